//! Route definitions as read from route files.

use crate::geo::{path_length_km, GeoPoint};
use serde::{Deserialize, Serialize};

/// A named point on a route. The first and last waypoints are the endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Waypoint {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// An ordered sequence of track points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub points: Vec<GeoPoint>,
}

/// Full definition of one pre-enumerated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Unique route identifier. Defaults to the file name when loaded from disk.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    /// Total length in kilometers. Computed from the first track when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl RouteDefinition {
    /// Total route distance in kilometers.
    pub fn distance_km(&self) -> f64 {
        self.distance_km.unwrap_or_else(|| {
            self.tracks
                .first()
                .map(|t| path_length_km(&t.points))
                .unwrap_or(0.0)
        })
    }

    /// Waypoints first, then the points of the first track.
    pub fn geometry(&self) -> Vec<GeoPoint> {
        let mut points: Vec<GeoPoint> = self.waypoints.iter().map(Waypoint::point).collect();
        if let Some(track) = self.tracks.first() {
            points.extend(track.points.iter().copied());
        }
        points
    }

    pub fn endpoints(&self) -> Option<RouteEndpoints> {
        let start = self.waypoints.first()?;
        let end = self.waypoints.last()?;
        Some(RouteEndpoints {
            start_name: start.name.clone(),
            start_description: start.description.clone(),
            end_name: end.name.clone(),
            end_description: end.description.clone(),
        })
    }
}

/// Names and descriptions of a route's start and end waypoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEndpoints {
    pub start_name: Option<String>,
    pub start_description: Option<String>,
    pub end_name: Option<String>,
    pub end_description: Option<String>,
}

impl RouteEndpoints {
    /// Name-or-description equality on both ends.
    pub fn connects(&self, source: &str, destination: &str) -> bool {
        let starts = self.start_name.as_deref() == Some(source)
            || self.start_description.as_deref() == Some(source);
        let ends = self.end_name.as_deref() == Some(destination)
            || self.end_description.as_deref() == Some(destination);
        starts && ends
    }

    pub fn start_label(&self) -> Option<&str> {
        self.start_description
            .as_deref()
            .or(self.start_name.as_deref())
    }

    pub fn end_label(&self) -> Option<&str> {
        self.end_description.as_deref().or(self.end_name.as_deref())
    }
}

/// A route identity with its total distance, as returned by catalog searches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    pub name: String,
    /// Kilometers
    pub distance: f64,
}

impl RouteCandidate {
    pub fn new(name: impl Into<String>, distance: f64) -> Self {
        Self {
            name: name.into(),
            distance,
        }
    }
}
