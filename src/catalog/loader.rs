//! Route file loader.
//!
//! Reads every `*.gpx` and `*.json` file in a directory as a
//! [`RouteDefinition`]. GPX files contribute their waypoints and every track,
//! with segments joined in order. JSON files use the definition's own shape:
//!
//! ```json
//! {
//!   "waypoints": [
//!     {"latitude": 37.8715, "longitude": -122.2730, "name": "Berkeley", "description": "Berkeley, California"},
//!     {"latitude": 37.3541, "longitude": -121.9552, "name": "Santa Clara", "description": "Santa Clara, California"}
//!   ],
//!   "tracks": [{"points": [{"latitude": 37.8715, "longitude": -122.2730}]}]
//! }
//! ```
//!
//! Files load in file-name order. A missing `name` becomes the file name.

use super::{CatalogError, RouteDefinition, Track, Waypoint};
use crate::geo::GeoPoint;
use std::io::Read;
use std::path::Path;

/// Extensions the loader picks up.
const ROUTE_EXTENSIONS: [&str; 2] = ["gpx", "json"];

/// Load all route definitions found in `dir`.
///
/// Unparseable files are skipped with a warning so one broken file does not
/// take the whole catalog down.
pub fn load_route_dir(dir: &Path) -> Result<Vec<RouteDefinition>, CatalogError> {
    if !dir.is_dir() {
        return Err(CatalogError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .is_some_and(|ext| ROUTE_EXTENSIONS.iter().any(|known| ext == *known))
        })
        .collect();
    paths.sort();

    let mut routes = Vec::with_capacity(paths.len());
    for path in paths {
        match load_route_file(&path) {
            Ok(route) => routes.push(route),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable route file");
            }
        }
    }

    tracing::info!(
        dir = %dir.display(),
        routes = routes.len(),
        "Loaded route catalog"
    );

    Ok(routes)
}

/// Load a single route definition, GPX or JSON by extension.
pub fn load_route_file(path: &Path) -> Result<RouteDefinition, CatalogError> {
    let parse_error = |message: String| CatalogError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut route = if path.extension().is_some_and(|ext| ext == "gpx") {
        let file = std::fs::File::open(path)?;
        parse_gpx(std::io::BufReader::new(file)).map_err(parse_error)?
    } else {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str::<RouteDefinition>(&content)
            .map_err(|e| parse_error(e.to_string()))?
    };

    if route.name.is_empty() {
        route.name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    Ok(route)
}

/// Convert a GPX document into an unnamed route definition.
///
/// The distance is left unset so it is computed from the first track.
pub fn parse_gpx<R: Read>(reader: R) -> Result<RouteDefinition, String> {
    let document = gpx::read(reader).map_err(|e| e.to_string())?;

    let to_point = |waypoint: &gpx::Waypoint| {
        let point = waypoint.point();
        GeoPoint::new(point.y(), point.x())
    };

    let waypoints = document
        .waypoints
        .iter()
        .map(|waypoint| {
            let point = to_point(waypoint);
            Waypoint {
                latitude: point.latitude,
                longitude: point.longitude,
                name: waypoint.name.clone(),
                description: waypoint.description.clone(),
            }
        })
        .collect();

    let tracks = document
        .tracks
        .iter()
        .map(|track| Track {
            name: track.name.clone(),
            points: track
                .segments
                .iter()
                .flat_map(|segment| segment.points.iter().map(to_point))
                .collect(),
        })
        .collect();

    Ok(RouteDefinition {
        name: String::new(),
        waypoints,
        tracks,
        distance_km: None,
    })
}
