//! Condition enumerations and their wire strings.
//!
//! Unknown strings never fail to parse: data feeds are noisy and a bad
//! value must not take a provider offline. Congestion degrades to `Low`,
//! weather and incidents degrade to their clear variants.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Expected traffic congestion at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum CongestionLevel {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Moderate")]
    Moderate,
    #[serde(rename = "High")]
    High,
    #[serde(rename = "Severe")]
    Severe,
}

impl CongestionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Severe => "Severe",
        }
    }

    /// High or severe congestion.
    pub fn is_heavy(&self) -> bool {
        matches!(self, Self::High | Self::Severe)
    }

    pub fn parse_lossy(s: &str) -> Self {
        match s.trim() {
            "Low" => Self::Low,
            "Moderate" => Self::Moderate,
            "High" => Self::High,
            "Severe" => Self::Severe,
            other => {
                tracing::debug!(value = other, "Unknown congestion level, assuming Low");
                Self::Low
            }
        }
    }
}

/// Reported or forecast weather at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum WeatherStatus {
    #[serde(rename = "sunny")]
    Sunny,
    #[serde(rename = "cloudy")]
    Cloudy,
    #[serde(rename = "fog")]
    Fog,
    #[serde(rename = "rain")]
    Rain,
    #[serde(rename = "snow")]
    Snow,
    #[serde(rename = "Clear")]
    Clear,
    #[serde(rename = "Severe thunderstorms")]
    Storm,
    #[serde(rename = "Roadside Fire")]
    Fire,
    #[serde(rename = "Flash Floods")]
    Flood,
}

impl WeatherStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Fog => "fog",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Clear => "Clear",
            Self::Storm => "Severe thunderstorms",
            Self::Fire => "Roadside Fire",
            Self::Flood => "Flash Floods",
        }
    }

    /// Weather that triggers an alternate route search.
    pub fn is_adverse(&self) -> bool {
        matches!(
            self,
            Self::Fog | Self::Rain | Self::Storm | Self::Snow | Self::Fire | Self::Flood
        )
    }

    pub fn parse_lossy(s: &str) -> Self {
        match s.trim() {
            "sunny" => Self::Sunny,
            "cloudy" => Self::Cloudy,
            "fog" => Self::Fog,
            "rain" => Self::Rain,
            "snow" => Self::Snow,
            "Clear" => Self::Clear,
            "Severe thunderstorms" => Self::Storm,
            "Roadside Fire" => Self::Fire,
            "Flash Floods" => Self::Flood,
            other => {
                tracing::debug!(value = other, "Unknown weather status, assuming Clear");
                Self::Clear
            }
        }
    }
}

/// Incident reported at an intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum IncidentStatus {
    #[serde(rename = "clear")]
    Clear,
    #[serde(rename = "accident")]
    Accident,
    #[serde(rename = "crowding")]
    Crowding,
    #[serde(rename = "roadblock")]
    Roadblock,
    #[serde(rename = "maintenance")]
    Maintenance,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Accident => "accident",
            Self::Crowding => "crowding",
            Self::Roadblock => "roadblock",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn parse_lossy(s: &str) -> Self {
        match s.trim() {
            "clear" => Self::Clear,
            "accident" => Self::Accident,
            "crowding" => Self::Crowding,
            "roadblock" => Self::Roadblock,
            "maintenance" => Self::Maintenance,
            other => {
                tracing::debug!(value = other, "Unknown incident status, assuming clear");
                Self::Clear
            }
        }
    }
}

macro_rules! lossy_string_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<String> for $ty {
                fn from(s: String) -> Self {
                    Self::parse_lossy(&s)
                }
            }

            impl std::str::FromStr for $ty {
                type Err = std::convert::Infallible;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(Self::parse_lossy(s))
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

lossy_string_conversions!(CongestionLevel, WeatherStatus, IncidentStatus);
