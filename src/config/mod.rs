//! Configuration module for Roadsage
//!
//! Provides layered configuration loading from files, environment variables, and defaults.
//!
//! # Configuration Precedence
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`ROADSAGE_*`)
//! 3. Configuration file (TOML)
//! 4. Default values (lowest priority)
//!
//! # Example
//!
//! ```rust
//! use roadsage::config::RoadsageConfig;
//!
//! let toml = r#"
//! [planner]
//! density_threshold = 7
//! "#;
//! let config: RoadsageConfig = toml::from_str(toml).unwrap();
//! assert_eq!(config.planner.density_threshold, 7);
//! assert_eq!(config.server.port, 8000);
//! ```

pub mod error;
pub mod logging;
pub mod planner;
pub mod providers;
pub mod server;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use planner::PlannerConfig;
pub use providers::{CatalogConfig, LiveTrafficConfig, ProvidersConfig, ToleranceConfig};
pub use server::ServerConfig;

use crate::conditions::ReferenceIssues;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unified configuration for the Roadsage server and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoadsageConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Planning behaviour
    pub planner: PlannerConfig,
    /// Route file location
    pub catalog: CatalogConfig,
    /// Static condition sources
    pub providers: ProvidersConfig,
    /// Live intersection telemetry
    pub live_traffic: LiveTrafficConfig,
    /// Known-issue reference used to adjudicate live reports
    pub reference_issues: ReferenceIssues,
}

impl RoadsageConfig {
    /// Load configuration from a TOML file
    ///
    /// If path is None, returns default configuration.
    /// If path doesn't exist, returns NotFound error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => {
                if !p.exists() {
                    return Err(ConfigError::NotFound(p.to_path_buf()));
                }
                let content = std::fs::read_to_string(p)?;
                toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply `ROADSAGE_*` environment overrides.
    ///
    /// Values that fail to parse are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(port) = std::env::var("ROADSAGE_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }
        if let Ok(host) = std::env::var("ROADSAGE_HOST") {
            self.server.host = host;
        }

        if let Ok(level) = std::env::var("ROADSAGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("ROADSAGE_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                self.logging.format = f;
            }
        }

        if let Ok(threshold) = std::env::var("ROADSAGE_DENSITY_THRESHOLD") {
            if let Ok(t) = threshold.parse() {
                self.planner.density_threshold = t;
            }
        }
        if let Ok(interval) = std::env::var("ROADSAGE_TICK_INTERVAL") {
            if let Ok(i) = interval.parse() {
                self.planner.tick_interval_seconds = i;
            }
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }

        if self.planner.history_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "planner.history_capacity".to_string(),
                message: "history must hold at least one entry".to_string(),
            });
        }
        if self.planner.tick_interval_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "planner.tick_interval_seconds".to_string(),
                message: "tick interval must be non-zero".to_string(),
            });
        }

        let tolerances = [
            ("traffic_trend", self.providers.tolerances.traffic_trend),
            ("weather", self.providers.tolerances.weather),
            ("planned_events", self.providers.tolerances.planned_events),
            ("live_traffic", self.providers.tolerances.live_traffic),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Validation {
                    field: format!("providers.tolerances.{}", name),
                    message: "tolerance must be a non-negative number".to_string(),
                });
            }
        }

        for (i, host) in self.live_traffic.hosts.iter().enumerate() {
            if host.trim().is_empty() {
                return Err(ConfigError::Validation {
                    field: format!("live_traffic.hosts[{}]", i),
                    message: "host cannot be empty".to_string(),
                });
            }
        }
        if self.live_traffic.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "live_traffic.timeout_seconds".to_string(),
                message: "timeout must be non-zero".to_string(),
            });
        }

        Ok(())
    }
}
