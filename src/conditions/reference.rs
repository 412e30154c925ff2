//! Reference issue maps.
//!
//! The recorded "ground truth" for each route: which weather or incident the
//! route is known to have. Live reports that agree with it are valid issues;
//! live reports of trouble the map does not list for the route are invalid.

use super::{IncidentStatus, LiveTraffic, WeatherStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a live record relates to a route's reference issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueClass {
    /// Live data confirms the recorded issue
    Valid,
    /// Live data reports an issue the reference map does not corroborate
    Invalid,
    /// Nothing to report
    Clear,
}

/// Route name → expected weather / incident.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceIssues {
    pub weather: BTreeMap<String, WeatherStatus>,
    pub incidents: BTreeMap<String, IncidentStatus>,
}

impl ReferenceIssues {
    pub fn is_empty(&self) -> bool {
        self.weather.is_empty() && self.incidents.is_empty()
    }

    /// Classify one live record observed on `route`.
    pub fn classify(&self, route: &str, record: &LiveTraffic) -> IssueClass {
        let weather_matches = self
            .weather
            .get(route)
            .is_some_and(|expected| record.weather_status == Some(*expected));
        let incident_matches = self
            .incidents
            .get(route)
            .is_some_and(|expected| record.incident_status == Some(*expected));

        if weather_matches || incident_matches {
            IssueClass::Valid
        } else if record.reports_issue() {
            IssueClass::Invalid
        } else {
            IssueClass::Clear
        }
    }
}
