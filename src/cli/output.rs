//! Output formatting helpers for CLI commands

use crate::api::RouteSummaryView;
use crate::planner::PlanReport;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;

/// Format routes as a table
pub fn format_routes_table(routes: &[RouteSummaryView]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Route", "Distance", "Start", "End", "Points"]);

    for r in routes {
        table.add_row(vec![
            Cell::new(&r.name),
            Cell::new(format!("{:.1} km", r.distance_km)),
            Cell::new(r.start.as_deref().unwrap_or("-")),
            Cell::new(r.end.as_deref().unwrap_or("-")),
            Cell::new(r.points),
        ]);
    }

    table.to_string()
}

/// Format routes as JSON
pub fn format_routes_json(routes: &[RouteSummaryView]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "routes": routes }))
}

/// Format locations one per line
pub fn format_locations(locations: &[String]) -> String {
    if locations.is_empty() {
        return "No locations found".yellow().to_string();
    }
    locations.join("\n")
}

/// Format locations as JSON
pub fn format_locations_json(locations: &[String]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "locations": locations }))
}

/// Short label for how the current recommendation was reached.
pub fn route_status(report: &PlanReport) -> &'static str {
    let state = &report.state;
    if state.optimal_route.is_none() {
        "none"
    } else if state.is_unique_route {
        "unique"
    } else if state.is_sub_optimal {
        "sub-optimal"
    } else {
        "optimal"
    }
}

fn colored_status(status: &str) -> String {
    match status {
        "optimal" => status.green().to_string(),
        "unique" => status.cyan().to_string(),
        "sub-optimal" => status.yellow().to_string(),
        _ => status.red().to_string(),
    }
}

/// Format planning steps as a table, one row per step
pub fn format_plan_table(reports: &[PlanReport]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Step", "Route", "Distance", "Status", "Blocked", "Details"]);

    for (i, report) in reports.iter().enumerate() {
        let state = &report.state;
        let (route, distance) = match &state.optimal_route {
            Some(optimal) => (
                optimal.route.name.clone(),
                format!("{:.1} km", optimal.route.distance),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let blocked = state.blocked_routes.len() + state.blocked_routes_invalid.len();

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(route),
            Cell::new(distance),
            Cell::new(colored_status(route_status(report))),
            Cell::new(blocked),
            Cell::new(report.issue.as_deref().unwrap_or("")),
        ]);
    }

    table.to_string()
}

/// Format planning steps as JSON
pub fn format_plan_json(reports: &[PlanReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({ "steps": reports }))
}
