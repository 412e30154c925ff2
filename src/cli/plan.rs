//! Plan command implementation

use crate::cli::{load_config, output, PlanArgs};
use crate::config::RoadsageConfig;
use crate::planner::{PlanReport, PlanningSession, RoutePlanner};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Apply the plan command's overrides to the loaded configuration.
pub fn apply_overrides(mut config: RoadsageConfig, args: &PlanArgs) -> RoadsageConfig {
    if let Some(dir) = &args.routes_dir {
        config.catalog.routes_dir = dir.clone();
    }
    if let Some(snapshot) = &args.live_traffic {
        config.live_traffic.snapshot_file = Some(snapshot.clone());
    }
    config.logging.level = args.log_level.clone();
    config
}

/// Run `ticks` planning steps for one pair and collect every report.
pub async fn run_steps(
    planner: Arc<RoutePlanner>,
    args: &PlanArgs,
) -> anyhow::Result<Vec<PlanReport>> {
    let mut session = PlanningSession::new(planner, args.from.as_str(), args.to.as_str())?;
    let mut reports = Vec::with_capacity(args.ticks as usize);

    for step in 0..args.ticks {
        if step > 0 && args.interval > 0 {
            tokio::time::sleep(Duration::from_secs(args.interval)).await;
        }
        let state = session
            .tick()
            .await
            .with_context(|| format!("Planning step {} failed", step + 1))?;
        reports.push(PlanReport::from(state.clone()));
    }

    Ok(reports)
}

/// Handle `roadsage plan` command
pub async fn handle_plan(args: &PlanArgs) -> anyhow::Result<String> {
    let config = apply_overrides(load_config(&args.config)?, args);
    config.validate()?;
    if let Err(e) = crate::logging::init_tracing(&config.logging) {
        eprintln!("Warning: logging unavailable: {}", e);
    }

    let planner = RoutePlanner::from_config(&config).context("Failed to build planner")?;
    let reports = run_steps(Arc::new(planner), args).await?;

    Ok(if args.json {
        output::format_plan_json(&reports)?
    } else {
        output::format_plan_table(&reports)
    })
}
