//! Routes command implementation

use crate::api::RouteSummaryView;
use crate::catalog::RouteCatalog;
use crate::cli::{load_config, output, RoutesArgs};
use anyhow::Context;

/// Handle `roadsage routes` command
pub fn handle_routes(args: &RoutesArgs) -> anyhow::Result<String> {
    let config = load_config(&args.config)?;
    let routes_dir = args
        .routes_dir
        .clone()
        .unwrap_or(config.catalog.routes_dir);
    let catalog = RouteCatalog::load_dir(&routes_dir)
        .with_context(|| format!("Failed to load routes from {}", routes_dir.display()))?;

    list_catalog(&catalog, args)
}

/// Render the listing requested by `args` for an already loaded catalog.
pub fn list_catalog(catalog: &RouteCatalog, args: &RoutesArgs) -> anyhow::Result<String> {
    if args.locations {
        let locations = catalog.locations();
        return Ok(if args.json {
            output::format_locations_json(&locations)?
        } else {
            output::format_locations(&locations)
        });
    }

    let summaries = match (args.from.as_deref(), args.to.as_deref()) {
        (Some(from), Some(to)) => catalog.routes_between(from, to),
        _ => catalog.routes(),
    };
    let views: Vec<RouteSummaryView> = summaries.into_iter().map(Into::into).collect();

    Ok(if args.json {
        output::format_routes_json(&views)?
    } else {
        output::format_routes_table(&views)
    })
}
