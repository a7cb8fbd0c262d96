//! Routers command handler listing the registered routing strategies.

use anyhow::Result;
use serde::Serialize;

use linkroute_lib::{select_router, RouterKind};

use linkroute_cli::output::OutputFormat;

/// Registry entry as printed by the `routers` subcommand.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RouterEntry {
    pub name: &'static str,
    pub avoids_obstacles: bool,
    pub description: &'static str,
}

fn describe(kind: RouterKind) -> &'static str {
    match kind {
        RouterKind::Orthogonal => "right-angle legs between waypoints, no obstacle avoidance",
        RouterKind::Manhattan => "grid search with horizontal and vertical steps",
        RouterKind::Metro => "grid search with horizontal, vertical and diagonal steps",
    }
}

pub fn router_entries() -> Vec<RouterEntry> {
    RouterKind::ALL
        .into_iter()
        .map(|kind| RouterEntry {
            name: kind.name(),
            avoids_obstacles: select_router(kind).uses_obstacles(),
            description: describe(kind),
        })
        .collect()
}

/// Handle the `routers` subcommand.
pub fn handle_routers(format: OutputFormat) -> Result<()> {
    let entries = router_entries();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text | OutputFormat::Compact => {
            let default = RouterKind::default();
            for entry in &entries {
                let marker = if entry.name == default.name() { "*" } else { " " };
                println!("{marker} {:<11} {}", entry.name, entry.description);
            }
        }
    }
    Ok(())
}
