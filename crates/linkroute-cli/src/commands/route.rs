//! Route command handler for computing link routes in a scene file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use linkroute_lib::{LinkSpec, RouteRequest, RouterKind, Scene};

use linkroute_cli::output::{print_summaries, OutputFormat};

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Scene file to load.
    pub scene: PathBuf,
    /// Route only this link.
    pub link: Option<String>,
    /// Router name replacing the one each link names.
    pub router: Option<String>,
    /// Grid step replacing each link's option.
    pub step: Option<f64>,
    /// Search budget replacing each link's option.
    pub max_loops: Option<usize>,
    pub format: OutputFormat,
}

impl RouteCommandArgs {
    /// Parse the router override, failing on unknown names.
    fn router_override(&self) -> Result<Option<RouterKind>> {
        let Some(name) = self.router.as_deref() else {
            return Ok(None);
        };
        Ok(Some(name.parse::<RouterKind>()?))
    }

    fn apply_overrides(&self, request: &mut RouteRequest, router: Option<RouterKind>) {
        if let Some(router) = router {
            request.router = router;
        }
        if let Some(step) = self.step {
            request.options.step = step;
        }
        if let Some(max_loops) = self.max_loops {
            request.options.max_loops = max_loops;
        }
    }
}

/// Handle the `route` subcommand.
pub fn handle_route(args: &RouteCommandArgs) -> Result<()> {
    let router = args.router_override()?;
    let scene = Scene::from_path(&args.scene)
        .with_context(|| format!("failed to load scene from {}", args.scene.display()))?;

    let links: Vec<&LinkSpec> = match &args.link {
        Some(id) => vec![scene.link(id)?],
        None => scene.links.iter().collect(),
    };
    if links.is_empty() {
        warn!(scene = %args.scene.display(), "scene contains no links");
    }

    let mut summaries = Vec::with_capacity(links.len());
    for link in links {
        let mut request = scene
            .request_for(link)
            .with_context(|| format!("failed to prepare link '{}'", link.id))?;
        args.apply_overrides(&mut request, router);

        let routed = scene
            .route_request(&link.id, &request)
            .with_context(|| format!("failed to route link '{}'", link.id))?;
        if routed.route.fallback {
            warn!(link = %link.id, "search did not converge; drew fallback route");
        }
        summaries.push(routed.summary());
    }

    info!(links = summaries.len(), "routing complete");
    print_summaries(args.format, &summaries)
}
