//! JSON scene documents: shapes plus the links to route between them.
//!
//! A scene is the minimal stand-in for a diagram model. Each link names its
//! ends either by shape id or as a bare point, and may carry waypoints, a
//! router name and options. Obstacles for a link are every other shape in the
//! scene, filtered by [`collect_obstacles`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::obstacles::{collect_obstacles, ShapeInfo};
use crate::options::RouterOptions;
use crate::output::RouteSummary;
use crate::routing::{plan_route, Anchor, Route, RouteRequest, RouterKind};

/// One end of a scene link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkEnd {
    /// Attached to the shape with this id.
    Shape { id: String },
    /// Free end at a fixed coordinate.
    Point(Point),
}

impl LinkEnd {
    pub fn shape_id(&self) -> Option<&str> {
        match self {
            LinkEnd::Shape { id } => Some(id),
            LinkEnd::Point(_) => None,
        }
    }
}

/// A link to be routed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub id: String,
    pub source: LinkEnd,
    pub target: LinkEnd,
    /// Waypoints the route must pass through.
    #[serde(default)]
    pub vertices: Vec<Point>,
    /// Router name; the default router is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    #[serde(default)]
    pub options: RouterOptions,
}

/// Shapes and links loaded from a scene file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub shapes: Vec<ShapeInfo>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
}

/// A link together with the route computed for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedLink {
    pub id: String,
    pub source_anchor: Point,
    pub target_anchor: Point,
    pub route: Route,
}

impl RoutedLink {
    pub fn summary(&self) -> RouteSummary {
        RouteSummary::from_route(
            Some(&self.id),
            &self.route,
            self.source_anchor,
            self.target_anchor,
        )
    }
}

impl Scene {
    pub fn from_json(json: &str) -> Result<Self> {
        let scene: Scene = serde_json::from_str(json)?;
        debug!(
            shapes = scene.shapes.len(),
            links = scene.links.len(),
            "loaded scene"
        );
        Ok(scene)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::SceneRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn shape(&self, id: &str) -> Result<&ShapeInfo> {
        self.shapes
            .iter()
            .find(|shape| shape.id == id)
            .ok_or_else(|| Error::UnknownShape { id: id.to_string() })
    }

    pub fn link(&self, id: &str) -> Result<&LinkSpec> {
        self.links
            .iter()
            .find(|link| link.id == id)
            .ok_or_else(|| Error::UnknownLink { id: id.to_string() })
    }

    fn anchor(&self, end: &LinkEnd) -> Result<Anchor> {
        match end {
            LinkEnd::Shape { id } => Ok(Anchor::Rect(self.shape(id)?.bbox)),
            LinkEnd::Point(point) => Ok(Anchor::Point(*point)),
        }
    }

    /// Resolve a link into a routing request.
    ///
    /// Fails on unknown shape ids and unknown router names.
    pub fn request_for(&self, link: &LinkSpec) -> Result<RouteRequest> {
        let router = match &link.router {
            Some(name) => name.parse()?,
            None => RouterKind::default(),
        };
        let source = self.anchor(&link.source)?;
        let target = self.anchor(&link.target)?;
        let obstacles = collect_obstacles(
            &self.shapes,
            link.source.shape_id(),
            link.target.shape_id(),
            &link.options.exclude_types,
        );

        Ok(RouteRequest::new(router, source, target)
            .with_waypoints(link.vertices.iter().copied())
            .with_obstacles(obstacles)
            .with_options(link.options.clone()))
    }

    /// Route a prepared request on behalf of link `id`.
    pub fn route_request(&self, id: &str, request: &RouteRequest) -> Result<RoutedLink> {
        let route = plan_route(request)?;
        Ok(RoutedLink {
            id: id.to_string(),
            source_anchor: request.source.center(),
            target_anchor: request.target.center(),
            route,
        })
    }

    pub fn route_link(&self, id: &str) -> Result<RoutedLink> {
        let link = self.link(id)?;
        let request = self.request_for(link)?;
        self.route_request(&link.id, &request)
    }

    /// Route every link in document order.
    pub fn route_all(&self) -> Result<Vec<RoutedLink>> {
        self.links
            .iter()
            .map(|link| {
                let request = self.request_for(link)?;
                self.route_request(&link.id, &request)
            })
            .collect()
    }
}
