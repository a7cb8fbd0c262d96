//! Router registry and the routing call contract.
//!
//! This module provides:
//! - [`RouterKind`] - The named routing strategies (orthogonal, manhattan, metro)
//! - [`Anchor`] - A link end: a bare point or a shape's bounding box
//! - [`RouteRequest`] - Everything a single routing call consumes
//! - [`Route`] - The ordered vertex list a routing call produces
//! - [`plan_route`] and [`route`] - Entry points for computing routes
//!
//! # Strategy Pattern
//!
//! Each strategy implements the [`LinkRouter`] trait and is picked by
//! [`select_router`]. External names are parsed into [`RouterKind`] once, at
//! the boundary; an unknown name is reported as [`Error::UnknownRouter`] and
//! never replaced by a default.
//!
//! # Example
//!
//! ```
//! use linkroute_lib::{plan_route, Anchor, Rect, RouteRequest};
//!
//! let request = RouteRequest::manhattan(
//!     Anchor::Rect(Rect::new(0.0, 0.0, 40.0, 40.0)),
//!     Anchor::Rect(Rect::new(200.0, 0.0, 40.0, 40.0)),
//! );
//! let route = plan_route(&request).unwrap();
//! assert!(route.points.is_empty());
//! ```

mod planner;

pub use planner::{select_router, GridRouter, LinkRouter, OrthogonalRouter};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect, EPSILON};
use crate::options::RouterOptions;

/// Minimum Jaro-Winkler similarity for a router name to be suggested.
const SUGGESTION_THRESHOLD: f64 = 0.7;

/// Supported routing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RouterKind {
    /// Geometric right-angle routing without obstacle avoidance.
    Orthogonal,
    /// Grid search with four axis-aligned step directions.
    #[default]
    Manhattan,
    /// Grid search with eight step directions, including diagonals.
    Metro,
}

impl RouterKind {
    pub const ALL: [RouterKind; 3] = [
        RouterKind::Orthogonal,
        RouterKind::Manhattan,
        RouterKind::Metro,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RouterKind::Orthogonal => "orthogonal",
            RouterKind::Manhattan => "manhattan",
            RouterKind::Metro => "metro",
        }
    }

    /// Whether the strategy searches a grid around obstacles.
    pub fn uses_grid_search(self) -> bool {
        matches!(self, RouterKind::Manhattan | RouterKind::Metro)
    }
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RouterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        RouterKind::ALL
            .into_iter()
            .find(|kind| kind.name() == needle)
            .ok_or_else(|| Error::UnknownRouter {
                name: s.to_string(),
                suggestions: router_suggestions(&needle),
            })
    }
}

/// Registered router names resembling `name`, best match first.
fn router_suggestions(name: &str) -> Vec<String> {
    let mut scored: Vec<(f64, &'static str)> = RouterKind::ALL
        .into_iter()
        .map(|kind| (strsim::jaro_winkler(name, kind.name()), kind.name()))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .map(|(_, name)| name.to_string())
        .collect()
}

/// One end of a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    /// A bare coordinate, e.g. a link end being dragged.
    Point(Point),
    /// The bounding box of the shape the link is attached to.
    Rect(Rect),
}

impl Anchor {
    /// The point the link is drawn to: the point itself or the box center.
    pub fn center(&self) -> Point {
        match self {
            Anchor::Point(point) => *point,
            Anchor::Rect(rect) => rect.normalized().center(),
        }
    }

    /// Bounding box of the anchor; zero-sized for bare points.
    pub fn bbox(&self) -> Rect {
        match self {
            Anchor::Point(point) => Rect::at_point(*point),
            Anchor::Rect(rect) => rect.normalized(),
        }
    }

    pub fn is_point(&self) -> bool {
        matches!(self, Anchor::Point(_))
    }
}

impl From<Point> for Anchor {
    fn from(point: Point) -> Self {
        Anchor::Point(point)
    }
}

impl From<Rect> for Anchor {
    fn from(rect: Rect) -> Self {
        Anchor::Rect(rect)
    }
}

/// Caller-supplied test deciding whether the grid search may step on a point.
///
/// When set on a request it replaces the obstacle list, the padding and the
/// end exclusions entirely.
#[derive(Clone)]
pub struct PointObstacle(Arc<dyn Fn(Point) -> bool + Send + Sync>);

impl PointObstacle {
    pub fn new(test: impl Fn(Point) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }

    pub fn is_obstacle(&self, point: Point) -> bool {
        (self.0)(point)
    }
}

impl fmt::Debug for PointObstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PointObstacle(..)")
    }
}

/// Inputs of a single routing call.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub router: RouterKind,
    pub source: Anchor,
    pub target: Anchor,
    /// User-placed points the route passes through, in order.
    pub waypoints: Vec<Point>,
    /// Unpadded bounding boxes of the shapes to avoid.
    pub obstacles: Vec<Rect>,
    /// Overrides `obstacles` for the grid routers when set.
    pub obstacle_predicate: Option<PointObstacle>,
    pub options: RouterOptions,
}

impl RouteRequest {
    pub fn new(router: RouterKind, source: impl Into<Anchor>, target: impl Into<Anchor>) -> Self {
        Self {
            router,
            source: source.into(),
            target: target.into(),
            waypoints: Vec::new(),
            obstacles: Vec::new(),
            obstacle_predicate: None,
            options: RouterOptions::default(),
        }
    }

    pub fn orthogonal(source: impl Into<Anchor>, target: impl Into<Anchor>) -> Self {
        Self::new(RouterKind::Orthogonal, source, target)
    }

    pub fn manhattan(source: impl Into<Anchor>, target: impl Into<Anchor>) -> Self {
        Self::new(RouterKind::Manhattan, source, target)
    }

    pub fn metro(source: impl Into<Anchor>, target: impl Into<Anchor>) -> Self {
        Self::new(RouterKind::Metro, source, target)
    }

    pub fn with_waypoints(mut self, waypoints: impl IntoIterator<Item = Point>) -> Self {
        self.waypoints = waypoints.into_iter().collect();
        self
    }

    pub fn with_obstacles(mut self, obstacles: impl IntoIterator<Item = Rect>) -> Self {
        self.obstacles = obstacles.into_iter().collect();
        self
    }

    pub fn with_obstacle_predicate(
        mut self,
        test: impl Fn(Point) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.obstacle_predicate = Some(PointObstacle::new(test));
        self
    }

    pub fn with_options(mut self, options: RouterOptions) -> Self {
        self.options = options;
        self
    }
}

/// Route returned by the library.
///
/// `points` excludes the anchors; [`Route::polyline`] adds them back for
/// consumers that draw the link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub router: RouterKind,
    pub points: Vec<Point>,
    /// Set when at least one leg used the obstacle-blind fallback.
    pub fallback: bool,
    /// Direction (degrees) the route ended with; feed it back through
    /// `RouterOptions::previous_direction_hint` when re-routing the same link.
    pub last_direction: Option<u16>,
}

impl Route {
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Full drawable path: source anchor, vertices, target anchor, with
    /// consecutive duplicates removed.
    pub fn polyline(&self, source_anchor: Point, target_anchor: Point) -> Vec<Point> {
        let mut line = Vec::with_capacity(self.points.len() + 2);
        line.push(source_anchor);
        line.extend_from_slice(&self.points);
        line.push(target_anchor);
        line.dedup_by(|later, earlier| later.approx_eq(*earlier));
        line
    }

    /// Euclidean length of the drawable path.
    pub fn length(&self, source_anchor: Point, target_anchor: Point) -> f64 {
        self.polyline(source_anchor, target_anchor)
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Number of direction changes along the drawable path.
    pub fn bend_count(&self, source_anchor: Point, target_anchor: Point) -> usize {
        self.polyline(source_anchor, target_anchor)
            .windows(3)
            .filter(|w| {
                let a = w[1].difference(w[0]);
                let b = w[2].difference(w[1]);
                let cross = a.x * b.y - a.y * b.x;
                let dot = a.x * b.x + a.y * b.y;
                cross.abs() > EPSILON || dot < 0.0
            })
            .count()
    }
}

/// Compute a route for `request` with the strategy it names.
pub fn plan_route(request: &RouteRequest) -> Result<Route> {
    let router = select_router(request.router);
    let route = router.route(request)?;
    debug!(
        router = %request.router,
        vertices = route.points.len(),
        fallback = route.fallback,
        "route planned"
    );
    Ok(route)
}

/// Name-based entry point: route with the strategy called `strategy`.
///
/// Fails only on an unknown strategy name or malformed options.
pub fn route(
    strategy: &str,
    source: Anchor,
    target: Anchor,
    waypoints: &[Point],
    obstacles: &[Rect],
    options: &RouterOptions,
) -> Result<Vec<Point>> {
    let kind: RouterKind = strategy.parse()?;
    let request = RouteRequest::new(kind, source, target)
        .with_waypoints(waypoints.iter().copied())
        .with_obstacles(obstacles.iter().copied())
        .with_options(options.clone());
    plan_route(&request).map(Route::into_points)
}
