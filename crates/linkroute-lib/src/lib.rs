//! Link routing library entry points.
//!
//! This crate computes the intermediate vertices of a diagram link between two
//! anchors (shapes or bare points), optionally through user waypoints and
//! around obstacle shapes. Three strategies are available: a search-free
//! orthogonal router and a grid A* router in manhattan (4 directions) and
//! metro (8 directions) flavours. Higher-level consumers (the CLI) should only
//! depend on the items exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod geometry;
pub mod obstacles;
pub mod options;
pub mod orthogonal;
pub mod output;
pub mod path;
pub mod routing;
pub mod scene;

pub use error::{Error, Result};
pub use geometry::{bearing, Bearing, Insets, Line, Point, Rect, Side};
pub use obstacles::{collect_obstacles, ObstacleIndex, ShapeInfo};
pub use options::{LinkEndRole, Padding, PaddingSides, PenaltyTable, RouterOptions};
pub use output::{RouteRenderMode, RouteSummary};
pub use routing::{
    plan_route, route, select_router, Anchor, LinkRouter, PointObstacle, Route, RouteRequest,
    RouterKind,
};
pub use scene::{LinkEnd, LinkSpec, RoutedLink, Scene};
