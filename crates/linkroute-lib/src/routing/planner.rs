//! Routing strategies implementing the Strategy pattern.
//!
//! This module provides the `LinkRouter` trait and its implementations: the
//! search-free orthogonal router and the grid (A*) router in its manhattan
//! and metro flavours.

use crate::error::Result;
use crate::geometry::Rect;
use crate::obstacles::ObstacleIndex;
use crate::orthogonal::find_orthogonal_route;
use crate::path::{find_route, Blockers};

use super::{Anchor, Route, RouteRequest, RouterKind};

/// Trait for routing strategies.
///
/// Implementations are stateless; everything a call needs arrives in the
/// request and every scratch structure is dropped when the call returns.
pub trait LinkRouter: Send + Sync {
    /// The strategy identifier for this router.
    fn kind(&self) -> RouterKind;

    /// Compute the route for `request`.
    ///
    /// Errors only on malformed options; search failures resolve to a
    /// fallback route.
    fn route(&self, request: &RouteRequest) -> Result<Route>;

    /// Whether this router reads the request's obstacle list.
    fn uses_obstacles(&self) -> bool {
        false
    }
}

/// Right-angle routing that ignores obstacles.
#[derive(Debug, Clone, Default)]
pub struct OrthogonalRouter;

impl LinkRouter for OrthogonalRouter {
    fn kind(&self) -> RouterKind {
        RouterKind::Orthogonal
    }

    fn route(&self, request: &RouteRequest) -> Result<Route> {
        let opts = request.options.resolve(RouterKind::Orthogonal)?;
        let found = find_orthogonal_route(
            &request.source,
            &request.target,
            &request.waypoints,
            opts.element_padding,
        );
        Ok(Route {
            router: RouterKind::Orthogonal,
            points: found.points,
            fallback: false,
            last_direction: found.last_bearing.map(|b| b.angle()),
        })
    }
}

/// Obstacle-avoiding A* router over a grid of `step` pitch.
#[derive(Debug, Clone)]
pub struct GridRouter {
    kind: RouterKind,
}

impl GridRouter {
    /// Four axis-aligned step directions, right-angle fallback.
    pub fn manhattan() -> Self {
        Self {
            kind: RouterKind::Manhattan,
        }
    }

    /// Eight step directions, diagonal fallback.
    pub fn metro() -> Self {
        Self {
            kind: RouterKind::Metro,
        }
    }
}

impl LinkRouter for GridRouter {
    fn kind(&self) -> RouterKind {
        self.kind
    }

    fn route(&self, request: &RouteRequest) -> Result<Route> {
        let opts = request.options.resolve(self.kind)?;
        let index;
        let blockers = match &request.obstacle_predicate {
            Some(predicate) => Blockers::predicate(predicate),
            None => {
                index = ObstacleIndex::build(
                    request.obstacles.iter().map(|rect| rect.normalized()),
                    opts.padding,
                    opts.obstacle_grid_size,
                );
                let ends: Vec<Rect> = [
                    (request.source, opts.exclude_source),
                    (request.target, opts.exclude_target),
                ]
                .iter()
                .filter_map(|(anchor, excluded)| match anchor {
                    Anchor::Rect(rect) if !excluded => Some(rect.normalized()),
                    _ => None,
                })
                .collect();
                Blockers::new(&index, ends)
            }
        };

        let found = find_route(
            &request.source,
            &request.target,
            &request.waypoints,
            &blockers,
            &opts,
        );
        Ok(Route {
            router: self.kind,
            points: found.points,
            fallback: found.fallback,
            last_direction: found.last_direction,
        })
    }

    fn uses_obstacles(&self) -> bool {
        true
    }
}

/// Select the router implementing `kind`.
pub fn select_router(kind: RouterKind) -> Box<dyn LinkRouter> {
    match kind {
        RouterKind::Orthogonal => Box::new(OrthogonalRouter),
        RouterKind::Manhattan => Box::new(GridRouter::manhattan()),
        RouterKind::Metro => Box::new(GridRouter::metro()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orthogonal_router_reports_kind() {
        let router = OrthogonalRouter;
        assert_eq!(router.kind(), RouterKind::Orthogonal);
        assert!(!router.uses_obstacles());
    }

    #[test]
    fn grid_routers_use_obstacles() {
        assert_eq!(GridRouter::manhattan().kind(), RouterKind::Manhattan);
        assert_eq!(GridRouter::metro().kind(), RouterKind::Metro);
        assert!(GridRouter::metro().uses_obstacles());
    }

    #[test]
    fn select_router_chooses_correct_type() {
        for kind in RouterKind::ALL {
            assert_eq!(select_router(kind).kind(), kind);
        }
    }
}
