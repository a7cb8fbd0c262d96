use std::fmt::Write;

use serde::Serialize;

use crate::geometry::Point;
use crate::routing::{Route, RouterKind};

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    /// Header line followed by one numbered vertex per line.
    PlainText,
    /// Single line with the full drawable path.
    Compact,
}

/// Vertex within a summarised route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteVertex {
    pub index: usize,
    pub x: f64,
    pub y: f64,
}

/// Structured representation of a computed route that consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub router: RouterKind,
    pub fallback: bool,
    pub vertices: usize,
    pub bends: usize,
    /// Length of the drawable path, anchors included.
    pub length: f64,
    pub source: Point,
    pub target: Point,
    pub points: Vec<RouteVertex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_direction: Option<u16>,
}

impl RouteSummary {
    /// Summarise `route` drawn between the given anchor points.
    pub fn from_route(
        link: Option<&str>,
        route: &Route,
        source_anchor: Point,
        target_anchor: Point,
    ) -> Self {
        let points = route
            .points
            .iter()
            .enumerate()
            .map(|(index, point)| RouteVertex {
                index,
                x: point.x,
                y: point.y,
            })
            .collect();

        Self {
            link: link.map(str::to_string),
            router: route.router,
            fallback: route.fallback,
            vertices: route.vertex_count(),
            bends: route.bend_count(source_anchor, target_anchor),
            length: route.length(source_anchor, target_anchor),
            source: source_anchor,
            target: target_anchor,
            points,
            last_direction: route.last_direction,
        }
    }

    fn label(&self) -> &str {
        self.link.as_deref().unwrap_or("<link>")
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::Compact => self.render_compact(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "Route {}: {} -> {} ({} vertices, {} bends, length {:.1}, router: {}{})",
            self.label(),
            self.source,
            self.target,
            self.vertices,
            self.bends,
            self.length,
            self.router,
            if self.fallback { ", fallback" } else { "" }
        );
        for vertex in &self.points {
            let _ = writeln!(buffer, "{:>3}: ({}, {})", vertex.index, vertex.x, vertex.y);
        }
        buffer
    }

    fn render_compact(&self) -> String {
        let path = std::iter::once(self.source)
            .chain(self.points.iter().map(|v| Point::new(v.x, v.y)))
            .chain(std::iter::once(self.target))
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        format!("{}: {path}\n", self.label())
    }
}
