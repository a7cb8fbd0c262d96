//! Common test utilities and fixture helpers.
//!
//! This module provides shared scenes for the integration tests: the
//! reference source/target layouts, an enclosed target that no search can
//! reach, and helpers to replay a route against its obstacles.

use std::fs;
use std::path::PathBuf;

use linkroute_lib::{Anchor, ObstacleIndex, Point, Rect, Route, RouteRequest};
use tempfile::TempDir;

pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(x, y, width, height)
}

pub fn shape(x: f64, y: f64, width: f64, height: f64) -> Anchor {
    Anchor::Rect(rect(x, y, width, height))
}

/// Two boxes side by side on the same row, nothing in between.
pub fn aligned_pair() -> RouteRequest {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(200.0, 0.0, 40.0, 40.0))
}

/// Wall separating the two boxes of [`stacked_pair`].
pub fn wall() -> Rect {
    rect(-10.0, 90.0, 200.0, 20.0)
}

/// Two boxes in the same column with [`wall`] across the gap.
pub fn stacked_pair() -> RouteRequest {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(0.0, 200.0, 40.0, 40.0))
        .with_obstacles([wall()])
}

/// Two boxes offset on both axes, nothing in between.
#[allow(dead_code)]
pub fn diagonal_pair() -> RouteRequest {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(200.0, 200.0, 40.0, 40.0))
}

/// Four walls enclosing the target box completely.
#[allow(dead_code)]
pub fn enclosure() -> Vec<Rect> {
    vec![
        rect(150.0, 150.0, 140.0, 10.0),
        rect(150.0, 280.0, 140.0, 10.0),
        rect(150.0, 150.0, 10.0, 140.0),
        rect(280.0, 150.0, 10.0, 140.0),
    ]
}

/// A grid of small boxes scattered between source and target.
#[allow(dead_code)]
pub fn obstacle_field() -> Vec<Rect> {
    let mut field = Vec::new();
    for row in 0..4 {
        for col in 0..4 {
            let x = 80.0 + col as f64 * 70.0 + (row % 2) as f64 * 30.0;
            let y = -60.0 + row as f64 * 60.0;
            field.push(rect(x, y, 30.0, 30.0));
        }
    }
    field
}

/// Every vertex of `route` that lies inside one of the padded obstacles.
#[allow(dead_code)]
pub fn blocked_vertices(route: &Route, obstacles: &[Rect], padding: f64) -> Vec<Point> {
    let index = ObstacleIndex::build(obstacles.iter().copied(), padding, 100.0);
    route
        .points
        .iter()
        .copied()
        .filter(|point| index.is_blocked(*point))
        .collect()
}

/// Whether every segment of `line` is horizontal or vertical.
#[allow(dead_code)]
pub fn is_rectilinear(line: &[Point]) -> bool {
    line.windows(2)
        .all(|pair| pair[0].x == pair[1].x || pair[0].y == pair[1].y)
}

/// Temporary directory holding a single scene file.
#[allow(dead_code)]
pub struct SceneFile {
    _dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
pub fn write_scene(json: &str) -> SceneFile {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("scene.json");
    fs::write(&path, json).expect("write scene file");
    SceneFile { _dir: dir, path }
}
