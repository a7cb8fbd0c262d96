//! Obstacle collection and the spatial hash used by the grid routers.
//!
//! The canvas is divided into square buckets of a fixed pitch. Every padded
//! obstacle is registered in each bucket its footprint touches, so a point
//! query only tests the obstacles of the single bucket the point snaps to.
//! Registration covers the full footprint, which keeps the query exact: a
//! point inside an obstacle always finds that obstacle in its bucket.
//! Obstacles that would span more than [`MAX_CELLS_PER_OBSTACLE`] buckets are
//! kept in a separate list that every query scans.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{Insets, Point, Rect};
use crate::options::DEFAULT_OBSTACLE_GRID_SIZE;

type CellKey = (i64, i64);

/// Largest number of buckets a single obstacle is registered in.
pub const MAX_CELLS_PER_OBSTACLE: u64 = 4096;

/// Shape on the canvas that may block a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeInfo {
    pub id: String,
    /// Shape type name, matched against `exclude_types`.
    #[serde(rename = "type", default)]
    pub kind: String,
    pub bbox: Rect,
    /// Id of the shape this one is embedded in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl ShapeInfo {
    pub fn new(id: impl Into<String>, bbox: Rect) -> Self {
        Self {
            id: id.into(),
            kind: String::new(),
            bbox,
            parent: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Ids of every shape `id` is embedded in, innermost first.
pub fn ancestor_ids<'a>(shapes: &'a [ShapeInfo], id: &str) -> Vec<&'a str> {
    let by_id: HashMap<&str, &ShapeInfo> = shapes.iter().map(|s| (s.id.as_str(), s)).collect();
    let mut ancestors = Vec::new();
    let mut seen = HashSet::new();
    let mut current = by_id.get(id).and_then(|s| s.parent.as_deref());
    while let Some(parent) = current {
        if !seen.insert(parent) {
            break;
        }
        let Some(shape) = by_id.get(parent) else {
            break;
        };
        ancestors.push(shape.id.as_str());
        current = shape.parent.as_deref();
    }
    ancestors
}

/// Bounding boxes of the shapes a link between `source` and `target` must avoid.
///
/// The link's own ends, every shape they are embedded in, and every shape
/// whose kind is listed in `exclude_types` are left out.
pub fn collect_obstacles(
    shapes: &[ShapeInfo],
    source: Option<&str>,
    target: Option<&str>,
    exclude_types: &[String],
) -> Vec<Rect> {
    let mut excluded: HashSet<&str> = HashSet::new();
    for end in [source, target].into_iter().flatten() {
        excluded.insert(end);
        excluded.extend(ancestor_ids(shapes, end));
    }

    shapes
        .iter()
        .filter(|shape| !excluded.contains(shape.id.as_str()))
        .filter(|shape| !exclude_types.iter().any(|kind| *kind == shape.kind))
        .map(|shape| shape.bbox.normalized())
        .collect()
}

/// Spatial hash answering "is this point inside any obstacle".
///
/// Built once per routing call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ObstacleIndex {
    grid_size: f64,
    obstacles: Vec<Rect>,
    cells: HashMap<CellKey, Vec<usize>>,
    /// Obstacles too large to register bucket by bucket.
    oversized: Vec<usize>,
}

impl ObstacleIndex {
    /// Register `rects`, each grown by `padding`, in buckets of `grid_size`.
    pub fn build(
        rects: impl IntoIterator<Item = Rect>,
        padding: impl Into<Insets>,
        grid_size: f64,
    ) -> Self {
        let grid_size = if grid_size.is_finite() && grid_size > 0.0 {
            grid_size
        } else {
            DEFAULT_OBSTACLE_GRID_SIZE
        };
        let padding = padding.into();
        let padding = if padding.is_valid() {
            padding
        } else {
            Insets::default()
        };

        let mut obstacles = Vec::new();
        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        let mut oversized = Vec::new();

        for rect in rects {
            let padded = rect.pad(padding);
            let index = obstacles.len();
            obstacles.push(padded);

            let (x0, y0) = cell_key(padded.origin(), grid_size);
            let (x1, y1) = cell_key(padded.corner(), grid_size);
            let columns = x1.abs_diff(x0).saturating_add(1);
            let rows = y1.abs_diff(y0).saturating_add(1);
            if columns.saturating_mul(rows) > MAX_CELLS_PER_OBSTACLE {
                oversized.push(index);
                continue;
            }
            for cx in x0..=x1 {
                for cy in y0..=y1 {
                    cells.entry((cx, cy)).or_default().push(index);
                }
            }
        }

        debug!(
            obstacles = obstacles.len(),
            cells = cells.len(),
            oversized = oversized.len(),
            grid_size,
            "built obstacle index"
        );

        Self {
            grid_size,
            obstacles,
            cells,
            oversized,
        }
    }

    /// Index with no obstacles; every point is accessible.
    pub fn empty() -> Self {
        Self::build(std::iter::empty(), 0.0, DEFAULT_OBSTACLE_GRID_SIZE)
    }

    pub fn is_blocked(&self, point: Point) -> bool {
        self.candidates_near(point)
            .any(|obstacle| obstacle.contains_point(point))
    }

    /// Obstacles that may contain `point`: those registered in its bucket,
    /// followed by the oversized ones.
    pub fn candidates_near(&self, point: Point) -> impl Iterator<Item = &Rect> + '_ {
        self.cells
            .get(&cell_key(point, self.grid_size))
            .into_iter()
            .flatten()
            .chain(self.oversized.iter())
            .map(move |&index| &self.obstacles[index])
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Bucket of `point`; coordinates beyond the `i64` range clamp to its ends.
fn cell_key(point: Point, grid_size: f64) -> CellKey {
    (
        (point.x / grid_size + 0.5).floor() as i64,
        (point.y / grid_size + 0.5).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_inside_padding_is_blocked() {
        let index = ObstacleIndex::build([Rect::new(100.0, 100.0, 50.0, 50.0)], 10.0, 100.0);
        assert!(index.is_blocked(Point::new(95.0, 120.0)));
        assert!(index.is_blocked(Point::new(160.0, 160.0)));
        assert!(!index.is_blocked(Point::new(161.0, 120.0)));
    }

    #[test]
    fn huge_obstacle_is_scanned_instead_of_bucketed() {
        let index = ObstacleIndex::build(
            [
                Rect::new(-1e15, -1e15, 2e15, 2e15),
                Rect::new(0.0, 0.0, 10.0, 10.0),
            ],
            0.0,
            100.0,
        );
        assert_eq!(index.len(), 2);
        assert_eq!(index.cell_count(), 1);
        assert!(index.is_blocked(Point::new(1e14, -3e14)));
        assert_eq!(index.candidates_near(Point::new(5.0, 5.0)).count(), 2);
        assert!(!index.is_blocked(Point::new(2e15, 0.0)));
    }

    #[test]
    fn per_side_padding_is_applied() {
        let insets = Insets {
            top: 0.0,
            right: 30.0,
            bottom: 0.0,
            left: 0.0,
        };
        let index = ObstacleIndex::build([Rect::new(0.0, 0.0, 10.0, 10.0)], insets, 100.0);
        assert!(index.is_blocked(Point::new(35.0, 5.0)));
        assert!(!index.is_blocked(Point::new(-5.0, 5.0)));
        assert!(!index.is_blocked(Point::new(5.0, -5.0)));
    }

    #[test]
    fn obstacle_spanning_many_cells_is_found_everywhere() {
        let index = ObstacleIndex::build([Rect::new(-10.0, 90.0, 400.0, 20.0)], 0.0, 50.0);
        for x in (-10..=390).step_by(7) {
            assert!(index.is_blocked(Point::new(x as f64, 100.0)), "x = {x}");
        }
        assert!(index.cell_count() > 1);
    }

    #[test]
    fn ancestors_stop_on_cycles() {
        let shapes = vec![
            ShapeInfo::new("a", Rect::default()).with_parent("b"),
            ShapeInfo::new("b", Rect::default()).with_parent("a"),
        ];
        assert_eq!(ancestor_ids(&shapes, "a"), vec!["b", "a"]);
    }

    #[test]
    fn collect_skips_ends_ancestors_and_excluded_types() {
        let shapes = vec![
            ShapeInfo::new("group", Rect::new(0.0, 0.0, 500.0, 500.0)),
            ShapeInfo::new("source", Rect::new(10.0, 10.0, 40.0, 40.0)).with_parent("group"),
            ShapeInfo::new("target", Rect::new(300.0, 10.0, 40.0, 40.0)),
            ShapeInfo::new("label", Rect::new(150.0, 10.0, 40.0, 20.0)).with_kind("basic.Text"),
            ShapeInfo::new("wall", Rect::new(150.0, 100.0, 20.0, 200.0)),
        ];
        let obstacles = collect_obstacles(
            &shapes,
            Some("source"),
            Some("target"),
            &["basic.Text".to_string()],
        );
        assert_eq!(obstacles, vec![Rect::new(150.0, 100.0, 20.0, 200.0)]);
    }
}
