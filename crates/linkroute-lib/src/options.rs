//! Router options.
//!
//! [`RouterOptions`] is the flat, caller-facing options record. Before a
//! route is computed it is validated and resolved into [`ResolvedOptions`],
//! which carries the derived values (step directions with their angles,
//! padding, penalty table) a router reads during the search.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{Insets, Point, Side};
use crate::routing::RouterKind;

/// Default grid pitch for the search routers.
pub const DEFAULT_STEP: f64 = 10.0;

/// Default padding around the source/target boxes for the orthogonal router.
pub const DEFAULT_ELEMENT_PADDING: f64 = 20.0;

/// Default pitch of the obstacle index buckets.
pub const DEFAULT_OBSTACLE_GRID_SIZE: f64 = 100.0;

/// Default search budget (number of expanded nodes per segment).
pub const DEFAULT_MAX_LOOPS: usize = 2000;

/// Default largest allowed turn between two consecutive steps, in degrees.
pub const DEFAULT_MAX_DIRECTION_CHANGE: u16 = 90;

/// Penalty added to a step for turning away from the incoming direction.
///
/// Keys are angular deltas in degrees. A delta between two keys uses the
/// penalty of the largest key not above it; values must not decrease as the
/// angle grows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyTable(BTreeMap<u16, f64>);

impl PenaltyTable {
    pub fn new(entries: impl IntoIterator<Item = (u16, f64)>) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Table used when the caller does not configure one: straight steps are
    /// free, any turn costs half a step.
    pub fn for_step(step: f64) -> Self {
        Self::new([(0, 0.0), (45, step / 2.0), (90, step / 2.0)])
    }

    pub fn penalty_for(&self, change: u16) -> f64 {
        self.0
            .range(..=change)
            .next_back()
            .map(|(_, penalty)| *penalty)
            .unwrap_or(0.0)
    }

    fn validate(&self) -> Result<()> {
        let mut previous = 0.0_f64;
        for (angle, penalty) in &self.0 {
            if *angle > 180 {
                return Err(Error::invalid_option(
                    "direction_change_penalty",
                    format!("angle {angle} exceeds 180 degrees"),
                ));
            }
            if !penalty.is_finite() || *penalty < 0.0 {
                return Err(Error::invalid_option(
                    "direction_change_penalty",
                    format!("penalty for {angle} degrees must be a non-negative number"),
                ));
            }
            if *penalty < previous {
                return Err(Error::invalid_option(
                    "direction_change_penalty",
                    format!("penalty for {angle} degrees is lower than for a smaller turn"),
                ));
            }
            previous = *penalty;
        }
        Ok(())
    }
}

/// Obstacle padding: one amount for every side, or per-side amounts.
///
/// In the per-side form `vertical` sets top and bottom, `horizontal` sets
/// left and right, and an explicit side overrides either. Sides left out are
/// not padded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f64),
    Sides(PaddingSides),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddingSides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
}

impl Padding {
    pub fn insets(&self) -> Insets {
        match *self {
            Padding::Uniform(value) => Insets::uniform(value),
            Padding::Sides(sides) => Insets {
                top: sides.top.or(sides.vertical).unwrap_or(0.0),
                right: sides.right.or(sides.horizontal).unwrap_or(0.0),
                bottom: sides.bottom.or(sides.vertical).unwrap_or(0.0),
                left: sides.left.or(sides.horizontal).unwrap_or(0.0),
            },
        }
    }
}

impl From<f64> for Padding {
    fn from(value: f64) -> Self {
        Padding::Uniform(value)
    }
}

/// Link end named in `exclude_ends`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkEndRole {
    Source,
    Target,
}

/// Caller-supplied options for a routing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Grid pitch used by the search routers.
    pub step: f64,
    /// Obstacle padding for the search routers; defaults to `step` on every side.
    pub padding: Option<Padding>,
    /// Padding around the source/target boxes for the orthogonal router.
    pub element_padding: f64,
    /// Bucket pitch of the obstacle index.
    pub obstacle_grid_size: f64,
    /// Sides of the source shape a route may leave from.
    pub start_directions: Vec<Side>,
    /// Sides of the target shape a route may arrive at.
    pub end_directions: Vec<Side>,
    /// Search budget per segment.
    pub max_loops: usize,
    /// Largest turn allowed between consecutive steps, in degrees.
    pub max_allowed_direction_change: u16,
    pub direction_change_penalty: Option<PenaltyTable>,
    /// Cost of a diagonal step for the metro router; defaults to `ceil(step * sqrt(2))`.
    pub diagonal_cost: Option<f64>,
    /// Shape kinds that never act as obstacles.
    pub exclude_types: Vec<String>,
    /// Link ends whose own box the search may cross.
    pub exclude_ends: Vec<LinkEndRole>,
    /// Direction (degrees) the link ended with on a previous routing of the
    /// same link. Seeds the turn penalties of the first segment.
    pub previous_direction_hint: Option<u16>,
    /// Skip the search for the final segment when either end is a bare point.
    pub direct_when_dragging: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP,
            padding: None,
            element_padding: DEFAULT_ELEMENT_PADDING,
            obstacle_grid_size: DEFAULT_OBSTACLE_GRID_SIZE,
            start_directions: Side::ALL.to_vec(),
            end_directions: Side::ALL.to_vec(),
            max_loops: DEFAULT_MAX_LOOPS,
            max_allowed_direction_change: DEFAULT_MAX_DIRECTION_CHANGE,
            direction_change_penalty: None,
            diagonal_cost: None,
            exclude_types: vec!["basic.Text".to_string()],
            exclude_ends: Vec::new(),
            previous_direction_hint: None,
            direct_when_dragging: false,
        }
    }
}

impl RouterOptions {
    /// Reject malformed values before any routing work starts.
    pub fn validate(&self) -> Result<()> {
        if !(self.step.is_finite() && self.step > 0.0) {
            return Err(Error::invalid_option("step", "must be a positive number"));
        }
        if let Some(padding) = self.padding {
            if !padding.insets().is_valid() {
                return Err(Error::invalid_option(
                    "padding",
                    "every side must be a non-negative number",
                ));
            }
        }
        if !(self.element_padding.is_finite() && self.element_padding >= 0.0) {
            return Err(Error::invalid_option(
                "element_padding",
                "must be a non-negative number",
            ));
        }
        if !(self.obstacle_grid_size.is_finite() && self.obstacle_grid_size > 0.0) {
            return Err(Error::invalid_option(
                "obstacle_grid_size",
                "must be a positive number",
            ));
        }
        if self.start_directions.is_empty() {
            return Err(Error::invalid_option(
                "start_directions",
                "at least one side is required",
            ));
        }
        if self.end_directions.is_empty() {
            return Err(Error::invalid_option(
                "end_directions",
                "at least one side is required",
            ));
        }
        if self.max_loops == 0 {
            return Err(Error::invalid_option("max_loops", "must be at least 1"));
        }
        if self.max_allowed_direction_change > 180 {
            return Err(Error::invalid_option(
                "max_allowed_direction_change",
                "must not exceed 180 degrees",
            ));
        }
        if let Some(cost) = self.diagonal_cost {
            if !(cost.is_finite() && cost > 0.0) {
                return Err(Error::invalid_option(
                    "diagonal_cost",
                    "must be a positive number",
                ));
            }
        }
        if let Some(hint) = self.previous_direction_hint {
            if hint >= 360 {
                return Err(Error::invalid_option(
                    "previous_direction_hint",
                    "must be an angle below 360 degrees",
                ));
            }
        }
        if let Some(table) = &self.direction_change_penalty {
            table.validate()?;
        }
        Ok(())
    }

    /// Validate and derive the values a router of `kind` needs.
    pub fn resolve(&self, kind: RouterKind) -> Result<ResolvedOptions> {
        self.validate()?;

        let step = self.step;
        let directions = match kind {
            RouterKind::Metro => {
                let diagonal = self
                    .diagonal_cost
                    .unwrap_or_else(|| (2.0 * step * step).sqrt().ceil());
                metro_directions(step, diagonal)
            }
            RouterKind::Manhattan | RouterKind::Orthogonal => manhattan_directions(step),
        };
        let fallback = match kind {
            RouterKind::Metro => FallbackElbow::Diagonal,
            RouterKind::Manhattan | RouterKind::Orthogonal => FallbackElbow::RightAngle,
        };

        Ok(ResolvedOptions {
            step,
            padding: self
                .padding
                .map_or_else(|| Insets::uniform(step), |padding| padding.insets()),
            element_padding: self.element_padding,
            obstacle_grid_size: self.obstacle_grid_size,
            start_sides: dedup_sides(&self.start_directions),
            end_sides: dedup_sides(&self.end_directions),
            directions,
            penalties: self
                .direction_change_penalty
                .clone()
                .unwrap_or_else(|| PenaltyTable::for_step(step)),
            max_loops: self.max_loops,
            max_direction_change: self.max_allowed_direction_change,
            exclude_source: self.exclude_ends.contains(&LinkEndRole::Source),
            exclude_target: self.exclude_ends.contains(&LinkEndRole::Target),
            previous_direction_hint: self.previous_direction_hint,
            direct_when_dragging: self.direct_when_dragging,
            fallback,
        })
    }
}

fn dedup_sides(sides: &[Side]) -> Vec<Side> {
    let mut unique = Vec::with_capacity(sides.len());
    for side in sides {
        if !unique.contains(side) {
            unique.push(*side);
        }
    }
    unique
}

/// One move on the search grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepDirection {
    /// Offset in grid cells.
    pub dx: i64,
    pub dy: i64,
    pub cost: f64,
    /// Angle of the move in degrees.
    pub angle: u16,
}

impl StepDirection {
    fn new(dx: i64, dy: i64, cost: f64) -> Self {
        let angle = Point::new(0.0, 0.0).theta(Point::new(dx as f64, dy as f64));
        Self {
            dx,
            dy,
            cost,
            angle: angle.round() as u16 % 360,
        }
    }
}

fn manhattan_directions(step: f64) -> Vec<StepDirection> {
    vec![
        StepDirection::new(1, 0, step),
        StepDirection::new(0, 1, step),
        StepDirection::new(-1, 0, step),
        StepDirection::new(0, -1, step),
    ]
}

fn metro_directions(step: f64, diagonal: f64) -> Vec<StepDirection> {
    vec![
        StepDirection::new(1, 0, step),
        StepDirection::new(1, 1, diagonal),
        StepDirection::new(0, 1, step),
        StepDirection::new(-1, 1, diagonal),
        StepDirection::new(-1, 0, step),
        StepDirection::new(-1, -1, diagonal),
        StepDirection::new(0, -1, step),
        StepDirection::new(1, -1, diagonal),
    ]
}

/// Shape of the obstacle-blind route used when a search segment fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackElbow {
    /// One right-angle bend, orientation alternating with the incoming direction.
    RightAngle,
    /// A straight run followed by a 45 degree diagonal.
    Diagonal,
}

/// Options after validation and derivation, read by the routers.
#[derive(Debug, Clone)]
pub struct ResolvedOptions {
    pub step: f64,
    pub padding: Insets,
    pub element_padding: f64,
    pub obstacle_grid_size: f64,
    pub start_sides: Vec<Side>,
    pub end_sides: Vec<Side>,
    pub directions: Vec<StepDirection>,
    pub penalties: PenaltyTable,
    pub max_loops: usize,
    pub max_direction_change: u16,
    pub exclude_source: bool,
    pub exclude_target: bool,
    pub previous_direction_hint: Option<u16>,
    pub direct_when_dragging: bool,
    pub fallback: FallbackElbow,
}
