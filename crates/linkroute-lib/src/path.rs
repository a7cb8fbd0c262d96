//! Direction-constrained A* search on a virtual grid.
//!
//! A link is routed as a chain of partial routes, one per waypoint gap. Each
//! partial route gets its own lattice: the origin sits on the segment's start
//! anchor and the pitch on each axis is stretched so the end anchor is a
//! lattice point too, which keeps waypoints and bare-point ends exact. The
//! search runs from the candidate points around the start to a single chosen
//! end point. Search state lives in an arena sized from the loop budget and is
//! discarded when the segment is done. A segment that cannot reach its goal
//! within the budget falls back to an obstacle-blind elbow, so routing always
//! yields a drawable result.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::{debug, warn};

use crate::geometry::{direction_angle, direction_change, snap_to_grid, Insets, Point, Rect, Side};
use crate::obstacles::ObstacleIndex;
use crate::options::{FallbackElbow, ResolvedOptions};
use crate::routing::{Anchor, PointObstacle};

/// Upper bound on arena slots reserved up front.
const MAX_PREALLOCATED_NODES: usize = 1 << 16;

/// Decimal places kept on every emitted coordinate.
const PRECISION: i32 = 1;

/// Largest lattice index (per axis) a segment may address.
const MAX_GRID_INDEX: f64 = 1_099_511_627_776.0;

/// Lattice coordinates relative to the segment's start anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
struct GridPoint {
    x: i64,
    y: i64,
}

impl GridPoint {
    const ORIGIN: GridPoint = GridPoint { x: 0, y: 0 };

    fn offset(self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

/// Search lattice of one segment.
#[derive(Debug, Clone, Copy)]
struct Grid {
    origin: Point,
    /// Pitch along each axis.
    x: f64,
    y: f64,
    step: f64,
}

impl Grid {
    /// Lattice through `from` with `to` on a lattice point; `None` when the
    /// distance between them cannot be represented.
    fn new(step: f64, from: Point, to: Point) -> Option<Self> {
        let x = grid_dimension(to.x - from.x, step);
        let y = grid_dimension(to.y - from.y, step);
        let valid = |pitch: f64| pitch.is_finite() && pitch > 0.0;
        (valid(x) && valid(y)).then_some(Self {
            origin: from,
            x,
            y,
            step,
        })
    }

    /// Lattice point nearest to `point`.
    fn cell(&self, point: Point) -> Option<GridPoint> {
        Some(GridPoint {
            x: lattice_index(point.x - self.origin.x, self.x)?,
            y: lattice_index(point.y - self.origin.y, self.y)?,
        })
    }

    fn point(&self, cell: GridPoint) -> Point {
        Point::new(
            self.origin.x + cell.x as f64 * self.x,
            self.origin.y + cell.y as f64 * self.y,
        )
        .round_to(PRECISION)
    }

    /// Direction from `start` to `end`, measured in lattice steps so that a
    /// stretched pitch does not skew the angle.
    fn direction_angle(&self, start: Point, end: Point, count: usize) -> u16 {
        let fixed = Point::new(
            start.x + (end.x - start.x) / self.x * self.step,
            start.y + (end.y - start.y) / self.y * self.step,
        );
        direction_angle(start, fixed, count)
    }
}

/// Pitch along one axis: `step`, corrected so `diff` is a whole number of
/// pitches. Distances below one step become a single pitch.
fn grid_dimension(diff: f64, step: f64) -> f64 {
    if diff == 0.0 {
        return step;
    }
    let distance = diff.abs();
    let steps = (distance / step).round();
    if steps == 0.0 {
        return distance;
    }
    step + (distance - steps * step) / steps
}

fn lattice_index(offset: f64, pitch: f64) -> Option<i64> {
    let index = snap_to_grid(offset, pitch) / pitch;
    let index = index.round();
    (index.is_finite() && index.abs() <= MAX_GRID_INDEX).then_some(index as i64)
}

/// Search state for one visited lattice point.
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    cell: GridPoint,
    point: Point,
    parent: Option<usize>,
    /// Angle of the step that reached this node; `None` for start points.
    direction: Option<u16>,
    cost: f64,
    closed: bool,
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: usize,
    cell: GridPoint,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: usize, cell: GridPoint, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cell,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap pops the lowest estimate; ties break on the
        // lattice point so equal inputs always expand in the same order.
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.cell.cmp(&self.cell))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Points a search may not step on.
pub(crate) enum Blockers<'a> {
    /// The obstacle index plus the unpadded boxes of the link's own ends.
    Index {
        index: &'a ObstacleIndex,
        ends: Vec<Rect>,
    },
    /// A caller-supplied test replacing the index.
    Predicate(&'a PointObstacle),
}

impl<'a> Blockers<'a> {
    pub(crate) fn new(index: &'a ObstacleIndex, ends: Vec<Rect>) -> Self {
        Blockers::Index { index, ends }
    }

    pub(crate) fn predicate(predicate: &'a PointObstacle) -> Self {
        Blockers::Predicate(predicate)
    }

    fn is_blocked(&self, point: Point) -> bool {
        match self {
            Blockers::Index { index, ends } => {
                index.is_blocked(point) || ends.iter().any(|end| end.contains_point(point))
            }
            Blockers::Predicate(predicate) => predicate.is_obstacle(point),
        }
    }
}

/// One stop of a link: where the route is drawn to, and for shapes the
/// padded box the route leaves or enters through.
#[derive(Debug, Clone, Copy)]
struct Stop {
    anchor: Point,
    bbox: Option<Rect>,
}

impl Stop {
    fn point(point: Point) -> Self {
        Self {
            anchor: point.round_to(PRECISION),
            bbox: None,
        }
    }

    fn from_anchor(anchor: &Anchor, padding: Insets) -> Self {
        match anchor {
            Anchor::Point(point) => Stop::point(*point),
            Anchor::Rect(rect) => Self {
                anchor: rect.normalized().center().round_to(PRECISION),
                bbox: Some(rect.pad(padding)),
            },
        }
    }

    /// Lattice points the route may leave from or arrive at.
    ///
    /// A shape yields one point per permitted side where the line from the
    /// anchor crosses the padded box, moved one pitch further out when it
    /// snaps back inside. A bare point is its own sole candidate.
    fn candidates(&self, sides: &[Side], grid: &Grid) -> Vec<GridPoint> {
        let Some(bbox) = self.bbox else {
            return grid.cell(self.anchor).into_iter().collect();
        };
        let mut cells = Vec::with_capacity(sides.len());
        for side in sides {
            let crossing = match side {
                Side::Right => Point::new(bbox.x + bbox.width, self.anchor.y),
                Side::Bottom => Point::new(self.anchor.x, bbox.y + bbox.height),
                Side::Left => Point::new(bbox.x, self.anchor.y),
                Side::Top => Point::new(self.anchor.x, bbox.y),
            };
            let Some(mut cell) = grid.cell(crossing) else {
                continue;
            };
            if bbox.contains_point(grid.point(cell)) {
                let (ux, uy) = side.unit();
                cell = cell.offset(ux as i64, uy as i64);
            }
            if !cells.contains(&cell) {
                cells.push(cell);
            }
        }
        cells
    }
}

/// Result of routing one segment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SegmentRoute {
    pub(crate) points: Vec<Point>,
    pub(crate) last_direction: Option<u16>,
    pub(crate) fallback: bool,
}

/// Why a segment fell back to the elbow route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackReason {
    OutOfRange,
    NoAccessibleStart,
    NoAccessibleEnd,
    BudgetExhausted,
    Unreachable,
}

impl FallbackReason {
    fn as_str(self) -> &'static str {
        match self {
            FallbackReason::OutOfRange => "coordinates out of range",
            FallbackReason::NoAccessibleStart => "no accessible start point",
            FallbackReason::NoAccessibleEnd => "no accessible end point",
            FallbackReason::BudgetExhausted => "loop budget exhausted",
            FallbackReason::Unreachable => "end point unreachable",
        }
    }
}

/// Route one segment between `from` and `to`.
///
/// `incoming` is the direction the route arrived with at `from`; `None`
/// marks the beginning of the link, the only place where a bare start point
/// may leave in any direction.
fn find_segment(
    from: &Stop,
    to: &Stop,
    blockers: &Blockers<'_>,
    opts: &ResolvedOptions,
    incoming: Option<u16>,
) -> SegmentRoute {
    let fallback = |reason| fallback_segment(from.anchor, to.anchor, incoming, opts, reason);

    let Some(grid) = Grid::new(opts.step, from.anchor, to.anchor) else {
        return fallback(FallbackReason::OutOfRange);
    };

    let starts: Vec<(GridPoint, Point)> = from
        .candidates(&opts.start_sides, &grid)
        .into_iter()
        .map(|cell| (cell, grid.point(cell)))
        .filter(|(_, point)| !blockers.is_blocked(*point))
        .collect();
    if starts.is_empty() {
        return fallback(FallbackReason::NoAccessibleStart);
    }

    // The single A* target: the accessible end candidate closest to any start.
    let mut goal: Option<(GridPoint, Point, f64)> = None;
    for cell in to.candidates(&opts.end_sides, &grid) {
        let point = grid.point(cell);
        if blockers.is_blocked(point) {
            continue;
        }
        let cost = starts
            .iter()
            .map(|(_, start)| start.manhattan_distance(point))
            .fold(f64::INFINITY, f64::min);
        if goal.map_or(true, |(_, _, best)| cost < best) {
            goal = Some((cell, point, cost));
        }
    }
    let Some((goal, goal_point, _)) = goal else {
        return fallback(FallbackReason::NoAccessibleEnd);
    };

    let direction_count = opts.directions.len();
    // A side point of a shape may only be entered at an acceptable angle
    // relative to the way into the shape.
    let goal_entry = (!goal_point.approx_eq(to.anchor))
        .then(|| grid.direction_angle(goal_point, to.anchor, direction_count));

    let capacity = opts
        .max_loops
        .saturating_mul(direction_count)
        .min(MAX_PREALLOCATED_NODES);
    let mut nodes: Vec<SearchNode> = Vec::with_capacity(capacity);
    let mut lookup: HashMap<GridPoint, usize> = HashMap::with_capacity(capacity);
    let mut open = BinaryHeap::new();

    for (cell, point) in &starts {
        let index = nodes.len();
        nodes.push(SearchNode {
            cell: *cell,
            point: *point,
            parent: None,
            direction: None,
            cost: 0.0,
            closed: false,
        });
        lookup.insert(*cell, index);
        open.push(AStarEntry::new(
            index,
            *cell,
            0.0,
            point.manhattan_distance(goal_point),
        ));
    }

    let mut loops_remaining = opts.max_loops;
    let mut exhausted_budget = false;

    while let Some(entry) = open.pop() {
        let current = entry.node;
        if nodes[current].closed || entry.cost.0 > nodes[current].cost {
            continue;
        }
        if loops_remaining == 0 {
            exhausted_budget = true;
            break;
        }

        let node = nodes[current];
        let is_start = node.cell == GridPoint::ORIGIN;
        let previous = node.direction.or(incoming).or_else(|| {
            (!is_start).then(|| grid.direction_angle(from.anchor, node.point, direction_count))
        });

        if node.cell == goal {
            let points = reconstruct_route(&nodes, current, from.anchor, to.anchor);
            debug!(
                loops = opts.max_loops - loops_remaining,
                vertices = points.len(),
                "grid search reached goal"
            );
            return SegmentRoute {
                points,
                last_direction: previous,
                fallback: false,
            };
        }

        nodes[current].closed = true;

        for dir in &opts.directions {
            let change = direction_change(previous.unwrap_or(0), dir.angle);
            if previous.is_some() && change > opts.max_direction_change {
                continue;
            }

            let neighbor = node.cell.offset(dir.dx, dir.dy);
            let existing = lookup.get(&neighbor).copied();
            if existing.is_some_and(|index| nodes[index].closed) {
                continue;
            }
            let neighbor_point = grid.point(neighbor);
            if blockers.is_blocked(neighbor_point) {
                continue;
            }
            if neighbor == goal {
                if let Some(entry_angle) = goal_entry {
                    if direction_change(dir.angle, entry_angle) > opts.max_direction_change {
                        continue;
                    }
                }
            }

            let penalty = if is_start {
                0.0
            } else {
                opts.penalties.penalty_for(change)
            };
            let cost = node.cost + dir.cost + penalty;
            let index = match existing {
                Some(index) if nodes[index].cost <= cost => continue,
                Some(index) => {
                    let slot = &mut nodes[index];
                    slot.parent = Some(current);
                    slot.direction = Some(dir.angle);
                    slot.cost = cost;
                    index
                }
                None => {
                    let index = nodes.len();
                    nodes.push(SearchNode {
                        cell: neighbor,
                        point: neighbor_point,
                        parent: Some(current),
                        direction: Some(dir.angle),
                        cost,
                        closed: false,
                    });
                    lookup.insert(neighbor, index);
                    index
                }
            };
            open.push(AStarEntry::new(
                index,
                neighbor,
                cost,
                neighbor_point.manhattan_distance(goal_point),
            ));
        }

        loops_remaining -= 1;
    }

    fallback(if exhausted_budget {
        FallbackReason::BudgetExhausted
    } else {
        FallbackReason::Unreachable
    })
}

/// Route `source -> waypoints -> target`, one search per gap.
///
/// Shape anchors are padded before their candidate points are derived. The
/// returned points exclude the anchors themselves but include every waypoint.
pub(crate) fn find_route(
    source: &Anchor,
    target: &Anchor,
    waypoints: &[Point],
    blockers: &Blockers<'_>,
    opts: &ResolvedOptions,
) -> SegmentRoute {
    let mut stops = Vec::with_capacity(waypoints.len() + 2);
    stops.push(Stop::from_anchor(source, opts.padding));
    stops.extend(waypoints.iter().map(|point| Stop::point(*point)));
    stops.push(Stop::from_anchor(target, opts.padding));

    let source_anchor = stops[0].anchor;
    let target_anchor = stops[stops.len() - 1].anchor;
    let dragging = opts.direct_when_dragging && (source.is_point() || target.is_point());
    let last_leg = stops.len() - 2;

    let mut points: Vec<Point> = Vec::new();
    let mut tail = source_anchor;
    let mut direction = opts.previous_direction_hint;
    let mut fallback = false;

    for (i, pair) in stops.windows(2).enumerate() {
        if i == last_leg && dragging {
            debug!("skipping search for final leg while dragging");
            break;
        }

        let segment = find_segment(&pair[0], &pair[1], blockers, opts, direction);
        fallback |= segment.fallback;
        direction = segment.last_direction.or(direction);

        let mut partial = segment.points.into_iter().peekable();
        if partial.peek().is_some_and(|lead| lead.approx_eq(tail)) {
            partial.next();
        }
        for point in partial {
            tail = point;
            points.push(point);
        }
    }

    if points.last().is_some_and(|p| p.approx_eq(target_anchor)) {
        points.pop();
    }

    SegmentRoute {
        points,
        last_direction: direction,
        fallback,
    }
}

/// Walk parent links back from `goal`, keeping only points where the
/// direction changes.
fn reconstruct_route(nodes: &[SearchNode], goal: usize, start: Point, end: Point) -> Vec<Point> {
    let mut route = Vec::new();
    let mut current = goal;
    let mut previous_diff = end.difference(nodes[goal].point).signum();

    while let Some(parent) = nodes[current].parent {
        let point = nodes[current].point;
        let diff = point.difference(nodes[parent].point).signum();
        if diff != previous_diff {
            route.push(point);
            previous_diff = diff;
        }
        current = parent;
    }

    let first = nodes[current].point;
    if first.difference(start).signum() != previous_diff {
        route.push(first);
    }

    route.reverse();
    route
}

fn fallback_segment(
    from: Point,
    to: Point,
    incoming: Option<u16>,
    opts: &ResolvedOptions,
    reason: FallbackReason,
) -> SegmentRoute {
    warn!(
        reason = reason.as_str(),
        from = %from,
        to = %to,
        "grid search failed; using fallback route"
    );
    let points = match opts.fallback {
        FallbackElbow::RightAngle => right_angle_elbow(from, to, incoming),
        FallbackElbow::Diagonal => diagonal_elbow(from, to),
    };
    let last_from = if points.len() >= 2 {
        points[points.len() - 2]
    } else {
        from
    };
    let last_direction = if last_from.approx_eq(to) {
        incoming
    } else {
        Some(direction_angle(last_from, to, opts.directions.len()))
    };
    SegmentRoute {
        points,
        last_direction,
        fallback: true,
    }
}

/// Obstacle-blind route with one right-angle bend ending at `to`.
///
/// After a horizontal run (or with no history) the route turns vertical
/// first, otherwise horizontal first, so repeated calls alternate the same way.
pub(crate) fn right_angle_elbow(from: Point, to: Point, incoming: Option<u16>) -> Vec<Point> {
    let elbow = if incoming.unwrap_or(0) % 180 == 0 {
        Point::new(from.x, to.y)
    } else {
        Point::new(to.x, from.y)
    };
    elbow_points(from, elbow, to)
}

/// Obstacle-blind route running straight along the dominant axis, then
/// diagonally at 45 degrees into `to`.
pub(crate) fn diagonal_elbow(from: Point, to: Point) -> Vec<Point> {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let elbow = if dx.abs() >= dy.abs() {
        Point::new(to.x - dx.signum() * dy.abs(), from.y)
    } else {
        Point::new(from.x, to.y - dy.signum() * dx.abs())
    };
    elbow_points(from, elbow.round_to(PRECISION), to)
}

fn elbow_points(from: Point, elbow: Point, to: Point) -> Vec<Point> {
    if from.approx_eq(to) {
        return Vec::new();
    }
    if elbow.approx_eq(from) || elbow.approx_eq(to) {
        return vec![to];
    }
    vec![elbow, to]
}
