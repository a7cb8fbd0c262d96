//! Search-free router producing right-angle routes.
//!
//! The route is built leg by leg between consecutive points of
//! `source anchor, waypoints.., target anchor`. Each leg is classified by what
//! its ends are (shape or waypoint) and joined with at most a couple of
//! elbow points; legs that are already axis-aligned need none.

use std::f64::consts::FRAC_PI_2;

use tracing::debug;

use crate::geometry::{bearing, Bearing, Line, Point, Rect};
use crate::routing::Anchor;

/// Elbow points for one leg plus the bearing the leg ends with.
#[derive(Debug, Clone, PartialEq)]
struct Leg {
    points: Vec<Point>,
    direction: Option<Bearing>,
}

impl Leg {
    fn single(point: Point, to: Point) -> Self {
        Self {
            points: vec![point],
            direction: bearing(point, to),
        }
    }
}

/// Result of routing a whole link.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrthogonalRoute {
    pub(crate) points: Vec<Point>,
    pub(crate) last_bearing: Option<Bearing>,
}

fn point_box(p: Point) -> Rect {
    Rect::at_point(p)
}

/// Width for horizontal bearings, height otherwise.
fn box_size(bbox: &Rect, brng: Option<Bearing>) -> f64 {
    match brng {
        Some(b) if b.is_horizontal() => bbox.width,
        _ => bbox.height,
    }
}

/// Corner point `p` such that `p1-p` and `p-p2` are perpendicular, preferring
/// the corner outside `bbox`.
fn free_join(p1: Point, p2: Point, bbox: &Rect) -> Point {
    let p = Point::new(p1.x, p2.y);
    if bbox.contains_point(p) {
        Point::new(p2.x, p1.y)
    } else {
        p
    }
}

fn is_orthogonal(from: Point, to: Point) -> bool {
    from.approx_eq(to) || bearing(from, to).is_some()
}

fn vertex_vertex(from: Point, to: Point, brng: Option<Bearing>) -> Leg {
    let p1 = Point::new(from.x, to.y);
    let p2 = Point::new(to.x, from.y);
    let d1 = bearing(from, p1);
    let d2 = bearing(from, p2);
    let reverse = brng.map(Bearing::opposite);

    // Keep going the way the previous leg went, and never double back.
    let p = if d1 == brng || (d1 != reverse && (d2 == reverse || d2 != brng)) {
        p1
    } else {
        p2
    };
    Leg::single(p, to)
}

fn element_vertex(from: Point, to: Point, from_bbox: &Rect) -> Leg {
    Leg::single(free_join(from, to, from_bbox), to)
}

fn vertex_element(from: Point, to: Point, to_bbox: &Rect, brng: Option<Bearing>) -> Leg {
    let corners = [Point::new(from.x, to.y), Point::new(to.x, from.y)];
    let free: Vec<Point> = corners
        .iter()
        .copied()
        .filter(|p| !to_bbox.contains_point(*p))
        .collect();
    let forward: Vec<Point> = free
        .iter()
        .copied()
        .filter(|p| bearing(*p, from) != brng)
        .collect();

    if !forward.is_empty() {
        let p = forward
            .iter()
            .rev()
            .find(|p| bearing(from, **p) == brng)
            .copied()
            .unwrap_or(forward[0]);
        return Leg::single(p, to);
    }

    // Every corner is either inside the element or would reverse the previous
    // leg: push a contained corner out of the element and join to it instead.
    let inside = corners
        .iter()
        .copied()
        .find(|p| !free.contains(p))
        .unwrap_or(corners[0]);
    let outside = to.move_from(inside, -box_size(to_bbox, brng) / 2.0);
    let join = free_join(outside, from, to_bbox);
    Leg {
        points: vec![join, outside],
        direction: bearing(outside, to),
    }
}

fn element_element(from: Point, to: Point, from_bbox: &Rect, to_bbox: &Rect) -> Leg {
    let leg = element_vertex(to, from, to_bbox);
    let p1 = leg.points[0];
    if !from_bbox.contains_point(p1) {
        return leg;
    }

    let leg = element_vertex(from, to, from_bbox);
    let p2 = leg.points[0];
    if !to_bbox.contains_point(p2) {
        return leg;
    }

    // Both corners land inside the other box; route through the middle of
    // the gap between the two boxes.
    let from_border = from.move_from(p2, -box_size(from_bbox, bearing(from, p2)) / 2.0);
    let to_border = to.move_from(p1, -box_size(to_bbox, bearing(to, p1)) / 2.0);
    let mid = Line::new(from_border, to_border).midpoint();

    let start = element_vertex(from, mid, from_bbox);
    let end = vertex_vertex(mid, to, start.direction);
    Leg {
        points: vec![start.points[0], end.points[0]],
        direction: end.direction,
    }
}

/// Route between ends where one box contains or overlaps the other.
///
/// The route leaves the union of both boxes from the end nearer its
/// boundary, travels around outside it and comes back in to the other end.
fn inside_element(
    from: Point,
    to: Point,
    from_bbox: &Rect,
    to_bbox: &Rect,
    brng: Option<Bearing>,
) -> Leg {
    let boundary = from_bbox.union(to_bbox).inflate(1.0, 1.0);
    let center = boundary.center();

    let reversed = center.distance(to) > center.distance(from);
    let (start, end) = if reversed { (to, from) } else { (from, to) };
    let reach = boundary.width + boundary.height;

    let p1 = match brng {
        Some(b) => {
            // At distance w + h from any inner point we are outside the box.
            let far = Point::from_polar(reach, b.radians(), start);
            boundary.nearest_boundary_point(far).move_from(far, -1.0)
        }
        None => boundary.nearest_boundary_point(start).move_from(start, 1.0),
    };
    let p2 = free_join(p1, end, &boundary);

    let points = if p1.round() == p2.round() {
        let far = Point::from_polar(reach, p1.theta(start).to_radians() + FRAC_PI_2, end);
        let p2 = boundary
            .nearest_boundary_point(far)
            .move_from(end, 1.0)
            .round();
        let p3 = free_join(p1, p2, &boundary);
        if reversed {
            vec![p2, p3, p1]
        } else {
            vec![p1, p3, p2]
        }
    } else if reversed {
        vec![p2, p1]
    } else {
        vec![p1, p2]
    };

    let last = if reversed { p1 } else { points[points.len() - 1] };
    Leg {
        direction: bearing(last, to),
        points,
    }
}

fn anchor_contains(anchor: &Anchor, p: Point) -> bool {
    matches!(anchor, Anchor::Rect(rect) if rect.contains_point(p))
}

/// Whether one end shape encloses the other (or the other's anchor).
fn ends_nested(source: &Anchor, target: &Anchor) -> bool {
    if let (Anchor::Rect(s), Anchor::Rect(t)) = (source, target) {
        if s.contains_rect(t) || t.contains_rect(s) {
            return true;
        }
    }
    anchor_contains(source, target.center()) || anchor_contains(target, source.center())
}

/// Route `source -> waypoints -> target` with right-angle legs.
///
/// `element_padding` is the clearance kept around shape anchors.
pub(crate) fn find_orthogonal_route(
    source: &Anchor,
    target: &Anchor,
    waypoints: &[Point],
    element_padding: f64,
) -> OrthogonalRoute {
    let source_anchor = source.center();
    let target_anchor = target.center();
    let source_bbox = source
        .bbox()
        .inflate(element_padding, element_padding)
        .union(&point_box(source_anchor));
    let target_bbox = target
        .bbox()
        .inflate(element_padding, element_padding)
        .union(&point_box(target_anchor));

    let mut vertices = Vec::with_capacity(waypoints.len() + 2);
    vertices.push(source_anchor);
    vertices.extend_from_slice(waypoints);
    vertices.push(target_anchor);

    let last = vertices.len() - 1;
    let mut brng: Option<Bearing> = None;
    let mut points = Vec::new();

    for (i, pair) in vertices.windows(2).enumerate() {
        let (from, to) = (pair[0], pair[1]);
        let orthogonal = is_orthogonal(from, to);
        let leg = if i == 0 && i + 1 == last {
            // Touching boxes are caught by growing one of them by a pixel.
            if ends_nested(source, target) {
                Some(inside_element(from, to, &source_bbox, &target_bbox, None))
            } else if orthogonal {
                None
            } else if source_bbox.intersects(&target_bbox.inflate(1.0, 1.0)) {
                Some(inside_element(from, to, &source_bbox, &target_bbox, None))
            } else {
                Some(element_element(from, to, &source_bbox, &target_bbox))
            }
        } else if i == 0 {
            if source_bbox.contains_point(to) {
                let to_bbox = point_box(to).inflate(element_padding, element_padding);
                Some(inside_element(from, to, &source_bbox, &to_bbox, None))
            } else if !orthogonal {
                Some(element_vertex(from, to, &source_bbox))
            } else {
                None
            }
        } else if i + 1 == last {
            // A straight leg back along the previous one would overlap it.
            let doubles_back = orthogonal && brng.is_some() && bearing(to, from) == brng;
            if target_bbox.contains_point(from) || doubles_back {
                let from_bbox = point_box(from).inflate(element_padding, element_padding);
                Some(inside_element(from, to, &from_bbox, &target_bbox, brng))
            } else if !orthogonal {
                Some(vertex_element(from, to, &target_bbox, brng))
            } else {
                None
            }
        } else if !orthogonal {
            Some(vertex_vertex(from, to, brng))
        } else {
            None
        };

        match leg {
            Some(leg) => {
                points.extend(leg.points);
                brng = leg.direction;
            }
            None => brng = bearing(from, to),
        }

        if i + 1 < last {
            points.push(to);
        }
    }

    debug!(
        waypoints = waypoints.len(),
        vertices = points.len(),
        "orthogonal route computed"
    );

    OrthogonalRoute {
        points,
        last_bearing: brng,
    }
}
