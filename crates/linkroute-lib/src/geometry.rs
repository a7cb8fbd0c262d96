//! Geometry kernel shared by the routers.
//!
//! Diagram coordinates follow screen conventions: `x` grows to the right and
//! `y` grows downwards. Angles are reported in degrees, counter-clockwise from
//! the positive x axis as seen on screen (so "up" is 90 degrees).
//!
//! Every operation is total. Degenerate input (coincident points, zero-length
//! segments, zero-area rectangles) yields a defined sentinel such as `None`,
//! a zero vector or an angle of 0 instead of NaN.

use std::f64::consts::{PI, TAU};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing computed coordinates.
pub const EPSILON: f64 = 1e-9;

/// Snap `value` to the nearest multiple of `grid`, rounding halves upwards.
pub fn snap_to_grid(value: f64, grid: f64) -> f64 {
    if !(grid.is_finite() && grid > 0.0) {
        return value;
    }
    grid * (value / grid + 0.5).floor()
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let normalized = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// A location in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        self.squared_distance(other).sqrt()
    }

    pub fn squared_distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Taxi-cab distance between two points.
    pub fn manhattan_distance(self, other: Point) -> f64 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Vector from `other` to `self`.
    pub fn difference(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    /// Component-wise sign, with zero components staying zero.
    pub fn signum(self) -> Point {
        fn sign(v: f64) -> f64 {
            if v > 0.0 {
                1.0
            } else if v < 0.0 {
                -1.0
            } else {
                0.0
            }
        }
        Point::new(sign(self.x), sign(self.y))
    }

    pub fn snap_to_grid(self, grid: f64) -> Point {
        Point::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }

    pub fn round(self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }

    /// Round both coordinates to `decimals` decimal places.
    pub fn round_to(self, decimals: i32) -> Point {
        let factor = 10f64.powi(decimals);
        let round = |v: f64| {
            // Integral beyond 2^52 already, and scaling could overflow.
            if !v.is_finite() || v.abs() >= 4_503_599_627_370_496.0 {
                v
            } else {
                (v * factor).round() / factor
            }
        };
        Point::new(round(self.x), round(self.y))
    }

    pub fn approx_eq(self, other: Point) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    /// Angle in degrees of the vector from `self` to `other`, in `[0, 360)`.
    ///
    /// Coincident points yield 0.
    pub fn theta(self, other: Point) -> f64 {
        let y = -(other.y - self.y);
        let x = other.x - self.x;
        if x == 0.0 && y == 0.0 {
            return 0.0;
        }
        let mut rad = y.atan2(x);
        if rad < 0.0 {
            rad += TAU;
        }
        normalize_angle(rad.to_degrees())
    }

    /// Move `self` along the ray from `reference` through `self` by `distance`.
    ///
    /// Negative distances move back towards `reference`. When the two points
    /// coincide the ray is taken to point along the positive x axis.
    pub fn move_from(self, reference: Point, distance: f64) -> Point {
        let theta = reference.theta(self).to_radians();
        self.offset(theta.cos() * distance, -theta.sin() * distance)
    }

    /// Point at `distance` from `origin` in direction `angle` (radians).
    pub fn from_polar(distance: f64, angle: f64, origin: Point) -> Point {
        Point::new(
            origin.x + distance * angle.cos(),
            origin.y - distance * angle.sin(),
        )
    }

    /// Rotate `self` around `origin` by `angle` degrees (counter-clockwise on screen).
    pub fn rotate(self, origin: Point, angle: f64) -> Point {
        let (sin, cos) = angle.to_radians().sin_cos();
        let dx = self.x - origin.x;
        let dy = self.y - origin.y;
        Point::new(
            origin.x + dx * cos + dy * sin,
            origin.y - dx * sin + dy * cos,
        )
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal direction of an axis-aligned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bearing {
    N,
    E,
    S,
    W,
}

impl Bearing {
    pub fn opposite(self) -> Bearing {
        match self {
            Bearing::N => Bearing::S,
            Bearing::S => Bearing::N,
            Bearing::E => Bearing::W,
            Bearing::W => Bearing::E,
        }
    }

    /// Direction in radians, using the same convention as [`Point::from_polar`].
    pub fn radians(self) -> f64 {
        match self {
            Bearing::N => PI / 2.0,
            Bearing::S => -PI / 2.0,
            Bearing::E => 0.0,
            Bearing::W => PI,
        }
    }

    /// Direction in whole degrees, matching [`Point::theta`].
    pub fn angle(self) -> u16 {
        match self {
            Bearing::E => 0,
            Bearing::N => 90,
            Bearing::W => 180,
            Bearing::S => 270,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Bearing::E | Bearing::W)
    }
}

/// Cardinal bearing from `from` to `to`.
///
/// Returns `None` when the segment is not axis-aligned or the points coincide.
pub fn bearing(from: Point, to: Point) -> Option<Bearing> {
    if from == to {
        return None;
    }
    if from.x == to.x {
        return Some(if from.y > to.y { Bearing::N } else { Bearing::S });
    }
    if from.y == to.y {
        return Some(if from.x > to.x { Bearing::W } else { Bearing::E });
    }
    None
}

/// Side of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Right,
    Bottom,
    Left,
    Top,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Right, Side::Bottom, Side::Left, Side::Top];

    /// Unit vector pointing out of the rectangle through this side.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Side::Right => (1.0, 0.0),
            Side::Bottom => (0.0, 1.0),
            Side::Left => (-1.0, 0.0),
            Side::Top => (0.0, -1.0),
        }
    }
}

/// A straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }

    /// Intersection point of two segments, if any.
    ///
    /// Parallel, collinear and zero-length segments report no intersection.
    pub fn intersection(&self, other: &Line) -> Option<Point> {
        let d1 = self.end.difference(self.start);
        let d2 = other.end.difference(other.start);
        let det = d1.x * d2.y - d1.y * d2.x;
        if det == 0.0 {
            return None;
        }
        let delta = other.start.difference(self.start);
        let alpha = delta.x * d2.y - delta.y * d2.x;
        let beta = delta.x * d1.y - delta.y * d1.x;
        if alpha * det < 0.0 || beta * det < 0.0 {
            return None;
        }
        if det > 0.0 {
            if alpha > det || beta > det {
                return None;
            }
        } else if alpha < det || beta < det {
            return None;
        }
        Some(Point::new(
            self.start.x + alpha * d1.x / det,
            self.start.y + alpha * d1.y / det,
        ))
    }
}

/// Per-side amounts by which a box is grown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Insets {
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub fn is_valid(&self) -> bool {
        [self.top, self.right, self.bottom, self.left]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

impl From<f64> for Insets {
    fn from(value: f64) -> Self {
        Insets::uniform(value)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle located at `p`.
    pub const fn at_point(p: Point) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0)
    }

    /// Copy with non-negative dimensions, flipping the origin where needed.
    pub fn normalized(self) -> Rect {
        let mut rect = self;
        if rect.width < 0.0 {
            rect.x += rect.width;
            rect.width = -rect.width;
        }
        if rect.height < 0.0 {
            rect.y += rect.height;
            rect.height = -rect.height;
        }
        rect
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn corner(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn top_right(&self) -> Point {
        Point::new(self.x + self.width, self.y)
    }

    pub fn bottom_left(&self) -> Point {
        Point::new(self.x, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Boundary-inclusive point containment.
    pub fn contains_point(&self, p: Point) -> bool {
        let r = self.normalized();
        p.x >= r.x && p.x <= r.x + r.width && p.y >= r.y && p.y <= r.y + r.height
    }

    /// Whether `inner` lies entirely within `self`.
    ///
    /// Rectangles with a zero dimension never contain nor are contained.
    pub fn contains_rect(&self, inner: &Rect) -> bool {
        let outer = self.normalized();
        let inner = inner.normalized();
        if outer.width == 0.0 || outer.height == 0.0 || inner.width == 0.0 || inner.height == 0.0
        {
            return false;
        }
        outer.x <= inner.x
            && inner.x + inner.width <= outer.x + outer.width
            && outer.y <= inner.y
            && inner.y + inner.height <= outer.y + outer.height
    }

    /// Overlap of the two rectangles; touching edges do not count.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();
        let (a_origin, a_corner) = (a.origin(), a.corner());
        let (b_origin, b_corner) = (b.origin(), b.corner());
        if b_corner.x <= a_origin.x
            || b_corner.y <= a_origin.y
            || b_origin.x >= a_corner.x
            || b_origin.y >= a_corner.y
        {
            return None;
        }
        let x = a_origin.x.max(b_origin.x);
        let y = a_origin.y.max(b_origin.y);
        Some(Rect::new(
            x,
            y,
            a_corner.x.min(b_corner.x) - x,
            a_corner.y.min(b_corner.y) - y,
        ))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// Grow by `dx` horizontally and `dy` vertically on each side.
    pub fn inflate(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            self.width + 2.0 * dx,
            self.height + 2.0 * dy,
        )
        .normalized()
    }

    /// Symmetric padding on all four sides.
    pub fn expand(&self, margin: f64) -> Rect {
        self.normalized().inflate(margin, margin)
    }

    /// Grow each side by its own amount.
    pub fn pad(&self, insets: Insets) -> Rect {
        let rect = self.normalized();
        Rect::new(
            rect.x - insets.left,
            rect.y - insets.top,
            rect.width + insets.left + insets.right,
            rect.height + insets.top + insets.bottom,
        )
        .normalized()
    }

    /// Smallest rectangle covering both inputs.
    pub fn union(&self, other: &Rect) -> Rect {
        let a = self.normalized();
        let b = other.normalized();
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        let corner_x = (a.x + a.width).max(b.x + b.width);
        let corner_y = (a.y + a.height).max(b.y + b.height);
        Rect::new(x, y, corner_x - x, corner_y - y)
    }

    /// Side of the rectangle closest to `p`.
    ///
    /// Ties resolve in the order left, right, top, bottom.
    pub fn side_nearest_to_point(&self, p: Point) -> Side {
        let r = self.normalized();
        let candidates = [
            (Side::Right, r.x + r.width - p.x),
            (Side::Top, p.y - r.y),
            (Side::Bottom, r.y + r.height - p.y),
        ];
        let mut side = Side::Left;
        let mut closest = p.x - r.x;
        for (candidate, distance) in candidates {
            if distance < closest {
                closest = distance;
                side = candidate;
            }
        }
        side
    }

    /// Nearest point on the boundary.
    ///
    /// Outside points are clamped onto the boundary; inside points are
    /// projected onto the nearest side.
    pub fn nearest_boundary_point(&self, p: Point) -> Point {
        let r = self.normalized();
        if r.contains_point(p) {
            return match r.side_nearest_to_point(p) {
                Side::Right => Point::new(r.x + r.width, p.y),
                Side::Left => Point::new(r.x, p.y),
                Side::Bottom => Point::new(p.x, r.y + r.height),
                Side::Top => Point::new(p.x, r.y),
            };
        }
        Point::new(
            p.x.clamp(r.x, r.x + r.width),
            p.y.clamp(r.y, r.y + r.height),
        )
    }

    /// The four sides clockwise from the top.
    pub fn sides(&self) -> [Line; 4] {
        let r = self.normalized();
        [
            Line::new(r.origin(), r.top_right()),
            Line::new(r.top_right(), r.corner()),
            Line::new(r.corner(), r.bottom_left()),
            Line::new(r.bottom_left(), r.origin()),
        ]
    }

    /// Where the segment from the center towards `p` crosses the boundary.
    ///
    /// With `angle` set, the rectangle is treated as rotated by that many
    /// degrees around its center.
    pub fn intersection_with_line_from_center_to_point(
        &self,
        p: Point,
        angle: Option<f64>,
    ) -> Option<Point> {
        let center = self.center();
        let angle = angle.filter(|a| *a != 0.0 && a.is_finite());
        let target = match angle {
            Some(a) => p.rotate(center, a),
            None => p,
        };
        let connector = Line::new(center, target);
        let hit = self
            .sides()
            .iter()
            .rev()
            .find_map(|side| side.intersection(&connector))?;
        Some(match angle {
            Some(a) => hit.rotate(center, -a),
            None => hit,
        })
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {} {}x{}]",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Quantize the direction from `start` to `end` onto `count` evenly spaced
/// directions, returning the sector angle in degrees.
pub fn direction_angle(start: Point, end: Point, count: usize) -> u16 {
    let count = count.max(1);
    let sector = 360.0 / count as f64;
    let angle = (normalize_angle(start.theta(end) + sector / 2.0) / sector).floor() * sector;
    (angle.round() as u16) % 360
}

/// Smallest absolute difference between two angles in degrees.
pub fn direction_change(a: u16, b: u16) -> u16 {
    let change = a.abs_diff(b) % 360;
    if change > 180 {
        360 - change
    } else {
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_rounds_halves_upwards() {
        assert_eq!(snap_to_grid(15.0, 10.0), 20.0);
        assert_eq!(snap_to_grid(-15.0, 10.0), -10.0);
        assert_eq!(snap_to_grid(14.9, 10.0), 10.0);
        assert_eq!(snap_to_grid(7.0, 0.0), 7.0);
    }

    #[test]
    fn theta_uses_screen_orientation() {
        let origin = Point::new(0.0, 0.0);
        assert_eq!(origin.theta(Point::new(10.0, 0.0)), 0.0);
        assert_eq!(origin.theta(Point::new(0.0, -10.0)), 90.0);
        assert_eq!(origin.theta(Point::new(-10.0, 0.0)), 180.0);
        assert_eq!(origin.theta(Point::new(0.0, 10.0)), 270.0);
        assert_eq!(origin.theta(origin), 0.0);
    }

    #[test]
    fn move_from_extends_away_from_reference() {
        let moved = Point::new(10.0, 0.0).move_from(Point::new(0.0, 0.0), 5.0);
        assert!(moved.approx_eq(Point::new(15.0, 0.0)));
        let back = Point::new(10.0, 0.0).move_from(Point::new(0.0, 0.0), -5.0);
        assert!(back.approx_eq(Point::new(5.0, 0.0)));
    }

    #[test]
    fn rotate_quarter_turn_counter_clockwise() {
        let rotated = Point::new(10.0, 0.0).rotate(Point::new(0.0, 0.0), 90.0);
        assert!(rotated.approx_eq(Point::new(0.0, -10.0)));
    }

    #[test]
    fn signum_keeps_zero() {
        assert_eq!(Point::new(0.0, -3.0).signum(), Point::new(0.0, -1.0));
    }

    #[test]
    fn direction_change_wraps() {
        assert_eq!(direction_change(0, 270), 90);
        assert_eq!(direction_change(90, 270), 180);
        assert_eq!(direction_change(315, 45), 90);
    }

    #[test]
    fn direction_angle_quantizes() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(direction_angle(o, Point::new(10.0, 1.0), 4), 0);
        assert_eq!(direction_angle(o, Point::new(10.0, 10.0), 8), 315);
        assert_eq!(direction_angle(o, Point::new(1.0, -10.0), 4), 90);
    }

    #[test]
    fn pad_grows_each_side_independently() {
        let insets = Insets {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        let padded = Rect::new(10.0, 10.0, 20.0, 20.0).pad(insets);
        assert_eq!(padded, Rect::new(6.0, 9.0, 26.0, 24.0));
        assert_eq!(
            Rect::new(0.0, 0.0, 10.0, 10.0).pad(Insets::uniform(5.0)),
            Rect::new(0.0, 0.0, 10.0, 10.0).expand(5.0)
        );
    }

    #[test]
    fn round_to_keeps_one_decimal() {
        assert_eq!(Point::new(105.04, -33.26).round_to(1), Point::new(105.0, -33.3));
        assert_eq!(Point::new(1e300, 0.0).round_to(1), Point::new(1e300, 0.0));
    }
}
