//! Integration tests for the geometry kernel and the obstacle index.
//!
//! These tests verify:
//! - Degenerate input yields sentinels instead of NaN
//! - Rectangle containment, overlap and boundary queries
//! - Exactness of the spatial hash against a full scan
//! - Obstacle collection from a shape list

mod common;

use common::rect;
use linkroute_lib::{
    bearing, collect_obstacles, Bearing, Line, ObstacleIndex, Point, Rect, ShapeInfo, Side,
};

#[test]
fn bearing_only_for_axis_aligned_segments() {
    let o = Point::new(0.0, 0.0);
    assert_eq!(bearing(o, Point::new(0.0, -5.0)), Some(Bearing::N));
    assert_eq!(bearing(o, Point::new(5.0, 0.0)), Some(Bearing::E));
    assert_eq!(bearing(o, Point::new(0.0, 5.0)), Some(Bearing::S));
    assert_eq!(bearing(o, Point::new(-5.0, 0.0)), Some(Bearing::W));
    assert_eq!(bearing(o, Point::new(5.0, 5.0)), None);
    assert_eq!(bearing(o, o), None);
}

#[test]
fn distances() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, -4.0);
    assert_eq!(a.distance(b), 5.0);
    assert_eq!(a.manhattan_distance(b), 7.0);
}

#[test]
fn negative_dimensions_are_normalized() {
    let flipped = Rect::new(40.0, 40.0, -40.0, -40.0);
    assert_eq!(flipped.normalized(), rect(0.0, 0.0, 40.0, 40.0));
    assert!(flipped.contains_point(Point::new(10.0, 10.0)));
    assert!(rect(-10.0, -10.0, 100.0, 100.0).contains_rect(&flipped));
}

#[test]
fn zero_area_rect_contains_nothing() {
    let empty = Rect::at_point(Point::new(5.0, 5.0));
    assert!(!rect(0.0, 0.0, 10.0, 10.0).contains_rect(&empty));
    assert!(!empty.contains_rect(&empty));
}

#[test]
fn touching_rects_do_not_intersect_until_inflated() {
    let a = rect(0.0, 0.0, 40.0, 40.0);
    let b = rect(40.0, 0.0, 40.0, 40.0);
    assert!(!a.intersects(&b));
    assert!(a.intersects(&b.inflate(1.0, 1.0)));
    assert_eq!(a.intersection(&rect(20.0, 20.0, 40.0, 40.0)), Some(rect(20.0, 20.0, 20.0, 20.0)));
}

#[test]
fn nearest_boundary_point_clamps_or_projects() {
    let r = rect(0.0, 0.0, 100.0, 50.0);
    assert_eq!(r.nearest_boundary_point(Point::new(150.0, 20.0)), Point::new(100.0, 20.0));
    assert_eq!(r.nearest_boundary_point(Point::new(-5.0, -5.0)), Point::new(0.0, 0.0));
    assert_eq!(r.nearest_boundary_point(Point::new(50.0, 10.0)), Point::new(50.0, 0.0));
    assert_eq!(r.side_nearest_to_point(Point::new(95.0, 25.0)), Side::Right);
}

#[test]
fn line_from_center_hits_boundary() {
    let r = rect(0.0, 0.0, 100.0, 100.0);
    let hit = r
        .intersection_with_line_from_center_to_point(Point::new(200.0, 50.0), None)
        .expect("crosses right side");
    assert!(hit.approx_eq(Point::new(100.0, 50.0)));
    assert_eq!(
        r.intersection_with_line_from_center_to_point(Point::new(60.0, 60.0), None),
        None
    );
}

#[test]
fn degenerate_segments_do_not_intersect() {
    let p = Point::new(1.0, 1.0);
    let dot = Line::new(p, p);
    let other = Line::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
    assert_eq!(dot.intersection(&other), None);
    assert_eq!(dot.length(), 0.0);
    assert_eq!(p.theta(p), 0.0);
}

#[test]
fn spatial_hash_matches_full_scan() {
    let obstacles = vec![
        rect(0.0, 0.0, 30.0, 30.0),
        rect(95.0, 95.0, 10.0, 10.0),
        rect(-250.0, 40.0, 500.0, 15.0),
        rect(60.0, -120.0, 20.0, 300.0),
    ];
    let padding = 5.0;
    let index = ObstacleIndex::build(obstacles.iter().copied(), padding, 50.0);
    let padded: Vec<Rect> = obstacles.iter().map(|r| r.expand(padding)).collect();

    for x in (-300..=300).step_by(5) {
        for y in (-200..=200).step_by(5) {
            let p = Point::new(x as f64, y as f64);
            let expected = padded.iter().any(|r| r.contains_point(p));
            assert_eq!(index.is_blocked(p), expected, "mismatch at {p}");
        }
    }
    assert_eq!(index.len(), 4);
}

#[test]
fn candidates_near_lists_only_local_obstacles() {
    let index = ObstacleIndex::build([rect(0.0, 0.0, 10.0, 10.0), rect(500.0, 500.0, 10.0, 10.0)], 0.0, 100.0);
    let near: Vec<&Rect> = index.candidates_near(Point::new(5.0, 5.0)).collect();
    assert_eq!(near, vec![&rect(0.0, 0.0, 10.0, 10.0)]);
    assert_eq!(index.candidates_near(Point::new(250.0, 250.0)).count(), 0);
}

#[test]
fn shape_list_parses_and_filters() {
    let shapes: Vec<ShapeInfo> = serde_json::from_str(
        r#"[
            {"id": "pool", "type": "bpmn.Pool", "bbox": {"x": 0, "y": 0, "width": 600, "height": 400}},
            {"id": "a", "type": "basic.Rect", "parent": "pool", "bbox": {"x": 20, "y": 20, "width": 40, "height": 40}},
            {"id": "b", "type": "basic.Rect", "bbox": {"x": 300, "y": 20, "width": 40, "height": 40}},
            {"id": "note", "type": "basic.Text", "bbox": {"x": 150, "y": 20, "width": 60, "height": 20}},
            {"id": "c", "bbox": {"x": 150, "y": 100, "width": 40, "height": 40}}
        ]"#,
    )
    .expect("shapes parse");

    let obstacles = collect_obstacles(&shapes, Some("a"), Some("b"), &["basic.Text".to_string()]);
    assert_eq!(obstacles, vec![rect(150.0, 100.0, 40.0, 40.0)]);

    let unfiltered = collect_obstacles(&shapes, None, None, &[]);
    assert_eq!(unfiltered.len(), shapes.len());
}
