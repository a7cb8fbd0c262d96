mod common;

use common::write_scene;
use linkroute_lib::{Error, Point, RouteRenderMode, RouterKind, Scene};

const SCENE: &str = r#"{
    "shapes": [
        {"id": "source", "type": "basic.Rect", "bbox": {"x": 0, "y": 0, "width": 40, "height": 40}},
        {"id": "target", "type": "basic.Rect", "bbox": {"x": 0, "y": 200, "width": 40, "height": 40}},
        {"id": "wall", "type": "basic.Rect", "bbox": {"x": -10, "y": 90, "width": 200, "height": 20}},
        {"id": "caption", "type": "basic.Text", "bbox": {"x": -100, "y": 0, "width": 400, "height": 300}}
    ],
    "links": [
        {"id": "around", "source": {"id": "source"}, "target": {"id": "target"}},
        {"id": "straight", "source": {"id": "source"}, "target": {"id": "target"}, "router": "orthogonal"},
        {"id": "free", "source": {"x": 300, "y": 20}, "target": {"id": "target"},
         "vertices": [{"x": 300, "y": 220}], "router": "metro", "options": {"step": 20}}
    ]
}"#;

#[test]
fn scene_file_routes_every_link() {
    let file = write_scene(SCENE);
    let scene = Scene::from_path(&file.path).expect("scene loads");
    let routed = scene.route_all().expect("all links route");

    let ids: Vec<&str> = routed.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["around", "straight", "free"]);
    assert_eq!(routed[1].route.router, RouterKind::Orthogonal);
    assert_eq!(routed[2].route.router, RouterKind::Metro);
}

#[test]
fn text_shapes_do_not_block_and_walls_do() {
    let scene = Scene::from_json(SCENE).expect("scene parses");
    let link = scene.link("around").expect("link exists");
    let request = scene.request_for(link).expect("request");
    assert_eq!(request.obstacles.len(), 1);

    let routed = scene.route_link("around").expect("route");
    assert!(!routed.route.fallback);
    assert!(routed.route.points.iter().any(|p| p.x < -10.0 || p.x > 190.0));
}

#[test]
fn orthogonal_link_ignores_the_wall() {
    let scene = Scene::from_json(SCENE).expect("scene parses");
    let routed = scene.route_link("straight").expect("route");
    assert!(routed.route.points.is_empty());
    assert_eq!(routed.source_anchor, Point::new(20.0, 20.0));
    assert_eq!(routed.target_anchor, Point::new(20.0, 220.0));
}

#[test]
fn waypoints_from_scene_are_kept() {
    let scene = Scene::from_json(SCENE).expect("scene parses");
    let routed = scene.route_link("free").expect("route");
    assert!(routed.route.points.contains(&Point::new(300.0, 220.0)));
}

#[test]
fn summaries_render_for_routed_links() {
    let scene = Scene::from_json(SCENE).expect("scene parses");
    let summary = scene.route_link("straight").expect("route").summary();
    assert_eq!(summary.link.as_deref(), Some("straight"));
    assert_eq!(summary.vertices, 0);
    assert_eq!(
        summary.render(RouteRenderMode::Compact),
        "straight: (20, 20) -> (20, 220)\n"
    );
}

#[test]
fn missing_file_reports_path() {
    let err = Scene::from_path("/definitely/not/here/scene.json").expect_err("missing file");
    assert!(matches!(err, Error::SceneRead { .. }));
    assert!(err.to_string().contains("/definitely/not/here/scene.json"));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = Scene::from_json("{\"shapes\": [").expect_err("truncated json");
    assert!(matches!(err, Error::SceneParse(_)));
}

#[test]
fn unknown_router_in_scene_is_reported() {
    let scene = Scene::from_json(
        r#"{"links": [{"id": "l", "source": {"x": 0, "y": 0}, "target": {"x": 50, "y": 50}, "router": "metor"}]}"#,
    )
    .expect("scene parses");
    let err = scene.route_link("l").expect_err("unknown router");
    assert!(err.to_string().contains("Did you mean 'metro'?"), "{err}");
}
