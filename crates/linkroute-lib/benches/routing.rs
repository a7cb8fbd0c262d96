use criterion::{criterion_group, criterion_main, Criterion};
use linkroute_lib::{plan_route, Anchor, ObstacleIndex, Rect, RouteRequest};
use once_cell::sync::Lazy;
use std::hint::black_box;

fn shape(x: f64, y: f64, width: f64, height: f64) -> Anchor {
    Anchor::Rect(Rect::new(x, y, width, height))
}

/// 20x20 grid of small boxes with corridors between them.
fn dense_field() -> Vec<Rect> {
    let mut field = Vec::with_capacity(400);
    for row in 0..20 {
        for col in 0..20 {
            field.push(Rect::new(
                100.0 + col as f64 * 60.0,
                -300.0 + row as f64 * 60.0,
                30.0,
                30.0,
            ));
        }
    }
    field
}

static ALIGNED_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(200.0, 0.0, 40.0, 40.0))
});
static WALL_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(0.0, 200.0, 40.0, 40.0))
        .with_obstacles([Rect::new(-10.0, 90.0, 200.0, 20.0)])
});
static DENSE_MANHATTAN_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::manhattan(shape(0.0, 0.0, 40.0, 40.0), shape(1400.0, 300.0, 40.0, 40.0))
        .with_obstacles(dense_field())
});
static DENSE_METRO_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::metro(shape(0.0, 0.0, 40.0, 40.0), shape(1400.0, 300.0, 40.0, 40.0))
        .with_obstacles(dense_field())
});
static ORTHOGONAL_REQUEST: Lazy<RouteRequest> = Lazy::new(|| {
    RouteRequest::orthogonal(shape(0.0, 0.0, 200.0, 200.0), shape(50.0, 50.0, 40.0, 40.0))
});

fn benchmark_routing(c: &mut Criterion) {
    c.bench_function("manhattan_aligned", |b| {
        let request = &*ALIGNED_REQUEST;
        b.iter(|| {
            let route = plan_route(request).expect("route");
            black_box(route.points.len())
        });
    });

    c.bench_function("manhattan_wall_detour", |b| {
        let request = &*WALL_REQUEST;
        b.iter(|| {
            let route = plan_route(request).expect("route");
            black_box(route.points.len())
        });
    });

    c.bench_function("manhattan_dense_field", |b| {
        let request = &*DENSE_MANHATTAN_REQUEST;
        b.iter(|| {
            let route = plan_route(request).expect("route");
            black_box((route.points.len(), route.fallback))
        });
    });

    c.bench_function("metro_dense_field", |b| {
        let request = &*DENSE_METRO_REQUEST;
        b.iter(|| {
            let route = plan_route(request).expect("route");
            black_box((route.points.len(), route.fallback))
        });
    });

    c.bench_function("orthogonal_nested", |b| {
        let request = &*ORTHOGONAL_REQUEST;
        b.iter(|| {
            let route = plan_route(request).expect("route");
            black_box(route.points.len())
        });
    });
}

fn benchmark_obstacle_index(c: &mut Criterion) {
    let field = dense_field();
    c.bench_function("obstacle_index_build_400", |b| {
        b.iter(|| black_box(ObstacleIndex::build(field.iter().copied(), 10.0, 100.0).cell_count()));
    });
}

criterion_group!(benches, benchmark_routing, benchmark_obstacle_index);
criterion_main!(benches);
