//! Cross-cutting invariants exercised through the public API.

use metacurve::{Engine, Path, PathBuilder, Point, Transform};

fn wavy_path(engine: &mut Engine) -> Path {
    PathBuilder::new()
        .move_to(Point::new(0.0, 0.0))
        .curve_to(Point::new(50.0, 80.0))
        .curve_to(Point::new(100.0, 80.0))
        .curve_to(Point::new(150.0, 0.0))
        .solve(engine)
        .expect("solve")
}

fn cyclic_path(engine: &mut Engine) -> Path {
    PathBuilder::new()
        .move_to(Point::new(0.0, 0.0))
        .curve_to(Point::new(60.0, 40.0))
        .curve_to(Point::new(40.0, 90.0))
        .curve_to(Point::new(10.0, 70.0))
        .curve_to(Point::new(30.0, 50.0))
        .close()
        .solve(engine)
        .expect("solve")
}

/// Solver closure: every segment side is explicit with finite controls.
#[test]
fn solved_paths_are_explicit_and_finite() {
    let mut engine = Engine::new();
    for path in [wavy_path(&mut engine), cyclic_path(&mut engine)] {
        for id in path.ring_ids() {
            let (lx, ly) = path[id].left_control();
            let (rx, ry) = path[id].right_control();
            assert!(lx.is_finite() && ly.is_finite() && rx.is_finite() && ry.is_finite());
        }
    }
}

/// Reverse is an involution in geometry, not just in storage.
#[test]
fn reverse_involution() {
    let mut engine = Engine::new();
    for path in [wavy_path(&mut engine), cyclic_path(&mut engine)] {
        let rr = path.reverse().reverse();
        let n = path.path_length();
        for i in 0..=(n * 8) {
            let t = i as f64 / 8.0;
            let a = path.point_of(t);
            let b = rr.point_of(t);
            assert!(
                (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
                "t = {t}: {a:?} vs {b:?}"
            );
        }
    }
}

/// Subpath ends land on the parent path's points.
#[test]
fn subpath_ends() {
    let mut engine = Engine::new();
    let path = wavy_path(&mut engine);
    for (t1, t2) in [(0.25, 1.75), (0.0, 3.0), (1.1, 2.9), (0.4, 0.6)] {
        let sub = path.subpath(t1, t2);
        let s0 = sub.point_of(0.0);
        let s1 = sub.point_of(sub.path_length() as f64);
        let e0 = path.point_of(t1);
        let e1 = path.point_of(t2);
        assert!(
            (s0.x - e0.x).abs() < 1e-6 && (s0.y - e0.y).abs() < 1e-6,
            "start of subpath({t1},{t2})"
        );
        assert!(
            (s1.x - e1.x).abs() < 1e-6 && (s1.y - e1.y).abs() < 1e-6,
            "end of subpath({t1},{t2})"
        );
    }
}

/// `direction_of` is parallel to the De Casteljau tangent.
#[test]
fn direction_matches_tangent() {
    let mut engine = Engine::new();
    let path = wavy_path(&mut engine);
    for i in 1..12 {
        let t = i as f64 / 4.0;
        let d = path.direction_of(t);
        // Finite-difference tangent.
        let h = 1e-5;
        let a = path.point_of(t - h);
        let b = path.point_of(t + h);
        let (fx, fy) = (b.x - a.x, b.y - a.y);
        let cross = d.x * fy - d.y * fx;
        let scale = d.hypot() * fx.hypot(fy);
        assert!(
            cross.abs() / scale < 1e-3,
            "direction not parallel at t = {t}: {d:?} vs ({fx},{fy})"
        );
        assert!(d.x * fx + d.y * fy > 0.0, "antiparallel at t = {t}");
    }
}

/// Arc time inverts arc length.
#[test]
fn arc_time_inverts_arc_length() {
    let mut engine = Engine::new();
    let path = wavy_path(&mut engine);
    for i in 1..6 {
        let t = i as f64 * 0.5;
        let s = path.subpath(0.0, t).arc_length();
        let back = path.arc_time(s);
        assert!((back - t).abs() < 0.01, "t = {t} -> s = {s} -> {back}");
    }
}

/// Transform composition agrees with sequential application, on whole
/// paths as well as points.
#[test]
fn transform_composability() {
    let mut engine = Engine::new();
    let path = wavy_path(&mut engine);
    let a = Transform::rotated(20.0).then(&Transform::shifted(3.0, -2.0));
    let b = Transform::scaled(1.25);

    let composed = path.transformed(&a.then(&b));
    let sequential = path.transformed(&a).transformed(&b);
    for i in 0..=12 {
        let t = i as f64 / 4.0;
        let p = composed.point_of(t);
        let q = sequential.point_of(t);
        assert!((p.x - q.x).abs() < 1e-9 && (p.y - q.y).abs() < 1e-9);
    }
}

/// Intersection times name the same geometric point on both paths.
#[test]
fn intersection_symmetry() {
    let mut engine = Engine::new();
    let a = PathBuilder::new()
        .move_to(Point::new(0.0, 0.0))
        .curve_to(Point::new(50.0, 80.0))
        .curve_to(Point::new(100.0, 0.0))
        .solve(&mut engine)
        .expect("solve");
    let b = PathBuilder::new()
        .move_to(Point::new(0.0, 80.0))
        .curve_to(Point::new(50.0, 0.0))
        .curve_to(Point::new(100.0, 80.0))
        .solve(&mut engine)
        .expect("solve");

    let (t1, t2) = a.intersection_times(&b);
    assert!(t1 >= 0.0 && t2 >= 0.0, "expected an intersection");
    let pa = a.point_of(t1);
    let pb = b.point_of(t2);
    assert!(
        (pa.x - pb.x).abs() < 0.1 && (pa.y - pb.y).abs() < 0.1,
        "{pa:?} vs {pb:?}"
    );
}

/// Solving twice changes nothing.
#[test]
fn solve_idempotent_via_engine() {
    let mut engine = Engine::new();
    let mut path = wavy_path(&mut engine);
    let snapshot = path.copy();
    engine.solve(&mut path).expect("second solve");
    for i in 0..=12 {
        let t = i as f64 / 4.0;
        let p = path.point_of(t);
        let q = snapshot.point_of(t);
        assert!((p.x - q.x).abs() < 1e-12 && (p.y - q.y).abs() < 1e-12);
    }
}
