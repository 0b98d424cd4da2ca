use approx::assert_relative_eq;
use construction_engine::*;
use geo_kernel::{Point2d, Tolerance};
use pad_types::{Color, GlobalVariable};
use proptest::prelude::*;

fn point(d: &mut Diagram, name: &str, x: f64, y: f64) -> ShapeId {
    d.add_shape(ShapeSpec::free_point(x, y).named(name)).unwrap()
}

fn build(d: &mut Diagram, kind: ShapeKind, deps: &[ShapeId]) -> ShapeId {
    d.add_shape(ShapeSpec::new(kind, deps.to_vec())).unwrap()
}

fn draw_point(name: &str, x: f64, y: f64) -> Command {
    Command::Draw {
        shape: DrawSpec {
            kind: ShapeKind::Point(PointKind::Free),
            dependencies: vec![],
            name: Some(name.to_string()),
            position: Some(Point2d::new(x, y)),
        },
    }
}

fn draw(kind: ShapeKind, deps: &[&str]) -> Command {
    Command::Draw {
        shape: DrawSpec {
            kind,
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
            name: None,
            position: None,
        },
    }
}

// ── Container Tests ────────────────────────────────────────────────────────

#[test]
fn diagram_add_free_point() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 1.0, 2.0);
    assert_eq!(d.len(), 1);
    assert_eq!(d.find_by_name("A"), Some(a));
    assert_eq!(d.point(a), Point2d::new(1.0, 2.0));
    assert_eq!(d.get(a).unwrap().level, 0);
}

#[test]
fn diagram_duplicate_name_rejected() {
    let mut d = Diagram::new();
    point(&mut d, "A", 0.0, 0.0);
    let err = d.add_shape(ShapeSpec::free_point(5.0, 5.0).named("A")).unwrap_err();
    assert_eq!(err, EngineError::DuplicateName { name: "A".into() });
    assert_eq!(d.len(), 1);
}

#[test]
fn diagram_duplicate_segment_rejected() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 1.0, 0.0);
    build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let again = d.add_shape(ShapeSpec::new(ShapeKind::Line(LineKind::Segment), vec![a, b]));
    assert!(matches!(again, Err(EngineError::DuplicateName { .. })));
}

#[test]
fn diagram_invalid_point_name_rejected() {
    let mut d = Diagram::new();
    let err = d.add_shape(ShapeSpec::free_point(0.0, 0.0).named("a1")).unwrap_err();
    assert!(matches!(err, EngineError::InvalidName { .. }));
}

#[test]
fn diagram_wrong_dependencies_rejected() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let err = d
        .add_shape(ShapeSpec::new(ShapeKind::Point(PointKind::Midpoint), vec![a]))
        .unwrap_err();
    assert!(matches!(err, EngineError::WrongDependencies { .. }));
}

#[test]
fn diagram_free_point_without_position_rejected() {
    let mut d = Diagram::new();
    let spec = ShapeSpec::new(ShapeKind::Point(PointKind::Free), vec![]);
    assert_eq!(d.add_shape(spec), Err(EngineError::MissingPosition));
}

#[test]
fn diagram_auto_names_skip_used() {
    let mut d = Diagram::new();
    point(&mut d, "A", 0.0, 0.0);
    point(&mut d, "C", 0.0, 0.0);
    assert_eq!(d.next_free_name(1), "B");
    let b = d.add_shape(ShapeSpec::free_point(1.0, 1.0)).unwrap();
    assert_eq!(d.name_of(b), Some("B"));
    assert_eq!(d.next_free_name(1), "D");
}

#[test]
fn diagram_auto_names_roll_over_to_two_letters() {
    let mut d = Diagram::new();
    for i in 0..26 {
        d.add_shape(ShapeSpec::free_point(i as f64, 0.0)).unwrap();
    }
    assert_eq!(d.next_free_name(1), "AA");
}

#[test]
fn diagram_levels_and_children() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, m]);
    assert_eq!(d.get(m).unwrap().level, 1);
    assert_eq!(d.get(s).unwrap().level, 2);
    assert_eq!(d.get(a).unwrap().children, vec![m, s]);
    assert_eq!(d.name_of(s), Some("segA_C"));
}

// ── Geometry Through The Graph ─────────────────────────────────────────────

#[test]
fn midpoint_of_two_points() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    assert_relative_eq!(d.point(m).x, 2.0);
    assert_relative_eq!(d.point(m).y, 0.0);
}

#[test]
fn intersection_of_two_lines() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let c = point(&mut d, "C", 2.0, -2.0);
    let e = point(&mut d, "D", 2.0, 2.0);
    let l1 = build(&mut d, ShapeKind::Line(LineKind::Through), &[a, b]);
    let l2 = build(&mut d, ShapeKind::Line(LineKind::Through), &[c, e]);
    let x = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: true }), &[l1, l2]);
    assert_relative_eq!(d.point(x).x, 2.0, epsilon = 1e-9);
    assert_relative_eq!(d.point(x).y, 0.0, epsilon = 1e-9);
}

#[test]
fn intersection_of_two_circles_is_symmetric() {
    let mut d = Diagram::new();
    let o1 = point(&mut d, "A", 0.0, 0.0);
    let r1 = point(&mut d, "B", 5.0, 0.0);
    let o2 = point(&mut d, "C", 8.0, 0.0);
    let r2 = point(&mut d, "D", 3.0, 0.0);
    let c1 = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o1, r1]);
    let c2 = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o2, r2]);
    let p = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: true }), &[c1, c2]);
    let q = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: false }), &[c1, c2]);
    let (p, q) = (d.point(p), d.point(q));
    assert_relative_eq!(p.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(q.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(p.y, -q.y, epsilon = 1e-9);
    for hit in [p, q] {
        assert!(d.tolerance.equal(hit.distance_to(&Point2d::new(0.0, 0.0)), 5.0));
        assert!(d.tolerance.equal(hit.distance_to(&Point2d::new(8.0, 0.0)), 5.0));
    }
}

#[test]
fn circle_then_line_intersection_is_normalized() {
    let mut d = Diagram::new();
    let o = point(&mut d, "O", 0.0, 0.0);
    let r = point(&mut d, "R", 5.0, 0.0);
    let a = point(&mut d, "A", -10.0, 0.0);
    let b = point(&mut d, "B", 10.0, 0.0);
    let c = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o, r]);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let x = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: true }), &[c, s]);
    assert_eq!(d.get(x).unwrap().dependencies, vec![s, c]);
    assert_relative_eq!(d.point(x).x, -5.0, epsilon = 1e-9);
}

#[test]
fn circumcircle_of_right_triangle() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let c = point(&mut d, "C", 0.0, 4.0);
    let cc = build(&mut d, ShapeKind::Circle(CircleKind::Circumcircle), &[a, b, c]);
    let circle = d.get(cc).unwrap().geometry.as_circle().unwrap();
    assert_relative_eq!(circle.center.x, 2.0, epsilon = 1e-12);
    assert_relative_eq!(circle.center.y, 2.0, epsilon = 1e-12);
    assert_relative_eq!(circle.radius, 2.0 * 2f64.sqrt(), epsilon = 1e-12);
}

#[test]
fn tangent_line_touches_at_right_angle() {
    let mut d = Diagram::new();
    let o = point(&mut d, "O", 0.0, 0.0);
    let r = point(&mut d, "R", 3.0, 0.0);
    let p = point(&mut d, "P", 10.0, 0.0);
    let c = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o, r]);
    let t = build(&mut d, ShapeKind::Line(LineKind::Tangent { identifier: true }), &[p, c]);
    let line = d.get(t).unwrap().geometry.as_line().unwrap();
    assert!(d.tolerance.equal(line.distance_to_point(&Point2d::ORIGIN), 3.0));
}

#[test]
fn diagram_tolerance_decides_near_tangency() {
    let near_miss = |tolerance: Tolerance| {
        let mut d = Diagram::with_tolerance(tolerance);
        let o = point(&mut d, "O", 0.0, 0.0);
        let r = point(&mut d, "R", 5.0, 0.0);
        let a = point(&mut d, "A", -3.0, 5.01);
        let b = point(&mut d, "B", 3.0, 5.01);
        let c = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o, r]);
        let l = build(&mut d, ShapeKind::Line(LineKind::Through), &[a, b]);
        let x = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: true }), &[l, c]);
        d.point(x)
    };
    assert!(!near_miss(Tolerance::default()).is_defined());
    let touch = near_miss(Tolerance::loose());
    assert_relative_eq!(touch.x, 0.0, epsilon = 1e-6);
    assert_relative_eq!(touch.y, 5.01, epsilon = 1e-6);
}

#[test]
fn triangle_center_point_tracks_vertices() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 6.0, 0.0);
    let c = point(&mut d, "C", 0.0, 3.0);
    let g = build(
        &mut d,
        ShapeKind::Point(PointKind::TriangleCenter { center: TriangleCenter::Centroid }),
        &[a, b, c],
    );
    assert_relative_eq!(d.point(g).x, 2.0, epsilon = 1e-12);
    d.move_point(b, Point2d::new(9.0, 0.0)).unwrap();
    assert_relative_eq!(d.point(g).x, 3.0, epsilon = 1e-12);
}

#[test]
fn parallel_lines_yield_sentinel_intersection() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let c = point(&mut d, "C", 0.0, 1.0);
    let l = build(&mut d, ShapeKind::Line(LineKind::Through), &[a, b]);
    let par = build(&mut d, ShapeKind::Line(LineKind::Parallel), &[c, l]);
    let x = build(&mut d, ShapeKind::Point(PointKind::Intersection { identifier: true }), &[l, par]);
    assert!(!d.point(x).is_defined());
    let mid = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[x, a]);
    assert!(!d.point(mid).is_defined());
}

#[test]
fn perpendicular_is_orthogonal() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 3.0, 4.0);
    let p = point(&mut d, "P", 1.0, 7.0);
    let l = build(&mut d, ShapeKind::Line(LineKind::Through), &[a, b]);
    let per = build(&mut d, ShapeKind::Line(LineKind::Perpendicular), &[p, l]);
    let dl = d.get(l).unwrap().geometry.as_line().unwrap().direction();
    let dp = d.get(per).unwrap().geometry.as_line().unwrap().direction();
    assert!(dl.dot(&dp).abs() < 1e-6);
}

// ── Refresh, Delete, Sweep ─────────────────────────────────────────────────

#[test]
fn moving_root_refreshes_descendants() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    let n = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, m]);
    d.move_point(b, Point2d::new(8.0, 4.0)).unwrap();
    assert_relative_eq!(d.point(m).x, 4.0);
    assert_relative_eq!(d.point(n).x, 2.0);
    assert_relative_eq!(d.point(n).y, 1.0);
}

#[test]
fn diamond_refresh_sees_both_parents() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    // depends on A directly and through M
    let n = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[m, a]);
    assert_eq!(d.descendants(a), vec![a, m, n]);
    d.move_point(a, Point2d::new(4.0, 8.0)).unwrap();
    assert_relative_eq!(d.point(n).x, 4.0);
    assert_relative_eq!(d.point(n).y, 6.0);
}

#[test]
fn point_on_line_clamps_when_moved() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 10.0, 0.0);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let p = build(&mut d, ShapeKind::Point(PointKind::OnShape { relative_location: 0.5 }), &[s]);
    assert_relative_eq!(d.point(p).x, 5.0);
    d.move_point(p, Point2d::new(30.0, 4.0)).unwrap();
    assert_relative_eq!(d.point(p).x, 10.0);
    d.move_point(p, Point2d::new(2.5, -1.0)).unwrap();
    assert_relative_eq!(d.point(p).x, 2.5);
    assert_relative_eq!(d.point(p).y, 0.0);
}

#[test]
fn point_on_circle_follows_angle() {
    let mut d = Diagram::new();
    let o = point(&mut d, "O", 0.0, 0.0);
    let r = point(&mut d, "R", 2.0, 0.0);
    let c = build(&mut d, ShapeKind::Circle(CircleKind::ByRadiusPoint), &[o, r]);
    let p = build(&mut d, ShapeKind::Point(PointKind::OnShape { relative_location: 0.0 }), &[c]);
    d.move_point(p, Point2d::new(0.0, 9.0)).unwrap();
    assert_relative_eq!(d.point(p).x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(d.point(p).y, 2.0, epsilon = 1e-12);
}

#[test]
fn derived_point_cannot_be_moved() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    assert!(matches!(d.move_point(m, Point2d::ORIGIN), Err(EngineError::NotMovable { .. })));
}

#[test]
fn point_on_undefined_host_cannot_be_moved() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 1.0, 1.0)).unwrap();
    engine.execute(draw_point("B", 1.0, 1.0)).unwrap();
    engine.execute(draw(ShapeKind::Line(LineKind::Through), &["A", "B"])).unwrap();
    engine
        .execute(Command::Draw {
            shape: DrawSpec {
                kind: ShapeKind::Point(PointKind::OnShape { relative_location: 0.5 }),
                dependencies: vec!["lineA_B".into()],
                name: Some("T".into()),
                position: None,
            },
        })
        .unwrap();
    let before = engine.log.len();
    let err = engine
        .execute(Command::Move { target: "T".into(), x: 3.0, y: 3.0 })
        .unwrap_err();
    assert_eq!(err, EngineError::Undefined { name: "lineA_B".into() });
    assert_eq!(engine.log.len(), before);
}

#[test]
fn delete_marks_then_sweep_drops_descendants() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let m = build(&mut d, ShapeKind::Point(PointKind::OnShape { relative_location: 0.5 }), &[s]);
    d.delete(a).unwrap();
    assert_eq!(d.len(), 4);
    assert!(d.get(m).unwrap().removed);
    assert!(d.find_by_name("A").is_none());
    assert_eq!(d.sweep(), 3);
    assert_eq!(d.len(), 1);
    assert!(d.get(b).unwrap().children.is_empty());
}

#[test]
fn sweep_propagates_manual_marks() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    d.delete(b).unwrap();
    d.update();
    assert_eq!(d.len(), 1);
}

#[test]
fn update_is_idempotent() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 2.0);
    build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    d.update();
    let first = d.snapshot();
    d.update();
    assert_eq!(first, d.snapshot());
}

// ── Edits ──────────────────────────────────────────────────────────────────

#[test]
fn rename_propagates_to_derived_names() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let c = point(&mut d, "C", 0.0, 3.0);
    let per = build(&mut d, ShapeKind::Line(LineKind::Perpendicular), &[c, s]);
    d.rename(a, "P'").unwrap();
    assert_eq!(d.name_of(s), Some("segP'_B"));
    assert_eq!(d.name_of(per), Some("perC_segP'_B"));
}

#[test]
fn invalid_rename_keeps_old_name() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    point(&mut d, "B", 0.0, 0.0);
    assert!(matches!(d.rename(a, "bad"), Err(EngineError::InvalidName { .. })));
    assert!(matches!(d.rename(a, "B"), Err(EngineError::DuplicateName { .. })));
    assert_eq!(d.name_of(a), Some("A"));
}

#[test]
fn rename_keeps_derived_names_unique() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let bc = point(&mut d, "B_C", 4.0, 0.0);
    let x = point(&mut d, "X", 0.0, 3.0);
    let c = point(&mut d, "C", 4.0, 3.0);
    let first = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, bc]);
    let second = build(&mut d, ShapeKind::Line(LineKind::Segment), &[x, c]);

    d.rename(x, "A_B").unwrap();
    assert_eq!(d.name_of(first), Some("segA_B_C"));
    assert_eq!(d.name_of(second), Some("segA_B_C_2"));
    assert_eq!(d.find_by_name("segA_B_C"), Some(first));
    assert_eq!(d.find_by_name("segA_B_C_2"), Some(second));

    d.rename(x, "Y").unwrap();
    assert_eq!(d.name_of(second), Some("segY_C"));
}

#[test]
fn colliding_derived_name_takes_suffix() {
    let mut engine = Engine::new();
    for name in ["A_B", "C", "A", "B_C"] {
        engine.execute(draw_point(name, 0.0, name.len() as f64)).unwrap();
    }
    engine.execute(draw(ShapeKind::Line(LineKind::Segment), &["A_B", "C"])).unwrap();
    engine.execute(draw(ShapeKind::Line(LineKind::Segment), &["A", "B_C"])).unwrap();

    let first = engine.diagram.shape_by_name("segA_B_C").unwrap();
    let second = engine.diagram.shape_by_name("segA_B_C_2").unwrap();
    assert_ne!(first.dependencies, second.dependencies);

    engine.undo().unwrap();
    engine.redo().unwrap();
    assert!(engine.find_by_name("segA_B_C_2").is_some());
}

#[test]
fn restore_names_skips_rederivation() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    let saved: Vec<(ShapeId, String)> = d.iter().map(|(id, s)| (id, s.name.clone())).collect();
    d.relabel(a, "Ap").unwrap();
    assert_eq!(d.name_of(s), Some("segAp_B"));
    d.restore_names(saved);
    assert_eq!(d.name_of(a), Some("A"));
    assert_eq!(d.name_of(s), Some("segA_B"));
}

#[test]
fn rename_rejects_lines() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let s = build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
    assert!(matches!(d.rename(s, "S"), Err(EngineError::NotAPoint { .. })));
}

#[test]
fn hide_and_show_all() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 0.0, 0.0);
    d.set_hidden(a, true).unwrap();
    d.set_hidden(b, true).unwrap();
    d.show_all();
    assert!(!d.get(a).unwrap().hidden);
    assert!(!d.get(b).unwrap().hidden);
}

#[test]
fn translate_and_zoom_move_roots_only() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 4.0, 0.0);
    let m = build(&mut d, ShapeKind::Point(PointKind::Midpoint), &[a, b]);
    d.translate(1.0, 1.0);
    assert_eq!(d.point(a), Point2d::new(1.0, 1.0));
    assert_relative_eq!(d.point(m).x, 3.0);
    d.zoom(Point2d::new(1.0, 1.0), 2.0);
    assert_eq!(d.point(b), Point2d::new(9.0, 1.0));
    assert_relative_eq!(d.point(m).x, 5.0);
}

#[test]
fn export_set_skips_dependents_of_degenerate_shapes() {
    let mut d = Diagram::new();
    let a = point(&mut d, "A", 0.0, 0.0);
    let b = point(&mut d, "B", 1.0, 1.0);
    let c = point(&mut d, "C", 2.0, 2.0);
    let cc = build(&mut d, ShapeKind::Circle(CircleKind::Circumcircle), &[a, b, c]);
    let on = build(&mut d, ShapeKind::Point(PointKind::OnShape { relative_location: 0.0 }), &[cc]);
    d.compute_export_set();
    assert!(d.get(a).unwrap().in_export);
    assert!(!d.get(cc).unwrap().in_export);
    assert!(!d.get(on).unwrap().in_export);
}

// ── Engine / History ───────────────────────────────────────────────────────

#[test]
fn engine_execute_records_commands() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 0.0, 0.0)).unwrap();
    engine.execute(draw_point("B", 4.0, 0.0)).unwrap();
    engine.execute(draw(ShapeKind::Point(PointKind::Midpoint), &["A", "B"])).unwrap();
    assert_eq!(engine.log.cursor(), 3);
    let m = engine.find_by_name("C").unwrap();
    assert_relative_eq!(engine.diagram.point(m).x, 2.0);
}

#[test]
fn engine_failed_command_not_recorded() {
    let mut engine = Engine::new();
    let err = engine.execute(Command::Hide { target: "Q".into() }).unwrap_err();
    assert_eq!(err, EngineError::UnknownName { name: "Q".into() });
    assert!(engine.log.is_empty());
}

#[test]
fn engine_undo_redo_replays() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 0.0, 0.0)).unwrap();
    engine.execute(draw_point("B", 4.0, 0.0)).unwrap();
    let before = engine.diagram.snapshot();
    engine.execute(Command::Move { target: "B".into(), x: 6.0, y: 1.0 }).unwrap();
    let after = engine.diagram.snapshot();

    engine.undo().unwrap();
    assert_eq!(engine.diagram.snapshot(), before);
    engine.redo().unwrap();
    assert_eq!(engine.diagram.snapshot(), after);
}

#[test]
fn engine_undo_delete_restores_shapes() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 0.0, 0.0)).unwrap();
    engine.execute(draw_point("B", 4.0, 0.0)).unwrap();
    engine.execute(draw(ShapeKind::Line(LineKind::Segment), &["A", "B"])).unwrap();
    engine.execute(Command::Delete { target: "A".into() }).unwrap();
    assert_eq!(engine.diagram.len(), 1);
    engine.undo().unwrap();
    assert_eq!(engine.diagram.len(), 3);
    assert!(engine.find_by_name("segA_B").is_some());
}

#[test]
fn engine_new_command_discards_redo() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 0.0, 0.0)).unwrap();
    engine.execute(draw_point("B", 1.0, 0.0)).unwrap();
    engine.undo().unwrap();
    engine.execute(draw_point("C", 2.0, 0.0)).unwrap();
    assert_eq!(engine.redo(), Err(EngineError::NothingToRedo));
    assert!(engine.find_by_name("B").is_none());
}

#[test]
fn engine_undo_on_empty_errors() {
    let mut engine = Engine::new();
    assert_eq!(engine.undo(), Err(EngineError::NothingToUndo));
}

#[test]
fn engine_undo_restores_render_config() {
    let mut engine = Engine::new();
    engine
        .execute(Command::SetGlobal { variable: GlobalVariable::StrokeWidth, value: 7.0 })
        .unwrap();
    assert_eq!(engine.diagram.render.stroke_width, 7.0);
    engine.undo().unwrap();
    assert_eq!(engine.diagram.render.stroke_width, 3.0);
}

#[test]
fn engine_rename_then_undo() {
    let mut engine = Engine::new();
    engine.execute(draw_point("A", 0.0, 0.0)).unwrap();
    engine.execute(draw_point("B", 4.0, 0.0)).unwrap();
    engine.execute(draw(ShapeKind::Line(LineKind::Segment), &["A", "B"])).unwrap();
    engine.execute(Command::Rename { target: "A".into(), new_name: "Q".into() }).unwrap();
    engine.execute(Command::Recolor { target: "segQ_B".into(), color: Color::new(255, 0, 0) }).unwrap();
    assert!(engine.find_by_name("segQ_B").is_some());
    engine.undo().unwrap();
    engine.undo().unwrap();
    assert!(engine.find_by_name("segA_B").is_some());
    engine.redo().unwrap();
    engine.redo().unwrap();
    let seg = engine.diagram.shape_by_name("segQ_B").unwrap();
    assert_eq!(seg.color, Color::new(255, 0, 0));
}

#[test]
fn engine_add_shape_records_draw() {
    let mut engine = Engine::new();
    let a = engine.add_shape(ShapeSpec::free_point(3.0, 4.0).named("A")).unwrap();
    engine.diagram.move_point(a, Point2d::new(5.0, 5.0)).unwrap();
    engine.record(Command::Move { target: "A".into(), x: 5.0, y: 5.0 });
    engine.undo().unwrap();
    assert_eq!(engine.diagram.point(engine.find_by_name("A").unwrap()), Point2d::new(3.0, 4.0));
}

// ── Properties ─────────────────────────────────────────────────────────────

/// One step of a random construction session, resolved against whatever
/// shapes exist when it runs.
#[derive(Debug, Clone)]
enum Step {
    Free(f64, f64),
    Midpoint(usize, usize),
    Segment(usize, usize),
    Circle(usize, usize),
    Move(usize, f64, f64),
    Delete(usize),
}

fn arb_step() -> impl Strategy<Value = Step> {
    let coord = -300.0f64..300.0;
    prop_oneof![
        3 => (coord.clone(), coord.clone()).prop_map(|(x, y)| Step::Free(x, y)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::Midpoint(a, b)),
        2 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::Segment(a, b)),
        1 => (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Step::Circle(a, b)),
        1 => (any::<usize>(), coord.clone(), coord).prop_map(|(a, x, y)| Step::Move(a, x, y)),
        1 => any::<usize>().prop_map(Step::Delete),
    ]
}

fn to_command(engine: &Engine, step: &Step) -> Option<Command> {
    let points: Vec<String> = engine
        .diagram
        .iter()
        .filter(|(_, s)| matches!(s.kind, ShapeKind::Point(_)))
        .map(|(_, s)| s.name.clone())
        .collect();
    let pick = |i: usize| points.get(i % points.len().max(1)).cloned();
    match *step {
        Step::Free(x, y) => Some(draw_point(&engine.diagram.next_free_name(1), x, y)),
        Step::Midpoint(a, b) => {
            let (a, b) = (pick(a)?, pick(b)?);
            Some(draw(ShapeKind::Point(PointKind::Midpoint), &[&a, &b]))
        }
        Step::Segment(a, b) => {
            let (a, b) = (pick(a)?, pick(b)?);
            Some(draw(ShapeKind::Line(LineKind::Segment), &[&a, &b]))
        }
        Step::Circle(a, b) => {
            let (a, b) = (pick(a)?, pick(b)?);
            Some(draw(ShapeKind::Circle(CircleKind::ByRadiusPoint), &[&a, &b]))
        }
        Step::Move(a, x, y) => Some(Command::Move { target: pick(a)?, x, y }),
        Step::Delete(a) => Some(Command::Delete { target: pick(a)? }),
    }
}

const RENAME_POOL: [&str; 6] = ["A", "B", "A_B", "B_C", "C_A", "A_C"];

proptest! {
    #[test]
    fn names_stay_unique_under_renames(
        renames in prop::collection::vec((0..4usize, 0..RENAME_POOL.len()), 1..20),
    ) {
        let mut d = Diagram::new();
        let roots: Vec<ShapeId> = ["P", "Q", "R", "S"]
            .iter()
            .enumerate()
            .map(|(i, n)| point(&mut d, n, i as f64, (i * i) as f64))
            .collect();
        for (i, &a) in roots.iter().enumerate() {
            for &b in &roots[i + 1..] {
                build(&mut d, ShapeKind::Line(LineKind::Segment), &[a, b]);
            }
        }
        for (who, to) in renames {
            let _ = d.rename(roots[who], RENAME_POOL[to]);
            let mut seen = std::collections::HashSet::new();
            for (_, shape) in d.iter() {
                prop_assert!(seen.insert(shape.name.clone()), "duplicate name {}", shape.name);
            }
        }
    }

    #[test]
    fn levels_increase_along_dependencies(steps in prop::collection::vec(arb_step(), 1..30)) {
        let mut engine = Engine::new();
        for step in &steps {
            if let Some(cmd) = to_command(&engine, step) {
                let _ = engine.execute(cmd);
            }
        }
        for (_, shape) in engine.diagram.iter() {
            for dep in &shape.dependencies {
                let dep = engine.diagram.get(*dep).unwrap();
                prop_assert!(shape.level > dep.level);
            }
        }
    }

    #[test]
    fn undo_then_redo_is_identity(steps in prop::collection::vec(arb_step(), 1..25)) {
        let mut engine = Engine::new();
        let mut states = vec![engine.diagram.snapshot()];
        for step in &steps {
            if let Some(cmd) = to_command(&engine, step) {
                if engine.execute(cmd).is_ok() {
                    states.push(engine.diagram.snapshot());
                }
            }
        }
        prop_assume!(states.len() >= 2);
        let last = states.len() - 1;
        engine.undo().unwrap();
        prop_assert_eq!(&engine.diagram.snapshot(), &states[last - 1]);
        engine.redo().unwrap();
        prop_assert_eq!(&engine.diagram.snapshot(), &states[last]);
    }
}
