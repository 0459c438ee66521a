//! Integration tests for world position queries.

use xform_eval::prelude::*;

const EPS: f64 = 1e-5;

fn assert_close(actual: DVec3, expected: DVec3, eps: f64) {
    assert!(
        actual.abs_diff_eq(expected, eps),
        "expected {expected}, got {actual}"
    );
}

/// Stage with a `/World` xform, as every scene starts.
fn world_stage() -> Stage {
    let mut stage = Stage::new();
    stage.define("/World", NodeKind::Xform).expect("define /World");
    stage
}

fn define(stage: &mut Stage, path: &str, kind: NodeKind, ops: Vec<XformOp>) -> NodeId {
    let id = stage.define(path, kind).expect("define");
    stage.set_ops(id, ops).expect("set ops");
    id
}

fn translated(stage: &mut Stage, path: &str, kind: NodeKind, t: [f64; 3]) -> NodeId {
    define(stage, path, kind, vec![XformOp::translate(DVec3::from_array(t))])
}

// ============================================================================
// Single node
// ============================================================================

#[test]
fn test_simple_translation() {
    let mut stage = world_stage();
    let cube = translated(&mut stage, "/World/Cube", NodeKind::Geometry, [10.0, 20.0, 30.0]);

    let pos = world_position(&stage, cube, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(10.0, 20.0, 30.0), EPS);
}

#[test]
fn test_identity_composition() {
    let mut stage = Stage::new();
    let node = define(&mut stage, "/Cube", NodeKind::Geometry, vec![]);

    let world = compute_world_transform(&stage, node, TimeCode::Default).unwrap();
    assert_eq!(world, DMat4::IDENTITY);
    assert_eq!(world_position(&stage, node, TimeCode::Default).unwrap(), DVec3::ZERO);
}

#[test]
fn test_negative_coordinates() {
    let mut stage = world_stage();
    let cube = translated(&mut stage, "/World/Cube", NodeKind::Geometry, [-100.0, -50.0, -25.0]);

    let pos = world_position(&stage, cube, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(-100.0, -50.0, -25.0), EPS);
}

#[test]
fn test_non_transformable_node() {
    let mut stage = world_stage();
    let scope = stage.define("/World/Scope", NodeKind::Scope).unwrap();

    let err = world_position(&stage, scope, TimeCode::Default).unwrap_err();
    match err {
        Error::InvalidNodeKind { path } => assert_eq!(path, "/World/Scope"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        world_transform_components(&stage, scope, TimeCode::Default),
        Err(Error::InvalidNodeKind { .. })
    ));
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn test_parent_child_translation() {
    let mut stage = world_stage();
    translated(&mut stage, "/World/Parent", NodeKind::Xform, [100.0, 0.0, 0.0]);
    let child = translated(&mut stage, "/World/Parent/Child", NodeKind::Geometry, [0.0, 50.0, 0.0]);

    let pos = world_position(&stage, child, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(100.0, 50.0, 0.0), EPS);
}

#[test]
fn test_multi_level_hierarchy() {
    let mut stage = world_stage();
    translated(&mut stage, "/World/Level1", NodeKind::Xform, [10.0, 0.0, 0.0]);
    translated(&mut stage, "/World/Level1/Level2", NodeKind::Xform, [0.0, 20.0, 0.0]);
    translated(&mut stage, "/World/Level1/Level2/Level3", NodeKind::Xform, [0.0, 0.0, 30.0]);
    let child = translated(
        &mut stage,
        "/World/Level1/Level2/Level3/Child",
        NodeKind::Geometry,
        [1.0, 2.0, 3.0],
    );

    let pos = world_position(&stage, child, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(11.0, 22.0, 33.0), EPS);
}

#[test]
fn test_nested_groups() {
    let mut stage = Stage::new();
    translated(&mut stage, "/World", NodeKind::Xform, [100.0, 0.0, 0.0]);
    translated(&mut stage, "/World/Group", NodeKind::Xform, [0.0, 50.0, 0.0]);
    translated(&mut stage, "/World/Group/SubGroup", NodeKind::Xform, [0.0, 0.0, 25.0]);
    let cube = translated(&mut stage, "/World/Group/SubGroup/Cube", NodeKind::Geometry, [5.0, 5.0, 5.0]);

    let pos = world_position(&stage, cube, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(105.0, 55.0, 30.0), 1e-3);
}

#[test]
fn test_rotation_affects_child_position() {
    let mut stage = world_stage();
    define(&mut stage, "/World/Parent", NodeKind::Xform, vec![XformOp::rotate_z(90.0)]);
    let child = translated(&mut stage, "/World/Parent/Child", NodeKind::Geometry, [10.0, 0.0, 0.0]);

    let pos = world_position(&stage, child, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(0.0, 10.0, 0.0), 1e-3);
}

#[test]
fn test_scale_affects_child_position() {
    let mut stage = world_stage();
    define(
        &mut stage,
        "/World/Parent",
        NodeKind::Xform,
        vec![
            XformOp::translate(DVec3::new(10.0, 0.0, 0.0)),
            XformOp::scale(DVec3::splat(2.0)),
        ],
    );
    let child = translated(&mut stage, "/World/Parent/Child", NodeKind::Geometry, [5.0, 0.0, 0.0]);

    let pos = world_position(&stage, child, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(20.0, 0.0, 0.0), 1e-3);
}

#[test]
fn test_deep_hierarchy_does_not_recurse() {
    let mut stage = Stage::new();
    let mut path = String::new();
    let mut leaf = NodeId::ROOT;
    for i in 0..2000 {
        path.push_str(&format!("/N{i}"));
        leaf = translated(&mut stage, &path, NodeKind::Xform, [1.0, 0.0, 0.0]);
    }

    let pos = world_position(&stage, leaf, TimeCode::Default).unwrap();
    assert_close(pos, DVec3::new(2000.0, 0.0, 0.0), 1e-6);
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn test_batch_query_accuracy() {
    let mut stage = world_stage();
    let mut ids = Vec::new();
    let mut expected = Vec::new();
    for i in 0..10 {
        let pos = DVec3::new(i as f64 * 10.0, i as f64 * 5.0, i as f64 * 2.0);
        ids.push(translated(&mut stage, &format!("/World/Cube{i}"), NodeKind::Geometry, pos.to_array()));
        expected.push(pos);
    }

    let batch = world_positions_batch(&stage, &ids, TimeCode::Default);
    assert_eq!(batch.len(), ids.len());

    for ((id, b), e) in ids.iter().zip(&batch).zip(&expected) {
        let single = world_position(&stage, *id, TimeCode::Default).unwrap();
        assert_eq!(*b, single);
        assert_close(*b, *e, EPS);
    }
}

#[test]
fn test_batch_matches_single_in_rotated_hierarchy() {
    let mut stage = world_stage();
    define(
        &mut stage,
        "/World/Arm",
        NodeKind::Xform,
        vec![
            XformOp::translate(DVec3::new(1.0, 2.0, 3.0)),
            XformOp::rotate_xyz(DVec3::new(10.0, 20.0, 30.0)),
            XformOp::scale(DVec3::new(1.0, 2.0, 0.5)),
        ],
    );
    define(&mut stage, "/World/Arm/Elbow", NodeKind::Xform, vec![XformOp::rotate_y(-35.0)]);
    let mut ids = Vec::new();
    for i in 0..8 {
        ids.push(translated(
            &mut stage,
            &format!("/World/Arm/Elbow/Finger{i}"),
            NodeKind::Geometry,
            [i as f64, 1.0, -2.0],
        ));
    }
    ids.push(stage.lookup("/World/Arm").unwrap());

    for time in [TimeCode::Default, TimeCode::at(3.0)] {
        let batch = world_positions_batch(&stage, &ids, time);
        for (id, b) in ids.iter().zip(&batch) {
            assert_eq!(*b, world_position(&stage, *id, time).unwrap());
        }
    }
}

#[test]
fn test_batch_with_shared_parents() {
    let mut stage = world_stage();
    translated(&mut stage, "/World/Parent", NodeKind::Xform, [100.0, 0.0, 0.0]);
    let ids: Vec<_> = (0..20)
        .map(|i| {
            translated(
                &mut stage,
                &format!("/World/Parent/Cube{i}"),
                NodeKind::Geometry,
                [i as f64, 0.0, 0.0],
            )
        })
        .collect();

    let results = world_positions_batch(&stage, &ids, TimeCode::Default);
    for (i, pos) in results.iter().enumerate() {
        assert!((pos.x - (100.0 + i as f64)).abs() < EPS);
    }
}

#[test]
fn test_batch_with_reset_xform_stack() {
    let mut stage = world_stage();
    define(
        &mut stage,
        "/World/Parent",
        NodeKind::Xform,
        vec![XformOp::translate(DVec3::new(100.0, 0.0, 0.0)), XformOp::rotate_z(90.0)],
    );
    let inherits = translated(&mut stage, "/World/Parent/Inherits", NodeKind::Geometry, [10.0, 0.0, 0.0]);
    let reset = translated(&mut stage, "/World/Parent/Reset", NodeKind::Xform, [10.0, 0.0, 0.0]);
    let below = translated(&mut stage, "/World/Parent/Reset/Below", NodeKind::Geometry, [0.0, 0.0, 7.0]);
    stage.set_resets_xform_stack(reset, true).unwrap();

    // Inherits first so the reset node finds its parent already cached
    let ids = [inherits, reset, below, inherits];
    let batch = world_positions_batch(&stage, &ids, TimeCode::Default);

    assert_close(batch[0], DVec3::new(100.0, 10.0, 0.0), 1e-9);
    assert_close(batch[1], DVec3::new(10.0, 0.0, 0.0), 1e-9);
    assert_close(batch[2], DVec3::new(10.0, 0.0, 7.0), 1e-9);
    for (id, b) in ids.iter().zip(&batch) {
        assert_eq!(*b, world_position(&stage, *id, TimeCode::Default).unwrap());
    }

    let mut query = BatchQuery::new(&stage, TimeCode::Default);
    let components = query.components(&[inherits, reset]);
    let reset_components = components[1].unwrap();
    assert!(reset_components.rotation.abs_diff_eq(&Rotation::IDENTITY, 1e-12));
    assert!(query.diagnostics().is_empty());
    assert_eq!(world_positions_par(&stage, &ids, TimeCode::Default), batch);
}

#[test]
fn test_empty_batch() {
    let stage = world_stage();
    assert!(world_positions_batch(&stage, &[], TimeCode::Default).is_empty());
    assert!(world_positions_par(&stage, &[], TimeCode::Default).is_empty());
}

#[test]
fn test_batch_with_non_transformable() {
    let mut stage = world_stage();
    let a = translated(&mut stage, "/World/A", NodeKind::Geometry, [1.0, 2.0, 3.0]);
    let scope = stage.define("/World/Scope", NodeKind::Scope).unwrap();
    let b = translated(&mut stage, "/World/Scope/B", NodeKind::Geometry, [4.0, 5.0, 6.0]);

    let results = world_positions_batch(&stage, &[a, scope, b], TimeCode::Default);
    assert_eq!(results.len(), 3);
    assert_close(results[0], DVec3::new(1.0, 2.0, 3.0), EPS);
    assert_eq!(results[1], DVec3::ZERO);
    assert_close(results[2], DVec3::new(4.0, 5.0, 6.0), EPS);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut stage = world_stage();
    let mut ids = Vec::new();
    for g in 0..10 {
        let group = format!("/World/Group{g}");
        define(
            &mut stage,
            &group,
            NodeKind::Xform,
            vec![XformOp::translate(DVec3::new(g as f64, 0.0, 0.0)), XformOp::rotate_z(g as f64 * 9.0)],
        );
        for c in 0..100 {
            ids.push(translated(
                &mut stage,
                &format!("{group}/Cube{c}"),
                NodeKind::Geometry,
                [c as f64, 0.5, 0.0],
            ));
        }
    }
    ids.push(stage.lookup("/World").unwrap());
    ids.push(stage.root());

    let seq = world_positions_batch(&stage, &ids, TimeCode::Default);
    let par = world_positions_par(&stage, &ids, TimeCode::Default);
    assert_eq!(seq, par);
}

// ============================================================================
// Decomposition
// ============================================================================

#[test]
fn test_transform_decomposition() {
    let mut stage = world_stage();
    let cube = define(
        &mut stage,
        "/World/Cube",
        NodeKind::Geometry,
        vec![
            XformOp::translate(DVec3::new(10.0, 20.0, 30.0)),
            XformOp::rotate_xyz(DVec3::new(0.0, 45.0, 0.0)),
            XformOp::scale(DVec3::new(2.0, 3.0, 4.0)),
        ],
    );

    let c = world_transform_components(&stage, cube, TimeCode::Default).unwrap();
    assert_close(c.translation, DVec3::new(10.0, 20.0, 30.0), EPS);
    assert_close(c.scale, DVec3::new(2.0, 3.0, 4.0), 1e-2);
    assert!(c.rotation.abs_diff_eq(&Rotation::from_axis_angle(DVec3::Y, 45.0), 1e-9));
    assert!((c.rotation.angle_degrees() - 45.0).abs() < 1e-9);
}

#[test]
fn test_decomposition_accumulates_parent_rotation() {
    let mut stage = world_stage();
    define(&mut stage, "/World/Parent", NodeKind::Xform, vec![XformOp::rotate_z(30.0)]);
    let child = define(
        &mut stage,
        "/World/Parent/Child",
        NodeKind::Geometry,
        vec![XformOp::rotate_z(60.0), XformOp::scale(DVec3::splat(3.0))],
    );

    let c = world_transform_components(&stage, child, TimeCode::Default).unwrap();
    assert!(c.rotation.abs_diff_eq(&Rotation::from_axis_angle(DVec3::Z, 90.0), 1e-9));
    assert_close(c.scale, DVec3::splat(3.0), 1e-9);
}

// ============================================================================
// Animation
// ============================================================================

fn animated_cube(stage: &mut Stage) -> NodeId {
    let samples = TimeSamples::from_samples([
        (0.0, DVec3::ZERO),
        (50.0, DVec3::new(50.0, 0.0, 0.0)),
        (100.0, DVec3::new(100.0, 0.0, 0.0)),
    ])
    .unwrap();
    define(stage, "/World/Cube", NodeKind::Geometry, vec![XformOp::translate(samples)])
}

#[test]
fn test_position_at_different_times() {
    let mut stage = world_stage();
    let cube = animated_cube(&mut stage);

    let at = |t: f64| world_position(&stage, cube, TimeCode::at(t)).unwrap();
    assert_eq!(at(0.0), DVec3::ZERO);
    assert_eq!(at(50.0), DVec3::new(50.0, 0.0, 0.0));
    assert_eq!(at(100.0), DVec3::new(100.0, 0.0, 0.0));
    assert_close(at(25.0), DVec3::new(25.0, 0.0, 0.0), EPS);
    assert_eq!(at(150.0), DVec3::new(100.0, 0.0, 0.0));
    assert!(transform_might_be_time_varying(&stage, cube).unwrap());
}

#[test]
fn test_default_time_vs_specific_time() {
    let mut stage = world_stage();
    let samples = TimeSamples::from_samples([(100.0, DVec3::new(50.0, 0.0, 0.0))])
        .unwrap()
        .with_default(DVec3::new(10.0, 0.0, 0.0));
    let cube = define(&mut stage, "/World/Cube", NodeKind::Geometry, vec![XformOp::translate(samples)]);

    assert_eq!(
        world_position(&stage, cube, TimeCode::Default).unwrap(),
        DVec3::new(10.0, 0.0, 0.0)
    );
    assert_eq!(
        world_position(&stage, cube, TimeCode::at(100.0)).unwrap(),
        DVec3::new(50.0, 0.0, 0.0)
    );
}

#[test]
fn test_animated_parent_in_batch() {
    let mut stage = Stage::new();
    let samples = TimeSamples::from_samples([(0.0, 0.0), (10.0, 90.0)]).unwrap();
    define(&mut stage, "/Spin", NodeKind::Xform, vec![XformOp::rotate_z(samples)]);
    let tip = translated(&mut stage, "/Spin/Tip", NodeKind::Geometry, [10.0, 0.0, 0.0]);

    let start = world_positions_batch(&stage, &[tip], TimeCode::at(0.0));
    let end = world_positions_batch(&stage, &[tip], TimeCode::at(10.0));
    let mid = world_positions_batch(&stage, &[tip], TimeCode::at(5.0));
    assert_close(start[0], DVec3::new(10.0, 0.0, 0.0), 1e-9);
    assert_close(end[0], DVec3::new(0.0, 10.0, 0.0), 1e-9);
    let half = 45f64.to_radians();
    assert_close(mid[0], DVec3::new(10.0 * half.cos(), 10.0 * half.sin(), 0.0), 1e-9);
}
