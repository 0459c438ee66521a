//! Demonstration scenes built in memory.

use xform_eval::prelude::*;

/// A built scene plus the nodes whose positions the demo reports.
pub struct Demo {
    pub name: &'static str,
    pub title: &'static str,
    pub stage: Stage,
    pub nodes: Vec<NodeId>,
    /// Times to evaluate when none is given on the command line.
    pub times: Vec<TimeCode>,
}

pub const NAMES: [&str; 5] = ["basic", "batch", "nested", "animated", "components"];

/// Build a demo by name.
pub fn build(name: &str) -> Result<Option<Demo>> {
    Ok(Some(match name {
        "basic" => basic()?,
        "batch" => batch()?,
        "nested" => nested()?,
        "animated" => animated()?,
        "components" => components()?,
        _ => return Ok(None),
    }))
}

fn world_stage() -> Result<Stage> {
    let mut stage = Stage::new();
    stage.define("/World", NodeKind::Xform)?;
    Ok(stage)
}

/// One cube translated under an identity root.
fn basic() -> Result<Demo> {
    let mut stage = world_stage()?;
    let cube = stage.define("/World/Cube", NodeKind::Geometry)?;
    stage.add_op(cube, XformOp::translate(DVec3::new(10.0, 5.0, 0.0)))?;
    Ok(Demo {
        name: "basic",
        title: "Single node position",
        stage,
        nodes: vec![cube],
        times: vec![TimeCode::Default],
    })
}

/// 5x5 grid of cubes spaced 10 units apart.
fn batch() -> Result<Demo> {
    let mut stage = world_stage()?;
    let mut nodes = Vec::with_capacity(25);
    for i in 0..5 {
        for j in 0..5 {
            let id = stage.define(&format!("/World/Cube_{i}_{j}"), NodeKind::Geometry)?;
            stage.add_op(id, XformOp::translate(DVec3::new(i as f64 * 10.0, j as f64 * 10.0, 0.0)))?;
            nodes.push(id);
        }
    }
    Ok(Demo {
        name: "batch",
        title: "Batch query over a grid",
        stage,
        nodes,
        times: vec![TimeCode::Default],
    })
}

/// World > Group > SubGroup > Cube, accumulating to (105, 55, 30).
fn nested() -> Result<Demo> {
    let mut stage = Stage::new();
    let mut nodes = Vec::new();
    for (path, kind, offset) in [
        ("/World", NodeKind::Xform, DVec3::new(100.0, 0.0, 0.0)),
        ("/World/Group", NodeKind::Xform, DVec3::new(0.0, 50.0, 0.0)),
        ("/World/Group/SubGroup", NodeKind::Xform, DVec3::new(0.0, 0.0, 25.0)),
        ("/World/Group/SubGroup/Cube", NodeKind::Geometry, DVec3::new(5.0, 5.0, 5.0)),
    ] {
        let id = stage.define(path, kind)?;
        stage.add_op(id, XformOp::translate(offset))?;
        nodes.push(id);
    }
    Ok(Demo {
        name: "nested",
        title: "Nested parent transforms",
        stage,
        nodes,
        times: vec![TimeCode::Default],
    })
}

/// Cube moving from (0,0,0) to (100,0,0) over 100 frames.
fn animated() -> Result<Demo> {
    let mut stage = world_stage()?;
    let cube = stage.define("/World/Cube", NodeKind::Geometry)?;
    let samples = TimeSamples::from_samples([
        (0.0, DVec3::ZERO),
        (50.0, DVec3::new(50.0, 0.0, 0.0)),
        (100.0, DVec3::new(100.0, 0.0, 0.0)),
    ])?;
    stage.add_op(cube, XformOp::translate(samples))?;
    Ok(Demo {
        name: "animated",
        title: "Time-sampled translation",
        stage,
        nodes: vec![cube],
        times: [0.0, 25.0, 50.0, 100.0, 150.0].into_iter().map(TimeCode::at).collect(),
    })
}

/// Translate, rotate and scale on one node, decomposed again.
fn components() -> Result<Demo> {
    let mut stage = world_stage()?;
    let cube = stage.define("/World/Cube", NodeKind::Geometry)?;
    stage.set_ops(
        cube,
        vec![
            XformOp::translate(DVec3::new(10.0, 20.0, 30.0)),
            XformOp::rotate_xyz(DVec3::new(0.0, 45.0, 0.0)),
            XformOp::scale(DVec3::new(2.0, 3.0, 4.0)),
        ],
    )?;
    Ok(Demo {
        name: "components",
        title: "Full transform decomposition",
        stage,
        nodes: vec![cube],
        times: vec![TimeCode::Default],
    })
}
