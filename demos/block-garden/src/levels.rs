//! The six garden levels.
//!
//! Levels with a setup function scatter extra blocks on every load, so no two
//! visits look alike.

use glam::Vec2;
use rand::Rng;
use tumble_engine::{
    BlockInputs, BodyOptions, ConstraintSpec, LayoutEntry, Level, LevelPlan, Rgba, SceneRng,
};

use crate::blocks::Catalogue;

fn shape(points: &[[f32; 2]]) -> BlockInputs {
    BlockInputs {
        shape: Some(points.iter().map(|&[x, y]| Vec2::new(x, y)).collect()),
        ..BlockInputs::default()
    }
}

fn angle(degrees: f32) -> BlockInputs {
    BlockInputs {
        angle: Some(degrees),
        ..BlockInputs::default()
    }
}

/// A static 8-wide plank, the floor of most levels.
fn floor(x: f32, y: f32, key: usize, width: f32) -> LayoutEntry {
    LayoutEntry::new(x, y, 100.0, key)
        .with_inputs(shape(&[[0.0, 0.0], [0.0, 1.0], [width, 1.0], [width, 0.0]]))
        .with_options(BodyOptions::fixed())
}

/// Clovers, squares and a ball over a floor, with static pegs and a rain of
/// balls added on load.
pub fn level1(blocks: &Catalogue) -> Level {
    const CLOVER: usize = 0;
    const BASIC: usize = 1;
    const BALL: usize = 2;

    let drag = |air_friction| BodyOptions::default().with_air_friction(air_friction);
    Level::new(
        "level1",
        vec![blocks.clover.clone(), blocks.basic.clone(), blocks.ball.clone()],
    )
    .with_layout(vec![
        LayoutEntry::new(500.0, 100.0, 50.0, BALL),
        LayoutEntry::new(200.0, 0.0, 200.0, CLOVER),
        LayoutEntry::new(225.0, 350.0, 25.0, CLOVER).with_options(drag(0.1)),
        LayoutEntry::new(250.0, 350.0, 25.0, CLOVER).with_options(drag(0.05)),
        LayoutEntry::new(275.0, 350.0, 25.0, CLOVER).with_options(drag(0.01)),
        LayoutEntry::new(400.0, 600.0, 100.0, CLOVER).with_inputs(BlockInputs::default()),
        LayoutEntry::new(300.0, 200.0, 100.0, BASIC)
            .with_inputs(shape(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]])),
        LayoutEntry::new(500.0, 200.0, 100.0, BASIC)
            .with_inputs(BlockInputs {
                color: Some(Rgba::rgba8(0, 255, 255, 0.5)),
                ..shape(&[[0.5, -0.5], [1.0, 0.5], [0.5, 1.0], [0.0, 0.5]])
            })
            .with_options(drag(0.0)),
        floor(100.0, 950.0, BASIC, 8.0),
    ])
    .with_setup(|plan: &mut LevelPlan, rng: &mut SceneRng| {
        for _ in 0..10 {
            plan.layout.push(
                LayoutEntry::new(
                    rng.random_range(0..1000) as f32,
                    rng.random_range(0..900) as f32,
                    25.0,
                    BASIC,
                )
                .with_options(BodyOptions::fixed())
                .with_inputs(angle(rng.random_range(0.0..360.0))),
            );
        }
        for _ in 0..25 {
            plan.layout.push(LayoutEntry::new(
                rng.random_range(0..1000) as f32,
                -(rng.random_range(0..2000) as f32),
                25.0,
                BALL,
            ));
        }
    })
}

/// A stack of squares between two tall pillars.
pub fn level2(blocks: &Catalogue) -> Level {
    const BASIC: usize = 1;

    Level::new("level2", vec![blocks.clover.clone(), blocks.basic.clone()]).with_layout(vec![
        LayoutEntry::new(500.0, 300.0, 75.0, BASIC),
        LayoutEntry::new(500.0, 500.0, 75.0, BASIC),
        LayoutEntry::new(500.0, 400.0, 100.0, BASIC),
        LayoutEntry::new(400.0, 400.0, 100.0, BASIC)
            .with_inputs(shape(&[[-1.0, 0.0], [-1.0, 2.0], [1.0, 2.0], [1.0, 0.0]])),
        LayoutEntry::new(600.0, 400.0, 100.0, BASIC)
            .with_inputs(shape(&[[0.0, 0.0], [0.0, 3.0], [2.0, 3.0], [2.0, 0.0]])),
        floor(100.0, 900.0, BASIC, 8.0),
    ])
}

/// Five hundred tilted squares dropped onto a floor.
pub fn level3(blocks: &Catalogue) -> Level {
    const BASIC: usize = 0;

    Level::new("level3", vec![blocks.basic.clone()])
        .with_layout(vec![floor(150.0, 900.0, BASIC, 8.0)])
        .with_setup(|plan: &mut LevelPlan, rng: &mut SceneRng| {
            for _ in 0..500 {
                plan.layout.push(
                    LayoutEntry::new(
                        rng.random_range(100..900) as f32,
                        rng.random_range(0..800) as f32,
                        rng.random_range(1..=3) as f32 * 25.0,
                        BASIC,
                    )
                    .with_inputs(angle(rng.random_range(0.0..360.0))),
                );
            }
        })
}

/// A notched block and a square landing on a giant static clover.
pub fn level4(blocks: &Catalogue) -> Level {
    const TEST: usize = 0;
    const CLOVER: usize = 1;
    const BASIC: usize = 2;

    Level::new(
        "level4",
        vec![blocks.test.clone(), blocks.clover.clone(), blocks.basic.clone()],
    )
    .with_layout(vec![
        LayoutEntry::new(550.0, 0.0, 100.0, TEST),
        LayoutEntry::new(450.0, 0.0, 100.0, BASIC),
        LayoutEntry::new(500.0, 500.0, 500.0, CLOVER).with_options(BodyOptions::fixed()),
    ])
}

/// Four clovers tied together by soft springs above a pedestal.
pub fn level5(blocks: &Catalogue) -> Level {
    const BASIC: usize = 0;
    const CLOVER: usize = 1;

    let spring = |a, b| ConstraintSpec::new(a, b).with_stiffness(0.005);
    Level::new("level5", vec![blocks.basic.clone(), blocks.clover.clone()])
        .with_layout(vec![
            LayoutEntry::new(400.0, 200.0, 100.0, CLOVER),
            LayoutEntry::new(600.0, 200.0, 100.0, CLOVER),
            LayoutEntry::new(400.0, 400.0, 100.0, CLOVER),
            LayoutEntry::new(600.0, 400.0, 100.0, CLOVER),
            LayoutEntry::new(400.0, 600.0, 150.0, BASIC).with_options(BodyOptions::fixed()),
            floor(100.0, 900.0, BASIC, 9.0),
        ])
        .with_constraints(vec![
            spring(0, 1),
            spring(0, 2),
            spring(0, 3),
            spring(1, 2),
            spring(1, 3),
            spring(2, 3),
        ])
}

/// The player level: a controlled block in a field of anchored pairs.
///
/// Every generated pair is a static anchor and a loose block on a 500 unit
/// tether that is either rigid or very slack.
pub fn level6(blocks: &Catalogue) -> Level {
    const CONTROLLED: usize = 2;
    const SCATTERED: usize = 250;

    Level::new(
        "level6",
        vec![blocks.basic.clone(), blocks.ball.clone(), blocks.controlled.clone()],
    )
    .with_layout(vec![LayoutEntry::new(1500.0, 1500.0, 100.0, CONTROLLED)])
    .with_setup(|plan: &mut LevelPlan, rng: &mut SceneRng| {
        for index in 1..SCATTERED {
            let options = if index % 2 == 0 {
                BodyOptions::default()
            } else {
                BodyOptions::fixed()
            };
            plan.layout.push(
                LayoutEntry::new(
                    rng.random_range(0.0..5000.0),
                    rng.random_range(0.0..5000.0),
                    rng.random_range(50.0..150.0),
                    rng.random_range(0..2),
                )
                .with_options(options)
                .with_inputs(angle(rng.random_range(0.0..360.0))),
            );
            if index % 2 == 0 {
                let stiffness = if rng.random_bool(0.5) { 1.0 } else { 0.001 };
                plan.constraints.push(
                    ConstraintSpec::new(index, index - 1)
                        .with_length(500.0)
                        .with_stiffness(stiffness),
                );
            }
        }
    })
}

/// Every level, in order.
pub fn all(blocks: &Catalogue) -> Vec<Level> {
    vec![
        level1(blocks),
        level2(blocks),
        level3(blocks),
        level4(blocks),
        level5(blocks),
        level6(blocks),
    ]
}
