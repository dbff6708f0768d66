use glam::Vec2;
use log::debug;

use crate::api::types::BodyId;
use crate::components::block::{BlockInstance, PhysicsDef, Position};
use crate::core::physics::{BodyOptions, Bounds, PhysicsWorld};
use crate::error::ShapeError;

/// A body built from a unit-space polygon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedShape {
    pub id: BodyId,
    /// Requested minus actual bounds at construction, per corner. The
    /// physics world re-centers polygons on their centroid, and artwork uses
    /// this to find where unit space landed.
    pub offset: Bounds,
}

/// Build the body for a placed block.
pub fn load_block(
    physics: &mut PhysicsWorld,
    block: &BlockInstance,
    options: &BodyOptions,
) -> Result<LoadedShape, ShapeError> {
    let def = block.data.physics.as_ref().ok_or(ShapeError::MissingPhysics)?;
    load_shape(physics, block.position, def, options)
}

/// Build a body whose unit square spans `scale` world units centered on
/// `(position.x, position.y)`, rotated by the definition's angle.
pub fn load_shape(
    physics: &mut PhysicsWorld,
    position: Position,
    def: &PhysicsDef,
    options: &BodyOptions,
) -> Result<LoadedShape, ShapeError> {
    let at = position.at();
    let scale = position.scale;
    let placed: Vec<Vec2> = def.shape.iter().map(|p| *p * scale + at).collect();
    let requested = Bounds::from_points(&placed).ok_or(ShapeError::TooFewPoints { count: 0 })?;

    let id = physics.create_polygon_body(at, &placed, options)?;
    let actual = physics.body(id).map(|b| b.bounds).unwrap_or(requested);
    let offset = requested.offset_from(actual);

    physics.set_position(id, at + offset.min - Vec2::splat(0.5 * scale));
    if def.angle != 0.0 {
        physics.rotate(id, def.angle.to_radians());
    }

    debug!(
        "loaded body {:?}: {} points, scale {}, offset ({}, {})",
        id,
        placed.len(),
        scale,
        offset.min.x,
        offset.min.y
    );
    Ok(LoadedShape { id, offset })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::block::{BlockTemplate, TemplateData};
    use crate::core::physics::PhysicsSettings;

    fn square() -> Vec<Vec2> {
        vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)]
    }

    fn def(shape: Vec<Vec2>, angle: f32) -> PhysicsDef {
        PhysicsDef {
            shape,
            angle,
            ..PhysicsDef::default()
        }
    }

    fn still_world() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsSettings {
            gravity: Vec2::ZERO,
            ..PhysicsSettings::default()
        })
    }

    #[test]
    fn square_is_centered_on_its_placement() {
        let mut physics = still_world();
        let loaded = load_shape(
            &mut physics,
            Position::new(300.0, 200.0, 100.0),
            &def(square(), 0.0),
            &BodyOptions::default(),
        )
        .unwrap();

        let body = physics.body(loaded.id).unwrap();
        assert!((body.bounds.min - Vec2::new(250.0, 150.0)).length() < 1e-3);
        assert!((body.bounds.max - Vec2::new(350.0, 250.0)).length() < 1e-3);
        assert!((loaded.offset.min - Vec2::splat(50.0)).length() < 1e-3);
    }

    #[test]
    fn offset_tracks_the_centroid_of_lopsided_shapes() {
        let triangle = vec![Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0)];
        let mut physics = still_world();
        let loaded = load_shape(
            &mut physics,
            Position::new(0.0, 0.0, 90.0),
            &def(triangle, 0.0),
            &BodyOptions::default(),
        )
        .unwrap();

        // centroid of the scaled triangle is (30, 60)
        assert!((loaded.offset.min - Vec2::new(30.0, 60.0)).length() < 1e-3);
        let body = physics.body(loaded.id).unwrap();
        assert!((body.bounds.min - Vec2::splat(-45.0)).length() < 1e-3);
        assert!((body.bounds.max - Vec2::splat(45.0)).length() < 1e-3);
    }

    #[test]
    fn angle_is_applied_in_degrees() {
        let mut physics = still_world();
        let loaded = load_shape(
            &mut physics,
            Position::new(0.0, 0.0, 100.0),
            &def(square(), 90.0),
            &BodyOptions::default(),
        )
        .unwrap();
        let (_, angle) = physics.body_pose(loaded.id).unwrap();
        assert!((angle - std::f32::consts::FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn degenerate_polygons_are_rejected() {
        let mut physics = still_world();
        let flat = vec![Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)];
        let err = load_shape(
            &mut physics,
            Position::new(0.0, 0.0, 10.0),
            &def(flat, 0.0),
            &BodyOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, ShapeError::ZeroArea);

        let bowtie = vec![Vec2::ZERO, Vec2::new(3.0, 1.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 2.0)];
        let err = load_shape(
            &mut physics,
            Position::new(0.0, 0.0, 10.0),
            &def(bowtie, 0.0),
            &BodyOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ShapeError::SelfIntersecting { .. }));
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn blocks_without_physics_cannot_load() {
        let mut physics = still_world();
        let block = BlockTemplate::new("ghost", TemplateData::default())
            .instantiate(Position::new(0.0, 0.0, 1.0));
        assert_eq!(
            load_block(&mut physics, &block, &BodyOptions::default()).unwrap_err(),
            ShapeError::MissingPhysics
        );
    }

    #[test]
    fn dynamic_square_rests_on_static_square() {
        let mut physics = PhysicsWorld::new(PhysicsSettings::default());
        let floor = load_shape(
            &mut physics,
            Position::new(500.0, 600.0, 100.0),
            &def(square(), 0.0),
            &BodyOptions::fixed(),
        )
        .unwrap();
        let crate_box = load_shape(
            &mut physics,
            Position::new(500.0, 480.0, 100.0),
            &def(square(), 0.0),
            &BodyOptions::default(),
        )
        .unwrap();

        for _ in 0..240 {
            physics.step(1.0 / 60.0);
        }

        let top = physics.body(floor.id).unwrap().bounds.min.y;
        let bottom = physics.body(crate_box.id).unwrap().bounds.max.y;
        assert!((top - 550.0).abs() < 1e-3, "floor moved to {top}");
        assert!((bottom - top).abs() < 2.0, "box bottom {bottom} vs floor top {top}");
        assert!(physics.velocity(crate_box.id).length() < 5.0);
    }
}
