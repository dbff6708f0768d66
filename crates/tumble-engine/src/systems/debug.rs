//! Debug overlays: physics wireframes, body bounds, contact highlighting,
//! constraint tension and the camera target.
//!
//! Each pass is toggled by its own [`RenderOptions`] flag and appends to the
//! world stage after the artwork. Nothing here writes to the link table.

use std::collections::HashSet;

use log::warn;

use crate::api::types::BodyId;
use crate::components::color::Rgba;
use crate::core::links::LinkTable;
use crate::core::physics::{BodySnapshot, PhysicsWorld};
use crate::renderer::draw_list::{
    closed_path, open_path, rect_path, Anchor, DrawItem, DrawList, PathOp, WORLD_STAGE,
};
use crate::systems::compose::RenderOptions;

pub const WIREFRAME_COLOR: Rgba = Rgba::rgb(0.0, 150.0 / 255.0, 1.0);
pub const WIREFRAME_WIDTH: f32 = 1.0;
pub const BOUNDS_COLOR: Rgba = Rgba::rgb(200.0 / 255.0, 0.0, 0.0);
pub const BOUNDS_WIDTH: f32 = 2.0;
pub const CONTACT_TINT: Rgba = Rgba::new(1.0, 0.0, 0.0, 0.25);
pub const CLEAR_TINT: Rgba = Rgba::new(0.0, 1.0, 0.0, 0.25);
pub const TARGET_TINT: Rgba = Rgba::new(0.0, 0.0, 1.0, 0.25);
pub const CONSTRAINT_WIDTH: f32 = 1.0;

/// Closed outline of every convex part of a body.
pub fn body_path(body: &BodySnapshot) -> Vec<PathOp> {
    body.parts
        .iter()
        .filter(|part| !part.vertices.is_empty())
        .flat_map(|part| closed_path(part.vertices.iter().copied()))
        .collect()
}

/// Links involved in any contact this frame, over every body in the world.
pub fn touching_links(links: &LinkTable, physics: &PhysicsWorld) -> HashSet<BodyId> {
    let mut touching = HashSet::new();
    for contact in physics.detect_collisions(physics.body_ids()) {
        for part in [contact.part_a, contact.part_b] {
            match links.resolve(part, physics) {
                Ok(link) => {
                    touching.insert(link);
                }
                Err(err) => warn!("contact highlight skipped: {err}"),
            }
        }
    }
    touching
}

/// Stretch of a constraint relative to its rest length, times five, so a
/// 20% deviation reads fully red.
pub fn tension(current: f32, rest: f32) -> f32 {
    if rest.abs() <= f32::EPSILON {
        return if current.abs() <= f32::EPSILON { 0.0 } else { 1.0 };
    }
    ((current - rest) / rest).abs() * 5.0
}

pub fn tension_color(tension: f32) -> Rgba {
    Rgba::lerp(Rgba::GREEN, Rgba::RED, tension)
}

/// Append every enabled debug pass.
pub fn compose_debug(
    options: &RenderOptions,
    links: &LinkTable,
    physics: &PhysicsWorld,
    camera_target: Option<BodyId>,
    draw_list: &mut DrawList,
) {
    let bodies = physics.bodies();

    if options.wireframes || options.collisions || options.camera_target {
        let touching = if options.collisions {
            touching_links(links, physics)
        } else {
            HashSet::new()
        };

        for body in &bodies {
            let path = body_path(body);
            if path.is_empty() {
                continue;
            }
            if options.wireframes {
                draw_list.push(
                    WORLD_STAGE,
                    DrawItem::outline(WIREFRAME_COLOR, WIREFRAME_WIDTH, path.clone()),
                );
            }
            if options.collisions {
                let hit = links
                    .resolve(body.id, physics)
                    .is_ok_and(|link| touching.contains(&link));
                let tint = if hit { CONTACT_TINT } else { CLEAR_TINT };
                draw_list.push(WORLD_STAGE, DrawItem::fill(tint, path.clone()));
            }
            if options.camera_target && camera_target == Some(body.id) {
                draw_list.push(WORLD_STAGE, DrawItem::fill(TARGET_TINT, path));
            }
        }
    }

    if options.bounds {
        for body in &bodies {
            draw_list.push(
                WORLD_STAGE,
                DrawItem::outline(
                    BOUNDS_COLOR,
                    BOUNDS_WIDTH,
                    rect_path(body.bounds.min, body.bounds.max, Anchor::World),
                ),
            );
        }
    }

    if options.constraints {
        for record in physics.constraints() {
            let Some((a, b)) = physics.constraint_anchors(record) else {
                continue;
            };
            let color = tension_color(tension(a.distance(b), record.length));
            draw_list.push(WORLD_STAGE, DrawItem::outline(color, CONSTRAINT_WIDTH, open_path([a, b])));
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::components::block::{BlockTemplate, PhysicsDef, Position, TemplateData};
    use crate::core::physics::{BodyOptions, ConstraintDesc, PhysicsSettings};
    use crate::core::shape::load_block;
    use crate::renderer::draw_list::DrawMode;

    fn square_template() -> BlockTemplate {
        BlockTemplate::new(
            "square",
            TemplateData {
                physics: Some(PhysicsDef {
                    shape: vec![Vec2::ZERO, Vec2::Y, Vec2::ONE, Vec2::X],
                    ..PhysicsDef::default()
                }),
                ..TemplateData::default()
            },
        )
    }

    fn scene(positions: &[(f32, f32)]) -> (PhysicsWorld, LinkTable, Vec<BodyId>) {
        let mut physics = PhysicsWorld::new(PhysicsSettings {
            gravity: Vec2::ZERO,
            ..PhysicsSettings::default()
        });
        let mut links = LinkTable::new();
        let template = square_template();
        let mut ids = Vec::new();
        for &(x, y) in positions {
            let mut block = template.instantiate(Position::new(x, y, 100.0));
            let loaded = load_block(&mut physics, &block, &BodyOptions::default()).unwrap();
            block.offset = loaded.offset;
            links.insert(loaded.id, block);
            ids.push(loaded.id);
        }
        (physics, links, ids)
    }

    fn fills(list: &DrawList) -> Vec<Rgba> {
        list.iter()
            .filter_map(|(_, item)| match item.mode {
                DrawMode::Fill(color) => Some(color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn tension_scale() {
        assert_eq!(tension(100.0, 100.0), 0.0);
        assert!((tension(110.0, 100.0) - 0.5).abs() < 1e-6);
        assert!((tension(90.0, 100.0) - 0.5).abs() < 1e-6);
        assert_eq!(tension(0.0, 0.0), 0.0);
        assert_eq!(tension(3.0, 0.0), 1.0);
        assert_eq!(tension_color(0.0), Rgba::GREEN);
        assert_eq!(tension_color(4.0), Rgba::RED);
    }

    #[test]
    fn overlapping_bodies_are_tinted_red() {
        let (physics, links, _) = scene(&[(0.0, 0.0), (60.0, 0.0), (1000.0, 0.0)]);
        let options = RenderOptions {
            cover_art: false,
            collisions: true,
            ..RenderOptions::default()
        };
        let mut list = DrawList::new();
        compose_debug(&options, &links, &physics, None, &mut list);
        assert_eq!(fills(&list), vec![CONTACT_TINT, CONTACT_TINT, CLEAR_TINT]);
    }

    #[test]
    fn untagged_bodies_still_highlight() {
        // highlighting looks at every body, not only tagged ones
        let (physics, links, ids) = scene(&[(0.0, 0.0), (50.0, 50.0)]);
        assert!(!links.get(ids[0]).unwrap().is_collision_candidate());
        assert_eq!(touching_links(&links, &physics).len(), 2);
    }

    #[test]
    fn target_gets_a_blue_tint() {
        let (physics, links, ids) = scene(&[(0.0, 0.0), (500.0, 0.0)]);
        let options = RenderOptions {
            camera_target: true,
            ..RenderOptions::default()
        };
        let mut list = DrawList::new();
        compose_debug(&options, &links, &physics, Some(ids[1]), &mut list);
        assert_eq!(fills(&list), vec![TARGET_TINT]);
    }

    #[test]
    fn wireframes_and_bounds_per_body() {
        let (physics, links, _) = scene(&[(0.0, 0.0), (500.0, 0.0)]);
        let options = RenderOptions {
            wireframes: true,
            bounds: true,
            ..RenderOptions::default()
        };
        let mut list = DrawList::new();
        compose_debug(&options, &links, &physics, None, &mut list);

        let modes: Vec<_> = list.iter().map(|(_, item)| item.mode).collect();
        let wire = DrawMode::Outline {
            color: WIREFRAME_COLOR,
            width: WIREFRAME_WIDTH,
        };
        let bounds = DrawMode::Outline {
            color: BOUNDS_COLOR,
            width: BOUNDS_WIDTH,
        };
        assert_eq!(modes, vec![wire, wire, bounds, bounds]);
    }

    #[test]
    fn stretched_constraints_turn_red() {
        let (mut physics, links, ids) = scene(&[(0.0, 0.0), (300.0, 0.0)]);
        physics
            .create_constraint(&ConstraintDesc {
                body_a: ids[0],
                body_b: ids[1],
                point_a: Vec2::ZERO,
                point_b: Vec2::ZERO,
                length: Some(200.0),
                stiffness: 1.0,
                damping: 0.0,
            })
            .unwrap();
        let options = RenderOptions {
            constraints: true,
            ..RenderOptions::default()
        };
        let mut list = DrawList::new();
        compose_debug(&options, &links, &physics, None, &mut list);

        let items = list.stage(WORLD_STAGE);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].color(), Some(Rgba::RED));
        assert_eq!(items[0].path.len(), 2);
    }
}
