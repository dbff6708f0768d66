//! Tag-based collision routing.
//!
//! Only tagged blocks take part. Every contact is recorded on both sides,
//! but a block's collision hook fires only when one of its collision tags
//! names one of the other block's self tags.

use std::collections::HashSet;
use std::rc::Rc;

use log::warn;

use crate::api::types::{BodyId, CollisionPair};
use crate::components::behavior::{Collidable, HookContext};
use crate::core::links::LinkTable;
use crate::core::physics::PhysicsWorld;

/// Rebuild every block's touching list from this tick's contacts and return
/// the hooks to fire, as (source, other) pairs.
///
/// Each unordered pair of links is considered once per tick, however many
/// parts of the two bodies touch.
pub fn route_collisions(links: &mut LinkTable, physics: &PhysicsWorld) -> Vec<CollisionPair> {
    let candidates: Vec<BodyId> = physics
        .body_ids()
        .iter()
        .copied()
        .filter(|id| links.get(*id).is_some_and(|b| b.is_collision_candidate()))
        .collect();

    for (_, block) in links.iter_mut() {
        if let Some(tags) = block.collisions_mut() {
            tags.current.clear();
        }
    }

    let mut seen = HashSet::new();
    let mut pairs = Vec::new();
    for contact in physics.detect_collisions(&candidates) {
        let resolved = links
            .resolve(contact.part_a, physics)
            .and_then(|a| links.resolve(contact.part_b, physics).map(|b| (a, b)));
        let (a, b) = match resolved {
            Ok(pair) => pair,
            Err(err) => {
                warn!("dropping contact: {err}");
                continue;
            }
        };
        if a == b {
            continue;
        }
        let key = if a < b { (a, b) } else { (b, a) };
        if seen.insert(key) {
            pairs.push((a, b));
        }
    }

    for &(a, b) in &pairs {
        record_touch(links, a, b);
        record_touch(links, b, a);
    }

    let mut dispatch = Vec::new();
    for (a, b) in pairs {
        let (Some(tags_a), Some(tags_b)) = (
            links.get(a).and_then(|block| block.collisions()),
            links.get(b).and_then(|block| block.collisions()),
        ) else {
            continue;
        };
        if tags_a.reacts_to(tags_b) {
            dispatch.push(CollisionPair::new(a, b));
        }
        if tags_b.reacts_to(tags_a) {
            dispatch.push(CollisionPair::new(b, a));
        }
    }
    dispatch
}

fn record_touch(links: &mut LinkTable, owner: BodyId, other: BodyId) {
    if let Some(tags) = links.get_mut(owner).and_then(|block| block.collisions_mut()) {
        tags.current.push(other);
    }
}

/// Call the source block's collision hook for each pair, in order.
pub fn fire_collisions(dispatch: &[CollisionPair], ctx: &mut HookContext<'_>) {
    for &pair in dispatch {
        let hook: Option<Rc<dyn Collidable>> = ctx
            .links
            .get(pair.source)
            .and_then(|block| block.hooks.collision.clone());
        if let Some(hook) = hook {
            hook.on_collision(pair, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use glam::Vec2;

    use super::*;
    use crate::components::behavior::BlockHooks;
    use crate::components::block::{BlockTemplate, CollisionTags, PhysicsDef, Position, TemplateData};
    use crate::core::physics::{BodyOptions, PhysicsSettings};
    use crate::core::shape::load_block;
    use crate::input::keybinds::Keybinds;
    use crate::input::state::InputState;
    use crate::renderer::camera::{CameraController, FollowMode};

    fn square() -> Vec<Vec2> {
        vec![Vec2::ZERO, Vec2::Y, Vec2::ONE, Vec2::X]
    }

    fn tags(self_tags: &[&str], collision_tags: &[&str]) -> CollisionTags {
        CollisionTags {
            self_tags: self_tags.iter().map(|t| t.to_string()).collect(),
            collision_tags: collision_tags.iter().map(|t| t.to_string()).collect(),
            current: Vec::new(),
        }
    }

    fn template(shape: Vec<Vec2>, collisions: CollisionTags) -> BlockTemplate {
        BlockTemplate::new(
            "tagged",
            TemplateData {
                physics: Some(PhysicsDef {
                    shape,
                    collisions,
                    ..PhysicsDef::default()
                }),
                ..TemplateData::default()
            },
        )
    }

    struct World {
        physics: PhysicsWorld,
        links: LinkTable,
    }

    impl World {
        fn new() -> Self {
            Self {
                physics: PhysicsWorld::new(PhysicsSettings {
                    gravity: Vec2::ZERO,
                    ..PhysicsSettings::default()
                }),
                links: LinkTable::new(),
            }
        }

        fn add(&mut self, template: &BlockTemplate, x: f32, y: f32) -> BodyId {
            let mut block = template.instantiate(Position::new(x, y, 100.0));
            let loaded = load_block(&mut self.physics, &block, &BodyOptions::default()).unwrap();
            block.offset = loaded.offset;
            self.links.insert(loaded.id, block);
            loaded.id
        }

        fn touching(&self, id: BodyId) -> Vec<BodyId> {
            self.links.get(id).unwrap().touching().to_vec()
        }
    }

    #[test]
    fn dispatch_follows_tag_direction() {
        let mut world = World::new();
        let hunter = world.add(&template(square(), tags(&[], &["solid"])), 0.0, 0.0);
        let wall = world.add(&template(square(), tags(&["solid"], &[])), 60.0, 0.0);

        let dispatch = route_collisions(&mut world.links, &world.physics);
        assert_eq!(dispatch, vec![CollisionPair::new(hunter, wall)]);
        assert_eq!(world.touching(hunter), vec![wall]);
        assert_eq!(world.touching(wall), vec![hunter]);
    }

    #[test]
    fn mutual_tags_fire_both_ways() {
        let mut world = World::new();
        let both = template(square(), tags(&["solid"], &["solid"]));
        let a = world.add(&both, 0.0, 0.0);
        let b = world.add(&both, 60.0, 0.0);

        let mut dispatch = route_collisions(&mut world.links, &world.physics);
        dispatch.sort();
        assert_eq!(dispatch, vec![CollisionPair::new(a, b), CollisionPair::new(b, a)]);
    }

    #[test]
    fn untagged_blocks_are_not_candidates() {
        let mut world = World::new();
        let hunter = world.add(&template(square(), tags(&["solid"], &["solid"])), 0.0, 0.0);
        let plain = world.add(&template(square(), CollisionTags::default()), 50.0, 0.0);

        assert!(route_collisions(&mut world.links, &world.physics).is_empty());
        assert!(world.touching(hunter).is_empty());
        assert!(world.touching(plain).is_empty());
    }

    #[test]
    fn touching_lists_are_rebuilt_each_tick() {
        let mut world = World::new();
        let tagged = template(square(), tags(&["solid"], &[]));
        let a = world.add(&tagged, 0.0, 0.0);
        let b = world.add(&tagged, 60.0, 0.0);

        route_collisions(&mut world.links, &world.physics);
        assert_eq!(world.touching(a), vec![b]);

        world.physics.set_position(b, Vec2::new(1000.0, 0.0));
        route_collisions(&mut world.links, &world.physics);
        assert!(world.touching(a).is_empty());
        assert!(world.touching(b).is_empty());
    }

    #[test]
    fn concave_parts_resolve_to_their_body_once() {
        let ell = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 0.8),
            Vec2::new(0.2, 0.8),
            Vec2::new(0.2, 0.0),
        ];
        let mut world = World::new();
        let hunter = world.add(&template(ell, tags(&[], &["solid"])), 0.0, 0.0);
        assert!(world.physics.parts_of(hunter).len() >= 2);
        // slab under the foot of the L, touching both parts
        let slab = world.add(&template(square(), tags(&["solid"], &[])), 0.0, 90.0);

        let dispatch = route_collisions(&mut world.links, &world.physics);
        assert_eq!(dispatch, vec![CollisionPair::new(hunter, slab)]);
        assert_eq!(world.touching(slab), vec![hunter]);
    }

    struct Recorder(Rc<RefCell<Vec<CollisionPair>>>);

    impl Collidable for Recorder {
        fn on_collision(&self, pair: CollisionPair, ctx: &mut HookContext<'_>) {
            self.0.borrow_mut().push(pair);
            ctx.physics.apply_force(pair.other, Vec2::new(0.0, -1.0));
        }
    }

    #[test]
    fn only_the_source_hook_fires() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let hooks = BlockHooks::new().with_collision(Recorder(log.clone()));
        let mut world = World::new();
        let hunter = world.add(
            &template(square(), tags(&[], &["solid"])).with_hooks(hooks.clone()),
            0.0,
            0.0,
        );
        let wall = world.add(&template(square(), tags(&["solid"], &[])).with_hooks(hooks), 60.0, 0.0);

        let dispatch = route_collisions(&mut world.links, &world.physics);
        let mut camera = CameraController::new(1500.0, FollowMode::Snap);
        let input = InputState::new();
        let keybinds = Keybinds::default();
        let mut ctx = HookContext {
            links: &mut world.links,
            physics: &mut world.physics,
            camera: &mut camera,
            input: &input,
            keybinds: &keybinds,
        };
        fire_collisions(&dispatch, &mut ctx);

        assert_eq!(*log.borrow(), vec![CollisionPair::new(hunter, wall)]);
    }
}
