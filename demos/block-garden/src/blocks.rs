//! The block catalogue: five templates and the hooks that animate them.
//!
//! Forces and spins are tuned for pixel-scale worlds stepped at 60 Hz. A
//! force of `F` here moves a 100 x 100 block (mass 10) by `F / 10` px/s².

use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec2;
use tumble_engine::{
    Action, ArtLayer, BlockHooks, BlockInputs, BlockInstance, BlockTemplate, BodyId, Collidable,
    CollisionPair, CollisionTags, Configurable, CoverArt, HookContext, Outline, PhysicsDef,
    Renderable, Rgba, TemplateData,
};

/// Upward push given to anything that hunts into a clover.
pub const CLOVER_THROW: Vec2 = Vec2::new(0.0, -50_000.0);
/// Spin, in rad/s, given along with the throw.
pub const CLOVER_SPIN: f32 = 15.0;

/// Change in spin per frame while a direction key is held.
pub const STEER_SPIN_STEP: f32 = 0.6;
/// Spin limit while steering.
pub const STEER_SPIN_MAX: f32 = 15.0;
/// Sideways push while a direction key is held.
pub const STEER_PUSH: f32 = 10_000.0;
pub const JUMP_POWER: f32 = 700_000.0;

fn pts(points: &[[f32; 2]]) -> Vec<Vec2> {
    points.iter().map(|&[x, y]| Vec2::new(x, y)).collect()
}

fn tags(self_tags: &[&str], collision_tags: &[&str]) -> CollisionTags {
    CollisionTags {
        self_tags: self_tags.iter().map(|t| t.to_string()).collect(),
        collision_tags: collision_tags.iter().map(|t| t.to_string()).collect(),
        current: Vec::new(),
    }
}

const UNIT_SQUARE: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]];

const CLOVER: [[f32; 2]; 21] = [
    [0.0, 0.166], [0.166, 0.0], [0.333, 0.0], [0.5, 0.333], [0.666, 0.0], [0.666, 0.0],
    [0.833, 0.0], [1.0, 0.166], [1.0, 0.333], [0.666, 0.5], [1.0, 0.666], [1.0, 0.833],
    [0.833, 1.0], [0.666, 1.0], [0.5, 0.666], [0.333, 1.0], [0.166, 1.0], [0.0, 0.833],
    [0.0, 0.666], [0.333, 0.5], [0.0, 0.333],
];

const CLOVER_INNER: [[f32; 2]; 16] = [
    [0.166, 0.166], [0.333, 0.166], [0.5, 0.333], [0.666, 0.166], [0.833, 0.166],
    [0.833, 0.333], [0.666, 0.5], [0.833, 0.666], [0.833, 0.833], [0.666, 0.833],
    [0.5, 0.666], [0.333, 0.833], [0.166, 0.833], [0.166, 0.666], [0.333, 0.5],
    [0.166, 0.333],
];

const CLOVER_HEART: [[f32; 2]; 4] = [[0.5, 0.333], [0.333, 0.5], [0.5, 0.666], [0.666, 0.5]];

const BALL: [[f32; 2]; 16] = [
    [0.4, 0.0], [0.6, 0.0], [0.8, 0.1], [0.9, 0.2], [1.0, 0.4], [1.0, 0.6], [0.9, 0.8],
    [0.8, 0.9], [0.6, 1.0], [0.4, 1.0], [0.2, 0.9], [0.1, 0.8], [0.0, 0.6], [0.0, 0.4],
    [0.1, 0.2], [0.2, 0.1],
];

const BALL_FACE: [[f32; 2]; 21] = [
    [0.3, 0.4], [0.2, 0.3], [0.3, 0.1], [0.4, 0.3], [0.6, 0.3], [0.7, 0.1], [0.8, 0.3],
    [0.7, 0.4], [0.3, 0.4], [0.3, 0.5], [0.2, 0.6], [0.2, 0.7], [0.3, 0.8], [0.4, 0.8],
    [0.5, 0.9], [0.6, 0.8], [0.7, 0.8], [0.8, 0.7], [0.8, 0.6], [0.7, 0.5], [0.3, 0.5],
];

// spiky halo drawn around the ball, well outside the unit square
const BALL_HALO: [[f32; 2]; 58] = [
    [0.0, -0.25], [-0.25, -0.5], [0.0, -0.5], [0.0, -0.25], [0.5, -0.25], [0.25, -0.5],
    [0.5, -0.75], [0.75, -0.5], [0.5, -0.25], [1.0, -0.25], [1.0, -0.5], [1.25, -0.5],
    [1.0, -0.25], [1.25, 0.0], [1.5, -0.25], [1.5, 0.0], [1.25, 0.0], [1.25, 0.5],
    [1.5, 0.25], [1.75, 0.5], [1.5, 0.75], [1.25, 0.5], [1.25, 1.0], [1.5, 1.25],
    [1.5, 1.0], [1.25, 1.0], [1.0, 1.25], [1.25, 1.5], [1.0, 1.5], [1.0, 1.25],
    [0.5, 1.25], [0.75, 1.5], [0.5, 1.75], [0.25, 1.5], [0.5, 1.25], [0.0, 1.25],
    [-0.25, 1.5], [0.0, 1.5], [0.0, 1.25], [-0.25, 1.0], [-0.5, 1.25], [-0.5, 1.0],
    [-0.25, 1.0], [-0.25, 0.5], [-0.5, 0.75], [-0.75, 0.5], [-0.5, 0.25], [-0.25, 0.5],
    [-0.25, 0.0], [-0.5, -0.25], [-0.5, 0.0], [-0.25, 0.0], [-0.25, 1.0], [0.0, 1.25],
    [1.0, 1.25], [1.25, 1.0], [1.25, 0.0], [1.0, -0.25],
];

const NOTCHED: [[f32; 2]; 8] = [
    [0.0, 0.0], [0.0, 0.0], [0.333, 0.0], [0.5, 0.5], [0.666, 0.0], [1.0, 0.0], [1.0, 1.0],
    [0.0, 1.0],
];

const OCTAGON: [[f32; 2]; 8] = [
    [0.0, 0.25], [0.25, 0.0], [0.75, 0.0], [1.0, 0.25], [1.0, 0.75], [0.75, 1.0], [0.25, 1.0],
    [0.0, 0.75],
];

/// Olive resting color of the clover's outer layer.
pub fn clover_idle() -> Rgba {
    Rgba::rgb8(100, 100, 0)
}

/// Translucent red the clover turns while touching anything.
pub fn clover_alert() -> Rgba {
    Rgba::rgba8(255, 0, 0, 0.5)
}

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// `basic` blocks take their shape, color, outline and angle from the layout.
pub struct Reshape;

impl Configurable for Reshape {
    fn configure(&self, inputs: Option<&BlockInputs>, block: &mut BlockInstance) {
        let Some(inputs) = inputs else {
            return;
        };
        if let Some(shape) = &inputs.shape {
            if let Some(layer) = block.layer_mut(0) {
                layer.steps = shape.clone();
            }
            if let Some(physics) = block.data.physics.as_mut() {
                physics.shape = shape.clone();
            }
        }
        if let Some(layer) = block.layer_mut(0) {
            if let Some(color) = inputs.color {
                layer.color = color;
            }
            if let Some(outline) = &inputs.outline {
                layer.outline = Some(outline.clone());
            }
        }
        if let (Some(angle), Some(physics)) = (inputs.angle, block.data.physics.as_mut()) {
            physics.angle = angle;
        }
    }
}

/// The clover blushes while touched and flings whatever it hunts.
pub struct Clover;

impl Renderable for Clover {
    fn on_render(&self, link: BodyId, ctx: &mut HookContext<'_>) {
        let Some(block) = ctx.links.get_mut(link) else {
            return;
        };
        let color = if block.touching().is_empty() {
            clover_idle()
        } else {
            clover_alert()
        };
        if let Some(layer) = block.layer_mut(0) {
            layer.color = color;
        }
    }
}

impl Collidable for Clover {
    fn on_collision(&self, pair: CollisionPair, ctx: &mut HookContext<'_>) {
        if ctx.physics.is_static(pair.other) {
            return;
        }
        ctx.physics.apply_force(pair.other, CLOVER_THROW);
        ctx.physics.set_angular_velocity(pair.other, CLOVER_SPIN);
    }
}

/// The player block: holds the camera and answers the keyboard.
pub struct Controlled;

impl Controlled {
    /// Unit direction away from everything the block touches, averaged over
    /// every contact. `None` when there is nothing to push off.
    pub fn jump_direction(link: BodyId, ctx: &HookContext<'_>) -> Option<Vec2> {
        let touching = ctx.links.get(link)?.touching();
        if touching.is_empty() {
            return None;
        }
        let mut ids = Vec::with_capacity(touching.len() + 1);
        ids.push(link);
        ids.extend_from_slice(touching);

        let mut sum = Vec2::ZERO;
        for contact in ctx.physics.detect_collisions(&ids) {
            let a = ctx.links.resolve(contact.part_a, &*ctx.physics).ok();
            let b = ctx.links.resolve(contact.part_b, &*ctx.physics).ok();
            // normals run from a to b; flip so they point back at us
            if a == Some(link) && b != Some(link) {
                sum -= contact.penetration();
            } else if b == Some(link) && a != Some(link) {
                sum += contact.penetration();
            }
        }
        sum.try_normalize()
    }
}

impl Renderable for Controlled {
    fn on_render(&self, link: BodyId, ctx: &mut HookContext<'_>) {
        ctx.camera.set_target(link);

        if ctx.keybinds.is_active(Action::Jump, ctx.input) {
            if let Some(direction) = Self::jump_direction(link, ctx) {
                ctx.physics.apply_force(link, direction * JUMP_POWER);
            }
        }
        if ctx.keybinds.is_active(Action::Left, ctx.input) {
            let spin = ctx.physics.angular_velocity(link);
            ctx.physics
                .set_angular_velocity(link, (spin - STEER_SPIN_STEP).max(-STEER_SPIN_MAX));
            ctx.physics.apply_force(link, Vec2::new(-STEER_PUSH, 0.0));
        }
        if ctx.keybinds.is_active(Action::Right, ctx.input) {
            let spin = ctx.physics.angular_velocity(link);
            ctx.physics
                .set_angular_velocity(link, (spin + STEER_SPIN_STEP).min(STEER_SPIN_MAX));
            ctx.physics.apply_force(link, Vec2::new(STEER_PUSH, 0.0));
        }
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

pub fn basic() -> BlockTemplate {
    let layer = ArtLayer::new(Rgba::rgba8(100, 100, 100, 0.5), pts(&UNIT_SQUARE)).with_outline(
        Outline {
            color: Some(Rgba::rgb8(50, 50, 50)),
            width: Some(0.1),
        },
    );
    let mut files = BTreeMap::new();
    files.insert("file".to_string(), "Im a file".to_string());
    BlockTemplate::new(
        "basic",
        TemplateData {
            cover_art: CoverArt { layers: vec![layer] },
            physics: Some(PhysicsDef {
                shape: pts(&UNIT_SQUARE),
                collisions: tags(&["basic", "solid"], &[]),
                ..PhysicsDef::default()
            }),
            files,
        },
    )
    .with_hooks(BlockHooks::new().with_inputs(Reshape))
}

pub fn clover() -> BlockTemplate {
    BlockTemplate::new(
        "clover",
        TemplateData {
            cover_art: CoverArt {
                layers: vec![
                    ArtLayer::new(clover_idle(), pts(&CLOVER)),
                    ArtLayer::new(Rgba::rgba8(0, 100, 100, 0.5), pts(&CLOVER_INNER)),
                    ArtLayer::new(Rgba::rgb8(0, 150, 0), pts(&CLOVER_HEART)),
                ],
            },
            physics: Some(PhysicsDef {
                shape: pts(&CLOVER),
                collisions: tags(&["clover", "solid"], &["solid"]),
                ..PhysicsDef::default()
            }),
            ..TemplateData::default()
        },
    )
    .with_hooks(BlockHooks::new().with_render_and_collision(Clover))
}

pub fn ball() -> BlockTemplate {
    let halo = pts(&BALL_HALO);
    BlockTemplate::new(
        "ball",
        TemplateData {
            cover_art: CoverArt {
                layers: vec![
                    ArtLayer::new(Rgba::rgb8(200, 200, 200), pts(&BALL)),
                    ArtLayer::new(Rgba::rgb8(0, 0, 0), pts(&BALL_FACE)).with_rotation_effect(0.0),
                    ArtLayer::new(Rgba::rgba8(255, 0, 0, 0.2), halo.clone()).with_rotation_effect(8.0),
                    ArtLayer::new(Rgba::rgba8(0, 255, 0, 0.2), halo.clone()).with_rotation_effect(4.0),
                    ArtLayer::new(Rgba::rgba8(0, 0, 255, 0.2), halo).with_rotation_effect(2.0),
                ],
            },
            physics: Some(PhysicsDef {
                shape: pts(&BALL),
                collisions: tags(&["ball", "solid"], &[]),
                ..PhysicsDef::default()
            }),
            ..TemplateData::default()
        },
    )
}

/// A square with a V-shaped notch cut into its top edge. The repeated first
/// point is deliberate: loading has to clean it up.
pub fn test() -> BlockTemplate {
    BlockTemplate::new(
        "test",
        TemplateData {
            cover_art: CoverArt {
                layers: vec![ArtLayer::new(Rgba::rgb8(0, 100, 100), pts(&NOTCHED))],
            },
            physics: Some(PhysicsDef {
                shape: pts(&NOTCHED),
                collisions: tags(&["test", "solid"], &[]),
                ..PhysicsDef::default()
            }),
            ..TemplateData::default()
        },
    )
}

pub fn controlled() -> BlockTemplate {
    BlockTemplate::new(
        "controlled",
        TemplateData {
            cover_art: CoverArt {
                layers: vec![ArtLayer::new(Rgba::rgba8(100, 100, 0, 0.5), pts(&OCTAGON))],
            },
            physics: Some(PhysicsDef {
                shape: pts(&OCTAGON),
                collisions: tags(&["controlled", "solid"], &["solid"]),
                ..PhysicsDef::default()
            }),
            ..TemplateData::default()
        },
    )
    .with_hooks(BlockHooks::new().with_render(Controlled))
}

/// One shared copy of every template, handed out to the levels.
#[derive(Debug, Clone)]
pub struct Catalogue {
    pub basic: Rc<BlockTemplate>,
    pub clover: Rc<BlockTemplate>,
    pub ball: Rc<BlockTemplate>,
    pub test: Rc<BlockTemplate>,
    pub controlled: Rc<BlockTemplate>,
}

impl Catalogue {
    pub fn new() -> Self {
        Self {
            basic: Rc::new(basic()),
            clover: Rc::new(clover()),
            ball: Rc::new(ball()),
            test: Rc::new(test()),
            controlled: Rc::new(controlled()),
        }
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use tumble_engine::{
        load_block, BodyOptions, CameraController, FollowMode, InputEvent, InputState, Keybinds,
        LinkTable, PhysicsSettings, PhysicsWorld, Position,
    };

    use super::*;

    struct World {
        physics: PhysicsWorld,
        links: LinkTable,
        camera: CameraController,
        input: InputState,
        keybinds: Keybinds,
    }

    impl World {
        fn new() -> Self {
            Self {
                physics: PhysicsWorld::new(PhysicsSettings {
                    gravity: Vec2::ZERO,
                    ..PhysicsSettings::default()
                }),
                links: LinkTable::new(),
                camera: CameraController::new(1500.0, FollowMode::Snap),
                input: InputState::new(),
                keybinds: Keybinds::default(),
            }
        }

        fn add(&mut self, template: &BlockTemplate, x: f32, y: f32, options: BodyOptions) -> BodyId {
            let mut block = template.instantiate(Position::new(x, y, 100.0));
            let loaded = load_block(&mut self.physics, &block, &options).unwrap();
            block.offset = loaded.offset;
            self.links.insert(loaded.id, block);
            loaded.id
        }

        fn press(&mut self, key: &str) {
            self.input.apply(&InputEvent::KeyDown { key: key.into() }, 0.0);
            self.input.begin_frame(16.0);
        }

        fn ctx(&mut self) -> HookContext<'_> {
            HookContext {
                links: &mut self.links,
                physics: &mut self.physics,
                camera: &mut self.camera,
                input: &self.input,
                keybinds: &self.keybinds,
            }
        }
    }

    #[test]
    fn reshape_rewrites_art_and_body_together() {
        let template = basic();
        let mut block = template.instantiate(Position::new(0.0, 0.0, 100.0));
        let wide = pts(&[[0.0, 0.0], [0.0, 1.0], [8.0, 1.0], [8.0, 0.0]]);
        let inputs = BlockInputs {
            shape: Some(wide.clone()),
            color: Some(Rgba::rgba8(0, 255, 255, 0.5)),
            angle: Some(30.0),
            ..BlockInputs::default()
        };
        Reshape.configure(Some(&inputs), &mut block);

        assert_eq!(block.data.cover_art.layers[0].steps, wide);
        let physics = block.data.physics.as_ref().unwrap();
        assert_eq!(physics.shape, wide);
        assert_eq!(physics.angle, 30.0);
        assert_eq!(block.data.cover_art.layers[0].color, Rgba::rgba8(0, 255, 255, 0.5));
        // the outline was not mentioned, so the template's stays
        assert!(block.data.cover_art.layers[0].outline.is_some());
        // the template itself is untouched
        assert_eq!(template.data.cover_art.layers[0].steps, pts(&UNIT_SQUARE));
    }

    #[test]
    fn reshape_without_inputs_keeps_defaults() {
        let mut block = basic().instantiate(Position::new(0.0, 0.0, 100.0));
        Reshape.configure(None, &mut block);
        Reshape.configure(Some(&BlockInputs::default()), &mut block);
        assert_eq!(block.data.physics.as_ref().unwrap().shape, pts(&UNIT_SQUARE));
    }

    #[test]
    fn clover_color_follows_contacts() {
        let mut world = World::new();
        let catalogue = Catalogue::new();
        let clover = world.add(&catalogue.clover, 0.0, 0.0, BodyOptions::default());
        let color = |world: &World| world.links.get(clover).unwrap().data.cover_art.layers[0].color;

        world.links.get_mut(clover).unwrap().collisions_mut().unwrap().current.push(BodyId(99));
        Clover.on_render(clover, &mut world.ctx());
        assert_eq!(color(&world), clover_alert());

        world.links.get_mut(clover).unwrap().collisions_mut().unwrap().current.clear();
        Clover.on_render(clover, &mut world.ctx());
        assert_eq!(color(&world), clover_idle());
    }

    #[test]
    fn clover_flings_only_dynamic_bodies() {
        let mut world = World::new();
        let catalogue = Catalogue::new();
        let clover = world.add(&catalogue.clover, 0.0, 0.0, BodyOptions::default());
        let loose = world.add(&catalogue.ball, 500.0, 0.0, BodyOptions::default());
        let pinned = world.add(&catalogue.ball, 1000.0, 0.0, BodyOptions::fixed());

        Clover.on_collision(CollisionPair::new(clover, loose), &mut world.ctx());
        Clover.on_collision(CollisionPair::new(clover, pinned), &mut world.ctx());
        world.physics.step(1.0 / 60.0);

        assert!(world.physics.velocity(loose).y < 0.0);
        assert!(world.physics.angular_velocity(loose) > 0.0);
        assert_eq!(world.physics.angular_velocity(pinned), 0.0);
    }

    #[test]
    fn controlled_claims_the_camera() {
        let mut world = World::new();
        let player = world.add(&controlled(), 0.0, 0.0, BodyOptions::default());
        Controlled.on_render(player, &mut world.ctx());
        assert_eq!(world.camera.target(), Some(player));
    }

    #[test]
    fn steering_spin_is_clamped() {
        let mut world = World::new();
        let player = world.add(&controlled(), 0.0, 0.0, BodyOptions::default());
        world.press("arrowright");
        for _ in 0..100 {
            Controlled.on_render(player, &mut world.ctx());
        }
        assert!((world.physics.angular_velocity(player) - STEER_SPIN_MAX).abs() < 1e-3);
    }

    #[test]
    fn jump_pushes_away_from_the_floor() {
        let mut world = World::new();
        // floor overlaps the bottom of the player
        let floor = world.add(&basic(), 0.0, 90.0, BodyOptions::fixed());
        let player = world.add(&controlled(), 0.0, 0.0, BodyOptions::default());
        world.links.get_mut(player).unwrap().collisions_mut().unwrap().current.push(floor);

        let direction = Controlled::jump_direction(player, &world.ctx()).unwrap();
        assert!(direction.y < -0.9, "{direction:?}");
    }

    #[test]
    fn no_contacts_means_no_jump() {
        let mut world = World::new();
        let player = world.add(&controlled(), 0.0, 0.0, BodyOptions::default());
        world.press("c");
        Controlled.on_render(player, &mut world.ctx());
        assert!(Controlled::jump_direction(player, &world.ctx()).is_none());
        world.physics.step(1.0 / 60.0);
        assert_eq!(world.physics.velocity(player), Vec2::ZERO);
    }
}
