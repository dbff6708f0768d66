//! Optional per-block capabilities.
//!
//! A block kind implements any subset of [`Configurable`], [`Renderable`] and
//! [`Collidable`]. Hooks are stateless with respect to the instance: anything
//! they need to remember lives on the instance they are handed.

use std::fmt;
use std::rc::Rc;

use crate::api::types::{BodyId, CollisionPair};
use crate::components::block::{BlockInputs, BlockInstance};
use crate::core::links::LinkTable;
use crate::core::physics::PhysicsWorld;
use crate::input::keybinds::Keybinds;
use crate::input::state::InputState;
use crate::renderer::camera::CameraController;

/// Rewrites a freshly copied instance from its layout entry's payload,
/// before its body is built.
pub trait Configurable {
    fn configure(&self, inputs: Option<&BlockInputs>, block: &mut BlockInstance);
}

/// Runs once per frame for each linked block, before artwork is composed.
pub trait Renderable {
    fn on_render(&self, link: BodyId, ctx: &mut HookContext<'_>);
}

/// Runs when this block's collision tags match the block it touched.
pub trait Collidable {
    fn on_collision(&self, pair: CollisionPair, ctx: &mut HookContext<'_>);
}

/// Everything a render or collision hook may read or change.
pub struct HookContext<'a> {
    pub links: &'a mut LinkTable,
    pub physics: &'a mut PhysicsWorld,
    pub camera: &'a mut CameraController,
    pub input: &'a InputState,
    pub keybinds: &'a Keybinds,
}

/// The hooks of one block kind. Cloning shares them.
#[derive(Clone, Default)]
pub struct BlockHooks {
    pub inputs: Option<Rc<dyn Configurable>>,
    pub render: Option<Rc<dyn Renderable>>,
    pub collision: Option<Rc<dyn Collidable>>,
}

impl BlockHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inputs(mut self, hook: impl Configurable + 'static) -> Self {
        self.inputs = Some(Rc::new(hook));
        self
    }

    pub fn with_render(mut self, hook: impl Renderable + 'static) -> Self {
        self.render = Some(Rc::new(hook));
        self
    }

    pub fn with_collision(mut self, hook: impl Collidable + 'static) -> Self {
        self.collision = Some(Rc::new(hook));
        self
    }

    /// Share one value as both render and collision hook.
    pub fn with_render_and_collision<H>(mut self, hook: H) -> Self
    where
        H: Renderable + Collidable + 'static,
    {
        let shared = Rc::new(hook);
        self.render = Some(shared.clone());
        self.collision = Some(shared);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_none() && self.render.is_none() && self.collision.is_none()
    }
}

impl fmt::Debug for BlockHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHooks")
            .field("inputs", &self.inputs.is_some())
            .field("render", &self.render.is_some())
            .field("collision", &self.collision.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::components::block::{BlockTemplate, Position, TemplateData};

    struct CountingHook(Rc<Cell<u32>>);

    impl Renderable for CountingHook {
        fn on_render(&self, _link: BodyId, _ctx: &mut HookContext<'_>) {
            self.0.set(self.0.get() + 1);
        }
    }

    impl Collidable for CountingHook {
        fn on_collision(&self, _pair: CollisionPair, _ctx: &mut HookContext<'_>) {
            self.0.set(self.0.get() + 10);
        }
    }

    struct Tint;

    impl Configurable for Tint {
        fn configure(&self, inputs: Option<&BlockInputs>, block: &mut BlockInstance) {
            if let (Some(color), Some(layer)) = (inputs.and_then(|i| i.color), block.layer_mut(0)) {
                layer.color = color;
            }
        }
    }

    #[test]
    fn empty_hooks() {
        assert!(BlockHooks::new().is_empty());
        assert!(!BlockHooks::new().with_inputs(Tint).is_empty());
    }

    #[test]
    fn instances_share_hooks() {
        let count = Rc::new(Cell::new(0));
        let template = BlockTemplate::new("counted", TemplateData::default())
            .with_hooks(BlockHooks::new().with_render_and_collision(CountingHook(count.clone())));
        let a = template.instantiate(Position::new(0.0, 0.0, 1.0));
        let b = template.instantiate(Position::new(0.0, 0.0, 1.0));

        let (Some(ra), Some(rb)) = (&a.hooks.render, &b.hooks.render) else {
            panic!("render hooks missing");
        };
        assert!(Rc::ptr_eq(ra, rb));
        assert!(a.hooks.collision.is_some());
        assert!(format!("{:?}", a.hooks).contains("render: true"));
    }
}
