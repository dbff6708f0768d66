//! Block templates and the placed instances built from them.
//!
//! A [`BlockTemplate`] is shared between every instance that references it and
//! is never mutated. [`BlockTemplate::instantiate`] deep-copies the template
//! data and shares the behavior hooks by reference.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::Deserialize;

use crate::api::types::BodyId;
use crate::components::behavior::BlockHooks;
use crate::components::color::Rgba;
use crate::core::physics::Bounds;
use crate::error::SceneError;

/// Outline width in unit space when a layer's outline does not give one.
pub const DEFAULT_OUTLINE_WIDTH: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Outline {
    pub color: Option<Rgba>,
    /// Width in unit space; multiplied by the block scale.
    pub width: Option<f32>,
}

impl Outline {
    pub fn color(&self) -> Rgba {
        self.color.unwrap_or(Rgba::BLACK)
    }

    /// Stroke width in world units for a block of the given scale.
    pub fn world_width(&self, scale: f32) -> f32 {
        self.width.unwrap_or(DEFAULT_OUTLINE_WIDTH) * scale
    }
}

fn unit_rotation() -> f32 {
    1.0
}

/// One filled (and optionally outlined) polygon of a block's artwork.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArtLayer {
    pub color: Rgba,
    /// Closed polygon in unit space. Points may stray outside [0, 1].
    pub steps: Vec<Vec2>,
    /// Multiplier on the body angle: 1 tracks the body, 0 stays level.
    #[serde(default = "unit_rotation")]
    pub rotation_effect: f32,
    #[serde(default)]
    pub outline: Option<Outline>,
}

impl ArtLayer {
    pub fn new(color: Rgba, steps: Vec<Vec2>) -> Self {
        Self {
            color,
            steps,
            rotation_effect: 1.0,
            outline: None,
        }
    }

    pub fn with_rotation_effect(mut self, rotation_effect: f32) -> Self {
        self.rotation_effect = rotation_effect;
        self
    }

    pub fn with_outline(mut self, outline: Outline) -> Self {
        self.outline = Some(outline);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CoverArt {
    pub layers: Vec<ArtLayer>,
}

/// Collision tags of a block plus the links it currently touches.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct CollisionTags {
    /// What this block is.
    pub self_tags: Vec<String>,
    /// What this block reacts to.
    pub collision_tags: Vec<String>,
    /// Links touching this block this tick. Rebuilt every tick.
    #[serde(skip)]
    pub current: Vec<BodyId>,
}

impl CollisionTags {
    pub fn is_tagged(&self) -> bool {
        !self.self_tags.is_empty() || !self.collision_tags.is_empty()
    }

    /// Whether this block reacts to `other`: one of our collision tags is
    /// one of its self tags.
    pub fn reacts_to(&self, other: &CollisionTags) -> bool {
        self.collision_tags
            .iter()
            .any(|tag| other.self_tags.contains(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct PhysicsDef {
    /// Collision polygon in unit space.
    pub shape: Vec<Vec2>,
    /// Initial rotation in degrees.
    pub angle: f32,
    pub collisions: CollisionTags,
}

/// The plain-data part of a template.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct TemplateData {
    pub cover_art: CoverArt,
    /// Blocks without physics are configured but never linked.
    pub physics: Option<PhysicsDef>,
    pub files: BTreeMap<String, String>,
}

impl TemplateData {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Payload a layout entry hands to a block's configure hook.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BlockInputs {
    pub shape: Option<Vec<Vec2>>,
    pub color: Option<Rgba>,
    pub outline: Option<Outline>,
    /// Degrees.
    pub angle: Option<f32>,
}

/// A named template plus its behavior.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    pub name: String,
    pub data: TemplateData,
    pub hooks: BlockHooks,
}

impl BlockTemplate {
    pub fn new(name: impl Into<String>, data: TemplateData) -> Self {
        Self {
            name: name.into(),
            data,
            hooks: BlockHooks::default(),
        }
    }

    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, SceneError> {
        Ok(Self::new(name, TemplateData::from_json(json)?))
    }

    pub fn with_hooks(mut self, hooks: BlockHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// A fresh, independent instance at `position`.
    pub fn instantiate(&self, position: Position) -> BlockInstance {
        BlockInstance {
            name: self.name.clone(),
            data: self.data.clone(),
            hooks: self.hooks.clone(),
            position,
            offset: Bounds::default(),
            link: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, scale: f32) -> Self {
        Self { x, y, scale }
    }

    pub fn at(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// One placed block.
#[derive(Debug, Clone)]
pub struct BlockInstance {
    /// Name of the template it came from.
    pub name: String,
    pub data: TemplateData,
    pub hooks: BlockHooks,
    pub position: Position,
    /// Requested minus actual body bounds, per corner, at construction.
    pub offset: Bounds,
    /// Body this instance is linked to, once built.
    pub link: Option<BodyId>,
}

impl BlockInstance {
    pub fn collisions(&self) -> Option<&CollisionTags> {
        self.data.physics.as_ref().map(|p| &p.collisions)
    }

    pub fn collisions_mut(&mut self) -> Option<&mut CollisionTags> {
        self.data.physics.as_mut().map(|p| &mut p.collisions)
    }

    /// Links touching this block this tick.
    pub fn touching(&self) -> &[BodyId] {
        self.collisions()
            .map(|c| c.current.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_collision_candidate(&self) -> bool {
        self.collisions().is_some_and(CollisionTags::is_tagged)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut ArtLayer> {
        self.data.cover_art.layers.get_mut(index)
    }
}
