//! Per-frame artwork composition.
//!
//! Render hooks run first, so a hook that recolors its own layers or claims
//! the camera is seen by the rest of the frame. Artwork is then regenerated
//! in world space from each body's live pose.

use std::rc::Rc;

use glam::Vec2;
use serde::Deserialize;

use crate::api::types::BodyId;
use crate::components::behavior::{HookContext, Renderable};
use crate::components::block::{ArtLayer, BlockInstance};
use crate::core::links::LinkTable;
use crate::core::physics::PhysicsWorld;
use crate::renderer::draw_list::{closed_path, DrawItem, DrawList, WORLD_STAGE};

/// Independent render passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub cover_art: bool,
    pub wireframes: bool,
    pub bounds: bool,
    pub collisions: bool,
    pub constraints: bool,
    pub camera_target: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cover_art: true,
            wireframes: false,
            bounds: false,
            collisions: false,
            constraints: false,
            camera_target: false,
        }
    }
}

impl RenderOptions {
    /// Physics view: wireframes, contacts, constraints and the camera
    /// target, without artwork.
    pub fn debug() -> Self {
        Self {
            cover_art: false,
            wireframes: true,
            bounds: false,
            collisions: true,
            constraints: true,
            camera_target: true,
        }
    }
}

/// Run every linked block's render hook, in link order.
pub fn run_render_hooks(ctx: &mut HookContext<'_>) {
    let hooked: Vec<(BodyId, Rc<dyn Renderable>)> = ctx
        .links
        .iter()
        .filter_map(|(id, block)| block.hooks.render.clone().map(|hook| (id, hook)))
        .collect();

    for (id, hook) in hooked {
        if ctx.links.contains(id) {
            hook.on_render(id, ctx);
        }
    }
}

/// World point that unit-space (0.5, 0.5) maps to, before rotation.
pub fn art_origin(block: &BlockInstance, body_position: Vec2) -> Vec2 {
    body_position - block.offset.min + Vec2::splat(0.5 * block.position.scale)
}

/// A layer's polygon in world space.
///
/// Unit points are scaled about the art origin, then rotated about the body
/// position by the body angle times the layer's rotation effect.
pub fn layer_points(
    layer: &ArtLayer,
    scale: f32,
    origin: Vec2,
    body_position: Vec2,
    body_angle: f32,
) -> Vec<Vec2> {
    let rotation = Vec2::from_angle(body_angle * layer.rotation_effect);
    layer
        .steps
        .iter()
        .map(|step| {
            let world = (*step - Vec2::splat(0.5)) * scale + origin;
            body_position + rotation.rotate(world - body_position)
        })
        .collect()
}

/// Append the artwork of every linked body to the world stage, in body
/// creation order.
pub fn compose_cover_art(links: &LinkTable, physics: &PhysicsWorld, draw_list: &mut DrawList) {
    for &id in physics.body_ids() {
        let Some(block) = links.get(id) else {
            continue;
        };
        let Some((position, angle)) = physics.body_pose(id) else {
            continue;
        };
        let origin = art_origin(block, position);
        let scale = block.position.scale;

        for layer in &block.data.cover_art.layers {
            if layer.steps.is_empty() {
                continue;
            }
            let path = closed_path(layer_points(layer, scale, origin, position, angle));
            match &layer.outline {
                Some(outline) => {
                    draw_list.push(WORLD_STAGE, DrawItem::fill(layer.color, path.clone()));
                    draw_list.push(
                        WORLD_STAGE,
                        DrawItem::outline(outline.color(), outline.world_width(scale), path),
                    );
                }
                None => draw_list.push(WORLD_STAGE, DrawItem::fill(layer.color, path)),
            }
        }
    }
}
