use glam::Vec2;
use rand::Rng;
use serde::Deserialize;

use crate::api::types::{BodyId, SceneRng};
use crate::core::links::LinkTable;
use crate::core::physics::{Bounds, PhysicsWorld};

/// How the viewport converges on its target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum FollowMode {
    /// Move 1.9x the offset, ringing around the target.
    Overshoot = 0,
    /// Move (offset / 100)^2 per axis, keeping the sign.
    QuadraticEase = 1,
    /// Land on the target exactly.
    Snap = 2,
    /// Move a tenth of the distance along a randomly bent heading.
    Drift = 3,
}

impl FollowMode {
    pub const ALL: [FollowMode; 4] = [
        FollowMode::Overshoot,
        FollowMode::QuadraticEase,
        FollowMode::Snap,
        FollowMode::Drift,
    ];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn random(rng: &mut SceneRng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// Square world-space viewport that chases a linked body.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    /// Edge length of the viewport in world units.
    pub size: f32,
    /// World position of the viewport's top-left corner.
    pub origin: Vec2,
    target: Option<BodyId>,
    mode: FollowMode,
}

impl CameraController {
    pub fn new(size: f32, mode: FollowMode) -> Self {
        Self {
            size,
            origin: Vec2::ZERO,
            target: None,
            mode,
        }
    }

    pub fn mode(&self) -> FollowMode {
        self.mode
    }

    pub fn target(&self) -> Option<BodyId> {
        self.target
    }

    pub fn set_target(&mut self, target: BodyId) {
        self.target = Some(target);
    }

    /// Origin that would center the viewport on `position`.
    pub fn target_origin(&self, position: Vec2) -> Vec2 {
        position - Vec2::splat(self.size / 2.0)
    }

    /// The viewport rectangle in world space.
    pub fn viewport(&self) -> Bounds {
        Bounds::new(self.origin, self.origin + Vec2::splat(self.size))
    }

    pub fn is_visible(&self, point: Vec2) -> bool {
        let view = self.viewport();
        point.x >= view.min.x && point.x <= view.max.x && point.y >= view.min.y && point.y <= view.max.y
    }

    /// Once-per-tick update.
    ///
    /// A target that is no longer linked is replaced by a random live link and
    /// the viewport stays put for this tick.
    pub fn update(&mut self, links: &LinkTable, physics: &PhysicsWorld, rng: &mut SceneRng) {
        let live_position = self
            .target
            .filter(|id| links.contains(*id))
            .and_then(|id| physics.body_pose(id))
            .map(|(position, _)| position);

        match live_position {
            Some(position) => self.follow(position, rng),
            None => self.target = links.pick_random(rng),
        }
    }

    /// Move toward a target body at `position` by this camera's rule.
    pub fn follow(&mut self, position: Vec2, rng: &mut SceneRng) {
        let goal = self.target_origin(position);
        let offset = goal - self.origin;
        match self.mode {
            FollowMode::Overshoot => self.origin += offset * 1.9,
            FollowMode::QuadraticEase => {
                let ease = |d: f32| d.signum() * (d / 100.0).powi(2);
                self.origin += Vec2::new(ease(offset.x), ease(offset.y));
            }
            FollowMode::Snap => self.origin = goal,
            FollowMode::Drift => {
                let heading = offset.y.atan2(offset.x) + rng.random::<f32>();
                let step = offset.length() / 10.0;
                self.origin += Vec2::new(heading.cos(), heading.sin()) * step;
            }
        }
    }
}
