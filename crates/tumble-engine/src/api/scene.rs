//! The frame driver.
//!
//! A [`Scene`] owns everything one running level needs and advances it one
//! display frame at a time: physics, render hooks, artwork, collision
//! dispatch, camera, presentation. Always in that order.

use std::rc::Rc;

use glam::Vec2;
use log::{error, info};
use rand::SeedableRng;
use serde::Deserialize;

use crate::api::types::SceneRng;
use crate::components::behavior::HookContext;
use crate::core::level::{instantiate, Level, LoadedLevel};
use crate::core::links::LinkTable;
use crate::core::physics::{PhysicsSettings, PhysicsWorld};
use crate::core::time::{FixedTimestep, FrameClock};
use crate::error::SceneError;
use crate::input::keybinds::Keybinds;
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::state::InputState;
use crate::renderer::camera::{CameraController, FollowMode};
use crate::renderer::draw_list::DrawList;
use crate::renderer::present::{present, Chaos};
use crate::renderer::surface::Surface;
use crate::renderer::transform::SurfaceGeometry;
use crate::systems::collision::{fire_collisions, route_collisions};
use crate::systems::compose::{compose_cover_art, run_render_hooks, RenderOptions};
use crate::systems::debug::compose_debug;

/// Scene configuration, supplied by the director.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Edge length of the square viewport in world units (default: 1500).
    pub viewport_size: f32,
    /// World units per second squared; positive Y is down.
    pub gravity: Vec2,
    /// Fixed physics step in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Longest frame delta fed to the simulation (default: 100 ms).
    pub max_frame_delta_ms: f64,
    /// World units per solver metre (default: 100).
    pub length_unit: f32,
    /// Stretch the viewport over the whole surface instead of letterboxing.
    pub fill_surface: bool,
    /// Camera convergence rule. Random when absent.
    pub follow_mode: Option<FollowMode>,
    /// Force chaos mode on or off. Rolled once when absent.
    pub chaos: Option<bool>,
    pub seed: u64,
    pub render: RenderOptions,
    pub keybinds: Keybinds,
    pub surface_width: f32,
    pub surface_height: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            viewport_size: 1500.0,
            gravity: Vec2::new(0.0, 1000.0),
            fixed_dt: 1.0 / 60.0,
            max_frame_delta_ms: 100.0,
            length_unit: 100.0,
            fill_surface: true,
            follow_mode: None,
            chaos: None,
            seed: 0,
            render: RenderOptions::default(),
            keybinds: Keybinds::default(),
            surface_width: 1500.0,
            surface_height: 1500.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn physics_settings(&self) -> PhysicsSettings {
        PhysicsSettings {
            gravity: self.gravity,
            dt: self.fixed_dt,
            length_unit: self.length_unit,
        }
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.viewport_size.is_finite() && self.viewport_size > 0.0) {
            return Err(SceneError::Config(format!(
                "viewport_size must be positive, got {}",
                self.viewport_size
            )));
        }
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(SceneError::Config(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }
        if !self.gravity.is_finite() || !(self.length_unit.is_finite() && self.length_unit > 0.0) {
            return Err(SceneError::Config("gravity and length_unit must be finite and positive".into()));
        }
        Ok(())
    }
}

/// State shared by every system during a frame. Replaced wholesale on a
/// level transition, apart from the camera.
pub struct SceneState {
    pub physics: PhysicsWorld,
    pub links: LinkTable,
    pub camera: CameraController,
    pub draw_list: DrawList,
    pub level: Option<LoadedLevel>,
}

/// What one call to [`Scene::advance`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Index of the frame just drawn, starting at 0.
    pub frame: u64,
    pub steps: u32,
    pub collisions: usize,
    pub items: usize,
    pub clips_applied: usize,
}

pub struct Scene {
    config: SceneConfig,
    state: SceneState,
    input: InputState,
    queue: InputQueue,
    clock: FrameClock,
    timestep: FixedTimestep,
    geometry: SurfaceGeometry,
    chaos: Chaos,
    rng: SceneRng,
    pending: Option<Rc<Level>>,
    frame: u64,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;
        let mut rng = SceneRng::seed_from_u64(config.seed);
        let mode = config.follow_mode.unwrap_or_else(|| FollowMode::random(&mut rng));
        let chaos = config.chaos.map(Chaos::new).unwrap_or_else(|| Chaos::roll(&mut rng));
        info!(
            "scene ready: viewport {}, follow mode {:?}, chaos {}",
            config.viewport_size,
            mode,
            chaos.is_enabled()
        );

        Ok(Self {
            state: SceneState {
                physics: PhysicsWorld::new(config.physics_settings()),
                links: LinkTable::new(),
                camera: CameraController::new(config.viewport_size, mode),
                draw_list: DrawList::new(),
                level: None,
            },
            input: InputState::new(),
            queue: InputQueue::new(),
            clock: FrameClock::new(config.max_frame_delta_ms),
            timestep: FixedTimestep::new(config.fixed_dt),
            geometry: SurfaceGeometry::new(config.surface_width, config.surface_height, config.fill_surface),
            chaos,
            rng,
            pending: None,
            frame: 0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn links(&self) -> &LinkTable {
        &self.state.links
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.state.physics
    }

    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.state.physics
    }

    pub fn camera(&self) -> &CameraController {
        &self.state.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.state.camera
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.state.draw_list
    }

    pub fn level(&self) -> Option<&LoadedLevel> {
        self.state.level.as_ref()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn geometry(&self) -> &SurfaceGeometry {
        &self.geometry
    }

    pub fn chaos(&self) -> Chaos {
        self.chaos
    }

    pub fn rng_mut(&mut self) -> &mut SceneRng {
        &mut self.rng
    }

    /// Frames drawn so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn render_options(&self) -> RenderOptions {
        self.config.render
    }

    pub fn set_render_options(&mut self, options: RenderOptions) {
        self.config.render = options;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.geometry = SurfaceGeometry::new(width, height, self.config.fill_surface);
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    pub fn input_queue_mut(&mut self) -> &mut InputQueue {
        &mut self.queue
    }

    /// Swap in `level` at the start of the next frame.
    pub fn request_level(&mut self, level: Rc<Level>) {
        self.pending = Some(level);
    }

    pub fn has_pending_level(&self) -> bool {
        self.pending.is_some()
    }

    /// Replace the running level now.
    ///
    /// The new world is built before anything is dropped, so on error the
    /// current level keeps running untouched. New ids continue after the old
    /// world's, which leaves the camera target dangling and makes it pick a
    /// fresh one.
    pub fn load_level(&mut self, level: &Level) -> Result<(), SceneError> {
        let built = instantiate(
            level,
            &self.config.physics_settings(),
            self.state.physics.next_id(),
            &mut self.rng,
        )?;
        self.state.physics = built.physics;
        self.state.links = built.links;
        self.state.level = Some(built.level);
        self.state.draw_list.clear();
        self.timestep.reset();
        info!("level {} loaded with {} links", level.name, self.state.links.len());
        Ok(())
    }

    /// Run one frame stamped `timestamp_ms` and draw it onto `surface`.
    pub fn advance(&mut self, timestamp_ms: f64, surface: &mut dyn Surface) -> Result<FrameReport, SceneError> {
        if let Some(level) = self.pending.take() {
            if let Err(err) = self.load_level(&level) {
                error!("level {} rejected, keeping the current one: {err}", level.name);
                return Err(err);
            }
        }

        // events are stamped with the time they were queued in, the last frame
        let previous = self.clock.last().unwrap_or(timestamp_ms);
        let delta_ms = self.clock.tick(timestamp_ms);
        for event in self.queue.drain() {
            self.input.apply(&event, previous);
        }
        self.input.begin_frame(timestamp_ms);

        let steps = self.timestep.accumulate((delta_ms / 1000.0) as f32);
        let dt = self.timestep.dt();
        for _ in 0..steps {
            self.state.physics.step(dt);
        }

        let state = &mut self.state;
        state.draw_list.clear();
        {
            let mut ctx = HookContext {
                links: &mut state.links,
                physics: &mut state.physics,
                camera: &mut state.camera,
                input: &self.input,
                keybinds: &self.config.keybinds,
            };
            run_render_hooks(&mut ctx);
        }
        let options = self.config.render;
        if options.cover_art {
            compose_cover_art(&state.links, &state.physics, &mut state.draw_list);
        }
        compose_debug(
            &options,
            &state.links,
            &state.physics,
            state.camera.target(),
            &mut state.draw_list,
        );

        let dispatch = route_collisions(&mut state.links, &state.physics);
        {
            let mut ctx = HookContext {
                links: &mut state.links,
                physics: &mut state.physics,
                camera: &mut state.camera,
                input: &self.input,
                keybinds: &self.config.keybinds,
            };
            fire_collisions(&dispatch, &mut ctx);
        }

        state.camera.update(&state.links, &state.physics, &mut self.rng);

        let stats = present(
            &mut state.draw_list,
            &state.camera,
            &self.geometry,
            self.chaos,
            timestamp_ms,
            &mut self.rng,
            surface,
        );

        let report = FrameReport {
            frame: self.frame,
            steps,
            collisions: dispatch.len(),
            items: stats.items,
            clips_applied: stats.clips_applied,
        };
        self.frame += 1;
        Ok(report)
    }
}
