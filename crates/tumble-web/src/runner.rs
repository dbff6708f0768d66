use glam::Vec2;
use log::{error, info};
use tumble_engine::{Director, InputEvent, MouseButton, RenderOptions, Scene, SceneError};

#[cfg(feature = "vectors")]
use tumble_engine::{ClipBatch, TessellatingSurface};
#[cfg(not(feature = "vectors"))]
use tumble_engine::CommandRecorder;

/// What each frame is drawn onto.
#[cfg(feature = "vectors")]
pub type FrameSurface = TessellatingSurface;
#[cfg(not(feature = "vectors"))]
pub type FrameSurface = CommandRecorder;

/// Generic scene runner that wires a director to the browser frame loop.
///
/// Each concrete piece of content creates a `thread_local!` SceneRunner and
/// exports free functions via `#[wasm_bindgen]`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct SceneRunner<D: Director> {
    director: D,
    scene: Option<Scene>,
    surface: FrameSurface,
    #[cfg(feature = "vectors")]
    batches: Vec<ClipBatch>,
}

impl<D: Director> SceneRunner<D> {
    pub fn new(director: D) -> Self {
        Self {
            director,
            scene: None,
            surface: FrameSurface::new(),
            #[cfg(feature = "vectors")]
            batches: Vec::new(),
        }
    }

    /// Build the scene for a `width` x `height` surface and hand it to the
    /// director. On error the runner stays idle and every frame is a no-op.
    pub fn init(&mut self, width: f32, height: f32, seed: u64) -> Result<(), SceneError> {
        let mut config = self.director.config();
        config.seed = seed;
        config.surface_width = width;
        config.surface_height = height;
        let mut scene = Scene::new(config)?;
        self.director.init(&mut scene)?;
        info!("runner started on a {width}x{height} surface, seed {seed}");
        self.scene = Some(scene);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.scene.is_some()
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    pub fn director(&self) -> &D {
        &self.director
    }

    /// Run one animation frame stamped `timestamp_ms`.
    pub fn frame(&mut self, timestamp_ms: f64) {
        let Some(scene) = self.scene.as_mut() else {
            return;
        };
        if let Err(err) = self.director.before_frame(scene) {
            error!("director failed before frame {}: {err}", scene.frame());
        }
        self.surface.clear();
        if let Err(err) = scene.advance(timestamp_ms, &mut self.surface) {
            error!("frame {} skipped: {err}", scene.frame());
        }
        #[cfg(feature = "vectors")]
        {
            self.batches = self.surface.batches();
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if let Some(scene) = self.scene.as_mut() {
            scene.resize(width, height);
        }
    }

    pub fn push_input(&mut self, event: InputEvent) {
        if let Some(scene) = self.scene.as_mut() {
            scene.push_input(event);
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.push_input(InputEvent::KeyDown { key: key.to_string() });
    }

    pub fn key_up(&mut self, key: &str) {
        self.push_input(InputEvent::KeyUp { key: key.to_string() });
    }

    /// Buttons other than left, middle and right are dropped.
    pub fn mouse_down(&mut self, button: u32) {
        if let Some(button) = MouseButton::from_index(button) {
            self.push_input(InputEvent::MouseDown { button });
        }
    }

    pub fn mouse_up(&mut self, button: u32) {
        if let Some(button) = MouseButton::from_index(button) {
            self.push_input(InputEvent::MouseUp { button });
        }
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) {
        self.push_input(InputEvent::MouseMove { at: Vec2::new(x, y) });
    }

    pub fn wheel(&mut self, delta: f64) {
        self.push_input(InputEvent::Wheel { delta });
    }

    /// Switch between the full debug overlay set and plain artwork.
    pub fn set_debug(&mut self, enabled: bool) {
        if let Some(scene) = self.scene.as_mut() {
            let options = if enabled {
                RenderOptions::debug()
            } else {
                RenderOptions::default()
            };
            scene.set_render_options(options);
        }
    }

    pub fn frame_count(&self) -> u32 {
        self.scene.as_ref().map_or(0, |scene| scene.frame() as u32)
    }

    pub fn surface(&self) -> &FrameSurface {
        &self.surface
    }

    // ---- Pointer accessors for the host to copy from ----

    #[cfg(feature = "vectors")]
    pub fn vertices_ptr(&self) -> *const f32 {
        self.surface.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vertex_count(&self) -> u32 {
        self.surface.vertex_count() as u32
    }

    /// Batches as a flat `u32`-aligned buffer, seven words each.
    #[cfg(feature = "vectors")]
    pub fn batches_ptr(&self) -> *const u32 {
        bytemuck::cast_slice::<ClipBatch, u32>(&self.batches).as_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn batch_count(&self) -> u32 {
        self.batches.len() as u32
    }

    #[cfg(feature = "vectors")]
    pub fn batches(&self) -> &[ClipBatch] {
        &self.batches
    }
}
