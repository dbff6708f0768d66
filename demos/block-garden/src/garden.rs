use std::collections::VecDeque;
use std::rc::Rc;

use log::info;
use rand::Rng;
use tumble_engine::{Director, Level, Scene, SceneConfig, SceneError};

use crate::blocks::Catalogue;
use crate::levels;

/// Frames each level stays on screen before the next one is drawn.
pub const FRAMES_PER_LEVEL: u64 = 5000;

/// How many recent level names the slideshow remembers.
pub const SHOWN_HISTORY: usize = 32;

/// A slideshow of garden levels.
///
/// A level is loaded at frame 0 and again every `frames_per_level` frames,
/// picked uniformly from the catalogue, or always the pinned one.
pub struct Garden {
    levels: Vec<Rc<Level>>,
    frames_per_level: u64,
    pinned: Option<usize>,
    config: SceneConfig,
    shown: VecDeque<String>,
}

impl Garden {
    pub fn new() -> Self {
        let blocks = Catalogue::new();
        Self {
            levels: levels::all(&blocks).into_iter().map(Rc::new).collect(),
            frames_per_level: FRAMES_PER_LEVEL,
            pinned: None,
            config: SceneConfig::default(),
            shown: VecDeque::with_capacity(SHOWN_HISTORY),
        }
    }

    /// Always show the level at `index`.
    pub fn pinned(mut self, index: usize) -> Self {
        self.pinned = Some(index);
        self
    }

    pub fn with_frames_per_level(mut self, frames: u64) -> Self {
        self.frames_per_level = frames.max(1);
        self
    }

    pub fn with_config(mut self, config: SceneConfig) -> Self {
        self.config = config;
        self
    }

    pub fn levels(&self) -> &[Rc<Level>] {
        &self.levels
    }

    /// Names of the most recently requested levels, oldest first.
    pub fn shown(&self) -> &VecDeque<String> {
        &self.shown
    }

    fn next_level(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let index = match self.pinned {
            Some(index) => index,
            None => scene.rng_mut().random_range(0..self.levels.len()),
        };
        let level = self.levels.get(index).cloned().ok_or_else(|| {
            SceneError::Config(format!(
                "pinned level {index} out of range, {} levels",
                self.levels.len()
            ))
        })?;
        info!("slideshow: {}", level.name);
        if self.shown.len() == SHOWN_HISTORY {
            self.shown.pop_front();
        }
        self.shown.push_back(level.name.clone());
        scene.request_level(level);
        Ok(())
    }
}

impl Default for Garden {
    fn default() -> Self {
        Self::new()
    }
}

impl Director for Garden {
    fn config(&self) -> SceneConfig {
        self.config.clone()
    }

    fn init(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.next_level(scene)
    }

    fn before_frame(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let frame = scene.frame();
        if frame > 0 && frame % self.frames_per_level == 0 {
            self.next_level(scene)?;
        }
        Ok(())
    }
}
