use crate::api::scene::{Scene, SceneConfig};
use crate::error::SceneError;

/// The contract a piece of content fulfils: it configures the scene, loads
/// its first level and may steer the scene between frames.
pub trait Director {
    /// Scene configuration. Called once before init.
    fn config(&self) -> SceneConfig {
        SceneConfig::default()
    }

    /// Register content and request the first level.
    fn init(&mut self, scene: &mut Scene) -> Result<(), SceneError>;

    /// Runs before every frame, e.g. to schedule level transitions.
    fn before_frame(&mut self, _scene: &mut Scene) -> Result<(), SceneError> {
        Ok(())
    }
}
