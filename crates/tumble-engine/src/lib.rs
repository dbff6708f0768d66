pub mod api;
pub mod components;
pub mod core;
pub mod error;
pub mod input;
pub mod renderer;
pub mod systems;

// Re-export key types at crate root for convenience
pub use api::director::Director;
pub use api::scene::{FrameReport, Scene, SceneConfig, SceneState};
pub use api::types::{BodyId, CollisionPair, SceneRng};
pub use components::behavior::{BlockHooks, Collidable, Configurable, HookContext, Renderable};
pub use components::block::{
    ArtLayer, BlockInputs, BlockInstance, BlockTemplate, CollisionTags, CoverArt, Outline,
    PhysicsDef, Position, TemplateData,
};
pub use components::color::Rgba;
pub use core::level::{
    instantiate, BuiltLevel, ConstraintSpec, LayoutEntry, Level, LevelPlan, LoadedLevel,
};
pub use core::links::{LinkTable, OwnerChain, MAX_OWNER_DEPTH};
pub use core::physics::{
    BodyOptions, BodySnapshot, Bounds, Contact, ConstraintDesc, PhysicsSettings, PhysicsWorld,
};
pub use core::shape::{load_block, load_shape, LoadedShape};
pub use core::time::{FixedTimestep, FrameClock};
pub use error::{LevelError, LinkError, SceneError, ShapeError};
pub use input::keybinds::{Action, Keybinds};
pub use input::queue::{InputEvent, InputQueue, MouseButton};
pub use input::state::InputState;
pub use renderer::camera::{CameraController, FollowMode};
pub use renderer::draw_list::{DrawItem, DrawList, DrawMode, PathOp, PathPoint};
pub use renderer::present::Chaos;
pub use renderer::surface::{CommandRecorder, Surface, SurfaceCommand};
pub use renderer::transform::{SurfaceGeometry, SurfaceTransform};
pub use systems::compose::RenderOptions;

#[cfg(feature = "vectors")]
pub use systems::vector::{ClipBatch, TessellatingSurface, VectorVertex};
