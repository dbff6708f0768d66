pub mod camera;
pub mod draw_list;
pub mod present;
pub mod surface;
pub mod transform;

pub use surface::{CommandRecorder, Surface, SurfaceCommand};
