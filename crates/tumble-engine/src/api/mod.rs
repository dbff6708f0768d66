pub mod director;
pub mod scene;
pub mod types;
