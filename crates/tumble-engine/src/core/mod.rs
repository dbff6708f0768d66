pub mod level;
pub mod links;
pub mod physics;
pub mod shape;
pub mod time;
