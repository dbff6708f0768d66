pub mod behavior;
pub mod block;
pub mod color;
