pub mod collision;
pub mod compose;
pub mod debug;
#[cfg(feature = "vectors")]
pub mod vector;
