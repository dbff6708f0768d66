pub mod keybinds;
pub mod queue;
pub mod state;
