use glam::Vec2;

use crate::components::color::Rgba;

/// The drawing calls presentation needs from a 2D surface.
///
/// Coordinates are surface pixels. A path is started with `begin_path` and
/// consumed by exactly one of `fill`, `stroke` or `clip`.
pub trait Surface {
    fn begin_path(&mut self);
    fn move_to(&mut self, at: Vec2);
    fn line_to(&mut self, at: Vec2);
    fn close_path(&mut self);
    fn fill(&mut self, color: Rgba);
    fn stroke(&mut self, color: Rgba, width: f32);
    /// Intersect the clip region with the current path.
    fn clip(&mut self);
    /// Drop any clip region.
    fn reset_clip(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceCommand {
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    ClosePath,
    Fill(Rgba),
    Stroke { color: Rgba, width: f32 },
    Clip,
    ResetClip,
}

/// A surface that just remembers what it was told.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<SurfaceCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn take(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Colors of every fill, in order.
    pub fn fills(&self) -> Vec<Rgba> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::Fill(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&SurfaceCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| wanted(c)).count()
    }
}

impl Surface for CommandRecorder {
    fn begin_path(&mut self) {
        self.commands.push(SurfaceCommand::BeginPath);
    }

    fn move_to(&mut self, at: Vec2) {
        self.commands.push(SurfaceCommand::MoveTo(at));
    }

    fn line_to(&mut self, at: Vec2) {
        self.commands.push(SurfaceCommand::LineTo(at));
    }

    fn close_path(&mut self) {
        self.commands.push(SurfaceCommand::ClosePath);
    }

    fn fill(&mut self, color: Rgba) {
        self.commands.push(SurfaceCommand::Fill(color));
    }

    fn stroke(&mut self, color: Rgba, width: f32) {
        self.commands.push(SurfaceCommand::Stroke { color, width });
    }

    fn clip(&mut self) {
        self.commands.push(SurfaceCommand::Clip);
    }

    fn reset_clip(&mut self) {
        self.commands.push(SurfaceCommand::ResetClip);
    }
}
