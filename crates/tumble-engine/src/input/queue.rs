use glam::Vec2;

/// Mouse buttons the host can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` index. Other buttons are ignored.
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Left),
            1 => Some(Self::Middle),
            2 => Some(Self::Right),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Middle => "middle",
            Self::Right => "right",
        }
    }
}

/// Raw input events pushed by the host between frames.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key was pressed. `key` is the DOM key name, any case.
    KeyDown { key: String },
    KeyUp { key: String },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// Cursor moved to surface coordinates.
    MouseMove { at: Vec2 },
    /// Wheel turned by `delta` host units.
    Wheel { delta: f64 },
}

/// A queue of input events.
/// The host pushes events as they arrive; the scene drains them once per frame.
#[derive(Debug, Default)]
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(32),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Take every pending event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InputEvent> {
        self.events.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_drain() {
        let mut q = InputQueue::new();
        q.push(InputEvent::MouseDown {
            button: MouseButton::Left,
        });
        q.push(InputEvent::KeyDown { key: "C".into() });
        assert_eq!(q.len(), 2);
        let events = q.drain();
        assert_eq!(events.len(), 2);
        assert!(q.is_empty());
        assert_eq!(events[1], InputEvent::KeyDown { key: "C".into() });
    }

    #[test]
    fn button_indices() {
        assert_eq!(MouseButton::from_index(0), Some(MouseButton::Left));
        assert_eq!(MouseButton::from_index(2).map(MouseButton::name), Some("right"));
        assert_eq!(MouseButton::from_index(4), None);
    }
}
