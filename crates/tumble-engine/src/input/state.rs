use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;

use crate::input::queue::{InputEvent, MouseButton};

/// Keys admitted to the held-key set. Anything else is dropped so modifier
/// combinations cannot leave phantom keys held.
pub const ALLOWED_KEYS: &[&str] = &[
    "tab", "delete", "escape", "backspace", "0", "9", "8", "7", "6", "5", "4", "3", "2", "1", "q",
    "w", "e", "r", "t", "y", "u", "i", "o", "p", "l", "k", "j", "h", "g", "f", "d", "s", "a", "z",
    "x", "c", "v", "b", "n", "m", "shift", " ", "enter", "arrowright", "arrowleft", "arrowup",
    "arrowdown",
];

/// Entries kept per event log.
pub const LOG_CAPACITY: usize = 256;

pub fn is_allowed_key(key: &str) -> bool {
    ALLOWED_KEYS.contains(&key)
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyLogEntry {
    pub key: String,
    pub time_ms: f64,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonLogEntry {
    pub button: MouseButton,
    pub time_ms: f64,
    pub pressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollLogEntry {
    pub delta: f64,
    pub time_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveLogEntry {
    pub at: Vec2,
    pub time_ms: f64,
}

fn push_bounded<T>(log: &mut VecDeque<T>, entry: T) {
    if log.len() == LOG_CAPACITY {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Read-only input snapshot handed to hooks each frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    keys_down: BTreeMap<String, f64>,
    buttons_down: BTreeMap<MouseButton, f64>,
    mouse: Vec2,
    scroll_speed: f64,
    scroll_total: f64,
    last_wheel: Option<ScrollLogEntry>,
    key_log: VecDeque<KeyLogEntry>,
    button_log: VecDeque<ButtonLogEntry>,
    scroll_log: VecDeque<ScrollLogEntry>,
    move_log: VecDeque<MoveLogEntry>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the snapshot, stamped with `time_ms`.
    pub fn apply(&mut self, event: &InputEvent, time_ms: f64) {
        match event {
            InputEvent::KeyDown { key } => {
                let key = key.to_lowercase();
                if !is_allowed_key(&key) {
                    return;
                }
                self.keys_down.entry(key.clone()).or_insert(time_ms);
                let repeated = self
                    .key_log
                    .back()
                    .is_some_and(|last| last.pressed && last.key == key);
                if !repeated {
                    push_bounded(
                        &mut self.key_log,
                        KeyLogEntry {
                            key,
                            time_ms,
                            pressed: true,
                        },
                    );
                }
            }
            InputEvent::KeyUp { key } => {
                let key = key.to_lowercase();
                self.keys_down.remove(&key);
                push_bounded(
                    &mut self.key_log,
                    KeyLogEntry {
                        key,
                        time_ms,
                        pressed: false,
                    },
                );
            }
            InputEvent::MouseDown { button } => {
                self.buttons_down.insert(*button, time_ms);
                push_bounded(
                    &mut self.button_log,
                    ButtonLogEntry {
                        button: *button,
                        time_ms,
                        pressed: true,
                    },
                );
            }
            InputEvent::MouseUp { button } => {
                self.buttons_down.remove(button);
                push_bounded(
                    &mut self.button_log,
                    ButtonLogEntry {
                        button: *button,
                        time_ms,
                        pressed: false,
                    },
                );
            }
            InputEvent::MouseMove { at } => {
                self.mouse = *at;
                push_bounded(&mut self.move_log, MoveLogEntry { at: *at, time_ms });
            }
            InputEvent::Wheel { delta } => {
                let entry = ScrollLogEntry {
                    delta: *delta,
                    time_ms,
                };
                self.scroll_total += delta;
                self.last_wheel = Some(entry);
                push_bounded(&mut self.scroll_log, entry);
            }
        }
    }

    /// Recompute the scroll speed for the frame starting at `now_ms`.
    ///
    /// Speed is the last wheel delta divided by the milliseconds from now
    /// back to when it arrived, rounded, so a positive delta reads as a
    /// negative speed. No elapsed time means no speed.
    pub fn begin_frame(&mut self, now_ms: f64) {
        self.scroll_speed = match self.last_wheel {
            Some(wheel) => {
                let elapsed = now_ms - wheel.time_ms;
                if elapsed > 0.0 {
                    let speed = (wheel.delta / -elapsed).round();
                    // normalises -0.0 and NaN
                    if speed == 0.0 || !speed.is_finite() {
                        0.0
                    } else {
                        speed
                    }
                } else {
                    0.0
                }
            }
            None => 0.0,
        };
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains_key(key)
    }

    /// When `key` was first pressed, if it is held.
    pub fn key_down_since(&self, key: &str) -> Option<f64> {
        self.keys_down.get(key).copied()
    }

    pub fn keys_down(&self) -> impl Iterator<Item = &str> {
        self.keys_down.keys().map(String::as_str)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains_key(&button)
    }

    pub fn buttons_down(&self) -> impl Iterator<Item = MouseButton> + '_ {
        self.buttons_down.keys().copied()
    }

    pub fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    pub fn scroll_speed(&self) -> f64 {
        self.scroll_speed
    }

    pub fn scroll_total(&self) -> f64 {
        self.scroll_total
    }

    pub fn key_log(&self) -> &VecDeque<KeyLogEntry> {
        &self.key_log
    }

    pub fn button_log(&self) -> &VecDeque<ButtonLogEntry> {
        &self.button_log
    }

    pub fn scroll_log(&self) -> &VecDeque<ScrollLogEntry> {
        &self.scroll_log
    }

    pub fn move_log(&self) -> &VecDeque<MoveLogEntry> {
        &self.move_log
    }
}
