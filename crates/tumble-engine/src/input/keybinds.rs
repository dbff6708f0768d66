use serde::Deserialize;

use crate::input::state::InputState;

/// Actions a controlled block responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Right,
    Left,
    Jump,
}

/// Control mapping from actions to lowercase key names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Keybinds {
    pub right: String,
    pub left: String,
    pub jump: String,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            right: "arrowright".into(),
            left: "arrowleft".into(),
            jump: "c".into(),
        }
    }
}

impl Keybinds {
    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::Right => &self.right,
            Action::Left => &self.left,
            Action::Jump => &self.jump,
        }
    }

    pub fn is_active(&self, action: Action, input: &InputState) -> bool {
        input.is_key_down(self.key_for(action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::queue::InputEvent;

    #[test]
    fn defaults_follow_arrow_keys() {
        let binds = Keybinds::default();
        assert_eq!(binds.key_for(Action::Right), "arrowright");
        assert_eq!(binds.key_for(Action::Jump), "c");
    }

    #[test]
    fn partial_override_from_json() {
        let binds: Keybinds = serde_json::from_str(r#"{ "jump": "arrowup" }"#).unwrap();
        assert_eq!(binds.jump, "arrowup");
        assert_eq!(binds.left, "arrowleft");
    }

    #[test]
    fn active_when_bound_key_is_held() {
        let binds = Keybinds::default();
        let mut input = InputState::new();
        assert!(!binds.is_active(Action::Jump, &input));
        input.apply(&InputEvent::KeyDown { key: "C".into() }, 0.0);
        assert!(binds.is_active(Action::Jump, &input));
        assert!(!binds.is_active(Action::Left, &input));
    }
}
