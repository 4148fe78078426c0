//! Per-frame input snapshot
//!
//! The window layer translates keys into [`Action`]s; the engine only ever
//! sees which actions are held this frame.

use serde::{Serialize, Deserialize};

/// Discrete camera commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveForward,
    MoveBack,
    TurnLeft,
    TurnRight,
    MoveUp,
    MoveDown,
    StrafeLeft,
    StrafeRight,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::MoveForward,
        Action::MoveBack,
        Action::TurnLeft,
        Action::TurnRight,
        Action::MoveUp,
        Action::MoveDown,
        Action::StrafeLeft,
        Action::StrafeRight,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of actions held during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    held: u8,
}

impl InputState {
    pub fn press(&mut self, action: Action) {
        self.held |= action.bit();
    }

    pub fn release(&mut self, action: Action) {
        self.held &= !action.bit();
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.held & action.bit() != 0
    }

    pub fn is_idle(&self) -> bool {
        self.held == 0
    }

    pub fn held(&self) -> impl Iterator<Item = Action> + '_ {
        Action::ALL.into_iter().filter(|a| self.is_held(*a))
    }
}

impl FromIterator<Action> for InputState {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut state = InputState::default();
        for action in iter {
            state.press(action);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_release() {
        let mut input = InputState::default();
        assert!(input.is_idle());
        input.press(Action::TurnLeft);
        input.press(Action::StrafeRight);
        assert!(input.is_held(Action::TurnLeft));
        assert!(!input.is_held(Action::TurnRight));
        input.release(Action::TurnLeft);
        assert_eq!(input.held().collect::<Vec<_>>(), vec![Action::StrafeRight]);
    }

    #[test]
    fn test_collect_actions() {
        let input: InputState = [Action::MoveUp, Action::MoveDown].into_iter().collect();
        assert_eq!(input.held().count(), 2);
    }
}
