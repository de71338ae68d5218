use serde::{Deserialize, Serialize};

/// Which action-space a task's config expects the agent's actions to be
/// expressed in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionSpace {
    Computer13,
    Pyautogui,
    CodeBlock,
}

/// The fixed vocabulary of `computer_13` primitives. Unknown `action_type`
/// strings are rejected at dispatch, not silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Computer13Kind {
    MoveTo,
    Click,
    MouseDown,
    MouseUp,
    RightClick,
    DoubleClick,
    Drag,
    Scroll,
    TypeText,
    KeyPress,
    Hotkey,
    KeyDown,
    KeyUp,
}

/// A tagged `computer_13` action record: `{action_type, parameters}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Computer13Action {
    pub action_type: Computer13Kind,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// One action the agent emitted for one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Action {
    /// Sleep `pause` seconds and re-predict without acting.
    Wait,
    /// The agent judges the task infeasible; ends the episode.
    Fail,
    /// The agent judges the task complete; ends the episode.
    Done,
    /// A `computer_13` tagged primitive.
    Computer13(Computer13Action),
    /// A `pyautogui` source fragment to execute inside the guest.
    Pyautogui(String),
    /// A `code_block` program using the richer `computer` facade.
    CodeBlock(String),
}

impl Action {
    pub fn is_terminal_sentinel(&self) -> bool {
        matches!(self, Action::Fail | Action::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_computer13() {
        let action = Action::Computer13(Computer13Action {
            action_type: Computer13Kind::Click,
            parameters: serde_json::json!({"x": 10, "y": 20}),
        });
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(action, back);
    }

    #[test]
    fn sentinel_classification() {
        assert!(Action::Fail.is_terminal_sentinel());
        assert!(Action::Done.is_terminal_sentinel());
        assert!(!Action::Wait.is_terminal_sentinel());
    }
}
