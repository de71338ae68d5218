use crate::action::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rects/window-rect/screenshot/scale/clipboard payload forwarded to the
/// guest's `/update_computer` endpoint after a prediction, when the agent
/// supplies one. The core passes this through opaquely; only the guest
/// agent server interprets its shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ComputerUpdate {
    #[serde(default)]
    pub rects: Vec<crate::observation::Rect>,
    #[serde(default)]
    pub window_rect: Option<crate::observation::Rect>,
    #[serde(default)]
    pub scale: Option<(f64, f64)>,
    #[serde(default)]
    pub clipboard: Option<String>,
}

/// What the (out-of-scope, black-box) agent returns from one `predict()`
/// call: zero or more actions to execute in order, a free-form log blob to
/// persist alongside the step, and an optional facade refresh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AgentPrediction {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub logs: Value,
    #[serde(default)]
    pub computer_update: Option<ComputerUpdate>,
}
