use serde::{Deserialize, Serialize};

/// A pixel-space, integer rectangle. Downstream code (the a11y walker, the
/// set-of-marks renderer) assumes these coordinates are already in screen
/// pixels, not a normalized 0..1 range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

/// Shared currency for UI parsing: one labelled, located piece of screen
/// content, regardless of which source produced it (OCR, an icon detector,
/// the accessibility tree, ...).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntitySource {
    Ocr,
    Detector,
    Accessibility,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Text,
    Image,
    Icon,
    Html,
    A11y,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entity {
    pub source: EntitySource,
    #[serde(rename = "type")]
    pub kind: EntityType,
    pub shape: Rect,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Queued human input the episode engine forwards verbatim into the next
/// observation (e.g. an answer typed into the guest's `human` facade).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PendingHumanInput {
    pub question: Option<String>,
    pub answer: Option<String>,
}

/// One observation, assembled by the episode engine after every step and
/// handed to the agent and the recorder. Optional fields are `None` when
/// the corresponding guest fetch is not required for this task's action
/// space / observation type, or when it failed after internal retries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Observation {
    #[serde(default)]
    pub screenshot: Option<Vec<u8>>,
    #[serde(default)]
    pub accessibility_tree: Option<String>,
    #[serde(default)]
    pub terminal: Option<String>,
    pub instruction: String,
    #[serde(default)]
    pub window_title: Option<String>,
    #[serde(default)]
    pub window_rect: Option<Rect>,
    #[serde(default)]
    pub window_image: Option<Vec<u8>>,
    #[serde(default)]
    pub visible_windows: Vec<String>,
    #[serde(default)]
    pub clipboard: Option<String>,
    #[serde(default)]
    pub human_input: PendingHumanInput,
}

impl Observation {
    /// An observation is "null" (engine must wait and retry) when every
    /// field the caller asked for came back empty -- concretely, when both
    /// the screenshot and the window image are missing, since those are
    /// required by every action/observation-space combination.
    pub fn is_null(&self) -> bool {
        self.screenshot.is_none() && self.window_image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_observation_is_null() {
        let obs = Observation { instruction: "x".into(), ..Default::default() };
        assert!(obs.is_null());
    }

    #[test]
    fn observation_with_screenshot_is_not_null() {
        let obs = Observation {
            instruction: "x".into(),
            screenshot: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert!(!obs.is_null());
    }
}
