//! Shared server state: the `computer`/`human` facades `/execute_windows`
//! sees, and the screen-recorder's single-flight handle (§4.1.1, §4.1.2).

use deskarena_types::observation::Rect;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::process::Child;
use tokio::sync::{Mutex, RwLock};

/// Snapshot of window geometry and clipboard the agent last reported via
/// `/update_computer`. An explicit, owned struct rather than an ambient
/// global (§4.1.1 REDESIGN FLAG) -- `/update_computer` swaps its contents
/// atomically under the write lock; `/execute_windows` clones a read
/// snapshot before handing it to the executed code, so a concurrent
/// `/update_computer` is never observed mid-mutation.
#[derive(Debug, Clone, Default)]
pub struct ComputerFacade {
    pub rects: Vec<serde_json::Value>,
    pub window_rect: Option<Rect>,
    pub screenshot_b64: Option<String>,
    pub scale: Option<(f64, f64)>,
    pub clipboard: Option<String>,
}

/// Headless stand-in for `human.py`'s interactive dialog. `ask_question`/
/// `ask_action` pop a queued canned answer instead of opening UI; the
/// original's "no answer" sentinel is returned when the queue is empty.
#[derive(Debug, Default)]
pub struct HumanFacade {
    answers: std::collections::VecDeque<String>,
    history: Vec<String>,
}

/// The literal sentinel `human.py` returns when a human closes the answer
/// dialog without responding.
pub const NO_HUMAN_ANSWER: &str = "[NO_RESPONSE]";

impl HumanFacade {
    pub fn queue_answer(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }

    pub fn ask_question(&mut self, question: &str) -> String {
        self.history.push(question.to_string());
        self.answers.pop_front().unwrap_or_else(|| NO_HUMAN_ANSWER.to_string())
    }

    pub fn ask_action(&mut self, prompt: &str) -> String {
        self.ask_question(prompt)
    }

    pub fn get_past_input(&self) -> String {
        self.history.join("\n")
    }
}

pub struct RecordingState {
    pub child: Child,
    pub output_path: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    pub computer: Arc<RwLock<ComputerFacade>>,
    pub human: Arc<Mutex<HumanFacade>>,
    pub recording: Arc<Mutex<Option<RecordingState>>>,
    pub registry: Arc<RwLock<HashMap<String, String>>>,
    pub task_root: PathBuf,
    pub default_screen_size: (u32, u32),
}

impl AppState {
    pub fn new(task_root: PathBuf, default_screen_size: (u32, u32)) -> Self {
        Self {
            computer: Arc::new(RwLock::new(ComputerFacade::default())),
            human: Arc::new(Mutex::new(HumanFacade::default())),
            recording: Arc::new(Mutex::new(None)),
            registry: Arc::new(RwLock::new(HashMap::new())),
            task_root,
            default_screen_size,
        }
    }
}
