//! The `Agent` seam (§4.4.1): the engine is exercisable end-to-end without
//! an LLM dependency via the two reference doubles below. A real
//! screen-parsing/LLM-backed agent is expected to live in an external crate
//! implementing this trait.

use deskarena_types::agent::AgentPrediction;
use deskarena_types::observation::Observation;

pub trait Agent: Send {
    fn reset(&mut self);
    fn predict(&mut self, instruction: &str, obs: &Observation) -> AgentPrediction;
}

/// Replays a fixed list of actions, one per call to `predict`, regardless
/// of instruction or observation. Used for deterministic tests and the
/// worked scenarios in §8.
pub struct ScriptedAgent {
    script: Vec<AgentPrediction>,
    cursor: usize,
}

impl ScriptedAgent {
    pub fn new(script: Vec<AgentPrediction>) -> Self {
        Self { script, cursor: 0 }
    }
}

impl Agent for ScriptedAgent {
    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn predict(&mut self, _instruction: &str, _obs: &Observation) -> AgentPrediction {
        let prediction = self
            .script
            .get(self.cursor)
            .cloned()
            .unwrap_or_else(|| AgentPrediction { actions: vec![deskarena_types::action::Action::Done], ..Default::default() });
        self.cursor += 1;
        prediction
    }
}

/// Always emits `DONE` on the first call. The default agent when no real
/// one is wired, so the CLI and engine remain runnable without an LLM.
#[derive(Default)]
pub struct NoopAgent;

impl Agent for NoopAgent {
    fn reset(&mut self) {}

    fn predict(&mut self, _instruction: &str, _obs: &Observation) -> AgentPrediction {
        AgentPrediction { actions: vec![deskarena_types::action::Action::Done], ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_agent_replays_in_order_then_falls_back_to_done() {
        let mut agent = ScriptedAgent::new(vec![AgentPrediction {
            actions: vec![deskarena_types::action::Action::Wait],
            ..Default::default()
        }]);
        let obs = Observation::default();
        assert_eq!(agent.predict("go", &obs).actions, vec![deskarena_types::action::Action::Wait]);
        assert_eq!(agent.predict("go", &obs).actions, vec![deskarena_types::action::Action::Done]);
    }

    #[test]
    fn noop_agent_always_emits_done() {
        let mut agent = NoopAgent;
        let prediction = agent.predict("anything", &Observation::default());
        assert_eq!(prediction.actions, vec![deskarena_types::action::Action::Done]);
    }
}
