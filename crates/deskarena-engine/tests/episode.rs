//! Full episode runs against a fake guest server, covering the §8 worked
//! scenarios that don't require a real VM.

use deskarena_core::{Settings, SomOrigin};
use deskarena_engine::{run_episode, ResetBackend, ScriptedAgent};
use deskarena_recorder::TrajectoryWriter;
use deskarena_testing::result_dir::sample_key;
use deskarena_testing::{FakeGuestServer, TestResultRoot};
use deskarena_types::action::Action;
use deskarena_types::agent::AgentPrediction;

fn fast_settings(max_steps: u32) -> Settings {
    Settings {
        max_steps,
        sleep_after_execution_secs: 0.0,
        wait_pause_secs: 0.0,
        probe_poll_interval_secs: 0,
        probe_poll_attempts: 1,
        ..Settings::default()
    }
}

#[tokio::test]
async fn infeasible_task_scores_one_and_writes_two_trajectory_lines() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::infeasible_task();
    let settings = fast_settings(5);

    let result_root = TestResultRoot::new();
    let key = sample_key(&task.id);
    let dir = result_root.task_dir(&key);
    let mut recorder = TrajectoryWriter::open(&dir).unwrap();

    let mut agent = ScriptedAgent::new(vec![AgentPrediction { actions: vec![Action::Fail], ..Default::default() }]);

    let outcome = run_episode(&client, ResetBackend::Remote, &settings, &task, &mut agent, &mut recorder).await.unwrap();

    assert_eq!(outcome.score, 1.0);
    assert_eq!(result_root.result_value(&key), Some(1.0));
    assert_eq!(result_root.trajectory_lines(&key).len(), 2);
}

#[tokio::test]
async fn step_budget_runs_exactly_max_steps_predictions() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::step_budget_task();
    let settings = fast_settings(3);

    let result_root = TestResultRoot::new();
    let key = sample_key(&task.id);
    let dir = result_root.task_dir(&key);
    let mut recorder = TrajectoryWriter::open(&dir).unwrap();

    // Never emits DONE or FAIL: the episode must stop solely because the
    // step budget was exhausted.
    let script = vec![AgentPrediction { actions: vec![Action::Wait], ..Default::default() }; 10];
    let mut agent = ScriptedAgent::new(script);

    let outcome = run_episode(&client, ResetBackend::Remote, &settings, &task, &mut agent, &mut recorder).await.unwrap();

    assert_eq!(outcome.steps_taken, 3);
    // One reset-observation line plus one line per step.
    assert_eq!(result_root.trajectory_lines(&key).len(), 4);
}

#[tokio::test]
async fn fail_action_scores_zero_without_calling_the_metric() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::file_presence_conjunction_task();
    let settings = fast_settings(5);

    let result_root = TestResultRoot::new();
    let key = sample_key(&task.id);
    let dir = result_root.task_dir(&key);
    let mut recorder = TrajectoryWriter::open(&dir).unwrap();

    // Both files actually exist on the fake guest, which would otherwise
    // score 1.0 -- FAIL must still force 0.0 per §4.4 Rules.
    server.set_file("C:\\Users\\user\\Desktop\\report.docx", b"x".to_vec()).await;
    server.set_file("C:\\Users\\user\\Desktop\\summary.txt", b"y".to_vec()).await;

    let mut agent = ScriptedAgent::new(vec![AgentPrediction { actions: vec![Action::Fail], ..Default::default() }]);
    let outcome = run_episode(&client, ResetBackend::Remote, &settings, &task, &mut agent, &mut recorder).await.unwrap();

    assert_eq!(outcome.score, 0.0);
}

#[tokio::test]
async fn file_presence_conjunction_requires_both_files() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::file_presence_conjunction_task();

    let neither = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(neither, 0.0);

    server.set_file("C:\\Users\\user\\Desktop\\report.docx", b"x".to_vec()).await;
    let one = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(one, 0.0);

    server.set_file("C:\\Users\\user\\Desktop\\summary.txt", b"y".to_vec()).await;
    let both = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(both, 1.0);
}

#[tokio::test]
async fn registry_equality_matches_the_literal_expected_value() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::registry_equality_task();

    let missing = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(missing, 0.0);

    server.set_registry("HKCU\\Software\\Test\\Val", "42").await;
    let matching = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(matching, 1.0);

    server.set_registry("HKCU\\Software\\Test\\Val", "7").await;
    let mismatching = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(mismatching, 0.0);
}

#[tokio::test]
async fn a11y_tree_is_fetched_only_when_som_origin_requires_it() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    server.set_accessibility_tree("<Tree><Node/></Tree>").await;
    let task = deskarena_testing::fixtures::step_budget_task();

    let mut oss_settings = fast_settings(1);
    oss_settings.som_origin = SomOrigin::Oss;
    let result_root = TestResultRoot::new();
    let key = sample_key(&task.id);
    let dir = result_root.task_dir(&key);
    let mut recorder = TrajectoryWriter::open(&dir).unwrap();
    let mut agent = ScriptedAgent::new(vec![AgentPrediction { actions: vec![Action::Done], ..Default::default() }]);
    run_episode(&client, ResetBackend::Remote, &oss_settings, &task, &mut agent, &mut recorder).await.unwrap();
    let lines = result_root.trajectory_lines(&key);
    assert!(!lines.iter().any(|line| line.contains("accessibility_tree")));

    let mut a11y_settings = fast_settings(1);
    a11y_settings.som_origin = SomOrigin::A11y;
    let result_root = TestResultRoot::new();
    let key = sample_key(&task.id);
    let dir = result_root.task_dir(&key);
    let mut recorder = TrajectoryWriter::open(&dir).unwrap();
    let mut agent = ScriptedAgent::new(vec![AgentPrediction { actions: vec![Action::Done], ..Default::default() }]);
    run_episode(&client, ResetBackend::Remote, &a11y_settings, &task, &mut agent, &mut recorder).await.unwrap();
    let lines = result_root.trajectory_lines(&key);
    assert!(lines.iter().any(|line| line.contains("accessibility_tree")));
}

#[tokio::test]
async fn world_clock_probe_matches_city_and_country_regex() {
    let server = FakeGuestServer::start().await;
    let client = server.client();
    let task = deskarena_testing::fixtures::world_clock_task();

    let absent = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(absent, 0.0);

    server.set_world_clock("Munich", "Germany", "Munich, Germany").await;
    let present = deskarena_evaluators::evaluate(&client, &task.evaluator).await.unwrap();
    assert_eq!(present, 1.0);
}
