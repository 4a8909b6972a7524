use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use sandbox::client::{
    decode, Algorithm, ClientError, InitResponse, LogsResponse, ResetResponse,
    RunEpisodeResponse, SandboxApi, StepResponse, TrainParams, TrainRequest, TrainResponse,
};
use sandbox::config::Timing;
use sandbox::session::{Canvases, Session, SessionError, TrainingStatus};
use sandbox::view::{
    Cell, EnvKind, PlaybackObserver, PolicyView, RecordingSurface, StateValue, Step, StepReadout,
    ViewState,
};
use serde_json::{json, Value};
use tokio::time::Instant;

/// Serves canned bodies per route and records every call.
#[derive(Default)]
struct CannedApi {
    replies: RefCell<HashMap<&'static str, (u16, String)>>,
    calls: RefCell<Vec<&'static str>>,
    train_latency: Duration,
}

impl CannedApi {
    fn reply(&self, route: &'static str, status: u16, body: Value) {
        self.replies
            .borrow_mut()
            .insert(route, (status, body.to_string()));
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn canned(&self, route: &'static str) -> Result<(u16, String), ClientError> {
        self.calls.borrow_mut().push(route);
        self.replies
            .borrow()
            .get(route)
            .cloned()
            .ok_or(ClientError::Status(404))
    }
}

impl SandboxApi for CannedApi {
    async fn init_env(&self, _env: EnvKind) -> Result<InitResponse, ClientError> {
        let (status, body) = self.canned("init_env")?;
        decode(status, &body)
    }

    async fn train(&self, _request: &TrainRequest) -> Result<TrainResponse, ClientError> {
        let (status, body) = self.canned("train")?;
        tokio::time::sleep(self.train_latency).await;
        decode(status, &body)
    }

    async fn step(&self, _action: u8) -> Result<StepResponse, ClientError> {
        let (status, body) = self.canned("step")?;
        decode(status, &body)
    }

    async fn reset(&self) -> Result<ResetResponse, ClientError> {
        let (status, body) = self.canned("reset")?;
        decode(status, &body)
    }

    async fn run_episode(&self, _policy: &[u8]) -> Result<RunEpisodeResponse, ClientError> {
        let (status, body) = self.canned("run_episode")?;
        decode(status, &body)
    }

    async fn logs(&self) -> Result<LogsResponse, ClientError> {
        let (status, body) = self.canned("get_logs")?;
        decode(status, &body)
    }
}

type TestSession = Session<CannedApi, RecordingSurface>;

fn gridworld_api() -> CannedApi {
    let api = CannedApi {
        train_latency: Duration::from_millis(350),
        ..CannedApi::default()
    };
    api.reply(
        "init_env",
        200,
        json!({
            "state": [0, 0],
            "grid_size": 3,
            "goal": [2, 2],
            "obstacles": [[1, 1]],
            "n_states": 9,
            "n_actions": 4,
            "actions": ["up", "down", "left", "right"]
        }),
    );
    api.reply(
        "train",
        200,
        json!({
            "policy": [3, 3, 1, 1, 0, 1, 3, 3, 0],
            "values": [1.0, 2.0, 3.0, 2.0, 0.0, 4.0, 3.0, 4.0, 5.0],
            "history": [-10.0, -5.0, 1.23456]
        }),
    );
    api.reply("reset", 200, json!({"state": [0, 0]}));
    api
}

fn session(api: CannedApi) -> TestSession {
    let canvases = Canvases {
        environment: RecordingSurface::new(400.0, 400.0),
        values: RecordingSurface::new(400.0, 400.0),
        chart: RecordingSurface::new(500.0, 250.0),
    };
    Session::new(api, canvases, Timing::default())
}

fn agent(session: &TestSession) -> Option<StateValue> {
    session.view().environment().and_then(|env| env.state.clone())
}

#[derive(Default)]
struct Collect(Vec<StepReadout>);

impl PlaybackObserver<RecordingSurface> for Collect {
    fn on_step(&mut self, readout: &StepReadout, _frame: &RecordingSurface) {
        self.0.push(readout.clone());
    }
}

#[tokio::test(start_paused = true)]
async fn commands_before_init_make_no_requests() {
    let mut session = session(gridworld_api());

    assert!(matches!(session.step(0).await, Err(SessionError::NotInitialized)));
    assert!(matches!(session.reset().await, Err(SessionError::NotInitialized)));
    assert!(matches!(
        session
            .train(Algorithm::QLearning, TrainParams::default(), |_| {})
            .await,
        Err(SessionError::NotInitialized)
    ));
    assert!(matches!(
        session.run_episode(&mut ()).await,
        Err(SessionError::NotInitialized)
    ));
    assert!(session.api().calls().is_empty());

    session.init(EnvKind::GridWorld).await.unwrap();
    assert!(matches!(
        session.run_episode(&mut ()).await,
        Err(SessionError::NotTrained)
    ));
    assert_eq!(session.api().calls(), ["init_env"]);
}

#[tokio::test(start_paused = true)]
async fn failed_init_keeps_the_previous_environment() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    let before = session.canvases().environment.commands().to_vec();

    session.api().reply(
        "init_env",
        500,
        json!({"error": "bad params", "trace": "Traceback ..."}),
    );
    let err = session.init(EnvKind::FrozenLake).await.unwrap_err();
    assert_eq!(err.to_string(), "server error: bad params");

    assert_eq!(
        session.view().environment().map(|env| env.kind()),
        Some(EnvKind::GridWorld)
    );
    assert_eq!(session.canvases().environment.commands(), before.as_slice());
}

#[tokio::test(start_paused = true)]
async fn training_reports_progress_then_stats() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();

    let mut reports = Vec::new();
    let stats = session
        .train(Algorithm::QLearning, TrainParams::default(), |progress| {
            reports.push(*progress);
        })
        .await
        .unwrap();

    let (last, ticks) = reports.split_last().unwrap();
    assert!(ticks.len() >= 3);
    assert!(ticks.iter().all(|tick| !tick.exact && tick.percent < 95.0));
    assert!(last.exact);
    assert_eq!(last.label(), "100%");

    assert_eq!(stats.iterations, 3);
    assert_eq!(stats.convergence_text(), "1.2346");
    assert_eq!(stats.avg_reward_text(), "-4.59");
    assert!(stats.elapsed >= Duration::from_millis(350));
    assert_eq!(session.status(), &TrainingStatus::Complete);
    assert_eq!(session.status().message(), "Training Complete!");

    let PolicyView::Grid { rows, .. } = session.policy_view() else {
        panic!("expected a policy grid");
    };
    assert_eq!(rows.len(), 3);
    assert_eq!(session.view().curve(), Some([-10.0, -5.0, 1.23456].as_slice()));
    assert!(!session.controls().is_locked());
}

#[tokio::test(start_paused = true)]
async fn failed_training_marks_status_and_releases_controls() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    session
        .api()
        .reply("train", 400, json!({"error": "Unknown algorithm"}));

    let err = session
        .train(Algorithm::Sarsa, TrainParams::preset(Algorithm::Sarsa), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Client(ClientError::Server { ref message }) if message == "Unknown algorithm"
    ));
    assert_eq!(session.status().message(), "Training Failed!");
    assert!(session.view().policy().is_none());
    assert!(!session.controls().is_locked());
}

#[tokio::test(start_paused = true)]
async fn locked_controls_refuse_commands() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    session
        .api()
        .reply("step", 200, json!({"state": [0, 1], "reward": -1.0, "done": false}));

    let guard = session.controls().try_lock().unwrap();
    assert!(session.controls().try_lock().is_none());
    assert!(matches!(session.step(3).await, Err(SessionError::ControlsLocked)));
    assert!(matches!(
        session
            .train(Algorithm::QLearning, TrainParams::default(), |_| {})
            .await,
        Err(SessionError::ControlsLocked)
    ));
    assert_eq!(session.api().calls(), ["init_env"]);

    drop(guard);
    let outcome = session.step(3).await.unwrap();
    assert_eq!(outcome.reward, -1.0);
    assert!(!outcome.reset);
    assert_eq!(agent(&session), Some(StateValue::Cell(Cell::new(0, 1))));
}

#[tokio::test(start_paused = true)]
async fn finishing_step_resets_after_the_delay() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    session
        .api()
        .reply("step", 200, json!({"state": [2, 2], "reward": 10.0, "done": true}));

    let started = Instant::now();
    let outcome = session.step(1).await.unwrap();

    assert!(outcome.done);
    assert!(outcome.reset);
    assert!(started.elapsed() >= Duration::from_secs(1));
    assert_eq!(session.api().calls(), ["init_env", "step", "reset"]);
    assert_eq!(agent(&session), Some(StateValue::Cell(Cell::new(0, 0))));
}

#[tokio::test(start_paused = true)]
async fn trained_policy_episode_is_replayed() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    session
        .train(Algorithm::QLearning, TrainParams::default(), |_| {})
        .await
        .unwrap();
    session.api().reply(
        "run_episode",
        200,
        json!({
            "trajectory": [
                {"state": [0, 1], "action": 3, "reward": -1.0, "done": false},
                {"state": [0, 2], "action": 3, "reward": -1.0, "done": false},
                {"state": [1, 2], "action": 1, "reward": -1.0, "done": false},
                {"state": [2, 2], "action": 1, "reward": 10.0, "done": true}
            ],
            "total_reward": 7.0
        }),
    );

    let mut seen = Collect::default();
    let summary = session.run_episode(&mut seen).await.unwrap();

    assert_eq!(summary.steps, 4);
    assert!(summary.finished);
    assert!((summary.total_reward - 7.0).abs() < 1e-9);
    assert_eq!(seen.0.len(), 4);
    assert_eq!(seen.0[3].cumulative_text(), "7.00");
    assert_eq!(agent(&session), Some(StateValue::Cell(Cell::new(2, 2))));
    assert!(!session.player().is_playing());
}

#[tokio::test(start_paused = true)]
async fn episode_is_refused_while_a_replay_runs() {
    let mut session = session(gridworld_api());
    session.init(EnvKind::GridWorld).await.unwrap();
    session
        .train(Algorithm::QLearning, TrainParams::default(), |_| {})
        .await
        .unwrap();

    let player = session.player();
    let mut side_view = ViewState::new();
    let mut side_surface = RecordingSurface::new(400.0, 400.0);
    let (mut side_observer, mut observer) = ((), ());
    let other = vec![Step {
        state: StateValue::Cell(Cell::new(0, 1)),
        action: 3,
        reward: -1.0,
        done: true,
    }];

    let (side, refused) = tokio::join!(
        player.play(other, &mut side_view, &mut side_surface, &mut side_observer),
        session.run_episode(&mut observer),
    );

    assert!(side.is_ok());
    assert!(matches!(refused, Err(SessionError::PlaybackBusy)));
    assert!(!session.api().calls().contains(&"run_episode"));
}

#[tokio::test(start_paused = true)]
async fn log_panel_keeps_lines_when_a_poll_fails() {
    let mut session = session(gridworld_api());
    session.api().reply(
        "get_logs",
        200,
        json!({"logs": [
            {"timestamp": "2024-01-01 10:00:00.000", "type": "RESET", "details": {}},
            {"timestamp": "2024-01-01 10:00:02.500", "type": "STEP", "details": {"action": 3}}
        ]}),
    );

    let panel = session.poll_logs().await.unwrap();
    assert_eq!(panel.lines(), ["10:00:00.000 RESET: {}", r#"10:00:02.500 STEP: {"action":3}"#]);

    session.api().reply("get_logs", 503, json!("unavailable"));
    assert!(session.poll_logs().await.is_err());
    assert_eq!(session.logs().len(), 2);
}
