//! # Sandbox Application Logic
//!
//! [`run`] sets up logging and a single-threaded tokio runtime, then executes
//! one command. Every canvas is a [`RasterSurface`]; commands that change what
//! is shown write the canvases to a timestamped directory under `--out`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use sandbox::client::{Algorithm, HttpClient, SandboxApi, TrainParams};
use sandbox::config::SandboxConfig;
use sandbox::session::{Canvases, Session, SessionError};
use sandbox::view::{
    Action, EnvKind, LogPanel, PlaybackObserver, ProgressEstimate, RasterSurface, StepReadout,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::cli::{Cli, Command};

type RasterSession = Session<HttpClient, RasterSurface>;

/// Run the command selected on the command line.
///
/// # Errors
///
/// Returns runtime setup failures and any error of a one-shot command.
/// The interactive loop only fails when stdin does.
pub fn run(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = cli.config();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build the async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Command::Algorithms => {
                print_algorithms();
                Ok(())
            }
            Command::Envs => {
                print_envs();
                Ok(())
            }
            Command::Logs => print_logs(&config).await,
            Command::Demo {
                env,
                algorithm,
                params,
            } => demo(&config, env, algorithm, params.apply(algorithm)).await,
            Command::Interactive { env } => interactive(&config, env).await,
        }
    })
}

fn connect(config: &SandboxConfig) -> Result<HttpClient> {
    HttpClient::new(config.server.as_str(), config.timing.request_timeout)
        .with_context(|| format!("failed to create a client for {}", config.server))
}

fn new_session(config: &SandboxConfig) -> Result<RasterSession> {
    let api = connect(config)?;
    let (env_w, env_h) = config.canvas.environment;
    let (values_w, values_h) = config.canvas.values;
    let (chart_w, chart_h) = config.canvas.chart;
    let canvases = Canvases {
        environment: RasterSurface::new(env_w, env_h),
        values: RasterSurface::new(values_w, values_h),
        chart: RasterSurface::new(chart_w, chart_h),
    };
    Ok(Session::new(api, canvases, config.timing).with_progress(config.progress))
}

fn run_dir(base: &Path) -> Result<PathBuf> {
    let dir = base.join(Local::now().format("%Y%m%d-%H%M%S").to_string());
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    Ok(dir)
}

fn save_canvases(session: &RasterSession, dir: &Path) -> Result<()> {
    let canvases = session.canvases();
    for (name, canvas) in [
        ("environment.png", &canvases.environment),
        ("values.png", &canvases.values),
        ("curve.png", &canvases.chart),
    ] {
        let path = dir.join(name);
        canvas
            .save_png(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    let policy = dir.join("policy.html");
    fs::write(&policy, session.policy_view().to_html())
        .with_context(|| format!("failed to write {}", policy.display()))?;
    Ok(())
}

fn report(err: &SessionError) {
    match err {
        SessionError::Client(client) if client.is_transport() => {
            tracing::error!(error = %err, "request failed");
        }
        _ => tracing::warn!(error = %err, "command failed"),
    }
}

/// Logs the progress estimate each time it crosses a tenth.
fn progress_logger(total_episodes: u32) -> impl FnMut(&ProgressEstimate) {
    let mut last_decile = None;
    move |progress: &ProgressEstimate| {
        let decile = (progress.percent / 10.0).floor() as u32;
        if last_decile != Some(decile) || progress.exact {
            last_decile = Some(decile);
            tracing::info!(
                "{} episode {}/{}",
                progress.label(),
                progress.episode,
                total_episodes
            );
        }
    }
}

fn print_stats(session: &RasterSession) {
    if let Some(stats) = session.stats() {
        println!(
            "{}  time {}  iterations {}  convergence {}  avg reward {}",
            session.status().message(),
            stats.elapsed_text(),
            stats.iterations,
            stats.convergence_text(),
            stats.avg_reward_text()
        );
    }
    println!("{}", session.policy_view());
}

/// Prints each replayed step and writes it out as a numbered PNG.
struct FrameWriter {
    dir: PathBuf,
    written: usize,
}

impl FrameWriter {
    fn new(dir: PathBuf) -> Self {
        Self { dir, written: 0 }
    }
}

impl PlaybackObserver<RasterSurface> for FrameWriter {
    fn on_step(&mut self, readout: &StepReadout, frame: &RasterSurface) {
        println!(
            "step {:>3}  {:<8}  reward {:>7}  total {:>7}{}",
            readout.index,
            readout.action,
            readout.reward_text(),
            readout.cumulative_text(),
            if readout.done { "  done" } else { "" }
        );
        let path = self.dir.join(format!("frame_{:03}.png", readout.index));
        match frame.save_png(&path) {
            Ok(()) => self.written += 1,
            Err(err) => tracing::warn!(path = %path.display(), error = %err, "failed to write frame"),
        }
    }

    fn on_hide(&mut self) {
        tracing::info!(frames = self.written, dir = %self.dir.display(), "replay finished");
    }
}

async fn demo(
    config: &SandboxConfig,
    env: EnvKind,
    algorithm: Algorithm,
    params: TrainParams,
) -> Result<()> {
    let mut session = new_session(config)?;
    let dir = run_dir(&config.out_dir)?;

    session
        .init(env)
        .await
        .with_context(|| format!("failed to initialize {env}"))?;
    session
        .train(algorithm, params, progress_logger(params.n_episodes))
        .await
        .with_context(|| format!("failed to train {algorithm}"))?;
    print_stats(&session);

    let frames = dir.join("frames");
    fs::create_dir_all(&frames)
        .with_context(|| format!("failed to create {}", frames.display()))?;
    let mut writer = FrameWriter::new(frames);
    let summary = session
        .run_episode(&mut writer)
        .await
        .context("failed to run an episode")?;
    println!(
        "episode: {} steps, total reward {:.2}{}",
        summary.steps,
        summary.total_reward,
        if summary.finished { "" } else { " (step limit)" }
    );

    save_canvases(&session, &dir)?;
    println!("canvases written to {}", dir.display());
    Ok(())
}

async fn print_logs(config: &SandboxConfig) -> Result<()> {
    let api = connect(config)?;
    let response = api.logs().await.context("failed to fetch the event log")?;
    let mut panel = LogPanel::default();
    panel.replace(&response.logs);
    for line in panel.lines() {
        println!("{line}");
    }
    Ok(())
}

fn print_algorithms() {
    for algorithm in Algorithm::ALL {
        let preset = TrainParams::preset(algorithm);
        println!(
            "{:<17} gamma {}  alpha {}  epsilon {}  episodes {}  n_step {}",
            algorithm.as_str(),
            preset.gamma,
            preset.alpha,
            preset.epsilon,
            preset.n_episodes,
            preset.n_step
        );
        println!("    {}", algorithm.description());
    }
}

fn print_envs() {
    for kind in EnvKind::ALL {
        println!("{:<13} {}", kind.as_str(), kind.description());
    }
}

/// A line typed at the interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Init(Option<EnvKind>),
    Train(Option<Algorithm>),
    Step(u8),
    Reset,
    Run,
    Logs,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Err("empty command".to_owned());
    };
    let argument = words.next();

    let input = match command.to_ascii_lowercase().as_str() {
        "init" => Input::Init(
            argument
                .map(str::parse::<EnvKind>)
                .transpose()
                .map_err(|e| e.to_string())?,
        ),
        "train" => Input::Train(
            argument
                .map(str::parse::<Algorithm>)
                .transpose()
                .map_err(|e| e.to_string())?,
        ),
        "reset" => Input::Reset,
        "run" => Input::Run,
        "logs" => Input::Logs,
        "help" | "?" => Input::Help,
        "quit" | "exit" | "q" => Input::Quit,
        other => match (Action::from_key(other), other.parse::<u8>()) {
            (Some(action), _) => Input::Step(action.id()),
            (None, Ok(id)) => Input::Step(id),
            (None, Err(_)) => return Err(format!("unknown command '{other}'")),
        },
    };
    Ok(input)
}

fn print_help() {
    println!("commands: init [env] | train [algorithm] | up/down/left/right (w/a/s/d) | <action id> | reset | run | logs | quit");
}

async fn execute(session: &mut RasterSession, input: Input, env: EnvKind, algorithm: Algorithm) {
    let result = match input {
        Input::Init(kind) => session.init(kind.unwrap_or(env)).await,
        Input::Train(chosen) => {
            let algorithm = chosen.unwrap_or(algorithm);
            let params = TrainParams::preset(algorithm);
            session
                .train(algorithm, params, progress_logger(params.n_episodes))
                .await
                .map(|_| print_stats(session))
        }
        Input::Step(action) => session.step(action).await.map(|outcome| {
            let readout = session.view().readout();
            println!(
                "reward {:.2}  done {}  state {}{}",
                outcome.reward,
                outcome.done,
                readout.state_text(),
                if outcome.reset { "  (reset)" } else { "" }
            );
        }),
        Input::Reset => session.reset().await.map(|()| {
            println!("state {}", session.view().readout().state_text());
        }),
        Input::Run => {
            let mut print_only = StepPrinter;
            session.run_episode(&mut print_only).await.map(|summary| {
                println!("episode: {} steps, total reward {:.2}", summary.steps, summary.total_reward);
            })
        }
        Input::Logs => session.poll_logs().await.map(|panel| {
            for line in panel.lines() {
                println!("{line}");
            }
        }),
        Input::Help | Input::Quit => {
            print_help();
            Ok(())
        }
    };
    if let Err(err) = result {
        report(&err);
    }
}

struct StepPrinter;

impl PlaybackObserver<RasterSurface> for StepPrinter {
    fn on_step(&mut self, readout: &StepReadout, _frame: &RasterSurface) {
        println!(
            "step {:>3}  {:<8}  total {:>7}",
            readout.index,
            readout.action,
            readout.cumulative_text()
        );
    }
}

async fn interactive(config: &SandboxConfig, env: EnvKind) -> Result<()> {
    let mut session = new_session(config)?;
    let dir = run_dir(&config.out_dir)?;
    let algorithm = Algorithm::QLearning;

    if let Err(err) = session.init(env).await {
        report(&err);
    }
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(config.timing.log_poll);
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut shown = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_input(&line) {
                    Ok(Input::Quit) => break,
                    Ok(input) => {
                        execute(&mut session, input, env, algorithm).await;
                        if let Err(err) = save_canvases(&session, &dir) {
                            tracing::warn!(error = %err, "failed to write canvases");
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
            _ = poll.tick() => {
                match session.poll_logs().await {
                    Ok(panel) => {
                        if panel.len() < shown {
                            shown = 0;
                        }
                        for line in &panel.lines()[shown..] {
                            println!("[log] {line}");
                        }
                        shown = panel.len();
                    }
                    Err(err) => tracing::debug!(error = %err, "log poll failed"),
                }
            }
        }
    }

    println!("canvases written to {}", dir.display());
    Ok(())
}
