//! Focus Timer - Pomodoro focus timer for the terminal
//!
//! Main entry point for the terminal application.
//!
//! # Overview
//!
//! This binary wires the library together. It initializes:
//! - Configuration loading ([`ConfigManager`], with `FOCUS_TIMER_*` overrides)
//! - Logging infrastructure (daily file rotation + optional console output)
//! - The key-value store holding settings and the session count
//! - A current-thread tokio runtime that runs the [`Controller`], the coach,
//!   the notifier, the console and the stdin reader as tasks
//!
//! # Execution Flow
//!
//! 1. Parse the command line and load `FocusTimer Config.yaml`
//! 2. Initialize logging → logs/focus-timer.<date>
//! 3. Load `FocusTimer Coach.yaml` (or the built-in rules)
//! 4. Open the store in the data directory
//! 5. Run the controller until `quit`, EOF or Ctrl+C
//! 6. Flush the session count, log metrics, shut the runtime down

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use focus_timer::models::CoachConfig;
use focus_timer::services::{Coach, FileStore, FocusState, KeyValueStore, MemoryStore, Notifier};
use focus_timer::ui::{
    Command, ConsoleSink, Controller, ControllerOptions, read_commands, run_console,
};
use focus_timer::{APP_NAME, ConfigManager, Metrics, TimerState, UserConfig, VERSION};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;

/// Pomodoro focus timer with a focus coach.
#[derive(Parser, Debug)]
#[command(name = "focus-timer", version, about)]
struct Cli {
    /// Directory holding FocusTimer Config.yaml and FocusTimer Coach.yaml
    #[arg(long, default_value = "FocusTimer Data")]
    config_dir: Utf8PathBuf,

    /// Directory of the settings and session count store
    #[arg(long)]
    data_dir: Option<Utf8PathBuf>,

    /// Directory for log files
    #[arg(long)]
    log_dir: Option<Utf8PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Also write logs to stderr
    #[arg(long)]
    console_log: bool,

    /// Keep settings and the session count in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Write the current configuration files to the config directory and exit
    #[arg(long)]
    init: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut UserConfig) {
        if self.debug {
            config.debug_mode = true;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.to_string();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.to_string();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let mut user_config = config_manager.load_user_config()?;
    cli.apply_overrides(&mut user_config);

    // Held until exit to keep the non-blocking file writer alive
    let _log_guard = focus_timer::logging::setup_logging(
        Utf8Path::new(&user_config.log_dir),
        APP_NAME,
        user_config.debug_mode,
        cli.console_log,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let coach_config = config_manager.load_coach_config()?;

    if cli.init {
        config_manager.save_user_config(&user_config)?;
        config_manager.save_coach_config(&coach_config)?;
        println!("Configuration written to {}", config_manager.config_dir());
        return Ok(());
    }

    let store: Arc<dyn KeyValueStore> = if cli.ephemeral {
        tracing::info!("Using in-memory store");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            FileStore::open(&user_config.data_dir)
                .with_context(|| format!("Failed to open store in {}", user_config.data_dir))?,
        )
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let metrics = Arc::new(Metrics::new());
    let final_state = runtime.block_on(run_app(
        store,
        coach_config,
        &user_config,
        Arc::clone(&metrics),
    ))?;

    tracing::info!(
        "Exiting in {} with {}s left, {} work sessions completed",
        final_state.mode,
        final_state.remaining_seconds,
        final_state.sessions_completed
    );
    metrics.log_summary();

    // The stdin reader may still be blocked on a read
    runtime.shutdown_timeout(Duration::from_millis(500));

    tracing::info!("Application shutdown complete");
    Ok(())
}

async fn run_app(
    store: Arc<dyn KeyValueStore>,
    coach_config: CoachConfig,
    user_config: &UserConfig,
    metrics: Arc<Metrics>,
) -> Result<TimerState> {
    let (console_tx, console_rx) = mpsc::unbounded_channel();
    let console_task = tokio::spawn(run_console(console_rx, tokio::io::stdout()));

    let notifier = Notifier::new(
        ConsoleSink::new(console_tx.clone()),
        user_config.sound_enabled,
        user_config.notifications_enabled,
        FocusState::new(),
    );
    let controller = Controller::new(
        store,
        Coach::new(coach_config),
        notifier,
        ControllerOptions::from(user_config),
        console_tx.clone(),
        metrics,
    )?;

    let (command_tx, command_rx) = mpsc::channel(32);
    let input_task = tokio::spawn(read_commands(
        BufReader::new(tokio::io::stdin()),
        command_tx.clone(),
        console_tx.clone(),
    ));
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received");
            let _ = command_tx.send(Command::Quit).await;
        }
    });

    let final_state = controller.run(command_rx).await;

    input_task.abort();
    drop(console_tx);
    if tokio::time::timeout(Duration::from_secs(1), console_task).await.is_err() {
        tracing::warn!("Console task did not finish in time");
    }

    Ok(final_state)
}
