use std::path::PathBuf;
use std::sync::Arc;

use clap::Subcommand;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use wayguide_core::storage::MessagesConfig;
use wayguide_core::{
    CommandDispatcher, Config, ConfigStore, HeadingTiming, Position, Presenter, StartError,
    SystemClock, Unreachable, WalkEngine, WalkObserver, WaypointStore,
};

#[derive(Subcommand)]
pub enum TourAction {
    /// Start a guided tour and follow it to the end (Ctrl-C stops)
    Run {
        /// Display name used for {player} placeholders
        #[arg(long, default_value = "guest")]
        user: String,
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the configured tour as JSON
    Status {
        /// Override the config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

pub fn run(action: TourAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TourAction::Run { user, config } => run_tour(user, config),
        TourAction::Status { config } => status(config),
    }
}

/// Prints walk output to the terminal.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn relocate(&self, _user: Uuid, position: &Position) -> Result<(), Unreachable> {
        println!(
            "-> {} ({:.1}, {:.1}, {:.1})",
            position.space, position.x, position.y, position.z
        );
        Ok(())
    }

    fn show_message(&self, _user: Uuid, lines: &[String]) -> Result<(), Unreachable> {
        for line in lines {
            println!("   {line}");
        }
        Ok(())
    }

    fn show_heading(
        &self,
        _user: Uuid,
        title: &str,
        progress: &str,
        _timing: HeadingTiming,
    ) -> Result<(), Unreachable> {
        if !title.is_empty() {
            println!("== {title} ==");
        }
        println!("   [{progress}]");
        Ok(())
    }

    fn clear_heading(&self, _user: Uuid) {}
}

/// Echoes completion commands instead of handing them to a server.
struct ConsoleDispatcher;

impl CommandDispatcher for ConsoleDispatcher {
    fn dispatch(&self, command: &str) {
        println!("$ {command}");
    }
}

/// Wakes the run loop when the walk ends either way.
struct EndSignal {
    tx: mpsc::UnboundedSender<()>,
}

impl WalkObserver for EndSignal {
    fn on_stop(
        &self,
        _user: Uuid,
        _started_at: chrono::DateTime<chrono::Utc>,
        _steps_completed: usize,
        _total: usize,
    ) {
        let _ = self.tx.send(());
    }

    fn on_complete(
        &self,
        _user: Uuid,
        _started_at: chrono::DateTime<chrono::Utc>,
        _total_steps: usize,
    ) {
        let _ = self.tx.send(());
    }
}

fn run_tour(name: String, config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config)?;
    let cfg = Config::load_from(&path)?;
    let messages = cfg.messages.clone();
    let store = Arc::new(ConfigStore::new(path));

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let engine = WalkEngine::new(
            cfg.walk_settings(),
            store,
            Arc::new(ConsolePresenter),
            Arc::new(ConsoleDispatcher),
            Arc::new(SystemClock),
        )?;
        let (tx, mut rx) = mpsc::unbounded_channel();
        engine.register_observer(Arc::new(EndSignal { tx }));

        let user = Uuid::new_v4();
        if let Err(rejection) = engine.start(user, &name) {
            println!("{}", rejection_text(&messages, &rejection));
            return Ok(());
        }

        tokio::select! {
            _ = rx.recv() => {}
            _ = tokio::signal::ctrl_c() => {
                let _ = engine.stop(user);
            }
        }
        engine.shutdown();
        Ok(())
    })
}

fn rejection_text(messages: &MessagesConfig, rejection: &StartError) -> String {
    match rejection {
        StartError::AlreadyActive => messages.already_active.clone(),
        StartError::OnCooldown { remaining_secs } => messages.on_cooldown_text(*remaining_secs),
        StartError::NotConfigured => messages.not_configured.clone(),
        StartError::Vetoed { reason } => reason
            .clone()
            .unwrap_or_else(|| rejection.to_string()),
    }
}

#[derive(Serialize)]
struct StatusSummary {
    title: String,
    waypoints: usize,
    step_delay_secs: u64,
    cooldown_secs: u64,
    freeze_movement: bool,
    block_commands: bool,
}

fn status(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = super::config_path(config)?;
    let cfg = Config::load_from(&path)?;
    let store = ConfigStore::new(path);
    let sequence = store.load_sequence()?;

    let summary = StatusSummary {
        title: cfg.walk.title.clone(),
        waypoints: sequence.len(),
        step_delay_secs: cfg.walk.step_delay_secs,
        cooldown_secs: cfg.walk.cooldown_secs,
        freeze_movement: cfg.walk.freeze_movement,
        block_commands: cfg.walk.block_commands,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
