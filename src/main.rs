// surge entry point.
// Parses the command line, resolves the layered configuration, restores the
// last session, and runs the interactive loop.

mod catalog;
mod config;
mod error;
mod gh;
mod search;
mod session;
mod ui;

use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use config::paths;
use error::SurgeError;
use gh::{DataSource, GhCli};
use session::{AppEvent, EventHandler, SessionController, SnapshotStore};

/// Browse grouped GitHub Actions workflows and their run history.
#[derive(Parser, Debug)]
#[command(name = "surge", version, about)]
struct Cli {
    /// Repository in owner/name form, overriding configuration.
    #[arg(long)]
    repo: Option<String>,

    /// Load exactly this configuration file instead of the tier chain.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session-state file location.
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Do not restore or persist session state.
    #[arg(long)]
    no_state: bool,

    /// Auto-refresh interval in seconds (0 disables).
    #[arg(long)]
    interval: Option<u64>,

    /// Write debug logs to the state directory.
    #[arg(long)]
    verbose: bool,
}

fn setup_verbose_logging() -> error::Result<()> {
    let Some(path) = paths::log_path() else {
        return Err(SurgeError::Other(
            "cannot determine a log directory".into(),
        ));
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("surge=debug")),
        )
        .with_writer(file)
        .with_ansi(false)
        .init();
    tracing::info!("surge v{} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Background check that the configured repository and its workflow files
/// actually exist; results come back as a single event.
fn spawn_catalog_check(
    source: Arc<dyn DataSource>,
    config: &config::Config,
    tx: tokio::sync::mpsc::UnboundedSender<AppEvent>,
) {
    let repo = config.repository.clone();
    let referenced = collect_workflow_files(&config.groups);
    tokio::spawn(async move {
        let repo_exists = match source.repository_exists(&repo).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::warn!("repository check failed: {err}");
                return;
            }
        };
        let unknown_workflows = if repo_exists {
            match source.list_workflow_files(&repo).await {
                Ok(files) => {
                    let known: HashSet<String> = files.into_iter().collect();
                    referenced
                        .into_iter()
                        .filter(|file| !known.contains(file))
                        .collect()
                }
                Err(err) => {
                    tracing::warn!("workflow listing failed: {err}");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        let _ = tx.send(AppEvent::CatalogChecked {
            repo_exists,
            unknown_workflows,
        });
    });
}

fn collect_workflow_files(groups: &[config::Group]) -> Vec<String> {
    let mut files = Vec::new();
    let mut stack: Vec<&config::Group> = groups.iter().collect();
    while let Some(group) = stack.pop() {
        for wf in catalog::workflow_refs(group) {
            if !files.contains(&wf.file) {
                files.push(wf.file);
            }
        }
        stack.extend(group.groups.iter());
    }
    files
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();

    if args.verbose {
        if let Err(err) = setup_verbose_logging() {
            eprintln!("warning: verbose logging unavailable: {err}");
        }
    }

    let mut cfg = match config::resolve(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(SurgeError::NoConfig) => {
            eprintln!("No configuration found.");
            eprintln!("Create a .surge.yml in this directory (or pass --config) with a");
            eprintln!("repository and at least one group, for example:");
            eprintln!();
            eprintln!("  repository: owner/name");
            eprintln!("  groups:");
            eprintln!("    - id: ci");
            eprintln!("      name: CI");
            eprintln!("      workflows: [ci.yml]");
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    // Command-line overrides come last, above even the environment.
    if let Some(repo) = args.repo {
        cfg.repository = repo;
    }
    if let Some(interval) = args.interval {
        cfg.preferences.refresh_interval = interval;
    }

    if let Err(err) = config::validate(&cfg) {
        eprintln!("Error: {err}");
        return ExitCode::FAILURE;
    }

    let store = if args.no_state {
        SnapshotStore::disabled()
    } else {
        match args.state_file {
            Some(path) => SnapshotStore::at(path),
            None => SnapshotStore::new(),
        }
    };

    match run_tui(cfg, store).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run_tui(cfg: config::Config, store: SnapshotStore) -> error::Result<()> {
    // Restore the terminal even when we panic mid-session.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let source: Arc<dyn DataSource> = Arc::new(GhCli::new(cfg.repository.clone()));
    let mut events = EventHandler::new(Duration::from_millis(100));

    spawn_catalog_check(source.clone(), &cfg, events.sender());

    let mut controller = SessionController::new(cfg, source, store.clone(), events.sender());
    controller.restore(store.load());

    let result = controller.run(&mut terminal, &mut events).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}
