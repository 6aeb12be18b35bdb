// Event plumbing for the session loop.
// A dedicated input thread pumps terminal events and a coarse tick into the
// controller's channel; background tasks post completion events the same way.

use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as TerminalEvent, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::gh::Run;

/// Events processed by the session controller, one at a time to completion.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    /// Coarse cadence for toast pruning and redraw when idle.
    Tick,
    /// The refresh scheduler fired.
    RefreshTick,
    /// A background run fetch completed. Errors travel as strings so the
    /// event stays cheap to clone around.
    RunsLoaded {
        generation: u64,
        workflow: String,
        result: std::result::Result<Vec<Run>, String>,
    },
    /// An open-in-browser request finished.
    BrowseFinished { error: Option<String> },
    /// Startup catalog check against the live repository finished.
    CatalogChecked {
        repo_exists: bool,
        unknown_workflows: Vec<String>,
    },
}

/// Owns the input thread and the event channel.
pub struct EventHandler {
    rx: UnboundedReceiver<AppEvent>,
    tx: UnboundedSender<AppEvent>,
}

impl EventHandler {
    /// Spawn the input pump. `tick_rate` bounds how long the loop blocks
    /// waiting for input before emitting a Tick.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let input_tx = tx.clone();
        thread::spawn(move || input_loop(input_tx, tick_rate));
        Self { rx, tx }
    }

    /// Sender handle for background tasks and the refresh scheduler.
    pub fn sender(&self) -> UnboundedSender<AppEvent> {
        self.tx.clone()
    }

    /// Next event; None once every sender is gone.
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

fn input_loop(tx: UnboundedSender<AppEvent>, tick_rate: Duration) {
    loop {
        let event = match event::poll(tick_rate) {
            Ok(true) => match event::read() {
                Ok(TerminalEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    Some(AppEvent::Key(key))
                }
                Ok(TerminalEvent::Resize(_, _)) => Some(AppEvent::Resize),
                Ok(_) => None,
                Err(_) => None,
            },
            Ok(false) => Some(AppEvent::Tick),
            Err(_) => None,
        };
        if let Some(event) = event {
            if tx.send(event).is_err() {
                // Controller dropped its receiver: session is over.
                break;
            }
        }
    }
}
