// Session controller.
// Single-threaded state machine over the event queue: interprets input,
// drives search and the refresh scheduler, mutates pin state, issues
// background fetches, and snapshots its position at mutation boundaries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use ratatui::Terminal;
use ratatui::backend::Backend;
use tokio::sync::mpsc::UnboundedSender;

use crate::catalog::{self, ListRow, PinnedEntry};
use crate::config::{self, Config};
use crate::error::Result;
use crate::gh::{BrowseTarget, DataSource, Run};
use crate::search::{Corpus, ResultKind, SearchResult};
use crate::ui;

use super::events::{AppEvent, EventHandler};
use super::scheduler::RefreshScheduler;
use super::snapshot::{Snapshot, SnapshotStore, ViewMode};

/// Runs requested per fetch.
const RUN_FETCH_LIMIT: u32 = 25;

/// How long a toast stays on screen.
const TOAST_TTL: Duration = Duration::from_secs(5);

/// Which panel owns list-navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    Sidebar,
    #[default]
    Main,
}

/// Modal overlay; at most one open, and it takes all input while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Help,
    Search,
    Palette,
}

/// Keybinding profile from preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Keybindings {
    #[default]
    Default,
    Vim,
}

impl Keybindings {
    pub fn parse(value: &str) -> Self {
        match value {
            "vim" => Keybindings::Vim,
            _ => Keybindings::Default,
        }
    }
}

/// Loading state for async panel data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}

impl<T> LoadingState<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            LoadingState::Loaded(data) => Some(data),
            _ => None,
        }
    }
}

/// Toast severity, for styling only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

/// Transient status line message.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    created: Instant,
}

/// An action the command palette can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    ToggleAutoRefresh,
    TogglePin,
    OpenInBrowser,
    ToggleSidebar,
    TogglePinnedView,
    Help,
    Quit,
}

impl Command {
    pub const ALL: [Command; 8] = [
        Command::Refresh,
        Command::ToggleAutoRefresh,
        Command::TogglePin,
        Command::OpenInBrowser,
        Command::ToggleSidebar,
        Command::TogglePinnedView,
        Command::Help,
        Command::Quit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Command::Refresh => "Refresh runs",
            Command::ToggleAutoRefresh => "Toggle auto-refresh",
            Command::TogglePin => "Toggle pin",
            Command::OpenInBrowser => "Open in browser",
            Command::ToggleSidebar => "Toggle sidebar",
            Command::TogglePinnedView => "Toggle pinned view",
            Command::Help => "Show help",
            Command::Quit => "Quit",
        }
    }
}

/// The interactive session state machine. Processes one event at a time to
/// completion; background tasks only ever talk to it through the queue.
pub struct SessionController {
    pub config: Config,
    pub corpus: Corpus,

    pub view_mode: ViewMode,
    pub focus: FocusArea,
    /// Group ids from root to the current position, re-resolved on use.
    pub group_path: Vec<String>,
    pub selected_workflow: Option<String>,
    pub from_pinned_view: bool,

    pub overlay: Option<Overlay>,
    /// Active text filter in the focused panel.
    pub filter: Option<String>,
    pub search_input: String,
    pub search_results: Vec<SearchResult>,
    pub search_cursor: usize,
    pub palette_input: String,
    pub palette_matches: Vec<Command>,
    pub palette_cursor: usize,

    pub sidebar_visible: bool,
    pub rows: Vec<ListRow>,
    pub list_index: usize,
    pub pinned: Vec<PinnedEntry>,
    pub pinned_index: usize,
    pub runs: LoadingState<Vec<Run>>,
    pub run_index: usize,

    pub loading: bool,
    pub auto_refresh: bool,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    /// Monotonic fetch id; completions carrying an older value are stale
    /// and dropped on receipt.
    fetch_generation: u64,
    keys: Keybindings,
    matcher: SkimMatcherV2,
    scheduler: RefreshScheduler,
    store: SnapshotStore,
    source: Arc<dyn DataSource>,
    tx: UnboundedSender<AppEvent>,
}

impl SessionController {
    pub fn new(
        config: Config,
        source: Arc<dyn DataSource>,
        store: SnapshotStore,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        let corpus = Corpus::index(&config);
        let pinned = catalog::list_pinned(&config);
        let rows = catalog::root_rows(&config);
        let keys = Keybindings::parse(&config.preferences.keybindings);
        let auto_refresh = config.preferences.refresh_interval > 0;
        let scheduler = RefreshScheduler::new(tx.clone());

        Self {
            config,
            corpus,
            view_mode: ViewMode::default(),
            focus: FocusArea::default(),
            group_path: Vec::new(),
            selected_workflow: None,
            from_pinned_view: false,
            overlay: None,
            filter: None,
            search_input: String::new(),
            search_results: Vec::new(),
            search_cursor: 0,
            palette_input: String::new(),
            palette_matches: Command::ALL.to_vec(),
            palette_cursor: 0,
            sidebar_visible: true,
            rows,
            list_index: 0,
            pinned,
            pinned_index: 0,
            runs: LoadingState::Idle,
            run_index: 0,
            loading: false,
            auto_refresh,
            toast: None,
            should_quit: false,
            fetch_generation: 0,
            keys,
            matcher: SkimMatcherV2::default(),
            scheduler,
            store,
            source,
            tx,
        }
    }

    /// Restore a persisted position. The id path is re-resolved against the
    /// current catalog, never trusted blindly; a run-output restore
    /// re-issues the fetch so the session lands on live data.
    pub fn restore(&mut self, snapshot: Snapshot) {
        let resolved = catalog::resolve_group_path(&self.config.groups, &snapshot.group_path);
        if !resolved.complete {
            tracing::info!(
                "restored group path {:?} only partially resolves",
                snapshot.group_path
            );
        }
        self.group_path = resolved.ids();
        self.from_pinned_view = snapshot.from_pinned_view;
        self.rebuild_rows();
        self.list_index = snapshot.list_index.min(self.rows.len().saturating_sub(1));
        self.pinned_index = snapshot
            .pinned_list_index
            .min(self.pinned.len().saturating_sub(1));

        match snapshot.view_state {
            ViewMode::ViewingRunOutput => match snapshot.selected_workflow {
                Some(workflow) => {
                    self.view_mode = ViewMode::ViewingRunOutput;
                    self.selected_workflow = Some(workflow.clone());
                    self.spawn_fetch(workflow);
                    self.arm_scheduler();
                }
                None => self.view_mode = ViewMode::BrowsingGroups,
            },
            mode => self.view_mode = mode,
        }
    }

    /// Run the event loop until quit.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<impl Backend>,
        events: &mut EventHandler,
    ) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| ui::draw(frame, self))?;
            match events.next().await {
                Some(event) => self.handle_event(event),
                None => break,
            }
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.prune_toast(),
            AppEvent::RefreshTick => self.on_refresh_tick(),
            AppEvent::RunsLoaded {
                generation,
                workflow,
                result,
            } => self.on_runs_loaded(generation, workflow, result),
            AppEvent::BrowseFinished { error } => {
                if let Some(error) = error {
                    self.set_toast(format!("browser open failed: {error}"), ToastLevel::Error);
                }
            }
            AppEvent::CatalogChecked {
                repo_exists,
                unknown_workflows,
            } => self.on_catalog_checked(repo_exists, unknown_workflows),
        }
    }

    // Input routing. Priority: modal overlay, then active filter, then
    // global shortcuts, then the panel owning focus.
    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(overlay) = self.overlay {
            self.handle_overlay_key(overlay, key);
            return;
        }
        if self.filter.is_some() {
            self.handle_filter_key(key);
            return;
        }
        if self.handle_global_key(key) {
            return;
        }
        self.handle_panel_key(key);
    }

    fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyEvent) {
        match overlay {
            Overlay::Help => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.overlay = None;
                }
                _ => {}
            },
            Overlay::Search => match key.code {
                KeyCode::Esc => self.close_search(),
                KeyCode::Enter => self.commit_search(),
                KeyCode::Up => self.search_cursor = self.search_cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.search_cursor + 1 < self.search_results.len() {
                        self.search_cursor += 1;
                    }
                }
                KeyCode::Backspace => {
                    self.search_input.pop();
                    self.requery_search();
                }
                KeyCode::Char(c) => {
                    self.search_input.push(c);
                    self.requery_search();
                }
                _ => {}
            },
            Overlay::Palette => match key.code {
                KeyCode::Esc => self.overlay = None,
                KeyCode::Enter => {
                    if let Some(command) = self.palette_matches.get(self.palette_cursor).copied() {
                        self.overlay = None;
                        self.execute_command(command);
                    }
                }
                KeyCode::Up => self.palette_cursor = self.palette_cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.palette_cursor + 1 < self.palette_matches.len() {
                        self.palette_cursor += 1;
                    }
                }
                KeyCode::Backspace => {
                    self.palette_input.pop();
                    self.refilter_palette();
                }
                KeyCode::Char(c) => {
                    self.palette_input.push(c);
                    self.refilter_palette();
                }
                _ => {}
            },
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.clear_filter(),
            KeyCode::Enter => self.activate_selection(),
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Backspace => {
                let now_empty = match self.filter.as_mut() {
                    Some(text) => {
                        text.pop();
                        text.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.clear_filter();
                } else {
                    self.rebuild_rows();
                }
            }
            KeyCode::Char(c) => {
                if let Some(text) = self.filter.as_mut() {
                    text.push(c);
                }
                self.rebuild_rows();
            }
            _ => {}
        }
    }

    fn handle_global_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Char('?') => self.overlay = Some(Overlay::Help),
            KeyCode::Char('/') => self.open_search(),
            KeyCode::Char(':') => self.open_palette(),
            KeyCode::Char('p') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.open_palette()
            }
            KeyCode::Char('b') => self.toggle_sidebar(),
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Char('r') => self.manual_refresh(),
            KeyCode::Char('a') => self.toggle_auto_refresh(),
            _ => return false,
        }
        true
    }

    fn handle_panel_key(&mut self, key: KeyEvent) {
        let vim = self.keys == Keybindings::Vim;
        match key.code {
            KeyCode::Up => self.move_cursor(-1),
            KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') if vim => self.move_cursor(-1),
            KeyCode::Char('j') if vim => self.move_cursor(1),
            KeyCode::Enter => self.activate_selection(),
            KeyCode::Char('l') if vim => self.activate_selection(),
            KeyCode::Esc | KeyCode::Backspace => self.back(),
            KeyCode::Char('h') if vim => self.back(),
            KeyCode::Char('f') => self.start_filter(),
            KeyCode::Char('p') => self.toggle_pin_current(),
            KeyCode::Char('P') => self.toggle_pinned_view(),
            KeyCode::Char('o') => self.open_in_browser(),
            _ => {}
        }
    }

    // Cursor movement for whichever list owns focus.
    fn move_cursor(&mut self, delta: i64) {
        let (index, len) = match (self.focus, self.view_mode) {
            (FocusArea::Sidebar, _) | (_, ViewMode::ViewingPinned) => {
                (&mut self.pinned_index, self.pinned.len())
            }
            (_, ViewMode::BrowsingGroups) => (&mut self.list_index, self.rows.len()),
            (_, ViewMode::ViewingRunOutput) => {
                let len = self.runs.data().map(Vec::len).unwrap_or(0);
                (&mut self.run_index, len)
            }
        };
        if len == 0 {
            return;
        }
        let next = index.saturating_add_signed(delta as isize).min(len - 1);
        *index = next;
    }

    /// Enter on whatever the focused list has selected.
    fn activate_selection(&mut self) {
        if self.focus == FocusArea::Sidebar || self.view_mode == ViewMode::ViewingPinned {
            if let Some(entry) = self.pinned.get(self.pinned_index).cloned() {
                self.group_path = entry.group_path;
                self.rebuild_rows();
                self.select_workflow(entry.file, true);
            }
            return;
        }
        match self.view_mode {
            ViewMode::BrowsingGroups => match self.rows.get(self.list_index).cloned() {
                Some(ListRow::GroupRef { id, .. }) => self.enter_group(id),
                Some(ListRow::WorkflowRef { file, .. }) => self.select_workflow(file, false),
                None => {}
            },
            ViewMode::ViewingRunOutput => self.open_in_browser(),
            ViewMode::ViewingPinned => {}
        }
    }

    /// Descend into a child group of the current position.
    fn enter_group(&mut self, id: String) {
        self.group_path.push(id);
        self.filter = None;
        self.rebuild_rows();
        self.list_index = 0;
        self.persist();
    }

    /// One step of back navigation. An active filter absorbs the first
    /// back; leaving run output returns to wherever the workflow was
    /// entered from.
    fn back(&mut self) {
        if self.filter.is_some() {
            self.clear_filter();
            self.persist();
            return;
        }
        match self.view_mode {
            ViewMode::ViewingRunOutput => {
                self.view_mode = if self.from_pinned_view {
                    ViewMode::ViewingPinned
                } else {
                    ViewMode::BrowsingGroups
                };
                self.selected_workflow = None;
                self.runs = LoadingState::Idle;
                self.run_index = 0;
                self.loading = false;
                // Invalidate any in-flight fetch for the abandoned selection.
                self.fetch_generation += 1;
                self.scheduler.stop();
            }
            ViewMode::ViewingPinned => self.view_mode = ViewMode::BrowsingGroups,
            ViewMode::BrowsingGroups => {
                if self.group_path.pop().is_some() {
                    self.rebuild_rows();
                    self.list_index = 0;
                }
            }
        }
        self.persist();
    }

    /// Switch to run output for a workflow and fetch its history. Persisted
    /// immediately so a restored session lands back here even if the fetch
    /// never completes.
    fn select_workflow(&mut self, file: String, from_pinned: bool) {
        self.filter = None;
        self.view_mode = ViewMode::ViewingRunOutput;
        self.selected_workflow = Some(file.clone());
        self.from_pinned_view = from_pinned;
        self.run_index = 0;
        self.runs = LoadingState::Loading;
        self.spawn_fetch(file);
        self.arm_scheduler();
        self.persist();
    }

    fn spawn_fetch(&mut self, workflow: String) {
        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        self.loading = true;
        if self.runs.data().is_none() {
            self.runs = LoadingState::Loading;
        }
        let source = self.source.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = source
                .list_runs(&workflow, RUN_FETCH_LIMIT)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::RunsLoaded {
                generation,
                workflow,
                result,
            });
        });
    }

    fn on_runs_loaded(
        &mut self,
        generation: u64,
        workflow: String,
        result: std::result::Result<Vec<Run>, String>,
    ) {
        if generation != self.fetch_generation {
            tracing::debug!(generation, "dropping stale fetch completion");
            return;
        }
        self.loading = false;
        if self.selected_workflow.as_deref() != Some(workflow.as_str()) {
            return;
        }
        match result {
            Ok(runs) => {
                self.run_index = self.run_index.min(runs.len().saturating_sub(1));
                self.runs = LoadingState::Loaded(runs);
            }
            Err(message) => {
                // Surfaced in the run panel; the view itself stays put.
                self.runs = LoadingState::Error(message);
            }
        }
    }

    fn on_refresh_tick(&mut self) {
        if !self.auto_refresh || self.view_mode != ViewMode::ViewingRunOutput {
            return;
        }
        let Some(workflow) = self.selected_workflow.clone() else {
            return;
        };
        if !self.loading {
            self.spawn_fetch(workflow);
        }
        // Re-arm measured from now, so ticks never overlap a slow fetch.
        self.arm_scheduler();
    }

    /// User-initiated refresh. Also restarts the timer so the next
    /// automatic tick counts from this refresh.
    fn manual_refresh(&mut self) {
        let Some(workflow) = self.selected_workflow.clone() else {
            return;
        };
        if self.loading {
            tracing::debug!("manual refresh ignored; fetch already in flight");
            return;
        }
        self.spawn_fetch(workflow);
        self.arm_scheduler();
    }

    fn toggle_auto_refresh(&mut self) {
        if self.refresh_interval().is_zero() {
            self.set_toast(
                "auto-refresh unavailable: refresh interval is 0".into(),
                ToastLevel::Info,
            );
            return;
        }
        self.auto_refresh = !self.auto_refresh;
        if self.auto_refresh {
            if self.view_mode == ViewMode::ViewingRunOutput && self.selected_workflow.is_some() {
                self.arm_scheduler();
            }
            self.set_toast("auto-refresh on".into(), ToastLevel::Info);
        } else {
            self.scheduler.stop();
            self.set_toast("auto-refresh off".into(), ToastLevel::Info);
        }
    }

    fn arm_scheduler(&mut self) {
        if self.auto_refresh {
            self.scheduler.start(self.refresh_interval());
        }
    }

    fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.config.preferences.refresh_interval)
    }

    pub fn scheduler_active(&self) -> bool {
        self.scheduler.is_active()
    }

    fn toggle_sidebar(&mut self) {
        self.sidebar_visible = !self.sidebar_visible;
        if !self.sidebar_visible {
            self.focus = FocusArea::Main;
        }
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusArea::Main if self.sidebar_visible => FocusArea::Sidebar,
            _ => FocusArea::Main,
        };
    }

    /// Promote the pinned list to the main panel, or drop back out of it.
    fn toggle_pinned_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::ViewingPinned => ViewMode::BrowsingGroups,
            _ => ViewMode::ViewingPinned,
        };
        self.filter = None;
        self.persist();
    }

    /// Flip the pin of whatever workflow the focused list has selected and
    /// persist the configuration to its origin file. A failed write keeps
    /// the in-memory change; the next successful save carries it.
    fn toggle_pin_current(&mut self) {
        let target = if self.focus == FocusArea::Sidebar || self.view_mode == ViewMode::ViewingPinned
        {
            self.pinned
                .get(self.pinned_index)
                .map(|entry| (entry.group_path.clone(), entry.file.clone()))
        } else {
            match self.rows.get(self.list_index) {
                Some(ListRow::WorkflowRef { file, .. }) => {
                    Some((self.group_path.clone(), file.clone()))
                }
                _ => None,
            }
        };
        let Some((ids, file)) = target else {
            return;
        };

        match catalog::toggle_pin(&mut self.config, &ids, &file) {
            Ok(pinned) => {
                self.pinned = catalog::list_pinned(&self.config);
                self.pinned_index = self.pinned_index.min(self.pinned.len().saturating_sub(1));
                self.rebuild_rows();
                match config::save(&self.config) {
                    Ok(()) => {
                        let verb = if pinned { "pinned" } else { "unpinned" };
                        self.set_toast(format!("{verb} {file}"), ToastLevel::Info);
                    }
                    Err(err) => {
                        // In-memory state stays applied either way.
                        self.set_toast(
                            format!("pin change not saved: {err}"),
                            ToastLevel::Error,
                        );
                    }
                }
            }
            Err(err) => self.set_toast(err.to_string(), ToastLevel::Error),
        }
    }

    fn open_in_browser(&mut self) {
        let target = match self.view_mode {
            ViewMode::ViewingRunOutput => match self
                .runs
                .data()
                .and_then(|runs| runs.get(self.run_index))
            {
                Some(run) => Some(BrowseTarget::Run(run.id)),
                None => self
                    .selected_workflow
                    .clone()
                    .map(BrowseTarget::Workflow),
            },
            ViewMode::ViewingPinned => self
                .pinned
                .get(self.pinned_index)
                .map(|e| BrowseTarget::Workflow(e.file.clone())),
            ViewMode::BrowsingGroups => match self.rows.get(self.list_index) {
                Some(ListRow::WorkflowRef { file, .. }) => {
                    Some(BrowseTarget::Workflow(file.clone()))
                }
                _ => None,
            },
        };
        let Some(target) = target else {
            return;
        };

        let source = self.source.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let error = source.open_in_browser(&target).await.err().map(|e| e.to_string());
            let _ = tx.send(AppEvent::BrowseFinished { error });
        });
    }

    // Search overlay.

    fn open_search(&mut self) {
        self.overlay = Some(Overlay::Search);
        self.search_input.clear();
        self.search_results.clear();
        self.search_cursor = 0;
    }

    fn close_search(&mut self) {
        self.overlay = None;
        self.search_input.clear();
        self.search_results.clear();
    }

    fn requery_search(&mut self) {
        self.search_results = self.corpus.query(&self.search_input);
        self.search_cursor = 0;
    }

    /// Navigate to the selected search result, resolving its path against
    /// the current catalog rather than any cached reference.
    fn commit_search(&mut self) {
        let Some(result) = self.search_results.get(self.search_cursor).cloned() else {
            return;
        };
        self.close_search();

        let resolved = catalog::resolve_group_path(&self.config.groups, &result.group_path);
        if !resolved.complete {
            self.set_toast(
                format!("{} is no longer in the catalog", result.name),
                ToastLevel::Error,
            );
            return;
        }
        self.group_path = resolved.ids();
        self.filter = None;
        self.focus = FocusArea::Main;
        self.rebuild_rows();
        self.list_index = 0;

        match result.kind {
            ResultKind::Group => {
                self.view_mode = ViewMode::BrowsingGroups;
                self.persist();
            }
            ResultKind::Workflow => {
                if let Some(file) = result.workflow {
                    self.select_workflow(file, false);
                }
            }
        }
    }

    // Command palette.

    fn open_palette(&mut self) {
        self.overlay = Some(Overlay::Palette);
        self.palette_input.clear();
        self.palette_matches = Command::ALL.to_vec();
        self.palette_cursor = 0;
    }

    fn refilter_palette(&mut self) {
        let needle = self.palette_input.to_lowercase();
        if needle.is_empty() {
            self.palette_matches = Command::ALL.to_vec();
        } else {
            let mut scored: Vec<(i64, Command)> = Command::ALL
                .iter()
                .filter_map(|cmd| {
                    self.matcher
                        .fuzzy_match(&cmd.label().to_lowercase(), &needle)
                        .map(|score| (score, *cmd))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            self.palette_matches = scored.into_iter().map(|(_, cmd)| cmd).collect();
        }
        self.palette_cursor = 0;
    }

    fn execute_command(&mut self, command: Command) {
        match command {
            Command::Refresh => self.manual_refresh(),
            Command::ToggleAutoRefresh => self.toggle_auto_refresh(),
            Command::TogglePin => self.toggle_pin_current(),
            Command::OpenInBrowser => self.open_in_browser(),
            Command::ToggleSidebar => self.toggle_sidebar(),
            Command::TogglePinnedView => self.toggle_pinned_view(),
            Command::Help => self.overlay = Some(Overlay::Help),
            Command::Quit => self.quit(),
        }
    }

    // Filtering within the focused panel.

    fn start_filter(&mut self) {
        if self.view_mode == ViewMode::BrowsingGroups {
            self.filter = Some(String::new());
        }
    }

    fn clear_filter(&mut self) {
        self.filter = None;
        self.rebuild_rows();
    }

    /// Rebuild the visible rows for the current position, applying any
    /// active filter. Called whenever the path, pins, or filter change.
    pub fn rebuild_rows(&mut self) {
        let resolved = catalog::resolve_group_path(&self.config.groups, &self.group_path);
        if !resolved.complete {
            // The underlying catalog changed beneath us; fall back to the
            // resolvable prefix.
            self.group_path = resolved.ids();
        }
        let mut rows = match resolved.last() {
            Some(group) => catalog::group_rows(group),
            None => catalog::root_rows(&self.config),
        };
        if let Some(filter) = &self.filter {
            let needle = filter.to_lowercase();
            rows.retain(|row| row.label().to_lowercase().contains(&needle));
        }
        self.rows = rows;
        self.list_index = self.list_index.min(self.rows.len().saturating_sub(1));
    }

    /// Breadcrumb names for the current position.
    pub fn breadcrumb(&self) -> Vec<String> {
        catalog::resolve_group_path(&self.config.groups, &self.group_path).names()
    }

    fn on_catalog_checked(&mut self, repo_exists: bool, unknown_workflows: Vec<String>) {
        if !repo_exists {
            self.set_toast(
                format!("repository {} not found", self.config.repository),
                ToastLevel::Error,
            );
            return;
        }
        if !unknown_workflows.is_empty() {
            tracing::warn!(
                "catalog references workflows missing from the repository: {}",
                unknown_workflows.join(", ")
            );
            self.set_toast(
                format!(
                    "{} catalog workflow(s) not found in repository",
                    unknown_workflows.len()
                ),
                ToastLevel::Info,
            );
        }
    }

    fn set_toast(&mut self, message: String, level: ToastLevel) {
        self.toast = Some(Toast {
            message,
            level,
            created: Instant::now(),
        });
    }

    fn prune_toast(&mut self) {
        if let Some(toast) = &self.toast {
            if toast.created.elapsed() > TOAST_TTL {
                self.toast = None;
            }
        }
    }

    fn quit(&mut self) {
        self.scheduler.stop();
        self.persist();
        self.should_quit = true;
    }

    /// Write the current position to the snapshot store. Best effort: a
    /// failed write becomes a toast, never a rollback.
    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(err) = self.store.save(&snapshot) {
            self.set_toast(format!("session state not saved: {err}"), ToastLevel::Error);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            view_state: self.view_mode,
            group_path: self.group_path.clone(),
            selected_workflow: self.selected_workflow.clone(),
            from_pinned_view: self.from_pinned_view,
            list_index: self.list_index,
            pinned_list_index: self.pinned_index,
        }
    }

    /// Current fetch generation, exposed for completion tests.
    #[cfg(test)]
    pub(crate) fn generation(&self) -> u64 {
        self.fetch_generation
    }
}
