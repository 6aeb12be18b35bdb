// UI module for rendering the TUI.
// Layout: breadcrumb header, optional pinned sidebar, main panel, status
// bar. Overlays render last, on top of everything.

mod breadcrumb;
mod list;
mod overlay;
pub mod theme;

use ratatui::{prelude::*, widgets::*};

use crate::session::{FocusArea, Overlay, SessionController, ToastLevel, ViewMode};

use theme::Theme;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut SessionController) {
    let theme = Theme::named(&app.config.preferences.theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Breadcrumb header
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    breadcrumb::draw_breadcrumb(
        frame,
        &app.config.repository,
        &app.breadcrumb(),
        app.selected_workflow.as_deref(),
        &theme,
        chunks[0],
    );

    draw_content(frame, app, &theme, chunks[1]);
    draw_status_bar(frame, app, &theme, chunks[2]);

    match app.overlay {
        Some(Overlay::Help) => overlay::draw_help(frame, &theme, frame.area()),
        Some(Overlay::Search) => overlay::draw_search(
            frame,
            &app.search_input,
            &app.search_results,
            app.search_cursor,
            &theme,
            frame.area(),
        ),
        Some(Overlay::Palette) => overlay::draw_palette(
            frame,
            &app.palette_input,
            &app.palette_matches,
            app.palette_cursor,
            &theme,
            frame.area(),
        ),
        None => {}
    }
}

/// Content area: sidebar on the left when visible, the view-owned panel on
/// the right.
fn draw_content(frame: &mut Frame, app: &mut SessionController, theme: &Theme, area: Rect) {
    let main_area = if app.sidebar_visible {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(1)])
            .split(area);
        list::render_pinned(
            frame,
            &app.pinned,
            app.pinned_index,
            app.focus == FocusArea::Sidebar,
            theme,
            columns[0],
        );
        columns[1]
    } else {
        area
    };

    match app.view_mode {
        ViewMode::BrowsingGroups => list::render_group_rows(
            frame,
            &app.rows,
            app.list_index,
            app.filter.as_deref(),
            app.focus == FocusArea::Main,
            theme,
            main_area,
        ),
        ViewMode::ViewingPinned => list::render_pinned(
            frame,
            &app.pinned,
            app.pinned_index,
            true,
            theme,
            main_area,
        ),
        ViewMode::ViewingRunOutput => {
            list::render_runs(frame, &app.runs, app.run_index, app.loading, theme, main_area)
        }
    }
}

/// Status bar: key hints on the left, auto-refresh state and toast on the
/// right.
fn draw_status_bar(frame: &mut Frame, app: &SessionController, theme: &Theme, area: Rect) {
    if let Some(toast) = &app.toast {
        let color = match toast.level {
            ToastLevel::Info => theme.accent,
            ToastLevel::Error => theme.failure,
        };
        let line = Line::from(Span::styled(
            format!(" {}", toast.message),
            Style::default().fg(color),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Move", Style::default().fg(theme.dim)),
        Span::raw("  ↵ "),
        Span::styled("Select", Style::default().fg(theme.dim)),
        Span::raw("  Esc "),
        Span::styled("Back", Style::default().fg(theme.dim)),
        Span::raw("  / "),
        Span::styled("Search", Style::default().fg(theme.dim)),
        Span::raw("  p "),
        Span::styled("Pin", Style::default().fg(theme.dim)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(theme.dim)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(theme.dim)),
    ];

    if app.view_mode == ViewMode::ViewingRunOutput {
        let (label, color) = if app.auto_refresh {
            (
                format!(
                    "  auto-refresh {}s",
                    app.config.preferences.refresh_interval
                ),
                theme.success,
            )
        } else {
            ("  auto-refresh off".to_string(), theme.dim)
        };
        hints.push(Span::styled(label, Style::default().fg(color)));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}
