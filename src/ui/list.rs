// List rendering for the group browser, pinned panel, and run history.
// Provides styled list views with loading, error, and empty states.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::catalog::{ListRow, PinnedEntry};
use crate::gh::{Run, RunConclusion, RunStatus};
use crate::session::LoadingState;

use super::theme::Theme;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(*dt);
    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Status glyph for a run, conclusion-first.
fn status_icon(status: RunStatus, conclusion: Option<RunConclusion>) -> &'static str {
    match conclusion {
        Some(RunConclusion::Success) => "✔",
        Some(RunConclusion::Failure) | Some(RunConclusion::StartupFailure) => "✘",
        Some(RunConclusion::Cancelled) => "⊘",
        Some(RunConclusion::Skipped) => "≫",
        Some(RunConclusion::TimedOut) => "⏱",
        _ => match status {
            RunStatus::InProgress => "●",
            RunStatus::Queued | RunStatus::Waiting | RunStatus::Pending => "○",
            _ => "?",
        },
    }
}

fn conclusion_color(conclusion: Option<RunConclusion>, theme: &Theme) -> Color {
    match conclusion {
        Some(RunConclusion::Success) => theme.success,
        Some(RunConclusion::Failure)
        | Some(RunConclusion::TimedOut)
        | Some(RunConclusion::StartupFailure) => theme.failure,
        Some(RunConclusion::ActionRequired) => theme.warning,
        Some(RunConclusion::Cancelled)
        | Some(RunConclusion::Skipped)
        | Some(RunConclusion::Stale) => theme.neutral,
        _ => theme.warning,
    }
}

fn selected_state(index: usize, len: usize) -> ListState {
    let mut state = ListState::default();
    if len > 0 {
        state.select(Some(index.min(len - 1)));
    }
    state
}

fn panel_block<'a>(title: String, focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.border)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

/// Render the group browser rows: pinned workflows, unpinned workflows,
/// then subgroups.
pub fn render_group_rows(
    frame: &mut Frame,
    rows: &[ListRow],
    index: usize,
    filter: Option<&str>,
    focused: bool,
    theme: &Theme,
    area: Rect,
) {
    let title = match filter {
        Some(text) => format!(" Groups (filter: {text}) "),
        None => " Groups ".to_string(),
    };
    let block = panel_block(title, focused, theme);

    if rows.is_empty() {
        let message = if filter.is_some() {
            "No matches"
        } else {
            "Empty group"
        };
        let text = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.dim))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            ListRow::GroupRef { name, .. } => ListItem::new(Line::from(vec![
                Span::styled("▸ ", Style::default().fg(theme.dim)),
                Span::styled(name.clone(), Style::default().fg(theme.accent)),
            ])),
            ListRow::WorkflowRef {
                display,
                file,
                pinned,
            } => {
                let mut spans = Vec::new();
                if *pinned {
                    spans.push(Span::styled("★ ", Style::default().fg(theme.pinned)));
                } else {
                    spans.push(Span::raw("  "));
                }
                spans.push(Span::styled(display.clone(), Style::default().fg(theme.text)));
                if display != file {
                    spans.push(Span::styled(
                        format!("  {file}"),
                        Style::default().fg(theme.dim),
                    ));
                }
                ListItem::new(Line::from(spans))
            }
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = selected_state(index, rows.len());
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the pinned shortcut list (sidebar or full panel).
pub fn render_pinned(
    frame: &mut Frame,
    pinned: &[PinnedEntry],
    index: usize,
    focused: bool,
    theme: &Theme,
    area: Rect,
) {
    let block = panel_block(" Pinned ".to_string(), focused, theme);

    if pinned.is_empty() {
        let text = Paragraph::new("No pinned workflows\nPress p on a workflow to pin it")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.dim))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = pinned
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled("★ ", Style::default().fg(theme.pinned)),
                Span::styled(entry.display.clone(), Style::default().fg(theme.text)),
                Span::styled(
                    format!("  {}", entry.breadcrumb.join(" > ")),
                    Style::default().fg(theme.dim),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = selected_state(index, pinned.len());
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the run history panel for the selected workflow.
pub fn render_runs(
    frame: &mut Frame,
    runs: &LoadingState<Vec<Run>>,
    index: usize,
    refreshing: bool,
    theme: &Theme,
    area: Rect,
) {
    let title = if refreshing {
        " Runs (refreshing…) ".to_string()
    } else {
        " Runs ".to_string()
    };
    let block = panel_block(title, true, theme);

    match runs {
        LoadingState::Idle => {
            let text = Paragraph::new("No data")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.dim))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loading => {
            let text = Paragraph::new("Loading runs…")
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.warning))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Error(message) => {
            let text = Paragraph::new(format!("fetch failed: {message}\nPress r to retry"))
                .alignment(Alignment::Center)
                .style(Style::default().fg(theme.failure))
                .block(block);
            frame.render_widget(text, area);
        }
        LoadingState::Loaded(runs) => {
            if runs.is_empty() {
                let text = Paragraph::new("No runs recorded for this workflow")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(theme.dim))
                    .block(block);
                frame.render_widget(text, area);
                return;
            }
            let items: Vec<ListItem> = runs
                .iter()
                .map(|run| {
                    let color = conclusion_color(run.conclusion, theme);
                    let mut spans = vec![
                        Span::styled(
                            format!("{} ", status_icon(run.status, run.conclusion)),
                            Style::default().fg(color),
                        ),
                        Span::styled(format!("#{}", run.number), Style::default().fg(color)),
                        Span::styled(
                            format!("  {}", format_relative_time(&run.created_at)),
                            Style::default().fg(theme.dim),
                        ),
                        Span::styled(
                            format!("  {}", run.display_title),
                            Style::default().fg(theme.text),
                        ),
                    ];
                    if let Some(branch) = &run.head_branch {
                        spans.push(Span::styled(
                            format!("  [{branch}]"),
                            Style::default().fg(theme.accent),
                        ));
                    }
                    if let Some(event) = &run.event {
                        spans.push(Span::styled(
                            format!("  {event}"),
                            Style::default().fg(theme.dim),
                        ));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_style(
                    Style::default()
                        .bg(theme.highlight_bg)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("> ");
            let mut state = selected_state(index, runs.len());
            frame.render_stateful_widget(list, area, &mut state);
        }
    }
}
