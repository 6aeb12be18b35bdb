// Modal overlays.
// Help, catalog search, and the command palette, rendered over the main
// view with a cleared backdrop.

use ratatui::{prelude::*, widgets::*};

use crate::search::{ResultKind, SearchResult};
use crate::session::Command;

use super::theme::Theme;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

/// Render the catalog-wide fuzzy search overlay.
pub fn draw_search(
    frame: &mut Frame,
    input: &str,
    results: &[SearchResult],
    cursor: usize,
    theme: &Theme,
    area: Rect,
) {
    let popup = centered(area, 70, 18);
    frame.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" Search catalog ");
    let input_line = Line::from(vec![
        Span::styled("/ ", Style::default().fg(theme.accent)),
        Span::raw(input.to_string()),
        Span::styled("█", Style::default().fg(theme.pinned)),
    ]);
    frame.render_widget(Paragraph::new(input_line).block(input_block), chunks[0]);

    let results_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    if results.is_empty() {
        let message = if input.trim().is_empty() {
            "Type to search groups and workflows"
        } else {
            "No matches"
        };
        let text = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.dim))
            .block(results_block);
        frame.render_widget(text, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = results
        .iter()
        .map(|result| {
            let tag = match result.kind {
                ResultKind::Group => Span::styled("[group]   ", Style::default().fg(theme.accent)),
                ResultKind::Workflow => {
                    Span::styled("[workflow]", Style::default().fg(theme.success))
                }
            };
            let mut spans = vec![
                tag,
                Span::raw(" "),
                Span::styled(result.name.clone(), Style::default().fg(theme.text)),
            ];
            if !result.breadcrumb.is_empty() {
                spans.push(Span::styled(
                    format!("  {}", result.breadcrumb.join(" > ")),
                    Style::default().fg(theme.dim),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(cursor.min(results.len() - 1)));
    let list = List::new(items)
        .block(results_block)
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// Render the command palette overlay.
pub fn draw_palette(
    frame: &mut Frame,
    input: &str,
    matches: &[Command],
    cursor: usize,
    theme: &Theme,
    area: Rect,
) {
    let popup = centered(area, 44, 14);
    frame.render_widget(Clear, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(popup);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(" Command ");
    let input_line = Line::from(vec![
        Span::styled(": ", Style::default().fg(theme.accent)),
        Span::raw(input.to_string()),
        Span::styled("█", Style::default().fg(theme.pinned)),
    ]);
    frame.render_widget(Paragraph::new(input_line).block(input_block), chunks[0]);

    let list_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    if matches.is_empty() {
        let text = Paragraph::new("No matching command")
            .alignment(Alignment::Center)
            .style(Style::default().fg(theme.dim))
            .block(list_block);
        frame.render_widget(text, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = matches
        .iter()
        .map(|cmd| ListItem::new(Span::styled(cmd.label(), Style::default().fg(theme.text))))
        .collect();
    let mut state = ListState::default();
    state.select(Some(cursor.min(matches.len() - 1)));
    let list = List::new(items)
        .block(list_block)
        .highlight_style(
            Style::default()
                .bg(theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[1], &mut state);
}

/// Render the help overlay.
pub fn draw_help(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 56, 20);
    frame.render_widget(Clear, popup);

    let rows = [
        ("↑/↓", "Move selection"),
        ("Enter", "Enter group / select workflow"),
        ("Esc", "Back (clears filter first)"),
        ("Tab", "Cycle focus between sidebar and main"),
        ("b", "Toggle pinned sidebar"),
        ("P", "Toggle full pinned view"),
        ("f", "Filter the current list"),
        ("/", "Search the whole catalog"),
        (":", "Command palette"),
        ("p", "Pin or unpin selected workflow"),
        ("o", "Open in browser"),
        ("r", "Refresh run history"),
        ("a", "Toggle auto-refresh"),
        ("?", "This help"),
        ("q", "Quit"),
    ];

    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(rows.iter().map(|(keys, action)| {
        Line::from(vec![
            Span::styled(format!("  {keys:<8}"), Style::default().fg(theme.accent)),
            Span::raw(action.to_string()),
        ])
    }));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Esc to close",
        Style::default().fg(theme.dim),
    )));

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.accent))
            .title(" Help "),
    );
    frame.render_widget(help, popup);
}
