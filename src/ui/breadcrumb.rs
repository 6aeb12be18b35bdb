// Breadcrumb rendering for the navigation trail.
// Shows repository, group chain, and the selected workflow.

use ratatui::{prelude::*, widgets::*};

use super::theme::Theme;

/// Render the header line: repo, breadcrumb trail, optional workflow leaf.
pub fn draw_breadcrumb(
    frame: &mut Frame,
    repo: &str,
    names: &[String],
    workflow: Option<&str>,
    theme: &Theme,
    area: Rect,
) {
    let mut spans = vec![
        Span::styled(repo.to_string(), Style::default().fg(theme.dim)),
        Span::styled("  ", Style::default()),
    ];

    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" > ", Style::default().fg(theme.dim)));
        }
        let is_leaf = i == names.len() - 1 && workflow.is_none();
        let style = if is_leaf {
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text)
        };
        spans.push(Span::styled(name.clone(), style));
    }

    if let Some(workflow) = workflow {
        if !names.is_empty() {
            spans.push(Span::styled(" > ", Style::default().fg(theme.dim)));
        }
        spans.push(Span::styled(
            workflow.to_string(),
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(theme.border));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
