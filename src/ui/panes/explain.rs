//! Explanation pane: what the current event did, in words

use crate::explain::Explanation;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render_explain_pane(frame: &mut Frame, area: Rect, explanation: &Explanation) {
    let block = Block::default()
        .title(" Explanation ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    let mut lines = vec![
        Line::from(Span::styled(
            explanation.title.to_uppercase(),
            Style::default()
                .fg(DEFAULT_THEME.primary)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            explanation.details.clone(),
            Style::default().fg(DEFAULT_THEME.fg),
        )),
    ];

    if !explanation.metrics.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(
            explanation
                .metrics
                .iter()
                .flat_map(|metric| {
                    [
                        Span::styled(
                            format!("{} ", metric.label),
                            Style::default().fg(DEFAULT_THEME.comment),
                        ),
                        Span::styled(
                            format!("{}  ", metric.value),
                            Style::default().fg(DEFAULT_THEME.number),
                        ),
                    ]
                })
                .collect::<Vec<_>>(),
        ));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
