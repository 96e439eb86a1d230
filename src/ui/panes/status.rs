//! Status bar rendering with step counter, counters and keybindings

use crate::trace::{EventKind, Stats};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Data shown in the status bar
pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub cursor: isize,
    pub total: usize,
    pub kind: Option<EventKind>,
    pub stats: Stats,
    pub is_playing: bool,
    pub is_error: bool,
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let step_text = format!(" Step {}/{} ", data.cursor + 1, data.total);
    let badge = if data.is_error {
        DEFAULT_THEME.error
    } else {
        DEFAULT_THEME.primary
    };
    let bar_bg = Style::default().bg(DEFAULT_THEME.current_line_bg);

    let mut left_spans = vec![
        Span::styled(
            step_text,
            Style::default()
                .bg(badge)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" | ", bar_bg.fg(DEFAULT_THEME.comment)),
    ];
    if let Some(kind) = data.kind {
        left_spans.push(Span::styled(
            format!("{} ", kind),
            bar_bg
                .fg(DEFAULT_THEME.event_color(kind))
                .add_modifier(Modifier::BOLD),
        ));
    }
    left_spans.push(Span::styled(
        format!(
            "cmp {} swp {} ",
            data.stats.comparisons, data.stats.swaps
        ),
        bar_bg.fg(DEFAULT_THEME.fg),
    ));
    left_spans.push(Span::styled(" | ", bar_bg.fg(DEFAULT_THEME.comment)));
    left_spans.push(Span::styled(
        format!(" {} ", data.message),
        bar_bg.fg(if data.is_error {
            DEFAULT_THEME.error
        } else {
            DEFAULT_THEME.fg
        }),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(left_spans))
            .style(bar_bg)
            .alignment(Alignment::Left),
        layout[0],
    );

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = bar_bg.fg(DEFAULT_THEME.fg);
    let sep_style = bar_bg.fg(DEFAULT_THEME.comment);

    let mut right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵ / r ", key_style),
        Span::styled(" end/reset ", desc_style),
        Span::styled("│", sep_style),
        Span::styled("q", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let indicator = if data.is_playing {
        Some((" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if data.total > 0 && data.cursor + 1 >= data.total as isize {
        Some((" END ", DEFAULT_THEME.error))
    } else if data.cursor < 0 {
        Some((" START ", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some((label, color)) = indicator {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(Span::styled(
            label,
            Style::default()
                .bg(color)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(right_spans))
            .style(bar_bg)
            .alignment(Alignment::Right),
        layout[1],
    );
}
