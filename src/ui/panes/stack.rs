//! Call stack pane rendering
//!
//! Lists the frames of the current event's call stack, innermost first. The
//! innermost frame is emphasized; outer frames are muted.

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Render the call stack pane
pub fn render_stack_pane(frame: &mut Frame, area: Rect, call_stack: &[String]) {
    let block = Block::default()
        .title(" Call Stack ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal));

    let items: Vec<ListItem> = if call_stack.is_empty() {
        vec![ListItem::new("(empty)").style(Style::default().fg(DEFAULT_THEME.comment))]
    } else {
        call_stack
            .iter()
            .enumerate()
            .rev()
            .map(|(depth, descriptor)| {
                let innermost = depth + 1 == call_stack.len();
                let name_style = if innermost {
                    Style::default()
                        .fg(DEFAULT_THEME.function)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(DEFAULT_THEME.muted_function)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        if innermost { "▸ " } else { "  " },
                        Style::default().fg(DEFAULT_THEME.secondary),
                    ),
                    Span::styled(format!("[{}] ", depth), Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(descriptor.clone(), name_style),
                ]))
            })
            .collect()
    };

    frame.render_widget(List::new(items).block(block), area);
}
