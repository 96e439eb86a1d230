//! Bar chart of the playback snapshot
//!
//! One bar per element. Elements named by the current event are colored by
//! the event kind; `NaN` slots (holes) render as empty bars.

use crate::trace::TraceEvent;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
    Frame,
};

/// Bar heights for a snapshot, shifted so the smallest value is not negative
fn bar_heights(snapshot: &[f64]) -> Vec<u64> {
    let min = snapshot
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::min);
    snapshot
        .iter()
        .map(|v| if v.is_finite() { (v - min).round() as u64 } else { 0 })
        .collect()
}

/// Render the snapshot as bars
pub fn render_bars_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    snapshot: &[f64],
    event: Option<&TraceEvent>,
    fully_processed: bool,
) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(
            Style::default()
                .fg(DEFAULT_THEME.border_focused)
                .add_modifier(Modifier::BOLD),
        );

    let count = snapshot.len().max(1) as u16;
    let inner_width = area.width.saturating_sub(2);
    let bar_gap = if inner_width / count >= 3 { 1 } else { 0 };
    let bar_width = (inner_width / count).saturating_sub(bar_gap).max(1);

    let bars: Vec<Bar> = bar_heights(snapshot)
        .into_iter()
        .zip(snapshot)
        .enumerate()
        .map(|(index, (height, value))| {
            let color = match event {
                _ if fully_processed => DEFAULT_THEME.success,
                Some(event) if event.indices.contains(&index) => DEFAULT_THEME.event_color(event.kind),
                _ => DEFAULT_THEME.bar,
            };
            let text = if value.is_finite() {
                crate::parser::printer::format_number(*value)
            } else {
                String::new()
            };
            Bar::default()
                .value(height)
                .text_value(text)
                .label(Line::from(index.to_string()))
                .style(Style::default().fg(color))
                .value_style(Style::default().fg(DEFAULT_THEME.current_line_bg).bg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .bar_width(bar_width)
        .bar_gap(bar_gap)
        .data(BarGroup::default().bars(&bars));

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_heights_shift_negatives() {
        assert_eq!(bar_heights(&[3.0, -2.0, 0.0]), vec![5, 0, 2]);
        assert_eq!(bar_heights(&[1.0, f64::NAN]), vec![1, 0]);
        assert!(bar_heights(&[]).is_empty());
    }
}
