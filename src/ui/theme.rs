//! Color palette shared by every pane

use crate::trace::EventKind;
use ratatui::style::Color;

pub struct Theme {
    /// Default text
    pub fg: Color,
    /// Step badge
    pub primary: Color,
    /// Overwrite highlight and the playing indicator
    pub secondary: Color,
    /// Separators, comments and key hints
    pub comment: Color,
    pub success: Color,
    pub error: Color,

    // Source highlighting
    pub keyword: Color,
    pub string: Color,
    pub number: Color,
    pub function: Color,

    pub border_focused: Color,
    pub border_normal: Color,
    /// Active source line and status bar background
    pub current_line_bg: Color,
    /// Frames below the innermost one in the stack pane
    pub muted_function: Color,
    /// Bars not involved in the current event
    pub bar: Color,
}

impl Theme {
    /// Bar color for elements touched by an event of this kind
    pub fn event_color(&self, kind: EventKind) -> Color {
        match kind {
            EventKind::Compare => self.function,
            EventKind::Swap => self.error,
            EventKind::Overwrite => self.secondary,
            EventKind::Sorted => self.success,
            EventKind::Enter | EventKind::Exit => self.bar,
        }
    }
}

const BLUE: Color = Color::Rgb(137, 180, 250);
const PEACH: Color = Color::Rgb(250, 179, 135);
const YELLOW: Color = Color::Rgb(249, 226, 175);
const OVERLAY: Color = Color::Rgb(108, 112, 134);

pub const DEFAULT_THEME: Theme = Theme {
    fg: Color::Rgb(205, 214, 244),
    primary: BLUE,
    secondary: PEACH,
    comment: OVERLAY,
    success: Color::Rgb(166, 227, 161),
    error: Color::Rgb(243, 139, 168),
    keyword: Color::Rgb(203, 166, 247),
    string: Color::Rgb(166, 227, 161),
    number: PEACH,
    function: YELLOW,
    border_focused: YELLOW,
    border_normal: OVERLAY,
    current_line_bg: Color::Rgb(49, 50, 68),
    muted_function: Color::Rgb(180, 165, 120),
    bar: Color::Rgb(116, 199, 236),
};
