//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`bars`]: Bar chart of the playback snapshot, current event highlighted
//! - [`explain`]: Plain-language description of the current event
//! - [`source`]: Source code display with syntax highlighting and current line indicator
//! - [`stack`]: Call stack of the current event
//! - [`status`]: Status bar with step counter, counters and keybindings
//!
//! Each pane module exports a `render_*` function; panes hold no state of
//! their own beyond scroll offsets owned by the app.

pub mod bars;
pub mod explain;
pub mod source;
pub mod stack;
pub mod status;

pub use bars::render_bars_pane;
pub use explain::render_explain_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use stack::render_stack_pane;
pub use status::{render_status_bar, StatusRenderData};
