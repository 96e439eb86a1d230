//! # Introduction
//!
//! algotrace runs user-written sorting and graph routines written in a
//! JavaScript subset and records what they do to their input arrays as an
//! ordered [`Trace`] of events. The trace can then be replayed forward and
//! backward with [`Playback`], either programmatically or through a terminal
//! UI built with [ratatui](https://docs.rs/ratatui).
//!
//! ## Execution pipeline
//!
//! ```text
//! Source → Instrument → Parse → Interpret (observed inputs) → Trace → Playback → TUI
//! ```
//!
//! 1. [`parser`] tokenises the source and builds an AST; [`parser::printer`]
//!    prints it back as source text.
//! 2. [`instrument`] rewrites the first function to report line, enter and
//!    exit hooks.
//! 3. [`interpreter`] walks the instrumented AST over the scope model in
//!    [`memory`], reporting reads and writes of observed arrays to a
//!    [`interpreter::engine::Tracer`].
//! 4. [`harness`] ties the steps together, binds the inputs as observed
//!    arrays and dispatches to the first recognized entry routine.
//! 5. [`trace`] holds the event types; [`playback`] steps a snapshot through
//!    them and [`explain`](mod@explain) describes the event under the cursor.
//! 6. [`ui`] is the ratatui-based viewer; not part of the stable library API.
//!
//! [`templates`] ships default algorithm sources and [`reference`] has native
//! tracers used to cross-check them.
//!
//! ## Supported language subset
//!
//! Declarations: `let`, `const`, `var`, function declarations, function and
//! arrow expressions, default parameters, spread arguments.
//! Control flow: `if/else`, `while`, `do-while`, `for`, `for-of`,
//! `break`, `continue`, `return`, `throw`, `try/catch/finally`.
//! Built-ins: `Math`, `console.log`, `Number`, `Array`, `Error` and the
//! common array methods.

pub mod explain;
pub mod harness;
pub mod instrument;
pub mod interpreter;
pub mod memory;
pub mod parser;
pub mod playback;
pub mod reference;
pub mod templates;
pub mod trace;
pub mod ui;

pub use explain::{explain, Explanation};
pub use harness::{
    execute, execute_with_config, HarnessConfig, HarnessError, Input, ENTRY_ROUTINES,
};
pub use instrument::instrument;
pub use playback::Playback;
pub use trace::{EventKind, Stats, Trace, TraceEvent};
