//! Per-execution trace context: current line, call stack, counters, events

use crate::interpreter::engine::Tracer;
use crate::trace::{EventKind, Stats, TraceEvent};

/// Receives hook calls and observed activity for one execution and turns them
/// into trace events. A fresh context is built for every run.
#[derive(Debug, Clone, Default)]
pub struct TraceContext {
    current_line: Option<usize>,
    call_stack: Vec<String>,
    stats: Stats,
    events: Vec<TraceEvent>,
}

impl TraceContext {
    pub fn new() -> Self {
        TraceContext::default()
    }

    fn emit(&mut self, kind: EventKind, indices: Vec<usize>, value: Option<f64>) {
        self.events.push(TraceEvent {
            kind,
            indices,
            value,
            line: self.current_line,
            call_stack: self.call_stack.clone(),
            stats: self.stats,
        });
    }

    /// Mark indices `0..len` as sorted
    pub fn sorted(&mut self, len: usize) {
        self.emit(EventKind::Sorted, (0..len).collect(), None);
    }

    pub fn call_stack(&self) -> &[String] {
        &self.call_stack
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl Tracer for TraceContext {
    fn line(&mut self, line: usize) {
        self.current_line = Some(line);
    }

    fn enter(&mut self, frame: String) {
        self.call_stack.push(frame);
        self.emit(EventKind::Enter, Vec::new(), None);
    }

    fn exit(&mut self) {
        self.call_stack.pop();
        self.emit(EventKind::Exit, Vec::new(), None);
    }

    fn overwrite(&mut self, index: usize, value: f64) {
        self.stats.swaps += 1;
        self.emit(EventKind::Overwrite, vec![index], Some(value));
    }

    fn swap(&mut self, first: usize, second: usize) {
        self.stats.swaps += 1;
        self.emit(EventKind::Swap, vec![first, second], None);
    }

    fn compare(&mut self, indices: Vec<usize>) {
        self.stats.comparisons += 1;
        self.emit(EventKind::Compare, indices, None);
    }

    fn current_line(&self) -> Option<usize> {
        self.current_line
    }
}
