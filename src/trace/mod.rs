//! Trace event model
//!
//! A [`Trace`] is the ordered, immutable log one execution produces. Each
//! [`TraceEvent`] records what happened, where (line and call stack), and the
//! running [`Stats`] at that point.
//!
//! Only `swap` and `overwrite` change array contents; the other kinds are
//! informational. [`TraceEvent::apply`] and [`TraceEvent::undo`] are the
//! snapshot transitions used by [`crate::playback::Playback`].

use crate::interpreter::constants::MAX_ARRAY_LENGTH;
use log::warn;
use std::fmt;

/// What a trace event records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Elements were compared
    Compare,
    /// Two elements were exchanged
    Swap,
    /// One element was written
    Overwrite,
    /// The listed indices are in final position
    Sorted,
    /// A routine was entered
    Enter,
    /// A routine returned or unwound
    Exit,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Compare => "compare",
            EventKind::Swap => "swap",
            EventKind::Overwrite => "overwrite",
            EventKind::Sorted => "sorted",
            EventKind::Enter => "enter",
            EventKind::Exit => "exit",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running counters, never decreasing along a trace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub comparisons: u64,
    pub swaps: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TraceEvent {
    pub kind: EventKind,
    /// Positions involved; empty for `enter`/`exit`. Shared by every observed
    /// input, with no record of which array was touched.
    pub indices: Vec<usize>,
    /// Written value, present for `overwrite`
    pub value: Option<f64>,
    pub line: Option<usize>,
    /// Frames like `bubbleSort(Array(5))`, outermost first
    pub call_stack: Vec<String>,
    pub stats: Stats,
}

impl TraceEvent {
    /// Apply this event to a snapshot. Writes past the end extend it with `NaN`.
    /// Events whose indices reach [`MAX_ARRAY_LENGTH`] are ignored.
    pub fn apply(&self, snapshot: &mut Vec<f64>) {
        match (self.kind, self.indices.as_slice()) {
            (EventKind::Swap, &[i, j, ..]) => {
                if ensure_len(snapshot, i.max(j) + 1) {
                    snapshot.swap(i, j);
                }
            }
            (EventKind::Overwrite, &[i, ..]) => {
                if ensure_len(snapshot, i + 1) {
                    snapshot[i] = self.value.unwrap_or(f64::NAN);
                }
            }
            _ => {}
        }
    }

    /// Inverse of [`apply`](Self::apply). Exact for `swap`. An `overwrite`
    /// keeps no previous value, so undoing one leaves the snapshot unchanged.
    pub fn undo(&self, snapshot: &mut Vec<f64>) {
        if self.kind == EventKind::Swap {
            self.apply(snapshot);
        }
    }
}

/// Grow `snapshot` to `len` slots; false if that exceeds the length ceiling
fn ensure_len(snapshot: &mut Vec<f64>, len: usize) -> bool {
    if snapshot.len() >= len {
        return true;
    }
    if len > MAX_ARRAY_LENGTH {
        warn!("ignoring event for index {} past the snapshot limit", len - 1);
        return false;
    }
    snapshot.resize(len, f64::NAN);
    true
}

/// Ordered event log of one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trace {
    events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(events: Vec<TraceEvent>) -> Self {
        Trace { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TraceEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceEvent> {
        self.events.iter()
    }

    /// Number of events of one kind
    pub fn count(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Counters at the end of the trace
    pub fn final_stats(&self) -> Stats {
        self.events.last().map(|e| e.stats).unwrap_or_default()
    }

    /// Call depth left open at the end (`enter` minus `exit`)
    pub fn open_frames(&self) -> i64 {
        self.events.iter().fold(0, |depth, e| match e.kind {
            EventKind::Enter => depth + 1,
            EventKind::Exit => depth - 1,
            _ => depth,
        })
    }

    /// Snapshot after applying every event to `baseline`
    pub fn replay(&self, baseline: &[f64]) -> Vec<f64> {
        let mut snapshot = baseline.to_vec();
        for event in &self.events {
            event.apply(&mut snapshot);
        }
        snapshot
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a TraceEvent;
    type IntoIter = std::slice::Iter<'a, TraceEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, indices: Vec<usize>, value: Option<f64>) -> TraceEvent {
        TraceEvent {
            kind,
            indices,
            value,
            line: None,
            call_stack: Vec::new(),
            stats: Stats::default(),
        }
    }

    #[test]
    fn test_swap_is_self_inverse() {
        let swap = event(EventKind::Swap, vec![0, 2], None);
        let mut snapshot = vec![1.0, 2.0, 3.0];
        swap.apply(&mut snapshot);
        assert_eq!(snapshot, vec![3.0, 2.0, 1.0]);
        swap.undo(&mut snapshot);
        assert_eq!(snapshot, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_overwrite_undo_keeps_written_value() {
        let write = event(EventKind::Overwrite, vec![1], Some(9.0));
        let mut snapshot = vec![1.0, 2.0];
        write.apply(&mut snapshot);
        write.undo(&mut snapshot);
        assert_eq!(snapshot, vec![1.0, 9.0]);
    }

    #[test]
    fn test_overwrite_past_end_extends_with_nan() {
        let write = event(EventKind::Overwrite, vec![3], Some(4.0));
        let mut snapshot = vec![1.0];
        write.apply(&mut snapshot);
        assert_eq!(snapshot.len(), 4);
        assert!(snapshot[1].is_nan() && snapshot[2].is_nan());
        assert_eq!(snapshot[3], 4.0);
    }

    #[test]
    fn test_events_past_length_ceiling_are_ignored() {
        let mut snapshot = vec![1.0, 2.0];
        event(EventKind::Overwrite, vec![u32::MAX as usize - 1], Some(1.0)).apply(&mut snapshot);
        event(EventKind::Swap, vec![0, MAX_ARRAY_LENGTH], None).apply(&mut snapshot);
        assert_eq!(snapshot, vec![1.0, 2.0]);
    }

    #[test]
    fn test_informational_events_do_not_mutate() {
        let mut snapshot = vec![2.0, 1.0];
        for kind in [EventKind::Compare, EventKind::Sorted, EventKind::Enter, EventKind::Exit] {
            event(kind, vec![0, 1], None).apply(&mut snapshot);
        }
        assert_eq!(snapshot, vec![2.0, 1.0]);
    }

    #[test]
    fn test_trace_queries() {
        let trace = Trace::new(vec![
            event(EventKind::Enter, vec![], None),
            event(EventKind::Compare, vec![0, 1], None),
            event(EventKind::Swap, vec![0, 1], None),
            event(EventKind::Exit, vec![], None),
        ]);
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.count(EventKind::Compare), 1);
        assert_eq!(trace.open_frames(), 0);
        assert_eq!(trace.replay(&[2.0, 1.0]), vec![1.0, 2.0]);
        assert_eq!(EventKind::Overwrite.to_string(), "overwrite");
    }
}
