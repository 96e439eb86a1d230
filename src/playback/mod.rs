//! Playback state machine
//!
//! [`Playback`] walks a [`Trace`] one event at a time, keeping a materialized
//! snapshot of the array the events describe. The cursor ranges over
//! `-1..=len-1`, where `-1` is "before the first event".
//!
//! Stepping back is exact for `swap` (self-inverse) but lossy for `overwrite`:
//! events keep no previous value, so the snapshot keeps the overwritten value
//! after the undo.

use crate::trace::{Trace, TraceEvent};

#[derive(Debug, Clone)]
pub struct Playback {
    trace: Trace,
    baseline: Vec<f64>,
    snapshot: Vec<f64>,
    cursor: isize,
    playing: bool,
    fully_processed: bool,
}

impl Playback {
    pub fn new(trace: Trace, baseline: Vec<f64>) -> Self {
        Playback {
            trace,
            snapshot: baseline.clone(),
            baseline,
            cursor: -1,
            playing: false,
            fully_processed: false,
        }
    }

    /// Replace the trace and baseline wholesale; the cursor returns to `-1`
    pub fn jump_to(&mut self, trace: Trace, baseline: Vec<f64>) {
        *self = Playback::new(trace, baseline);
    }

    /// Apply the next event. At the last event this stops playback and marks
    /// the run fully processed instead. Returns whether the cursor moved.
    pub fn step_forward(&mut self) -> bool {
        let next = self.cursor + 1;
        let Some(event) = usize::try_from(next).ok().and_then(|i| self.trace.get(i)) else {
            self.playing = false;
            self.fully_processed = true;
            return false;
        };
        event.apply(&mut self.snapshot);
        self.cursor = next;
        true
    }

    /// Undo the event at the cursor and move back one. Returns whether the
    /// cursor moved.
    pub fn step_backward(&mut self) -> bool {
        let Some(event) = usize::try_from(self.cursor).ok().and_then(|i| self.trace.get(i)) else {
            return false;
        };
        event.undo(&mut self.snapshot);
        self.cursor -= 1;
        true
    }

    /// Back to `-1` with the snapshot restored to the baseline
    pub fn reset(&mut self) {
        self.cursor = -1;
        self.playing = false;
        self.fully_processed = false;
        self.snapshot = self.baseline.clone();
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn current_event(&self) -> Option<&TraceEvent> {
        usize::try_from(self.cursor)
            .ok()
            .and_then(|i| self.trace.get(i))
    }

    /// Source line of the event at the cursor
    pub fn active_line(&self) -> Option<usize> {
        self.current_event().and_then(|e| e.line)
    }

    pub fn snapshot(&self) -> &[f64] {
        &self.snapshot
    }

    pub fn baseline(&self) -> &[f64] {
        &self.baseline
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
    }

    pub fn is_fully_processed(&self) -> bool {
        self.fully_processed
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor + 1 >= self.trace.len() as isize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::{EventKind, Stats, TraceEvent};
    use pretty_assertions::assert_eq;

    fn event(kind: EventKind, indices: Vec<usize>, value: Option<f64>, line: usize) -> TraceEvent {
        TraceEvent {
            kind,
            indices,
            value,
            line: Some(line),
            call_stack: Vec::new(),
            stats: Stats::default(),
        }
    }

    fn swaps_trace() -> Trace {
        Trace::new(vec![
            event(EventKind::Compare, vec![0, 1], None, 3),
            event(EventKind::Swap, vec![0, 1], None, 4),
            event(EventKind::Swap, vec![1, 2], None, 4),
        ])
    }

    #[test]
    fn test_forward_applies_events() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        assert_eq!(playback.cursor(), -1);
        assert_eq!(playback.active_line(), None);

        assert!(playback.step_forward());
        assert_eq!(playback.snapshot(), &[3.0, 2.0, 1.0]);
        assert_eq!(playback.active_line(), Some(3));

        assert!(playback.step_forward());
        assert!(playback.step_forward());
        assert_eq!(playback.snapshot(), &[2.0, 1.0, 3.0]);
        assert_eq!(playback.cursor(), 2);
        assert!(!playback.is_fully_processed());
    }

    #[test]
    fn test_forward_at_end_stops_playing() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        playback.set_playing(true);
        while playback.step_forward() {}
        assert_eq!(playback.cursor(), 2);
        assert!(!playback.is_playing());
        assert!(playback.is_fully_processed());
    }

    #[test]
    fn test_backward_undoes_swaps_exactly() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        while playback.step_forward() {}
        assert!(playback.step_backward());
        assert!(playback.step_backward());
        assert_eq!(playback.snapshot(), &[3.0, 2.0, 1.0]);
        assert!(playback.step_backward());
        assert!(!playback.step_backward());
        assert_eq!(playback.cursor(), -1);
    }

    #[test]
    fn test_backward_from_middle_then_forward_again() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        assert!(!playback.step_backward());
        playback.step_forward();
        playback.step_forward();
        let middle = playback.snapshot().to_vec();

        assert!(playback.step_backward());
        assert_eq!(playback.cursor(), 0);
        assert!(playback.current_event().is_some());
        assert!(playback.step_forward());
        assert_eq!(playback.snapshot(), middle.as_slice());
    }

    #[test]
    fn test_backward_over_overwrite_is_lossy() {
        let trace = Trace::new(vec![event(EventKind::Overwrite, vec![0], Some(7.0), 2)]);
        let mut playback = Playback::new(trace, vec![1.0, 2.0]);
        playback.step_forward();
        assert_eq!(playback.snapshot(), &[7.0, 2.0]);
        playback.step_backward();
        assert_eq!(playback.cursor(), -1);
        // The previous value is not recorded, so the written one stays
        assert_eq!(playback.snapshot(), &[7.0, 2.0]);
    }

    #[test]
    fn test_reset_restores_baseline() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        while playback.step_forward() {}
        playback.reset();
        assert_eq!(playback.cursor(), -1);
        assert!(!playback.is_fully_processed());
        assert_eq!(playback.snapshot(), &[3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_jump_to_replaces_trace() {
        let mut playback = Playback::new(swaps_trace(), vec![3.0, 2.0, 1.0]);
        playback.step_forward();
        playback.jump_to(Trace::default(), vec![5.0]);
        assert_eq!(playback.cursor(), -1);
        assert!(playback.trace().is_empty());
        assert_eq!(playback.snapshot(), &[5.0]);
        assert!(!playback.step_forward());
        assert!(playback.is_fully_processed());
    }
}
