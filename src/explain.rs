//! Plain-language description of the event under the playback cursor
//!
//! [`explain`] reads the event together with the snapshot *after* that event
//! was applied, which is what [`crate::playback::Playback::snapshot`] holds at
//! the cursor. For a swap this means both values already sit in their new
//! positions, and the text is worded that way.

use crate::parser::printer::format_number;
use crate::trace::{EventKind, TraceEvent};

/// One labelled figure shown under the explanation text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metric {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Explanation {
    pub title: &'static str,
    pub details: String,
    pub metrics: Vec<Metric>,
}

/// Describe `event`, or the idle state when the cursor is before the first event
pub fn explain(event: Option<&TraceEvent>, snapshot: &[f64]) -> Explanation {
    let Some(event) = event else {
        return Explanation {
            title: "Ready to Start",
            details: "Press Space to play or → to step forward through the execution.".to_string(),
            metrics: Vec::new(),
        };
    };

    let value_at = |position: usize| event.indices.get(position).and_then(|&i| snapshot.get(i)).copied();

    let (title, details) = match (event.kind, event.indices.as_slice()) {
        (EventKind::Compare, &[i, j, ..]) => {
            let mut details = format!("Comparing elements at indices {} and {}.", i, j);
            if let (Some(a), Some(b)) = (value_at(0), value_at(1)) {
                let (a, b, greater) = (format_number(a), format_number(b), a > b);
                details.push_str(&format!(" Values are {} and {}.", a, b));
                if greater {
                    details.push_str(&format!(
                        " {} > {}, so a swap might be needed depending on the sort order.",
                        a, b
                    ));
                } else {
                    details.push_str(&format!(" {} <= {}, no swap needed.", a, b));
                }
            }
            ("Comparison", details)
        }
        (EventKind::Compare, &[i]) => {
            let mut details = format!("Reading the element at index {}.", i);
            if let Some(a) = value_at(0) {
                details.push_str(&format!(" Its value is {}.", format_number(a)));
            }
            ("Comparison", details)
        }
        (EventKind::Swap, &[i, j, ..]) => {
            let mut details = format!("Swapping elements at indices {} and {}.", i, j);
            if let (Some(now_i), Some(now_j)) = (value_at(0), value_at(1)) {
                details.push_str(&format!(
                    " Moved {} to index {} and {} to index {}.",
                    format_number(now_j),
                    j,
                    format_number(now_i),
                    i
                ));
            }
            ("Swap", details)
        }
        (EventKind::Overwrite, &[i, ..]) => {
            let written = event.value.map_or_else(|| "a value".to_string(), format_number);
            ("Overwrite", format!("Writing value {} to index {}.", written, i))
        }
        (EventKind::Sorted, _) => ("Sorted", "The array is now sorted.".to_string()),
        (EventKind::Enter, _) => {
            let frame = event.call_stack.last().map_or("a routine", String::as_str);
            ("Call", format!("Entering {}.", frame))
        }
        (EventKind::Exit, _) => match event.call_stack.last() {
            Some(caller) => ("Return", format!("Returning to {}.", caller)),
            None => ("Return", "The routine has returned.".to_string()),
        },
        (kind, _) => ("Event", format!("A {} event.", kind)),
    };

    let metrics = event
        .line
        .map(|line| Metric {
            label: "Line",
            value: line.to_string(),
        })
        .into_iter()
        .collect();

    Explanation {
        title,
        details,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::Stats;
    use pretty_assertions::assert_eq;

    fn event(kind: EventKind, indices: Vec<usize>, value: Option<f64>) -> TraceEvent {
        TraceEvent {
            kind,
            indices,
            value,
            line: Some(5),
            call_stack: vec!["bubbleSort(Array(3))".to_string()],
            stats: Stats::default(),
        }
    }

    #[test]
    fn test_no_event_is_ready_to_start() {
        let explanation = explain(None, &[1.0, 2.0]);
        assert_eq!(explanation.title, "Ready to Start");
        assert!(explanation.metrics.is_empty());
    }

    #[test]
    fn test_compare_mentions_values_and_order() {
        let explanation = explain(Some(&event(EventKind::Compare, vec![0, 1], None)), &[5.0, 3.0, 1.0]);
        assert_eq!(explanation.title, "Comparison");
        assert_eq!(
            explanation.details,
            "Comparing elements at indices 0 and 1. Values are 5 and 3. \
             5 > 3, so a swap might be needed depending on the sort order."
        );
        assert_eq!(
            explanation.metrics,
            vec![Metric {
                label: "Line",
                value: "5".to_string()
            }]
        );

        let in_order = explain(Some(&event(EventKind::Compare, vec![1, 2], None)), &[5.0, 1.5, 3.0]);
        assert_eq!(
            in_order.details,
            "Comparing elements at indices 1 and 2. Values are 1.5 and 3. 1.5 <= 3, no swap needed."
        );
    }

    #[test]
    fn test_compare_out_of_range_omits_values() {
        let explanation = explain(Some(&event(EventKind::Compare, vec![0, 9], None)), &[1.0]);
        assert_eq!(explanation.details, "Comparing elements at indices 0 and 9.");
    }

    #[test]
    fn test_swap_reads_values_in_new_positions() {
        // Snapshot after swapping [5, 3] at indices 0 and 1
        let explanation = explain(Some(&event(EventKind::Swap, vec![0, 1], None)), &[3.0, 5.0]);
        assert_eq!(explanation.title, "Swap");
        assert_eq!(
            explanation.details,
            "Swapping elements at indices 0 and 1. Moved 5 to index 1 and 3 to index 0."
        );
    }

    #[test]
    fn test_overwrite_and_sorted() {
        let overwrite = explain(Some(&event(EventKind::Overwrite, vec![2], Some(-4.0))), &[0.0; 3]);
        assert_eq!(overwrite.title, "Overwrite");
        assert_eq!(overwrite.details, "Writing value -4 to index 2.");

        let sorted = explain(Some(&event(EventKind::Sorted, vec![0, 1, 2], None)), &[1.0, 2.0, 3.0]);
        assert_eq!(sorted.title, "Sorted");
        assert_eq!(sorted.details, "The array is now sorted.");
    }

    #[test]
    fn test_enter_and_exit_name_frames() {
        let enter = explain(Some(&event(EventKind::Enter, vec![], None)), &[]);
        assert_eq!(enter.details, "Entering bubbleSort(Array(3)).");

        let mut exit = event(EventKind::Exit, vec![], None);
        exit.call_stack.clear();
        exit.line = None;
        let exit = explain(Some(&exit), &[]);
        assert_eq!(exit.title, "Return");
        assert_eq!(exit.details, "The routine has returned.");
        assert!(exit.metrics.is_empty());
    }
}
