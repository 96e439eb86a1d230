//! Native reference tracers
//!
//! Bubble, selection and insertion sort written directly in Rust, reporting
//! `compare`, `swap`, `overwrite` and `sorted` events through the same
//! [`TraceContext`] the harness uses. They involve no interpretation, so the
//! harness output for the matching templates can be checked against them.
//!
//! Events carry no line or call stack.

use crate::harness::context::TraceContext;
use crate::interpreter::engine::Tracer;
use crate::trace::Trace;

/// Reference tracer for a template name (`bubble`, `selection`, `insertion`)
pub fn by_name(name: &str) -> Option<fn(&[f64]) -> Trace> {
    match name {
        "bubble" => Some(bubble_sort),
        "selection" => Some(selection_sort),
        "insertion" => Some(insertion_sort),
        _ => None,
    }
}

pub fn bubble_sort(values: &[f64]) -> Trace {
    let mut arr = values.to_vec();
    let mut context = TraceContext::new();
    let n = arr.len();

    for i in 0..n {
        for j in 0..n.saturating_sub(i + 1) {
            context.compare(vec![j, j + 1]);
            if arr[j] > arr[j + 1] {
                context.swap(j, j + 1);
                arr.swap(j, j + 1);
            }
        }
    }

    context.sorted(n);
    Trace::new(context.into_events())
}

pub fn selection_sort(values: &[f64]) -> Trace {
    let mut arr = values.to_vec();
    let mut context = TraceContext::new();
    let n = arr.len();

    for i in 0..n {
        let mut min_idx = i;
        for j in i + 1..n {
            context.compare(vec![min_idx, j]);
            if arr[j] < arr[min_idx] {
                min_idx = j;
            }
        }
        if min_idx != i {
            context.swap(i, min_idx);
            arr.swap(i, min_idx);
        }
    }

    context.sorted(n);
    Trace::new(context.into_events())
}

/// Shifts larger elements right with overwrites, then writes the key.
/// The first `compare` of each pass pairs the key slot with its left neighbour.
pub fn insertion_sort(values: &[f64]) -> Trace {
    let mut arr = values.to_vec();
    let mut context = TraceContext::new();
    let n = arr.len();

    for i in 1..n {
        let key = arr[i];
        let mut j = i;

        context.compare(vec![i, i - 1]);
        while j > 0 && arr[j - 1] > key {
            context.compare(vec![j - 1, j]);
            context.overwrite(j, arr[j - 1]);
            arr[j] = arr[j - 1];
            j -= 1;
        }
        context.overwrite(j, key);
        arr[j] = key;
    }

    context.sorted(n);
    Trace::new(context.into_events())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bubble_sort_events() {
        let trace = bubble_sort(&[3.0, 1.0, 2.0]);
        let kinds: Vec<(EventKind, Vec<usize>)> = trace
            .iter()
            .map(|e| (e.kind, e.indices.clone()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (EventKind::Compare, vec![0, 1]),
                (EventKind::Swap, vec![0, 1]),
                (EventKind::Compare, vec![1, 2]),
                (EventKind::Swap, vec![1, 2]),
                (EventKind::Compare, vec![0, 1]),
                (EventKind::Sorted, vec![0, 1, 2]),
            ]
        );
        assert_eq!(trace.replay(&[3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
        assert_eq!(trace.final_stats().comparisons, 3);
        assert_eq!(trace.final_stats().swaps, 2);
    }

    #[test]
    fn test_selection_sort_sorts() {
        let input = [4.0, 2.0, 5.0, 1.0];
        let trace = selection_sort(&input);
        assert_eq!(trace.replay(&input), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(trace.final_stats().comparisons, 6);
    }

    #[test]
    fn test_insertion_sort_sorts() {
        let input = [4.0, 2.0, 5.0, 1.0];
        let trace = insertion_sort(&input);
        assert_eq!(trace.replay(&input), vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(trace.count(EventKind::Sorted), 1);
    }

    #[test]
    fn test_empty_input() {
        for tracer in ["bubble", "selection", "insertion"] {
            let trace = by_name(tracer).unwrap()(&[]);
            assert_eq!(trace.len(), 1);
            assert_eq!(trace.events()[0].kind, EventKind::Sorted);
        }
        assert!(by_name("quick").is_none());
    }
}
