// Integration tests for the tracing harness and playback

use algotrace::explain::explain;
use algotrace::harness::{execute, execute_with_config, HarnessConfig, HarnessError, Input};
use algotrace::instrument::instrument;
use algotrace::playback::Playback;
use algotrace::reference;
use algotrace::templates::{self, TEMPLATES};
use algotrace::trace::{EventKind, Stats, Trace};
use pretty_assertions::assert_eq;

fn sort_trace(source: &str, values: &[f64]) -> Trace {
    execute(source, &[Input::numbers(values)]).expect("execution failed")
}

/// Events comparable with the reference tracers: no hooks, no line or stack
fn observable(trace: &Trace) -> Vec<(EventKind, Vec<usize>, Option<f64>, Stats)> {
    trace
        .iter()
        .filter(|e| !matches!(e.kind, EventKind::Enter | EventKind::Exit))
        .map(|e| (e.kind, e.indices.clone(), e.value, e.stats))
        .collect()
}

#[test]
fn test_bubble_sort_template_sorts() {
    let trace = sort_trace(templates::BUBBLE_SORT, &[5.0, 3.0, 1.0]);

    let last = trace.events().last().expect("trace is empty");
    assert_eq!(last.kind, EventKind::Sorted);
    assert_eq!(last.indices, vec![0, 1, 2]);
    assert_eq!(trace.replay(&[5.0, 3.0, 1.0]), vec![1.0, 3.0, 5.0]);

    assert_eq!(trace.count(EventKind::Compare), 3);
    assert_eq!(trace.count(EventKind::Swap), 3);
    assert_eq!(
        trace.final_stats(),
        Stats {
            comparisons: 3,
            swaps: 3
        }
    );
}

#[test]
fn test_program_without_entry_routine() {
    let trace = sort_trace("function helper(a) { a[0] = 1; }\nhelper([1]);", &[4.0, 2.0]);
    assert!(trace.is_empty());
}

#[test]
fn test_syntax_error_is_parse_failure() {
    let err = execute("function bubbleSort(arr) { for (", &[Input::numbers(&[1.0])]).unwrap_err();
    assert!(matches!(err, HarnessError::Parse { .. }), "{:?}", err);
}

#[test]
fn test_bfs_visits_every_node_once() {
    let inputs = templates::graph_inputs(&templates::demo_graph());
    let trace = execute(templates::BFS, &inputs).expect("execution failed");

    let mut visited: Vec<usize> = trace
        .iter()
        .filter(|e| e.kind == EventKind::Overwrite)
        .map(|e| e.indices[0])
        .collect();
    assert_eq!(visited.len(), 4);
    visited.sort_unstable();
    assert_eq!(visited, vec![0, 1, 2, 3]);
    assert_eq!(trace.count(EventKind::Sorted), 0);
    assert_eq!(trace.replay(&[0.0; 4]), vec![1.0; 4]);
}

#[test]
fn test_playback_reset_is_repeatable() {
    let values = [4.0, 1.0, 3.0, 2.0];
    let trace = sort_trace(templates::QUICK_SORT, &values);
    let mut playback = Playback::new(trace, values.to_vec());

    for _ in 0..5 {
        playback.step_forward();
    }
    let first = playback.snapshot().to_vec();

    playback.reset();
    assert_eq!(playback.cursor(), -1);
    assert_eq!(playback.snapshot(), &values);

    for _ in 0..5 {
        playback.step_forward();
    }
    assert_eq!(playback.snapshot(), first.as_slice());
}

#[test]
fn test_playback_to_end_matches_replay() {
    let values = templates::demo_array();
    let trace = sort_trace(templates::MERGE_SORT, &values);
    let expected = trace.replay(&values);

    let mut playback = Playback::new(trace, values);
    while playback.step_forward() {}
    assert!(playback.is_fully_processed());
    assert_eq!(playback.snapshot(), expected.as_slice());

    let mut sorted = templates::demo_array();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(expected, sorted);
}

#[test]
fn test_runtime_failures() {
    let source = "function sort(a) {\n  throw new Error('boom');\n}";
    let err = execute(source, &[Input::numbers(&[1.0])]).unwrap_err();
    assert_eq!(
        err,
        HarnessError::Runtime {
            message: "Uncaught Error: boom (line 2)".to_string()
        }
    );

    let err = execute("function sort(a) { return missing + 1; }", &[Input::numbers(&[1.0])])
        .unwrap_err();
    assert!(err
        .to_string()
        .starts_with("ReferenceError: missing is not defined"));

    let config = HarnessConfig::default().with_max_steps(1_000);
    let err = execute_with_config(
        "function sort(a) { for (;;) { a[0] = 1; } }",
        &[Input::numbers(&[1.0])],
        &config,
    )
    .unwrap_err();
    assert!(err.to_string().contains("1000"));
}

#[test]
fn test_enter_exit_balanced() {
    for template in &TEMPLATES {
        let inputs = match template.family {
            algotrace::harness::Family::Sorting => vec![Input::numbers(&templates::demo_array())],
            algotrace::harness::Family::Graph => templates::graph_inputs(&templates::demo_graph()),
        };
        let trace = execute(template.source, &inputs).expect("execution failed");
        assert_eq!(trace.open_frames(), 0, "{} left frames open", template.name);
        assert!(trace.count(EventKind::Enter) > 0, "{} never entered", template.name);
        assert!(trace
            .iter()
            .filter(|e| e.kind != EventKind::Enter && e.kind != EventKind::Exit && e.kind != EventKind::Sorted)
            .all(|e| !e.call_stack.is_empty()));
    }
}

#[test]
fn test_instrumentation_is_idempotent() {
    let values = [3.0, 1.0, 2.0];
    for template in &TEMPLATES {
        let once = instrument(template.source);
        assert_eq!(instrument(&once), once, "{} not idempotent", template.name);
    }

    let direct = sort_trace(templates::SELECTION_SORT, &values);
    let pre_instrumented = sort_trace(&instrument(templates::SELECTION_SORT), &values);
    assert_eq!(direct, pre_instrumented);
}

#[test]
fn test_templates_match_reference_tracers() {
    let inputs: [&[f64]; 3] = [
        &[5.0, 3.0, 1.0],
        &[1.0, 2.0, 3.0, 4.0],
        &[38.0, 27.0, 43.0, 3.0, 9.0, 82.0, 10.0],
    ];
    for (name, source) in [
        ("bubble", templates::BUBBLE_SORT),
        ("selection", templates::SELECTION_SORT),
    ] {
        let tracer = reference::by_name(name).expect("missing reference tracer");
        for values in inputs {
            let harness = sort_trace(source, values);
            assert_eq!(observable(&harness), observable(&tracer(values)), "{} on {:?}", name, values);
        }
    }
}

#[test]
fn test_events_carry_source_lines() {
    let trace = sort_trace(templates::BUBBLE_SORT, &[2.0, 1.0]);
    let compare = trace
        .iter()
        .find(|e| e.kind == EventKind::Compare)
        .expect("no compare event");
    assert_eq!(compare.line, Some(5));
    let swap = trace
        .iter()
        .find(|e| e.kind == EventKind::Swap)
        .expect("no swap event");
    assert_eq!(swap.line, Some(6));
    assert_eq!(swap.call_stack, vec!["bubbleSort(Array(2))".to_string()]);
}

#[test]
fn test_explanations_follow_playback() {
    let values = [2.0, 1.0];
    let mut playback = Playback::new(sort_trace(templates::BUBBLE_SORT, &values), values.to_vec());
    assert_eq!(explain(playback.current_event(), playback.snapshot()).title, "Ready to Start");

    while playback.current_event().map(|e| e.kind) != Some(EventKind::Compare) {
        assert!(playback.step_forward());
    }
    let compare = explain(playback.current_event(), playback.snapshot());
    assert_eq!(compare.title, "Comparison");
    assert!(compare.details.contains("Values are 2 and 1."), "{}", compare.details);
    assert_eq!(compare.metrics[0].value, "5");

    assert!(playback.step_forward());
    let swap = explain(playback.current_event(), playback.snapshot());
    assert_eq!(swap.title, "Swap");
    assert!(swap.details.ends_with("Moved 2 to index 1 and 1 to index 0."), "{}", swap.details);
}
