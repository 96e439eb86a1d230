//! Execution harness
//!
//! [`execute`] turns algorithm source plus input data into a [`Trace`]:
//!
//! 1. instrument the source ([`crate::instrument`])
//! 2. parse the instrumented text, the "compile" step
//! 3. bind the trace hooks and the observed inputs as globals
//! 4. run the top-level statements
//! 5. call the first routine of [`ENTRY_ROUTINES`] the program defines, with
//!    every input as an argument
//! 6. for a sorting routine, append a `sorted` event covering the first input
//!
//! Every top-level list input is observed, and all of them report into the
//! same index space: an event's indices do not say which input they touched.
//! Playback applies them all to one baseline (the numbers for a sort, the
//! `visited` array for a graph routine), so a routine should mutate only the
//! input that baseline is built from.
//!
//! The result is all-or-nothing: any failure yields a [`HarnessError`] and no
//! events. A program that defines none of the entry routines is not an error;
//! it produces an empty trace.
//!
//! Each call runs on its own thread with a large stack, so deeply recursive
//! user code hits the call-depth limit instead of overflowing the host stack.
//! The thread is joined before returning.

pub mod context;
pub mod observed;

use crate::instrument::{instrument, ENTER_HOOK, EXIT_HOOK, LINE_HOOK};
use crate::interpreter::builtins::Builtin;
use crate::interpreter::constants::{
    DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_STEPS, DEFAULT_STACK_SIZE,
    MAX_ARRAY_LENGTH,
};
use crate::interpreter::engine::{Interpreter, Limits, Tracer};
use crate::interpreter::errors::RuntimeError;
use crate::memory::value::Value;
use crate::parser::parse_program;
use crate::trace::Trace;
use context::TraceContext;
use log::{debug, error, trace, warn};
use observed::observed_array;
use std::thread;
use thiserror::Error;

/// Name the first input is also bound to
pub const INPUT_GLOBAL: &str = "arr";

/// Algorithm family of an entry routine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Sorting,
    Graph,
}

/// A recognized entry-routine name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRoutine {
    pub name: &'static str,
    pub family: Family,
}

/// Entry routines in dispatch priority order
pub const ENTRY_ROUTINES: [EntryRoutine; 8] = [
    EntryRoutine {
        name: "bubbleSort",
        family: Family::Sorting,
    },
    EntryRoutine {
        name: "selectionSort",
        family: Family::Sorting,
    },
    EntryRoutine {
        name: "insertionSort",
        family: Family::Sorting,
    },
    EntryRoutine {
        name: "mergeSort",
        family: Family::Sorting,
    },
    EntryRoutine {
        name: "quickSort",
        family: Family::Sorting,
    },
    EntryRoutine {
        name: "bfs",
        family: Family::Graph,
    },
    EntryRoutine {
        name: "dfs",
        family: Family::Graph,
    },
    EntryRoutine {
        name: "sort",
        family: Family::Sorting,
    },
];

/// Raw input data
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Number(f64),
    List(Vec<Input>),
}

impl Input {
    /// List of numbers
    pub fn numbers(values: &[f64]) -> Input {
        Input::List(values.iter().map(|n| Input::Number(*n)).collect())
    }

    /// Adjacency list
    pub fn adjacency(rows: &[Vec<usize>]) -> Input {
        Input::List(
            rows.iter()
                .map(|row| Input::List(row.iter().map(|n| Input::Number(*n as f64)).collect()))
                .collect(),
        )
    }

    /// Runtime value for an argument: a top-level list becomes a private
    /// observed copy, nested lists stay plain
    fn to_argument(&self) -> Value {
        match self {
            Input::Number(n) => Value::Number(*n),
            Input::List(items) => observed_array(items.iter().map(Input::to_plain).collect()),
        }
    }

    fn to_plain(&self) -> Value {
        match self {
            Input::Number(n) => Value::Number(*n),
            Input::List(items) => Value::array(items.iter().map(Input::to_plain).collect()),
        }
    }
}

/// Execution limits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Statements and loop iterations allowed per execution
    pub max_steps: u64,
    /// Maximum nesting of user function calls
    pub max_call_depth: usize,
    /// Longest array a program may build; capped at [`MAX_ARRAY_LENGTH`]
    pub max_array_length: usize,
    /// Stack size of the execution thread, in bytes
    pub stack_size: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            max_steps: DEFAULT_MAX_STEPS,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

impl HarnessConfig {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_max_call_depth(mut self, max_call_depth: usize) -> Self {
        self.max_call_depth = max_call_depth;
        self
    }

    pub fn with_max_array_length(mut self, max_array_length: usize) -> Self {
        self.max_array_length = max_array_length.min(MAX_ARRAY_LENGTH);
        self
    }

    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    fn limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            max_call_depth: self.max_call_depth,
            max_array_length: self.max_array_length,
        }
    }
}

/// Why an execution produced no trace. Every variant displays as one
/// human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// The submitted source does not parse
    #[error("{message}")]
    Parse { message: String },

    /// The instrumented source does not parse
    #[error("Internal error: instrumented source failed to compile: {message}")]
    Compile { message: String },

    /// The program failed while running
    #[error("{message}")]
    Runtime { message: String },

    #[error("Execution thread failed: {0}")]
    Thread(String),
}

/// Run `source` against `inputs` with default limits
pub fn execute(source: &str, inputs: &[Input]) -> Result<Trace, HarnessError> {
    execute_with_config(source, inputs, &HarnessConfig::default())
}

pub fn execute_with_config(
    source: &str,
    inputs: &[Input],
    config: &HarnessConfig,
) -> Result<Trace, HarnessError> {
    let source = source.to_string();
    let inputs = inputs.to_vec();
    let config = config.clone();

    let handle = thread::Builder::new()
        .name("algotrace-exec".to_string())
        .stack_size(config.stack_size)
        .spawn(move || run(&source, &inputs, &config))
        .map_err(|err| HarnessError::Thread(err.to_string()))?;

    handle
        .join()
        .map_err(|_| HarnessError::Thread("execution thread panicked".to_string()))?
}

fn run(source: &str, inputs: &[Input], config: &HarnessConfig) -> Result<Trace, HarnessError> {
    let instrumented = instrument(source);
    let rewritten = instrumented != source;

    let program = parse_program(&instrumented).map_err(|err| {
        if rewritten {
            error!("instrumented source failed to parse: {}", err);
            HarnessError::Compile {
                message: err.to_string(),
            }
        } else {
            HarnessError::Parse {
                message: err.to_string(),
            }
        }
    })?;

    let mut interp = Interpreter::new(TraceContext::new(), config.limits());
    interp.define_global(LINE_HOOK, Value::Builtin(Builtin::LineHook));
    interp.define_global(ENTER_HOOK, Value::Builtin(Builtin::EnterHook));
    interp.define_global(EXIT_HOOK, Value::Builtin(Builtin::ExitHook));

    let args: Vec<Value> = inputs.iter().map(Input::to_argument).collect();
    if let Some(first) = args.first() {
        interp.define_global(INPUT_GLOBAL, first.clone());
    }

    if let Err(err) = interp.run_program(&program) {
        return Err(runtime_failure(&err, interp.tracer()));
    }

    let Some((routine, function)) = ENTRY_ROUTINES
        .iter()
        .find_map(|routine| interp.lookup_function(routine.name).map(|f| (routine, f)))
    else {
        warn!("no entry routine defined, expected one of: {}", routine_names());
        return Ok(Trace::default());
    };

    debug!("dispatching to {} with {} argument(s)", routine.name, args.len());
    if let Err(err) = interp.call_function(&function, args.clone()) {
        return Err(runtime_failure(&err, interp.tracer()));
    }
    let steps = interp.steps();

    let mut context = interp.into_tracer();
    if routine.family == Family::Sorting {
        let first_observed = args.iter().find_map(|arg| match arg {
            Value::Array(array) if array.borrow().observed => Some(array.borrow().len()),
            _ => None,
        });
        if let Some(len) = first_observed {
            context.sorted(len);
        }
    }

    let events = context.into_events();
    trace!("{} produced {} events in {} steps", routine.name, events.len(), steps);
    Ok(Trace::new(events))
}

fn runtime_failure(err: &RuntimeError, context: &TraceContext) -> HarnessError {
    let message = match context.current_line() {
        Some(line) => format!("{} (line {})", err, line),
        None => err.to_string(),
    };
    HarnessError::Runtime { message }
}

fn routine_names() -> String {
    ENTRY_ROUTINES
        .iter()
        .map(|routine| routine.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::EventKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dispatch_priority() {
        let source = "
            function sort(a) { a[0] = 100; }
            function insertionSort(a) { a[0] = 1; }
        ";
        let trace = execute(source, &[Input::numbers(&[9.0])]).unwrap();
        let writes: Vec<f64> = trace.iter().filter_map(|e| e.value).collect();
        assert_eq!(writes, vec![1.0]);
    }

    #[test]
    fn test_observed_inputs_share_index_space() {
        let source = "function sort(a, b) { a[1] = 5; b[1] = 6; }";
        let trace = execute(source, &[Input::numbers(&[0.0, 0.0]), Input::numbers(&[0.0, 0.0])]).unwrap();
        let writes: Vec<(Vec<usize>, Option<f64>)> = trace
            .iter()
            .filter(|e| e.kind == EventKind::Overwrite)
            .map(|e| (e.indices.clone(), e.value))
            .collect();
        assert_eq!(writes, vec![(vec![1], Some(5.0)), (vec![1], Some(6.0))]);
        // Both land on the same snapshot
        assert_eq!(trace.replay(&[0.0, 0.0]), vec![0.0, 6.0]);
    }

    #[test]
    fn test_missing_entry_routine_is_empty_trace() {
        let trace = execute("function helper(a) { a[0] = 1; }", &[Input::numbers(&[3.0])]).unwrap();
        assert!(trace.is_empty());
    }

    #[test]
    fn test_inputs_are_private_copies() {
        let inputs = [Input::numbers(&[2.0, 1.0])];
        let source = "function sort(a) { a[0] = a[1]; }";
        let first = execute(source, &inputs).unwrap();
        let second = execute(source, &inputs).unwrap();
        assert_eq!(first, second);
        assert_eq!(inputs[0], Input::numbers(&[2.0, 1.0]));
    }

    #[test]
    fn test_input_bound_as_arr() {
        let source = "function sort() { arr[0] = 4; }";
        let trace = execute(source, &[Input::numbers(&[1.0])]).unwrap();
        assert_eq!(trace.count(EventKind::Overwrite), 1);
    }

    #[test]
    fn test_graph_routine_has_no_sorted_event() {
        let source = "function dfs(graph, visited) { visited[0] = 1; }";
        let trace = execute(
            source,
            &[Input::adjacency(&[vec![]]), Input::numbers(&[0.0])],
        )
        .unwrap();
        assert_eq!(trace.count(EventKind::Sorted), 0);
        assert_eq!(trace.count(EventKind::Overwrite), 1);
    }

    #[test]
    fn test_runtime_error_carries_line() {
        let source = "function sort(a) {\n  let x;\n  return x.length;\n}";
        let err = execute(source, &[Input::numbers(&[1.0])]).unwrap_err();
        assert_eq!(
            err,
            HarnessError::Runtime {
                message: "TypeError: Cannot read properties of undefined (reading 'length') (line 3)"
                    .to_string()
            }
        );
    }

    #[test]
    fn test_parse_error() {
        let err = execute("function sort(a) {", &[]).unwrap_err();
        assert!(matches!(err, HarnessError::Parse { .. }));
        assert!(err.to_string().starts_with("SyntaxError"));
    }

    #[test]
    fn test_step_limit() {
        let config = HarnessConfig::default().with_max_steps(10_000);
        let err = execute_with_config("function sort() { while (true) {} }", &[], &config).unwrap_err();
        assert!(matches!(err, HarnessError::Runtime { .. }));
        assert!(err.to_string().contains("10000"));
    }

    #[test]
    fn test_sparse_write_past_array_limit_is_range_error() {
        let err = execute("function sort(a) { a[4294967294] = 1; }", &[Input::numbers(&[1.0])]).unwrap_err();
        assert_eq!(
            err,
            HarnessError::Runtime {
                message: "RangeError: Invalid array length (line 1)".to_string()
            }
        );
    }

    #[test]
    fn test_array_growth_respects_configured_limit() {
        let config = HarnessConfig::default().with_max_array_length(4);
        for body in [
            "a[4] = 0;",
            "a.length = 5;",
            "a.push(1, 2, 3, 4);",
            "a.unshift(1, 2, 3, 4);",
            "const b = new Array(5);",
            "const b = a.concat([1, 2], 3, 4);",
            "const b = [...a, ...a, ...a, ...a, ...a];",
        ] {
            let source = format!("function sort(a) {{ {} }}", body);
            let err = execute_with_config(&source, &[Input::numbers(&[1.0])], &config).unwrap_err();
            assert!(
                err.to_string().starts_with("RangeError: Invalid array length"),
                "{}: {}",
                body,
                err
            );
        }

        let trace = execute_with_config("function sort(a) { a[3] = 9; }", &[Input::numbers(&[1.0])], &config).unwrap();
        assert_eq!(trace.replay(&[1.0]).len(), 4);
    }

    #[test]
    fn test_array_length_error_is_catchable() {
        let source = "
            function sort(a) {
                try {
                    const big = new Array(4000000000);
                } catch (e) {
                    a[0] = e.name === 'RangeError' ? 1 : 2;
                }
            }
        ";
        let trace = execute(source, &[Input::numbers(&[0.0])]).unwrap();
        assert_eq!(trace.replay(&[0.0]), vec![1.0]);
    }

    #[test]
    fn test_runaway_string_doubling_is_range_error() {
        let source = "function sort(a) { let s = 'x'; while (true) { s += s; } }";
        let err = execute(source, &[Input::numbers(&[1.0])]).unwrap_err();
        assert!(err.to_string().starts_with("RangeError: Invalid string length"), "{}", err);
    }

    #[test]
    fn test_call_depth_limit() {
        let config = HarnessConfig::default().with_max_call_depth(50);
        let source = "function sort(n) { return sort(n + 1); }";
        let err = execute_with_config(source, &[Input::Number(0.0)], &config).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("RangeError: Maximum call stack size exceeded"));
    }
}
