//! Tree-walking interpreter for the algorithm language
//!
//! This module provides the core execution logic:
//! - [`engine`]: the [`engine::Interpreter`], scopes, calls and the [`engine::Tracer`] seam
//! - [`statements`] / [`loops`] / [`expressions`]: evaluation of each syntax form
//! - [`builtins`]: `Math`, `console`, `Array`, `Error`, array methods and the trace hooks
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! The interpreter walks the AST directly. Values follow JavaScript semantics;
//! arrays are shared by reference. Writes to observed arrays, comparisons that
//! read them, and calls to the trace hooks are reported to the tracer, which
//! is the only way execution becomes visible outside the interpreter.
//!
//! Each statement and loop iteration costs one step; exceeding the step budget
//! or the call-depth limit aborts the run with an error `try` cannot catch.

pub mod builtins;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod expressions;
pub mod loops;
pub mod statements;
