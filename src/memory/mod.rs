//! Memory model for the algorithm interpreter
//!
//! This module provides the core runtime abstractions:
//! - [`value`]: Runtime value representation (numbers, strings, shared arrays, closures)
//! - [`scope`]: Lexical environments with `let`/`const`/`var` binding rules
//!
//! # Arrays
//!
//! Arrays are shared (`Rc<RefCell<_>>`) so that algorithm routines mutate their
//! arguments in place. Arrays created from harness inputs carry an `observed`
//! flag; the interpreter routes writes to them through
//! [`crate::harness::observed::ObservedArray`], which records each write as a
//! trace event before performing it.

pub mod scope;
pub mod value;
