//! Algorithm source parser
//!
//! This module transforms JavaScript-like source text into an Abstract Syntax Tree (AST)
//! and back again:
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parser`]: Parsing (tokens → AST)
//! - [`ast`]: AST node definitions
//! - [`printer`]: Printing (AST → source text)
//!
//! # Supported Subset
//!
//! The parser supports the functional subset algorithm templates are written in:
//! - Declarations: `let`, `const`, `var`, function declarations, function and arrow expressions
//! - Statements: `if`, `for`, `for…of`, `while`, `do…while`, `break`, `continue`, `return`,
//!   `throw`, `try`/`catch`/`finally`
//! - Expressions: arithmetic, logical, bitwise, ternary, calls, indexing, array literals with
//!   spread, array destructuring assignment
//! - No objects, classes, template literals, regular expressions or modules
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! Semicolons are inserted at line breaks, before `}` and at end of input.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod printer;

pub use parser::{parse_program, ParseError};
