//! Runtime value representation
//!
//! This module defines the [`Value`] enum, which represents all possible runtime values
//! of the algorithm language. Values follow JavaScript's dynamic typing: conversions
//! between numbers, strings and booleans happen on demand.
//!
//! # Value Types
//!
//! - [`Value::Undefined`] / [`Value::Null`]
//! - [`Value::Bool`], [`Value::Number`] (always `f64`), [`Value::Str`]
//! - [`Value::Array`]: shared, mutable array ([`ArrayRef`]); observed arrays report
//!   their writes as trace events
//! - [`Value::Function`]: user closure
//! - [`Value::Builtin`] / [`Value::Namespace`]: host functions and objects like `Math`
//! - [`Value::Error`]: value produced by `new Error(..)` or a caught runtime error
//!
//! # Sharing
//!
//! Arrays are reference types: cloning a [`Value::Array`] clones the pointer, so the
//! callee of `sort(arr)` mutates the caller's array, as in JavaScript.

use crate::interpreter::builtins::{Builtin, Namespace};
use crate::interpreter::constants::MAX_STRING_LENGTH;
use crate::memory::scope::ScopeRef;
use crate::parser::ast::Function;
use crate::parser::printer::format_number;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an array
pub type ArrayRef = Rc<RefCell<JsArray>>;

/// Array storage. `observed` marks arrays backed by a harness input.
#[derive(Debug, Clone, Default)]
pub struct JsArray {
    pub items: Vec<Value>,
    pub observed: bool,
}

impl JsArray {
    pub fn new(items: Vec<Value>) -> Self {
        JsArray {
            items,
            observed: false,
        }
    }

    pub fn observed(items: Vec<Value>) -> Self {
        JsArray {
            items,
            observed: true,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Read an element; out-of-range reads yield `undefined`
    pub fn get(&self, index: usize) -> Value {
        self.items.get(index).cloned().unwrap_or(Value::Undefined)
    }

    /// Write an element, growing the array with `undefined` holes if needed
    pub fn set(&mut self, index: usize, value: Value) {
        if index >= self.items.len() {
            self.items.resize(index + 1, Value::Undefined);
        }
        self.items[index] = value;
    }
}

/// Nesting depth past which inner arrays render as empty
const MAX_JOIN_DEPTH: usize = 1024;

/// `Array.prototype.join`. An array that is already being joined further up
/// (a cycle) contributes nothing, as in JavaScript. The output stops growing
/// once it passes [`MAX_STRING_LENGTH`]; callers that must fail compare the
/// result against that limit.
pub fn join_array(array: &ArrayRef, separator: &str) -> String {
    let mut out = String::new();
    join_into(array, separator, &mut Vec::new(), &mut out);
    out
}

fn join_into(
    array: &ArrayRef,
    separator: &str,
    active: &mut Vec<*const RefCell<JsArray>>,
    out: &mut String,
) {
    let ptr = Rc::as_ptr(array);
    if active.len() >= MAX_JOIN_DEPTH || active.contains(&ptr) {
        return;
    }
    active.push(ptr);
    for (i, item) in array.borrow().items.iter().enumerate() {
        if out.len() > MAX_STRING_LENGTH {
            break;
        }
        if i > 0 {
            out.push_str(separator);
        }
        match item {
            Value::Undefined | Value::Null => {}
            Value::Array(inner) => join_into(inner, ",", active, out),
            other => out.push_str(&other.to_string()),
        }
    }
    active.pop();
}

/// A user function together with the scope it was created in
pub struct Closure {
    pub func: Rc<Function>,
    pub env: ScopeRef,
}

impl Closure {
    pub fn name(&self) -> &str {
        self.func.name.as_deref().unwrap_or("")
    }
}

// The environment may contain the closure itself, so it is not printed
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("name", &self.func.name)
            .field("params", &self.func.params.len())
            .field("is_arrow", &self.func.is_arrow)
            .finish()
    }
}

/// Payload of an error value (`new Error(msg)` or a caught runtime error)
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
}

/// Runtime values in the interpreter
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(Rc<str>),
    Array(ArrayRef),
    Function(Rc<Closure>),
    Builtin(Builtin),
    Namespace(Namespace),
    Error(Rc<ErrorValue>),
}

impl Value {
    /// New plain (unobserved) array value
    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(JsArray::new(items))))
    }

    pub fn string(s: &str) -> Value {
        Value::Str(Rc::from(s))
    }

    pub fn error(name: &str, message: &str) -> Value {
        Value::Error(Rc::new(ErrorValue {
            name: name.to_string(),
            message: message.to_string(),
        }))
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Builtin(_))
    }

    /// JavaScript truthiness
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// JavaScript `Number(value)`
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => string_to_number(s),
            Value::Array(array) => {
                let array = array.borrow();
                match array.items.as_slice() {
                    [] => 0.0,
                    [single] => single.to_number(),
                    _ => f64::NAN,
                }
            }
            _ => f64::NAN,
        }
    }

    /// JavaScript `ToInt32`, used by the bitwise operators
    pub fn to_int32(&self) -> i32 {
        let n = self.to_number();
        if !n.is_finite() {
            return 0;
        }
        n.trunc().rem_euclid(4_294_967_296.0) as u32 as i32
    }

    /// Result of the `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Function(_) | Value::Builtin(_) => "function",
            Value::Null | Value::Array(_) | Value::Namespace(_) | Value::Error(_) => "object",
        }
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Namespace(a), Value::Namespace(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => {
                let (a, b) = (self.to_number(), other.to_number());
                a == b
            }
            (Value::Array(_), Value::Number(_)) | (Value::Number(_), Value::Array(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Array(_), Value::Str(_)) | (Value::Str(_), Value::Array(_)) => {
                self.to_string() == other.to_string()
            }
            _ => self.strict_equals(other),
        }
    }

    /// Rendering used for call-stack frame arguments
    pub fn frame_text(&self) -> String {
        match self {
            Value::Array(array) => format!("Array({})", array.borrow().len()),
            other => other.to_string(),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    match trimmed {
        "" => 0.0,
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        // Rust accepts "inf" and "nan", JavaScript does not
        _ if trimmed
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') =>
        {
            f64::NAN
        }
        _ => trimmed.parse().unwrap_or(f64::NAN),
    }
}

/// JavaScript `String(value)`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Array(array) => write!(f, "{}", join_array(array, ",")),
            Value::Function(closure) => write!(f, "function {}() {{ ... }}", closure.name()),
            Value::Builtin(builtin) => write!(f, "function {}() {{ [native code] }}", builtin.name()),
            Value::Namespace(namespace) => write!(f, "[object {}]", namespace.name()),
            Value::Error(err) if err.message.is_empty() => write!(f, "{}", err.name),
            Value::Error(err) => write!(f, "{}: {}", err.name, err.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::string("0").is_truthy());
        assert!(Value::array(vec![]).is_truthy());
    }

    #[test]
    fn test_to_number() {
        assert_eq!(Value::string(" 42 ").to_number(), 42.0);
        assert_eq!(Value::string("").to_number(), 0.0);
        assert!(Value::string("inf").to_number().is_nan());
        assert_eq!(Value::string("1e3").to_number(), 1000.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert!(Value::Undefined.to_number().is_nan());
        assert_eq!(Value::array(vec![Value::Number(7.0)]).to_number(), 7.0);
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(Value::Number(4_294_967_297.0).to_int32(), 1);
        assert_eq!(Value::Number(-1.5).to_int32(), -1);
        assert_eq!(Value::Number(f64::INFINITY).to_int32(), 0);
    }

    #[test]
    fn test_equality() {
        let a = Value::array(vec![]);
        assert!(a.strict_equals(&a.clone()));
        assert!(!a.strict_equals(&Value::array(vec![])));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.strict_equals(&Value::Undefined));
        assert!(Value::string("1").loose_equals(&Value::Number(1.0)));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
    }

    #[test]
    fn test_display_and_frame_text() {
        let array = Value::array(vec![Value::Number(1.0), Value::Undefined, Value::string("x")]);
        assert_eq!(array.to_string(), "1,,x");
        assert_eq!(array.frame_text(), "Array(3)");
        assert_eq!(Value::Number(3.0).frame_text(), "3");
        assert_eq!(Value::error("TypeError", "boom").to_string(), "TypeError: boom");
    }

    #[test]
    fn test_cyclic_arrays_render_as_empty() {
        let array = Value::array(vec![Value::Number(1.0)]);
        let inner = Value::array(vec![Value::Number(2.0), array.clone()]);
        let outer = array.as_array().unwrap().clone();
        outer.borrow_mut().items.extend([array.clone(), inner.clone()]);
        assert_eq!(array.to_string(), "1,,2,");
        assert_eq!(inner.to_string(), "2,1,,");
        assert_eq!(join_array(array.as_array().unwrap(), "-"), "1--2,");
    }

    #[test]
    fn test_deep_nesting_renders_without_recursing_forever() {
        let mut value = Value::array(vec![Value::Number(7.0)]);
        for _ in 0..2_000 {
            value = Value::array(vec![value]);
        }
        assert_eq!(value.to_string(), "");
    }

    #[test]
    fn test_array_set_extends() {
        let mut array = JsArray::new(vec![Value::Number(1.0)]);
        array.set(3, Value::Number(4.0));
        assert_eq!(array.len(), 4);
        assert!(matches!(array.get(2), Value::Undefined));
        assert!(matches!(array.get(10), Value::Undefined));
    }
}
