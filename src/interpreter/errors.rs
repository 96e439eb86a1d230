//! Runtime error types for the algorithm interpreter
//!
//! This module defines [`RuntimeError`], which represents all errors that can occur
//! during program execution (as opposed to parse errors).
//!
//! Messages follow JavaScript's wording so that users see the same text a browser
//! would print. User code can intercept every error with `try`/`catch` except the
//! two resource limits, which always abort the run.

use crate::memory::value::Value;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    /// Read of a name that is not bound in any enclosing scope
    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    /// Operation applied to a value of the wrong kind
    #[error("TypeError: {message}")]
    TypeError { message: String },

    /// Numeric argument out of range (e.g. `new Array(-1)`)
    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// Value thrown by a `throw` statement
    #[error("Uncaught {value}")]
    Thrown { value: Value },

    /// Statement budget exhausted (runaway loop)
    #[error("Execution exceeded {limit} steps")]
    StepLimitExceeded { limit: u64 },

    /// Recursion deeper than the configured limit
    #[error("RangeError: Maximum call stack size exceeded")]
    CallDepthExceeded { depth: usize },

    /// Construct outside the supported subset
    #[error("SyntaxError: {feature} is not supported")]
    Unsupported { feature: String },
}

impl RuntimeError {
    pub fn type_error(message: impl Into<String>) -> Self {
        RuntimeError::TypeError {
            message: message.into(),
        }
    }

    pub fn invalid_array_length() -> Self {
        RuntimeError::RangeError {
            message: "Invalid array length".to_string(),
        }
    }

    pub fn invalid_string_length() -> Self {
        RuntimeError::RangeError {
            message: "Invalid string length".to_string(),
        }
    }

    /// Whether `try`/`catch` may intercept this error
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self,
            RuntimeError::StepLimitExceeded { .. } | RuntimeError::CallDepthExceeded { .. }
        )
    }

    /// Value bound to the `catch` parameter
    pub fn into_value(self) -> Value {
        match self {
            RuntimeError::Thrown { value } => value,
            RuntimeError::ReferenceError { name } => {
                Value::error("ReferenceError", &format!("{} is not defined", name))
            }
            RuntimeError::TypeError { message } => Value::error("TypeError", &message),
            RuntimeError::RangeError { message } => Value::error("RangeError", &message),
            RuntimeError::Unsupported { feature } => {
                Value::error("SyntaxError", &format!("{} is not supported", feature))
            }
            other => Value::error("Error", &other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = RuntimeError::ReferenceError {
            name: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "ReferenceError: foo is not defined");

        let err = RuntimeError::CallDepthExceeded { depth: 500 };
        assert_eq!(err.to_string(), "RangeError: Maximum call stack size exceeded");

        let err = RuntimeError::Thrown {
            value: Value::error("Error", "boom"),
        };
        assert_eq!(err.to_string(), "Uncaught Error: boom");
    }

    #[test]
    fn test_limits_are_not_catchable() {
        assert!(!RuntimeError::StepLimitExceeded { limit: 10 }.is_catchable());
        assert!(!RuntimeError::CallDepthExceeded { depth: 10 }.is_catchable());
        assert!(RuntimeError::type_error("x").is_catchable());
    }

    #[test]
    fn test_caught_value() {
        let value = RuntimeError::type_error("arr is not iterable").into_value();
        assert_eq!(value.to_string(), "TypeError: arr is not iterable");
    }
}
