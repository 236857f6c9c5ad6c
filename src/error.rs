// ABOUTME: Error types for reader and evaluation failures

use crate::value::Value;
use thiserror::Error;

/// Errors raised by the reader, the evaluator, and builtins.
///
/// Every variant can surface to the language as a first-class value:
/// `Thrown` carries the value directly, everything else converts to a String
/// via [`LispError::into_value`] when a `try*` catches it.
#[derive(Error, Debug, Clone)]
pub enum LispError {
    /// A value raised by `(throw v)` or re-raised by the evaluator.
    #[error("{0}")]
    Thrown(Value),

    /// Symbol lookup failed all the way up the environment chain.
    #[error("'{0}' not found")]
    SymbolNotFound(String),

    /// A builtin or special form received a value of the wrong kind.
    #[error("{function}: expected {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: String,
        actual: String,
    },

    /// Wrong number of arguments, with the expected count or range.
    #[error("{function}: expected {expected} argument{}, got {actual}", if *.expected == "1" { "" } else { "s" })]
    Arity {
        function: String,
        expected: String, // "2", "1-2", "at least 1"
        actual: usize,
    },

    /// The head of an application did not evaluate to a function.
    #[error("value is not callable")]
    NotCallable,

    /// Unterminated string or unclosed collection in the reader.
    #[error("unbalanced")]
    Unbalanced,

    /// Anything else, pre-formatted.
    #[error("{0}")]
    Message(String),
}

impl LispError {
    /// Type mismatch with the offending value's type filled in
    pub fn type_mismatch(function: &str, expected: &str, actual: &Value) -> Self {
        LispError::TypeMismatch {
            function: function.to_string(),
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }

    /// Arity error with expected count or range
    pub fn arity(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        LispError::Arity {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn msg(message: impl Into<String>) -> Self {
        LispError::Message(message.into())
    }

    /// The value a `try*` binds in its `catch*` clause. Host-side errors
    /// become String values; thrown values pass through untouched.
    pub fn into_value(self) -> Value {
        match self {
            LispError::Thrown(value) => value,
            other => Value::Str(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = LispError::SymbolNotFound("x".to_string());
        assert_eq!(err.to_string(), "'x' not found");
    }

    #[test]
    fn test_arity_pluralization() {
        let one = LispError::arity("first", "1", 2);
        assert_eq!(one.to_string(), "first: expected 1 argument, got 2");

        let two = LispError::arity("cons", "2", 0);
        assert_eq!(two.to_string(), "cons: expected 2 arguments, got 0");
    }

    #[test]
    fn test_thrown_value_passes_through() {
        let err = LispError::Thrown(Value::Int(42));
        match err.into_value() {
            Value::Int(n) => assert_eq!(n, 42),
            other => panic!("expected Int(42), got {:?}", other),
        }
    }

    #[test]
    fn test_host_error_becomes_string_value() {
        let err = LispError::SymbolNotFound("abc".to_string());
        match err.into_value() {
            Value::Str(s) => assert_eq!(s, "'abc' not found"),
            other => panic!("expected string value, got {:?}", other),
        }
    }
}
