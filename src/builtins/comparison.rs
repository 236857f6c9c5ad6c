//! Comparison operations: =, <, <=, >, >=
//!
//! `=` is structural equality over any two values (lists and vectors with
//! the same elements compare equal). The orderings take two integers.

use super::arithmetic::two_ints;
use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::rc::Rc;

/// Structural equality of any two values
pub fn builtin_eq(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("=", "2", args.len()));
    }
    Ok(Value::Bool(args[0] == args[1]))
}

pub fn builtin_lt(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("<", args)?;
    Ok(Value::Bool(a < b))
}

pub fn builtin_le(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("<=", args)?;
    Ok(Value::Bool(a <= b))
}

pub fn builtin_gt(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints(">", args)?;
    Ok(Value::Bool(a > b))
}

pub fn builtin_ge(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints(">=", args)?;
    Ok(Value::Bool(a >= b))
}

/// Register all comparison builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("=", Value::builtin("=", builtin_eq));
    env.set("<", Value::builtin("<", builtin_lt));
    env.set("<=", Value::builtin("<=", builtin_le));
    env.set(">", Value::builtin(">", builtin_gt));
    env.set(">=", Value::builtin(">=", builtin_ge));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderings() {
        assert_eq!(
            builtin_lt(&[Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_le(&[Value::Int(2), Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_gt(&[Value::Int(1), Value::Int(2)]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            builtin_ge(&[Value::Int(3), Value::Int(2)]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_equality_crosses_sequence_kinds() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let vector = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(builtin_eq(&[list, vector]).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_equality_distinguishes_keywords_from_strings() {
        assert_eq!(
            builtin_eq(&[Value::keyword("a"), Value::string("a")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_ordering_requires_ints() {
        assert!(builtin_lt(&[Value::string("a"), Value::Int(1)]).is_err());
    }
}
