//! Arithmetic operations: +, -, *, /
//!
//! Each takes exactly two integers. Overflow wraps two's-complement at
//! 64 bits; division by zero raises a catchable error.

use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::rc::Rc;

/// Extract the two integer arguments every arithmetic and ordering builtin
/// expects
pub(crate) fn two_ints(name: &str, args: &[Value]) -> Result<(i64, i64), LispError> {
    if args.len() != 2 {
        return Err(LispError::arity(name, "2", args.len()));
    }
    match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Ok((*a, *b)),
        (Value::Int(_), other) | (other, _) => Err(LispError::type_mismatch(name, "int", other)),
    }
}

/// Returns the sum of its two arguments.
///
/// # Examples
///
/// ```lisp
/// (+ 1 2) => 3
/// (+ 1 (* 2 3)) => 7
/// ```
pub fn builtin_add(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("+", args)?;
    Ok(Value::Int(a.wrapping_add(b)))
}

/// Returns the first argument minus the second.
///
/// # Examples
///
/// ```lisp
/// (- 10 3) => 7
/// ```
pub fn builtin_sub(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("-", args)?;
    Ok(Value::Int(a.wrapping_sub(b)))
}

/// Returns the product of its two arguments.
///
/// # Examples
///
/// ```lisp
/// (* 6 7) => 42
/// ```
pub fn builtin_mul(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("*", args)?;
    Ok(Value::Int(a.wrapping_mul(b)))
}

/// Returns the first argument divided by the second, truncating toward zero.
///
/// # Examples
///
/// ```lisp
/// (/ 20 4) => 5
/// (/ 7 2) => 3
/// ```
pub fn builtin_div(args: &[Value]) -> Result<Value, LispError> {
    let (a, b) = two_ints("/", args)?;
    if b == 0 {
        return Err(LispError::msg("division by zero"));
    }
    Ok(Value::Int(a.wrapping_div(b)))
}

/// Register all arithmetic builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("+", Value::builtin("+", builtin_add));
    env.set("-", Value::builtin("-", builtin_sub));
    env.set("*", Value::builtin("*", builtin_mul));
    env.set("/", Value::builtin("/", builtin_div));
}
