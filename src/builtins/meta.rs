//! Exceptions and metadata: throw, meta, with-meta
//!
//! `throw` raises its argument as a first-class exception that unwinds to
//! the nearest `try*`. Metadata lives on lists, vectors, maps, and
//! functions; `with-meta` returns a shallow copy carrying the new value.

use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::rc::Rc;

/// Raises its argument as an exception
pub fn builtin_throw(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("throw", "1", args.len()));
    }
    Err(LispError::Thrown(args[0].clone()))
}

/// The metadata of a value, nil when absent or unsupported
pub fn builtin_meta(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("meta", "1", args.len()));
    }
    Ok(args[0].meta())
}

/// A copy of the value with its metadata replaced
pub fn builtin_with_meta(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("with-meta", "2", args.len()));
    }
    args[0].with_meta(args[1].clone())
}

/// Register exception and metadata builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("throw", Value::builtin("throw", builtin_throw));
    env.set("meta", Value::builtin("meta", builtin_meta));
    env.set("with-meta", Value::builtin("with-meta", builtin_with_meta));
}
