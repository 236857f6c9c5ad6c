//! Sequence operations: list, cons, concat, vec, nth, first, rest, count,
//! conj, seq, apply, map, and the related predicates
//!
//! Lists and vectors are immutable; every operation here builds a new
//! container and may share elements with its inputs.

use crate::env::Environment;
use crate::error::LispError;
use crate::eval;
use crate::value::Value;
use std::rc::Rc;

fn seq_arg<'a>(name: &str, args: &'a [Value], index: usize) -> Result<&'a [Value], LispError> {
    args[index]
        .as_seq()
        .ok_or_else(|| LispError::type_mismatch(name, "list or vector", &args[index]))
}

fn check_arity(name: &str, expected: usize, args: &[Value]) -> Result<(), LispError> {
    if args.len() != expected {
        return Err(LispError::arity(name, expected.to_string(), args.len()));
    }
    Ok(())
}

/// Creates a new list containing the given elements in order
pub fn builtin_list(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::list(args.to_vec()))
}

pub fn builtin_list_q(args: &[Value]) -> Result<Value, LispError> {
    check_arity("list?", 1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::List(..))))
}

/// Creates a new vector containing the given elements in order
pub fn builtin_vector(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::vector(args.to_vec()))
}

pub fn builtin_vector_q(args: &[Value]) -> Result<Value, LispError> {
    check_arity("vector?", 1, args)?;
    Ok(Value::Bool(matches!(args[0], Value::Vector(..))))
}

pub fn builtin_sequential_q(args: &[Value]) -> Result<Value, LispError> {
    check_arity("sequential?", 1, args)?;
    Ok(Value::Bool(args[0].as_seq().is_some()))
}

/// Tests whether a sequence has no elements; nil counts as empty
pub fn builtin_empty_q(args: &[Value]) -> Result<Value, LispError> {
    check_arity("empty?", 1, args)?;
    match &args[0] {
        Value::Nil => Ok(Value::Bool(true)),
        _ => Ok(Value::Bool(seq_arg("empty?", args, 0)?.is_empty())),
    }
}

/// Number of elements in a sequence; nil counts as 0
pub fn builtin_count(args: &[Value]) -> Result<Value, LispError> {
    check_arity("count", 1, args)?;
    match &args[0] {
        Value::Nil => Ok(Value::Int(0)),
        _ => Ok(Value::Int(seq_arg("count", args, 0)?.len() as i64)),
    }
}

/// Prepends an element to a sequence, yielding a new list
pub fn builtin_cons(args: &[Value]) -> Result<Value, LispError> {
    check_arity("cons", 2, args)?;
    let tail = seq_arg("cons", args, 1)?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

/// Concatenates any number of sequences into one list
pub fn builtin_concat(args: &[Value]) -> Result<Value, LispError> {
    let mut items = Vec::new();
    for index in 0..args.len() {
        items.extend_from_slice(seq_arg("concat", args, index)?);
    }
    Ok(Value::list(items))
}

/// Converts a sequence to a vector
pub fn builtin_vec(args: &[Value]) -> Result<Value, LispError> {
    check_arity("vec", 1, args)?;
    match &args[0] {
        vector @ Value::Vector(..) => Ok(vector.clone()),
        _ => Ok(Value::vector(seq_arg("vec", args, 0)?.to_vec())),
    }
}

/// Element at an index; out-of-range indexes throw
pub fn builtin_nth(args: &[Value]) -> Result<Value, LispError> {
    check_arity("nth", 2, args)?;
    let items = seq_arg("nth", args, 0)?;
    let index = match &args[1] {
        Value::Int(i) => *i,
        other => return Err(LispError::type_mismatch("nth", "int", other)),
    };
    usize::try_from(index)
        .ok()
        .and_then(|i| items.get(i))
        .cloned()
        .ok_or_else(|| LispError::msg("out of range"))
}

/// First element, or nil for an empty sequence or nil
pub fn builtin_first(args: &[Value]) -> Result<Value, LispError> {
    check_arity("first", 1, args)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        _ => Ok(seq_arg("first", args, 0)?.first().cloned().unwrap_or(Value::Nil)),
    }
}

/// Everything after the first element; empty list for an empty sequence or nil
pub fn builtin_rest(args: &[Value]) -> Result<Value, LispError> {
    check_arity("rest", 1, args)?;
    match &args[0] {
        Value::Nil => Ok(Value::list(vec![])),
        _ => {
            let items = seq_arg("rest", args, 0)?;
            Ok(Value::list(items.get(1..).unwrap_or(&[]).to_vec()))
        }
    }
}

/// Normalizes to a list: vectors convert, strings split into one-character
/// strings, empty input and nil become nil
pub fn builtin_seq(args: &[Value]) -> Result<Value, LispError> {
    check_arity("seq", 1, args)?;
    match &args[0] {
        Value::Nil => Ok(Value::Nil),
        Value::Str(s) if s.is_empty() => Ok(Value::Nil),
        Value::Str(s) => Ok(Value::list(
            s.chars().map(|c| Value::Str(c.to_string())).collect(),
        )),
        _ => {
            let items = seq_arg("seq", args, 0)?;
            if items.is_empty() {
                Ok(Value::Nil)
            } else {
                Ok(Value::list(items.to_vec()))
            }
        }
    }
}

/// Adds elements to a collection: prepending one by one for a list,
/// appending for a vector
pub fn builtin_conj(args: &[Value]) -> Result<Value, LispError> {
    if args.is_empty() {
        return Err(LispError::arity("conj", "at least 1", args.len()));
    }
    match &args[0] {
        Value::List(items, _) => {
            let mut out = items.as_ref().clone();
            for value in &args[1..] {
                out.insert(0, value.clone());
            }
            Ok(Value::list(out))
        }
        Value::Vector(items, _) => {
            let mut out = items.as_ref().clone();
            out.extend_from_slice(&args[1..]);
            Ok(Value::vector(out))
        }
        other => Err(LispError::type_mismatch("conj", "list or vector", other)),
    }
}

/// Calls a function with arguments taken from the trailing sequence:
/// `(apply f a b [c d])` is `(f a b c d)`
pub fn builtin_apply(args: &[Value]) -> Result<Value, LispError> {
    if args.len() < 2 {
        return Err(LispError::arity("apply", "at least 2", args.len()));
    }
    let trailing = seq_arg("apply", args, args.len() - 1)?;
    let mut call_args = args[1..args.len() - 1].to_vec();
    call_args.extend_from_slice(trailing);
    eval::apply(&args[0], &call_args)
}

/// Applies a function to each element of a sequence, returning a list
pub fn builtin_map(args: &[Value]) -> Result<Value, LispError> {
    check_arity("map", 2, args)?;
    let items = seq_arg("map", args, 1)?;
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(eval::apply(&args[0], std::slice::from_ref(item))?);
    }
    Ok(Value::list(out))
}

/// Register all sequence builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("list", Value::builtin("list", builtin_list));
    env.set("list?", Value::builtin("list?", builtin_list_q));
    env.set("vector", Value::builtin("vector", builtin_vector));
    env.set("vector?", Value::builtin("vector?", builtin_vector_q));
    env.set("sequential?", Value::builtin("sequential?", builtin_sequential_q));
    env.set("empty?", Value::builtin("empty?", builtin_empty_q));
    env.set("count", Value::builtin("count", builtin_count));
    env.set("cons", Value::builtin("cons", builtin_cons));
    env.set("concat", Value::builtin("concat", builtin_concat));
    env.set("vec", Value::builtin("vec", builtin_vec));
    env.set("nth", Value::builtin("nth", builtin_nth));
    env.set("first", Value::builtin("first", builtin_first));
    env.set("rest", Value::builtin("rest", builtin_rest));
    env.set("seq", Value::builtin("seq", builtin_seq));
    env.set("conj", Value::builtin("conj", builtin_conj));
    env.set("apply", Value::builtin("apply", builtin_apply));
    env.set("map", Value::builtin("map", builtin_map));
}
