//! Hash map operations: hash-map, assoc, dissoc, get, contains?, keys, vals
//!
//! Maps are immutable; `assoc` and `dissoc` return new maps sharing no
//! structure with the original beyond the values themselves. Only strings
//! and keywords may be keys.

use crate::env::Environment;
use crate::error::LispError;
use crate::value::{MapKey, Value};
use std::collections::HashMap;
use std::rc::Rc;

fn map_arg<'a>(
    name: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a HashMap<MapKey, Value>, LispError> {
    match &args[index] {
        Value::Map(entries, _) => Ok(entries),
        other => Err(LispError::type_mismatch(name, "map", other)),
    }
}

fn insert_pairs(
    name: &str,
    entries: &mut HashMap<MapKey, Value>,
    pairs: &[Value],
) -> Result<(), LispError> {
    if pairs.len() % 2 != 0 {
        return Err(LispError::msg(format!(
            "{}: expected an even number of key/value arguments",
            name
        )));
    }
    for pair in pairs.chunks(2) {
        entries.insert(MapKey::from_value(&pair[0])?, pair[1].clone());
    }
    Ok(())
}

/// Builds a map from alternating keys and values
pub fn builtin_hash_map(args: &[Value]) -> Result<Value, LispError> {
    let mut entries = HashMap::with_capacity(args.len() / 2);
    insert_pairs("hash-map", &mut entries, args)?;
    Ok(Value::map(entries))
}

pub fn builtin_map_q(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("map?", "1", args.len()));
    }
    Ok(Value::Bool(matches!(args[0], Value::Map(..))))
}

/// Returns a new map with the given keys set
pub fn builtin_assoc(args: &[Value]) -> Result<Value, LispError> {
    if args.is_empty() {
        return Err(LispError::arity("assoc", "at least 1", args.len()));
    }
    let mut entries = map_arg("assoc", args, 0)?.clone();
    insert_pairs("assoc", &mut entries, &args[1..])?;
    Ok(Value::map(entries))
}

/// Returns a new map with the given keys removed; absent keys are ignored
pub fn builtin_dissoc(args: &[Value]) -> Result<Value, LispError> {
    if args.is_empty() {
        return Err(LispError::arity("dissoc", "at least 1", args.len()));
    }
    let mut entries = map_arg("dissoc", args, 0)?.clone();
    for key in &args[1..] {
        entries.remove(&MapKey::from_value(key)?);
    }
    Ok(Value::map(entries))
}

/// Looks up a key; nil when the map is nil or the key is absent
pub fn builtin_get(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("get", "2", args.len()));
    }
    if matches!(args[0], Value::Nil) {
        return Ok(Value::Nil);
    }
    let entries = map_arg("get", args, 0)?;
    let key = MapKey::from_value(&args[1])?;
    Ok(entries.get(&key).cloned().unwrap_or(Value::Nil))
}

/// Tests whether a map has a key
pub fn builtin_contains_q(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("contains?", "2", args.len()));
    }
    let entries = map_arg("contains?", args, 0)?;
    let key = MapKey::from_value(&args[1])?;
    Ok(Value::Bool(entries.contains_key(&key)))
}

/// All keys as a list
pub fn builtin_keys(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("keys", "1", args.len()));
    }
    let entries = map_arg("keys", args, 0)?;
    Ok(Value::list(entries.keys().map(MapKey::to_value).collect()))
}

/// All values as a list
pub fn builtin_vals(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("vals", "1", args.len()));
    }
    let entries = map_arg("vals", args, 0)?;
    Ok(Value::list(entries.values().cloned().collect()))
}

/// Register all map builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("hash-map", Value::builtin("hash-map", builtin_hash_map));
    env.set("map?", Value::builtin("map?", builtin_map_q));
    env.set("assoc", Value::builtin("assoc", builtin_assoc));
    env.set("dissoc", Value::builtin("dissoc", builtin_dissoc));
    env.set("get", Value::builtin("get", builtin_get));
    env.set("contains?", Value::builtin("contains?", builtin_contains_q));
    env.set("keys", Value::builtin("keys", builtin_keys));
    env.set("vals", Value::builtin("vals", builtin_vals));
}
