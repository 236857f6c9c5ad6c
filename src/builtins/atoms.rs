//! Atom operations: atom, atom?, deref, reset!, swap!
//!
//! Atoms are the only mutable cell in the value model. `swap!` computes the
//! replacement from a snapshot of the old value, so an update function that
//! itself touches the same atom still sees a consistent pre-swap value.

use crate::env::Environment;
use crate::error::LispError;
use crate::eval;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

fn atom_arg<'a>(
    name: &str,
    args: &'a [Value],
    index: usize,
) -> Result<&'a Rc<RefCell<Value>>, LispError> {
    match &args[index] {
        Value::Atom(cell) => Ok(cell),
        other => Err(LispError::type_mismatch(name, "atom", other)),
    }
}

/// Wraps a value in a new mutable cell
pub fn builtin_atom(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("atom", "1", args.len()));
    }
    Ok(Value::atom(args[0].clone()))
}

pub fn builtin_atom_q(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("atom?", "1", args.len()));
    }
    Ok(Value::Bool(matches!(args[0], Value::Atom(_))))
}

/// The value currently held by the atom
pub fn builtin_deref(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("deref", "1", args.len()));
    }
    let cell = atom_arg("deref", args, 0)?;
    let value = cell.borrow().clone();
    Ok(value)
}

/// Replaces the held value, returning the new value
pub fn builtin_reset(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 2 {
        return Err(LispError::arity("reset!", "2", args.len()));
    }
    let cell = atom_arg("reset!", args, 0)?;
    *cell.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

/// Sets the atom to `(f old args…)` and returns the new value.
///
/// The old value is snapshotted before `f` runs; the store happens after it
/// returns, so nested updates of the same atom observe the pre-swap value.
pub fn builtin_swap(args: &[Value]) -> Result<Value, LispError> {
    if args.len() < 2 {
        return Err(LispError::arity("swap!", "at least 2", args.len()));
    }
    let cell = atom_arg("swap!", args, 0)?;
    let mut call_args = Vec::with_capacity(args.len() - 1);
    call_args.push(cell.borrow().clone());
    call_args.extend_from_slice(&args[2..]);
    let new_value = eval::apply(&args[1], &call_args)?;
    *cell.borrow_mut() = new_value.clone();
    Ok(new_value)
}

/// Register all atom builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("atom", Value::builtin("atom", builtin_atom));
    env.set("atom?", Value::builtin("atom?", builtin_atom_q));
    env.set("deref", Value::builtin("deref", builtin_deref));
    env.set("reset!", Value::builtin("reset!", builtin_reset));
    env.set("swap!", Value::builtin("swap!", builtin_swap));
}
