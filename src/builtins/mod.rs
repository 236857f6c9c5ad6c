//! # Built-in Functions Module
//!
//! The fixed table of primitive functions, organized by category:
//!
//! - **[arithmetic]**: +, -, *, /
//! - **[comparison]**: =, <, <=, >, >=
//! - **[io]**: prn, println, pr-str, str, read-string, slurp, readline, time-ms
//! - **[sequences]**: list, list?, vector, vector?, sequential?, empty?, count,
//!   cons, concat, vec, nth, first, rest, seq, conj, apply, map
//! - **[maps]**: hash-map, map?, assoc, dissoc, get, contains?, keys, vals
//! - **[types]**: nil?, true?, false?, symbol?, keyword?, string?, number?,
//!   fn?, macro?, symbol, keyword
//! - **[atoms]**: atom, atom?, deref, reset!, swap!
//! - **[meta]**: throw, meta, with-meta
//!
//! Each category module exposes a `register` function that binds its
//! functions into an environment. The `eval` builtin is not here: it needs
//! a back-reference to the root environment and is wired up by the
//! interpreter during startup.

use crate::env::Environment;
use std::rc::Rc;

pub mod arithmetic;
pub mod atoms;
pub mod comparison;
pub mod io;
pub mod maps;
pub mod meta;
pub mod sequences;
pub mod types;

/// Register every builtin category in the environment
pub fn register_builtins(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    io::register(env);
    sequences::register(env);
    maps::register(env);
    types::register(env);
    atoms::register(env);
    meta::register(env);
}
