//! Type predicates and constructors: nil?, true?, false?, symbol?, keyword?,
//! string?, number?, fn?, macro?, symbol, keyword
//!
//! `fn?` is true for builtins and plain closures but not macros; `macro?`
//! is true only for macros. `string?` is false for keywords.

use crate::env::Environment;
use crate::error::LispError;
use crate::value::Value;
use std::rc::Rc;

fn one_arg<'a>(name: &str, args: &'a [Value]) -> Result<&'a Value, LispError> {
    match args {
        [value] => Ok(value),
        _ => Err(LispError::arity(name, "1", args.len())),
    }
}

pub fn builtin_nil_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(one_arg("nil?", args)?, Value::Nil)))
}

pub fn builtin_true_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("true?", args)?,
        Value::Bool(true)
    )))
}

pub fn builtin_false_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("false?", args)?,
        Value::Bool(false)
    )))
}

pub fn builtin_symbol_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("symbol?", args)?,
        Value::Symbol(_)
    )))
}

pub fn builtin_keyword_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("keyword?", args)?,
        Value::Keyword(_)
    )))
}

pub fn builtin_string_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("string?", args)?,
        Value::Str(_)
    )))
}

pub fn builtin_number_q(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Bool(matches!(
        one_arg("number?", args)?,
        Value::Int(_)
    )))
}

/// True for callable non-macro functions
pub fn builtin_fn_q(args: &[Value]) -> Result<Value, LispError> {
    let result = match one_arg("fn?", args)? {
        Value::Builtin(..) => true,
        Value::Closure(closure, _) => !closure.is_macro,
        _ => false,
    };
    Ok(Value::Bool(result))
}

/// True only for macro-flagged closures
pub fn builtin_macro_q(args: &[Value]) -> Result<Value, LispError> {
    let result = match one_arg("macro?", args)? {
        Value::Closure(closure, _) => closure.is_macro,
        _ => false,
    };
    Ok(Value::Bool(result))
}

/// Interns a string as a symbol; symbols pass through
pub fn builtin_symbol(args: &[Value]) -> Result<Value, LispError> {
    match one_arg("symbol", args)? {
        Value::Str(name) => Ok(Value::symbol(name.clone())),
        symbol @ Value::Symbol(_) => Ok(symbol.clone()),
        other => Err(LispError::type_mismatch("symbol", "string", other)),
    }
}

/// Interns a string as a keyword; keywords pass through
pub fn builtin_keyword(args: &[Value]) -> Result<Value, LispError> {
    match one_arg("keyword", args)? {
        Value::Str(name) => Ok(Value::keyword(name.clone())),
        keyword @ Value::Keyword(_) => Ok(keyword.clone()),
        other => Err(LispError::type_mismatch("keyword", "string", other)),
    }
}

/// Register all type builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("nil?", Value::builtin("nil?", builtin_nil_q));
    env.set("true?", Value::builtin("true?", builtin_true_q));
    env.set("false?", Value::builtin("false?", builtin_false_q));
    env.set("symbol?", Value::builtin("symbol?", builtin_symbol_q));
    env.set("keyword?", Value::builtin("keyword?", builtin_keyword_q));
    env.set("string?", Value::builtin("string?", builtin_string_q));
    env.set("number?", Value::builtin("number?", builtin_number_q));
    env.set("fn?", Value::builtin("fn?", builtin_fn_q));
    env.set("macro?", Value::builtin("macro?", builtin_macro_q));
    env.set("symbol", Value::builtin("symbol", builtin_symbol));
    env.set("keyword", Value::builtin("keyword", builtin_keyword));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_predicates() {
        assert_eq!(builtin_nil_q(&[Value::Nil]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_nil_q(&[Value::Int(0)]).unwrap(), Value::Bool(false));
        assert_eq!(
            builtin_true_q(&[Value::Bool(true)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_false_q(&[Value::Bool(false)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_number_q(&[Value::Int(3)]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_string_predicate_excludes_keywords() {
        assert_eq!(
            builtin_string_q(&[Value::string("x")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_string_q(&[Value::keyword("x")]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            builtin_keyword_q(&[Value::keyword("x")]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            builtin_keyword_q(&[Value::string("x")]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_constructors() {
        assert_eq!(
            builtin_symbol(&[Value::string("abc")]).unwrap(),
            Value::symbol("abc")
        );
        assert_eq!(
            builtin_keyword(&[Value::string("abc")]).unwrap(),
            Value::keyword("abc")
        );
        assert_eq!(
            builtin_keyword(&[Value::keyword("abc")]).unwrap(),
            Value::keyword("abc")
        );
        assert!(builtin_symbol(&[Value::Int(1)]).is_err());
    }

    #[test]
    fn test_fn_predicate() {
        let builtin = Value::builtin("id", |args: &[Value]| Ok(args[0].clone()));
        assert_eq!(builtin_fn_q(&[builtin]).unwrap(), Value::Bool(true));
        assert_eq!(builtin_fn_q(&[Value::Int(1)]).unwrap(), Value::Bool(false));
        assert_eq!(builtin_macro_q(&[Value::Int(1)]).unwrap(), Value::Bool(false));
    }
}
