//! I/O and text operations: prn, println, pr-str, str, read-string, slurp,
//! readline, time-ms
//!
//! `prn` and `pr-str` render readably (strings quoted and escaped);
//! `println` and `str` render for display. `slurp`, `readline` and
//! `time-ms` are the only points where the interpreter touches the
//! outside world.

use crate::env::Environment;
use crate::error::LispError;
use crate::printer::pr_seq;
use crate::reader::read_str;
use crate::value::Value;
use std::io::{BufRead, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Prints arguments readably, space-separated, with a newline; returns nil
pub fn builtin_prn(args: &[Value]) -> Result<Value, LispError> {
    println!("{}", pr_seq(args, true, " "));
    Ok(Value::Nil)
}

/// Prints arguments for display, space-separated, with a newline; returns nil
pub fn builtin_println(args: &[Value]) -> Result<Value, LispError> {
    println!("{}", pr_seq(args, false, " "));
    Ok(Value::Nil)
}

/// Returns the arguments rendered readably, joined with spaces
pub fn builtin_pr_str(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Str(pr_seq(args, true, " ")))
}

/// Returns the arguments rendered for display, concatenated
pub fn builtin_str(args: &[Value]) -> Result<Value, LispError> {
    Ok(Value::Str(pr_seq(args, false, "")))
}

/// Parses a string into a value; whitespace-only input reads as nil
pub fn builtin_read_string(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("read-string", "1", args.len()));
    }
    match &args[0] {
        Value::Str(src) => Ok(read_str(src)?.unwrap_or(Value::Nil)),
        other => Err(LispError::type_mismatch("read-string", "string", other)),
    }
}

/// Reads a whole file into a string
pub fn builtin_slurp(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("slurp", "1", args.len()));
    }
    match &args[0] {
        Value::Str(path) => std::fs::read_to_string(path)
            .map(Value::Str)
            .map_err(|e| LispError::msg(format!("slurp: {}: {}", path, e))),
        other => Err(LispError::type_mismatch("slurp", "string", other)),
    }
}

/// Prints a prompt and reads one line from stdin; nil at end of input
pub fn builtin_readline(args: &[Value]) -> Result<Value, LispError> {
    if args.len() != 1 {
        return Err(LispError::arity("readline", "1", args.len()));
    }
    let prompt = match &args[0] {
        Value::Str(prompt) => prompt,
        other => return Err(LispError::type_mismatch("readline", "string", other)),
    };

    print!("{}", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| LispError::msg(format!("readline: {}", e)))?;

    let mut line = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| LispError::msg(format!("readline: {}", e)))?;
    if read == 0 {
        return Ok(Value::Nil);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Value::Str(line))
}

/// Milliseconds since the Unix epoch
pub fn builtin_time_ms(args: &[Value]) -> Result<Value, LispError> {
    if !args.is_empty() {
        return Err(LispError::arity("time-ms", "0", args.len()));
    }
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LispError::msg(format!("time-ms: {}", e)))?;
    Ok(Value::Int(elapsed.as_millis() as i64))
}

/// Register all I/O builtins in the environment
pub fn register(env: &Rc<Environment>) {
    env.set("prn", Value::builtin("prn", builtin_prn));
    env.set("println", Value::builtin("println", builtin_println));
    env.set("pr-str", Value::builtin("pr-str", builtin_pr_str));
    env.set("str", Value::builtin("str", builtin_str));
    env.set("read-string", Value::builtin("read-string", builtin_read_string));
    env.set("slurp", Value::builtin("slurp", builtin_slurp));
    env.set("readline", Value::builtin("readline", builtin_readline));
    env.set("time-ms", Value::builtin("time-ms", builtin_time_ms));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pr_str_is_readable() {
        let result = builtin_pr_str(&[Value::string("a\"b"), Value::Int(1)]).unwrap();
        assert_eq!(result, Value::string("\"a\\\"b\" 1"));
    }

    #[test]
    fn test_str_concatenates_for_display() {
        let result = builtin_str(&[
            Value::string("(do "),
            Value::string("body"),
            Value::string(")"),
        ])
        .unwrap();
        assert_eq!(result, Value::string("(do body)"));
        assert_eq!(builtin_str(&[]).unwrap(), Value::string(""));
    }

    #[test]
    fn test_read_string_parses() {
        let result = builtin_read_string(&[Value::string("(+ 1 2)")]).unwrap();
        assert_eq!(
            result,
            Value::list(vec![Value::symbol("+"), Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_read_string_of_blank_input_is_nil() {
        assert_eq!(
            builtin_read_string(&[Value::string("  ; nothing")]).unwrap(),
            Value::Nil
        );
    }

    #[test]
    fn test_read_string_propagates_reader_errors() {
        let err = builtin_read_string(&[Value::string("(1 2")]).unwrap_err();
        assert_eq!(err.to_string(), "unbalanced");
    }

    #[test]
    fn test_slurp_missing_file_is_catchable() {
        let err = builtin_slurp(&[Value::string("/no/such/file")]).unwrap_err();
        assert!(err.to_string().starts_with("slurp:"));
    }

    #[test]
    fn test_time_ms_is_positive() {
        match builtin_time_ms(&[]).unwrap() {
            Value::Int(ms) => assert!(ms > 0),
            other => panic!("expected int, got {:?}", other),
        }
    }
}
