// ABOUTME: Interpreter assembly: root environment, the eval bridge builtin,
// prelude loading, and the read-eval-print entry point

use crate::builtins::register_builtins;
use crate::env::Environment;
use crate::error::LispError;
use crate::eval;
use crate::printer::pr_str;
use crate::reader::read_str;
use crate::value::Value;
use std::rc::Rc;

/// Forms evaluated at startup, in order. `load-file` and `cond` are defined
/// in the language itself on top of the builtin table.
const PRELUDE: &[&str] = &[
    "(def! not (fn* (a) (if a false true)))",
    r#"(def! load-file (fn* (f) (eval (read-string (str "(do " (slurp f) "\nnil)")))))"#,
    r#"(defmacro! cond (fn* (& xs) (if (> (count xs) 0) (list 'if (first xs) (if (> (count xs) 1) (nth xs 1) (throw "odd number of forms to cond")) (cons 'cond (rest (rest xs)))))))"#,
];

/// A ready-to-use interpreter: builtins registered, prelude loaded, `*ARGV*`
/// bound to an empty list.
pub struct Interpreter {
    env: Rc<Environment>,
}

impl Interpreter {
    pub fn new() -> Self {
        let env = Environment::new();
        register_builtins(&env);

        // The `eval` builtin runs against the root environment. It lives
        // inside that environment, so the back-reference must be weak or the
        // root would keep itself alive forever.
        let root = Rc::downgrade(&env);
        env.set(
            "eval",
            Value::builtin("eval", move |args: &[Value]| {
                if args.len() != 1 {
                    return Err(LispError::arity("eval", "1", args.len()));
                }
                let env = root
                    .upgrade()
                    .ok_or_else(|| LispError::msg("eval: interpreter environment is gone"))?;
                eval::eval(args[0].clone(), env)
            }),
        );

        env.set("*ARGV*", Value::list(Vec::new()));

        let interpreter = Interpreter { env };
        for form in PRELUDE {
            if let Err(e) = interpreter.eval_str(form) {
                eprintln!("warning: failed to load prelude form: {}", e);
            }
        }
        interpreter
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    /// Bind `*ARGV*` to the given strings
    pub fn set_argv(&self, args: &[String]) {
        let argv = args.iter().map(|arg| Value::string(arg.clone())).collect();
        self.env.set("*ARGV*", Value::list(argv));
    }

    /// Read one form and evaluate it; `Ok(None)` when the input holds no form
    pub fn eval_str(&self, src: &str) -> Result<Option<Value>, LispError> {
        match read_str(src)? {
            Some(form) => eval::eval(form, self.env.clone()).map(Some),
            None => Ok(None),
        }
    }

    /// Read, evaluate, and print one line
    pub fn rep(&self, line: &str) -> Result<Option<String>, LispError> {
        Ok(self.eval_str(line)?.map(|value| pr_str(&value, true)))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rep_prints_readably() {
        let interp = Interpreter::new();
        assert_eq!(interp.rep("(str \"a\" 1)").unwrap().unwrap(), "\"a1\"");
        assert_eq!(interp.rep("(+ 1 2)").unwrap().unwrap(), "3");
    }

    #[test]
    fn test_blank_input_produces_no_output() {
        let interp = Interpreter::new();
        assert!(interp.rep("").unwrap().is_none());
        assert!(interp.rep(" ; comment only").unwrap().is_none());
    }

    #[test]
    fn test_prelude_not() {
        let interp = Interpreter::new();
        assert_eq!(interp.rep("(not true)").unwrap().unwrap(), "false");
        assert_eq!(interp.rep("(not nil)").unwrap().unwrap(), "true");
        assert_eq!(interp.rep("(not 0)").unwrap().unwrap(), "false");
    }

    #[test]
    fn test_prelude_cond() {
        let interp = Interpreter::new();
        assert_eq!(
            interp
                .rep("(cond false 1 true 2 true 3)")
                .unwrap()
                .unwrap(),
            "2"
        );
        assert_eq!(interp.rep("(cond false 1)").unwrap().unwrap(), "nil");
        assert_eq!(
            interp
                .rep("(try* (cond true) (catch* e e))")
                .unwrap()
                .unwrap(),
            "\"odd number of forms to cond\""
        );
    }

    #[test]
    fn test_eval_builtin_runs_in_root_environment() {
        let interp = Interpreter::new();
        // def! inside a function body, routed through eval, lands at the root
        interp.rep("((fn* () (eval '(def! from-inside 7))))").unwrap();
        assert_eq!(interp.rep("from-inside").unwrap().unwrap(), "7");
    }

    #[test]
    fn test_argv_binding() {
        let interp = Interpreter::new();
        assert_eq!(interp.rep("*ARGV*").unwrap().unwrap(), "()");
        interp.set_argv(&["a".to_string(), "b".to_string()]);
        assert_eq!(interp.rep("*ARGV*").unwrap().unwrap(), "(\"a\" \"b\")");
    }

    #[test]
    fn test_eval_builtin_arity() {
        let interp = Interpreter::new();
        assert!(interp.rep("(eval)").is_err());
        assert_eq!(interp.rep("(eval '(+ 1 2))").unwrap().unwrap(), "3");
    }
}
