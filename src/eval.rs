// ABOUTME: Evaluator module: special forms, macro expansion, application,
// and tail call optimization via a loop that rebinds ast and env

use crate::env::Environment;
use crate::error::LispError;
use crate::value::{Closure, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Evaluate `ast` in `env`.
///
/// The loop never recurses for a `let*` body, the last form of a `do`, a
/// chosen `if` branch, a `quasiquote` expansion, a `catch*` handler, or a
/// closure application; those rebind `ast`/`env` and continue, so a
/// tail-recursive user function runs in constant host stack.
pub fn eval(ast: Value, env: Rc<Environment>) -> Result<Value, LispError> {
    let mut ast = ast;
    let mut env = env;
    loop {
        ast = macro_expand(ast, &env)?;

        let items = match &ast {
            Value::List(items, _) if !items.is_empty() => Rc::clone(items),
            Value::List(..) => return Ok(ast),
            other => return eval_ast(other, &env),
        };

        if let Value::Symbol(op) = &items[0] {
            match op.as_str() {
                "def!" => {
                    let name = binding_name("def!", &items)?;
                    let value = eval(items[2].clone(), env.clone())?;
                    env.set(name, value.clone());
                    return Ok(value);
                }
                "let*" => {
                    if items.len() != 3 {
                        return Err(LispError::arity("let*", "2", items.len() - 1));
                    }
                    let bindings = items[1].as_seq().ok_or_else(|| {
                        LispError::type_mismatch("let*", "list or vector of bindings", &items[1])
                    })?;
                    if bindings.len() % 2 != 0 {
                        return Err(LispError::msg(
                            "let*: bindings require an even number of forms",
                        ));
                    }
                    let child = Environment::with_outer(env.clone());
                    for pair in bindings.chunks(2) {
                        let name = match &pair[0] {
                            Value::Symbol(s) => s.clone(),
                            other => return Err(LispError::type_mismatch("let*", "symbol", other)),
                        };
                        let value = eval(pair[1].clone(), child.clone())?;
                        child.set(name, value);
                    }
                    ast = items[2].clone();
                    env = child;
                }
                "do" => {
                    if items.len() == 1 {
                        return Ok(Value::Nil);
                    }
                    for form in &items[1..items.len() - 1] {
                        eval(form.clone(), env.clone())?;
                    }
                    ast = items[items.len() - 1].clone();
                }
                "if" => {
                    if items.len() < 3 || items.len() > 4 {
                        return Err(LispError::arity("if", "2-3", items.len() - 1));
                    }
                    let condition = eval(items[1].clone(), env.clone())?;
                    if condition.is_truthy() {
                        ast = items[2].clone();
                    } else if let Some(alternative) = items.get(3) {
                        ast = alternative.clone();
                    } else {
                        return Ok(Value::Nil);
                    }
                }
                "fn*" => {
                    if items.len() != 3 {
                        return Err(LispError::arity("fn*", "2", items.len() - 1));
                    }
                    return make_closure(&items[1], items[2].clone(), env.clone());
                }
                "quote" => {
                    if items.len() != 2 {
                        return Err(LispError::arity("quote", "1", items.len() - 1));
                    }
                    return Ok(items[1].clone());
                }
                "quasiquote" => {
                    if items.len() != 2 {
                        return Err(LispError::arity("quasiquote", "1", items.len() - 1));
                    }
                    ast = quasiquote(&items[1]);
                }
                "quasiquoteexpand" => {
                    if items.len() != 2 {
                        return Err(LispError::arity("quasiquoteexpand", "1", items.len() - 1));
                    }
                    return Ok(quasiquote(&items[1]));
                }
                "defmacro!" => {
                    let name = binding_name("defmacro!", &items)?;
                    let value = eval(items[2].clone(), env.clone())?;
                    let flagged = match value {
                        Value::Closure(closure, meta) => {
                            let mut copy = (*closure).clone();
                            copy.is_macro = true;
                            Value::Closure(Rc::new(copy), meta)
                        }
                        other => {
                            return Err(LispError::type_mismatch("defmacro!", "function", &other))
                        }
                    };
                    env.set(name, flagged.clone());
                    return Ok(flagged);
                }
                "macroexpand" => {
                    if items.len() != 2 {
                        return Err(LispError::arity("macroexpand", "1", items.len() - 1));
                    }
                    return macro_expand(items[1].clone(), &env);
                }
                "try*" => {
                    if items.len() < 2 || items.len() > 3 {
                        return Err(LispError::arity("try*", "1-2", items.len() - 1));
                    }
                    match eval(items[1].clone(), env.clone()) {
                        Ok(value) => return Ok(value),
                        Err(err) => {
                            let Some(clause) = items.get(2) else {
                                return Err(err);
                            };
                            let (name, handler) = catch_clause(clause)?;
                            let child = Environment::with_outer(env.clone());
                            child.set(name, err.into_value());
                            ast = handler;
                            env = child;
                        }
                    }
                }
                _ => {
                    if let Some(result) = apply_step(&items, &mut ast, &mut env)? {
                        return Ok(result);
                    }
                }
            }
        } else if let Some(result) = apply_step(&items, &mut ast, &mut env)? {
            return Ok(result);
        }
    }
}

/// Evaluate head and arguments, then apply. A builtin returns its result;
/// a closure rebinds `ast`/`env` for the next loop iteration and yields
/// `None` so the caller continues the loop.
fn apply_step(
    items: &[Value],
    ast: &mut Value,
    env: &mut Rc<Environment>,
) -> Result<Option<Value>, LispError> {
    let evaluated = eval_seq(items, env)?;
    let func = &evaluated[0];
    let args = &evaluated[1..];
    match func {
        Value::Builtin(builtin, _) => Ok(Some(builtin.call(args)?)),
        Value::Closure(closure, _) => {
            *env = Environment::bind(
                closure.env.clone(),
                &closure.params,
                closure.variadic.as_deref(),
                args,
            )?;
            *ast = closure.body.clone();
            Ok(None)
        }
        _ => Err(LispError::NotCallable),
    }
}

fn binding_name(form: &str, items: &[Value]) -> Result<String, LispError> {
    if items.len() != 3 {
        return Err(LispError::arity(form, "2", items.len() - 1));
    }
    match &items[1] {
        Value::Symbol(name) => Ok(name.clone()),
        other => Err(LispError::type_mismatch(form, "symbol", other)),
    }
}

fn catch_clause(clause: &Value) -> Result<(String, Value), LispError> {
    let malformed = || LispError::msg("try*: expected (catch* sym handler)");
    let Value::List(parts, _) = clause else {
        return Err(malformed());
    };
    match parts.as_slice() {
        [Value::Symbol(head), Value::Symbol(name), handler] if head == "catch*" => {
            Ok((name.clone(), handler.clone()))
        }
        _ => Err(malformed()),
    }
}

fn make_closure(
    params_form: &Value,
    body: Value,
    env: Rc<Environment>,
) -> Result<Value, LispError> {
    let names = params_form
        .as_seq()
        .ok_or_else(|| LispError::type_mismatch("fn*", "parameter list", params_form))?;
    let mut params = Vec::new();
    let mut variadic = None;
    let mut iter = names.iter();
    while let Some(param) = iter.next() {
        let name = match param {
            Value::Symbol(s) => s.clone(),
            other => return Err(LispError::type_mismatch("fn*", "symbol", other)),
        };
        if name == "&" {
            match iter.next() {
                Some(Value::Symbol(rest)) => {
                    variadic = Some(rest.clone());
                    break;
                }
                Some(other) => return Err(LispError::type_mismatch("fn*", "symbol", other)),
                None => return Err(LispError::msg("fn*: '&' requires a parameter name after it")),
            }
        }
        params.push(name);
    }
    Ok(Value::closure(Closure {
        params,
        variadic,
        body,
        env,
        is_macro: false,
    }))
}

/// Non-list evaluation: symbols resolve, containers evaluate elementwise
/// into a container of the same kind, everything else is itself.
fn eval_ast(ast: &Value, env: &Rc<Environment>) -> Result<Value, LispError> {
    match ast {
        Value::Symbol(name) => env.get(name),
        Value::List(items, _) => Ok(Value::list(eval_seq(items, env)?)),
        Value::Vector(items, _) => Ok(Value::vector(eval_seq(items, env)?)),
        Value::Map(entries, _) => {
            let mut out = HashMap::with_capacity(entries.len());
            for (key, val) in entries.iter() {
                out.insert(key.clone(), eval(val.clone(), env.clone())?);
            }
            Ok(Value::map(out))
        }
        other => Ok(other.clone()),
    }
}

fn eval_seq(items: &[Value], env: &Rc<Environment>) -> Result<Vec<Value>, LispError> {
    items
        .iter()
        .map(|item| eval(item.clone(), env.clone()))
        .collect()
}

/// Call a function value with already-evaluated arguments. Builtins that
/// take functions (`apply`, `map`, `swap!`) come through here.
pub fn apply(func: &Value, args: &[Value]) -> Result<Value, LispError> {
    match func {
        Value::Builtin(builtin, _) => builtin.call(args),
        Value::Closure(closure, _) => apply_closure(closure, args),
        _ => Err(LispError::NotCallable),
    }
}

fn apply_closure(closure: &Closure, args: &[Value]) -> Result<Value, LispError> {
    let env = Environment::bind(
        closure.env.clone(),
        &closure.params,
        closure.variadic.as_deref(),
        args,
    )?;
    eval(closure.body.clone(), env)
}

// ============================================================================
// Quasiquote expansion
// ============================================================================

/// Rewrite a quasiquote template into `cons`/`concat` calls.
///
/// Lists and vectors fold right: a `(splice-unquote x)` element contributes
/// `(concat x acc)`, anything else `(cons (qq elt) acc)`. Vectors wrap the
/// fold in `(vec ...)`. Maps and symbols quote themselves.
pub fn quasiquote(ast: &Value) -> Value {
    match ast {
        Value::List(items, _) => {
            if let Some(arg) = unquote_arg(items) {
                return arg;
            }
            qq_fold(items)
        }
        Value::Vector(items, _) => Value::list(vec![Value::symbol("vec"), qq_fold(items)]),
        Value::Map(..) | Value::Symbol(_) => {
            Value::list(vec![Value::symbol("quote"), ast.clone()])
        }
        other => other.clone(),
    }
}

fn unquote_arg(items: &[Value]) -> Option<Value> {
    match items {
        [Value::Symbol(head), arg] if head == "unquote" => Some(arg.clone()),
        _ => None,
    }
}

fn splice_arg(element: &Value) -> Option<Value> {
    if let Value::List(items, _) = element {
        if let [Value::Symbol(head), arg] = items.as_slice() {
            if head == "splice-unquote" {
                return Some(arg.clone());
            }
        }
    }
    None
}

fn qq_fold(items: &[Value]) -> Value {
    let mut acc = Value::list(Vec::new());
    for element in items.iter().rev() {
        acc = match splice_arg(element) {
            Some(arg) => Value::list(vec![Value::symbol("concat"), arg, acc]),
            None => Value::list(vec![Value::symbol("cons"), quasiquote(element), acc]),
        };
    }
    acc
}

// ============================================================================
// Macro expansion
// ============================================================================

/// While `ast` is a call whose head resolves to a macro, apply the macro to
/// the unevaluated arguments and keep going with the result.
pub fn macro_expand(mut ast: Value, env: &Rc<Environment>) -> Result<Value, LispError> {
    while let Some((mac, args)) = as_macro_call(&ast, env) {
        ast = apply_closure(&mac, &args)?;
    }
    Ok(ast)
}

fn as_macro_call(ast: &Value, env: &Rc<Environment>) -> Option<(Rc<Closure>, Vec<Value>)> {
    let Value::List(items, _) = ast else {
        return None;
    };
    let Some(Value::Symbol(name)) = items.first() else {
        return None;
    };
    let Ok(Value::Closure(closure, _)) = env.get(name) else {
        return None;
    };
    if closure.is_macro {
        Some((closure, items[1..].to_vec()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::register_builtins;
    use crate::printer::pr_str;
    use crate::reader::read_str;

    fn setup() -> Rc<Environment> {
        let env = Environment::new();
        register_builtins(&env);
        env
    }

    fn run(env: &Rc<Environment>, src: &str) -> Result<Value, LispError> {
        let form = read_str(src).expect("read error").expect("expected a form");
        eval(form, env.clone())
    }

    fn run_ok(env: &Rc<Environment>, src: &str) -> Value {
        run(env, src).expect("eval error")
    }

    #[test]
    fn test_self_evaluating_atoms() {
        let env = setup();
        assert_eq!(run_ok(&env, "42"), Value::Int(42));
        assert_eq!(run_ok(&env, "\"s\""), Value::string("s"));
        assert_eq!(run_ok(&env, ":kw"), Value::keyword("kw"));
        assert_eq!(run_ok(&env, "nil"), Value::Nil);
        assert_eq!(run_ok(&env, "()"), Value::list(vec![]));
    }

    #[test]
    fn test_symbol_lookup_and_error() {
        let env = setup();
        env.set("x", Value::Int(7));
        assert_eq!(run_ok(&env, "x"), Value::Int(7));
        assert_eq!(
            run(&env, "unknown").unwrap_err().to_string(),
            "'unknown' not found"
        );
    }

    #[test]
    fn test_containers_evaluate_elementwise() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "[1 (+ 1 1) 3]"),
            Value::vector(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
        );
        assert_eq!(
            pr_str(&run_ok(&env, "{\"a\" (+ 1 2)}"), true),
            "{\"a\" 3}"
        );
    }

    #[test]
    fn test_def_binds_and_returns() {
        let env = setup();
        assert_eq!(run_ok(&env, "(def! a 10)"), Value::Int(10));
        assert_eq!(run_ok(&env, "a"), Value::Int(10));
    }

    #[test]
    fn test_let_shadows_and_binds_sequentially() {
        let env = setup();
        run_ok(&env, "(def! a 10)");
        assert_eq!(run_ok(&env, "(let* (a 20 b a) b)"), Value::Int(20));
        assert_eq!(run_ok(&env, "a"), Value::Int(10));
        // Vector bindings work too
        assert_eq!(run_ok(&env, "(let* [c 3 d (+ c 4)] d)"), Value::Int(7));
    }

    #[test]
    fn test_do_evaluates_in_order() {
        let env = setup();
        assert_eq!(run_ok(&env, "(do)"), Value::Nil);
        assert_eq!(run_ok(&env, "(do 1 2 3)"), Value::Int(3));
        run_ok(&env, "(do (def! side 1) (def! side 2))");
        assert_eq!(run_ok(&env, "side"), Value::Int(2));
    }

    #[test]
    fn test_if_branches_and_truthiness() {
        let env = setup();
        assert_eq!(run_ok(&env, "(if true 1 2)"), Value::Int(1));
        assert_eq!(run_ok(&env, "(if false 1 2)"), Value::Int(2));
        assert_eq!(run_ok(&env, "(if nil 1 2)"), Value::Int(2));
        assert_eq!(run_ok(&env, "(if 0 1 2)"), Value::Int(1));
        assert_eq!(run_ok(&env, "(if false 1)"), Value::Nil);
    }

    #[test]
    fn test_closures_capture_their_environment() {
        let env = setup();
        run_ok(&env, "(def! make-adder (fn* (n) (fn* (x) (+ x n))))");
        run_ok(&env, "(def! add5 (make-adder 5))");
        assert_eq!(run_ok(&env, "(add5 10)"), Value::Int(15));
    }

    #[test]
    fn test_variadic_binding() {
        let env = setup();
        run_ok(&env, "(def! rest-args (fn* (a & more) more))");
        assert_eq!(
            run_ok(&env, "(rest-args 1 2 3)"),
            Value::list(vec![Value::Int(2), Value::Int(3)])
        );
        assert_eq!(run_ok(&env, "(rest-args 1)"), Value::list(vec![]));
    }

    #[test]
    fn test_closure_arity_mismatch() {
        let env = setup();
        run_ok(&env, "(def! one (fn* (a) a))");
        assert!(run(&env, "(one)").is_err());
        assert!(run(&env, "(one 1 2)").is_err());
    }

    #[test]
    fn test_recursion() {
        let env = setup();
        run_ok(
            &env,
            "(def! fact (fn* (n) (if (<= n 1) 1 (* n (fact (- n 1))))))",
        );
        assert_eq!(run_ok(&env, "(fact 5)"), Value::Int(120));
    }

    #[test]
    fn test_tail_recursion_runs_in_constant_stack() {
        let env = setup();
        run_ok(
            &env,
            "(def! sum-to (fn* (n acc) (if (= n 0) acc (sum-to (- n 1) (+ acc n)))))",
        );
        assert_eq!(run_ok(&env, "(sum-to 10000 0)"), Value::Int(50_005_000));
    }

    #[test]
    fn test_tail_position_through_do_and_let() {
        let env = setup();
        run_ok(
            &env,
            "(def! down (fn* (n) (if (= n 0) 0 (do (let* (m (- n 1)) (down m))))))",
        );
        assert_eq!(run_ok(&env, "(down 10000)"), Value::Int(0));
    }

    #[test]
    fn test_quote() {
        let env = setup();
        assert_eq!(run_ok(&env, "'(1 2)"), run_ok(&env, "(list 1 2)"));
        assert_eq!(run_ok(&env, "'sym"), Value::symbol("sym"));
    }

    #[test]
    fn test_quasiquote_interpolation() {
        let env = setup();
        assert_eq!(
            pr_str(&run_ok(&env, "`(1 ~(+ 1 1) ~@(list 3 4) 5)"), true),
            "(1 2 3 4 5)"
        );
        assert_eq!(pr_str(&run_ok(&env, "`[1 ~(+ 1 1)]"), true), "[1 2]");
        assert_eq!(run_ok(&env, "`sym"), Value::symbol("sym"));
    }

    #[test]
    fn test_quasiquoteexpand_returns_the_rewrite() {
        let env = setup();
        assert_eq!(
            pr_str(&run_ok(&env, "(quasiquoteexpand (a ~b))"), true),
            "(cons (quote a) (cons b ()))"
        );
    }

    #[test]
    fn test_defmacro_and_expansion() {
        let env = setup();
        run_ok(
            &env,
            "(defmacro! unless (fn* (p a b) (list 'if p b a)))",
        );
        assert_eq!(run_ok(&env, "(unless false 7 8)"), Value::Int(7));
        assert_eq!(run_ok(&env, "(unless true 7 8)"), Value::Int(8));
        assert_eq!(
            pr_str(&run_ok(&env, "(macroexpand (unless false 7 8))"), true),
            "(if false 8 7)"
        );
    }

    #[test]
    fn test_macro_flag_does_not_leak_to_original() {
        let env = setup();
        run_ok(&env, "(def! plain (fn* (a) a))");
        run_ok(&env, "(defmacro! as-macro plain)");
        assert_eq!(run_ok(&env, "(macro? as-macro)"), Value::Bool(true));
        assert_eq!(run_ok(&env, "(macro? plain)"), Value::Bool(false));
        assert_eq!(run_ok(&env, "(fn? plain)"), Value::Bool(true));
    }

    #[test]
    fn test_try_catches_thrown_values() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "(try* (throw \"bad\") (catch* e e))"),
            Value::string("bad")
        );
        assert_eq!(
            run_ok(&env, "(try* (throw {\"err\" \"bad\"}) (catch* e (get e \"err\")))"),
            Value::string("bad")
        );
    }

    #[test]
    fn test_try_converts_host_errors_to_strings() {
        let env = setup();
        assert_eq!(
            run_ok(&env, "(try* missing (catch* e e))"),
            Value::string("'missing' not found")
        );
        assert_eq!(
            run_ok(&env, "(try* (+ 1 \"x\") (catch* e (string? e)))"),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_try_without_catch_rethrows() {
        let env = setup();
        let err = run(&env, "(try* (throw 9))").unwrap_err();
        match err {
            LispError::Thrown(Value::Int(9)) => {}
            other => panic!("expected thrown 9, got {:?}", other),
        }
    }

    #[test]
    fn test_try_body_result_passes_through() {
        let env = setup();
        assert_eq!(run_ok(&env, "(try* 123 (catch* e 0))"), Value::Int(123));
    }

    #[test]
    fn test_not_callable() {
        let env = setup();
        assert!(matches!(
            run(&env, "(1 2 3)").unwrap_err(),
            LispError::NotCallable
        ));
    }

    #[test]
    fn test_apply_helper() {
        let env = setup();
        let add = run_ok(&env, "+");
        assert_eq!(
            apply(&add, &[Value::Int(2), Value::Int(3)]).unwrap(),
            Value::Int(5)
        );
        let id = run_ok(&env, "(fn* (x) x)");
        assert_eq!(apply(&id, &[Value::Int(9)]).unwrap(), Value::Int(9));
        assert!(apply(&Value::Int(1), &[]).is_err());
    }
}
