// ABOUTME: Environment module for lexically chained symbol bindings

use crate::error::LispError;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no outer scope
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: None,
        })
    }

    /// Creates a new child environment chained to `outer`
    pub fn with_outer(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Creates a child of `outer` with parameters bound to arguments.
    ///
    /// A `variadic` name collects the remaining arguments into a fresh List
    /// (empty when none are left over).
    pub fn bind(
        outer: Rc<Environment>,
        params: &[String],
        variadic: Option<&str>,
        args: &[Value],
    ) -> Result<Rc<Self>, LispError> {
        if args.len() < params.len() || (variadic.is_none() && args.len() != params.len()) {
            let expected = match variadic {
                Some(_) => format!("at least {}", params.len()),
                None => params.len().to_string(),
            };
            return Err(LispError::arity("fn", expected, args.len()));
        }

        let env = Environment::with_outer(outer);
        for (name, value) in params.iter().zip(args) {
            env.set(name.clone(), value.clone());
        }
        if let Some(rest) = variadic {
            env.set(rest, Value::list(args[params.len()..].to_vec()));
        }
        Ok(env)
    }

    /// Inserts or overrides a binding in THIS scope (does not walk outward)
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Returns the innermost frame containing `name`, walking outward
    pub fn find(self: &Rc<Self>, name: &str) -> Option<Rc<Environment>> {
        if self.bindings.borrow().contains_key(name) {
            Some(self.clone())
        } else {
            self.outer.as_ref().and_then(|outer| outer.find(name))
        }
    }

    /// Looks up `name`, walking outward; missing symbols are a catchable error
    pub fn get(&self, name: &str) -> Result<Value, LispError> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        match &self.outer {
            Some(outer) => outer.get(name),
            None => Err(LispError::SymbolNotFound(name.to_string())),
        }
    }
}
