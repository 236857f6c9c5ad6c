// ABOUTME: Value types representing Lisp data structures and expressions

use crate::env::Environment;
use crate::error::LispError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A Lisp value. The AST is made of these too: the reader produces a `Value`
/// and the evaluator walks it.
///
/// List, Vector, Map and the two function variants carry a metadata slot
/// (default `Nil`); the remaining variants cannot hold metadata.
#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Symbol(String),
    Str(String),
    Keyword(String), // :name syntax; distinct from Str
    List(Rc<Vec<Value>>, Rc<Value>),
    Vector(Rc<Vec<Value>>, Rc<Value>),
    Map(Rc<HashMap<MapKey, Value>>, Rc<Value>),
    Atom(Rc<RefCell<Value>>), // the only mutable cell
    Builtin(Builtin, Rc<Value>),
    Closure(Rc<Closure>, Rc<Value>),
}

/// Hash map keys are restricted to strings and keywords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MapKey {
    Str(String),
    Keyword(String),
}

impl MapKey {
    pub fn from_value(value: &Value) -> Result<MapKey, LispError> {
        match value {
            Value::Str(s) => Ok(MapKey::Str(s.clone())),
            Value::Keyword(k) => Ok(MapKey::Keyword(k.clone())),
            other => Err(LispError::msg(format!(
                "expected a string or keyword key, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            MapKey::Str(s) => Value::Str(s.clone()),
            MapKey::Keyword(k) => Value::Keyword(k.clone()),
        }
    }
}

/// A user-defined function: the unevaluated body, the parameter names, the
/// captured environment, and whether `defmacro!` has flagged it as a macro.
#[derive(Clone)]
pub struct Closure {
    pub params: Vec<String>,
    pub variadic: Option<String>, // name bound after `&` in the parameter list
    pub body: Value,
    pub env: Rc<Environment>,
    pub is_macro: bool,
}

impl fmt::Debug for Closure {
    // The captured environment can reach back to this closure; keep Debug
    // acyclic by printing the parameter list only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("variadic", &self.variadic)
            .field("is_macro", &self.is_macro)
            .finish_non_exhaustive()
    }
}

/// A primitive function implemented in Rust.
#[derive(Clone)]
pub struct Builtin {
    name: String,
    func: Rc<dyn Fn(&[Value]) -> Result<Value, LispError>>,
}

impl Builtin {
    pub fn new(name: &str, func: impl Fn(&[Value]) -> Result<Value, LispError> + 'static) -> Self {
        Builtin {
            name: name.to_string(),
            func: Rc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, LispError> {
        (self.func)(args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<builtin {}>", self.name)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Builtin) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items), Rc::new(Value::Nil))
    }

    pub fn vector(items: Vec<Value>) -> Value {
        Value::Vector(Rc::new(items), Rc::new(Value::Nil))
    }

    pub fn map(entries: HashMap<MapKey, Value>) -> Value {
        Value::Map(Rc::new(entries), Rc::new(Value::Nil))
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::Str(text.into())
    }

    pub fn keyword(name: impl Into<String>) -> Value {
        Value::Keyword(name.into())
    }

    pub fn atom(value: Value) -> Value {
        Value::Atom(Rc::new(RefCell::new(value)))
    }

    pub fn builtin(name: &str, func: impl Fn(&[Value]) -> Result<Value, LispError> + 'static) -> Value {
        Value::Builtin(Builtin::new(name, func), Rc::new(Value::Nil))
    }

    pub fn closure(closure: Closure) -> Value {
        Value::Closure(Rc::new(closure), Rc::new(Value::Nil))
    }

    /// Everything except `nil` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::List(..) => "list",
            Value::Vector(..) => "vector",
            Value::Map(..) => "map",
            Value::Atom(_) => "atom",
            Value::Builtin(..) | Value::Closure(..) => "function",
        }
    }

    /// The elements of a List or Vector, `None` for everything else.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::List(items, _) | Value::Vector(items, _) => Some(items),
            _ => None,
        }
    }

    /// The metadata slot, or `nil` for variants that cannot carry one.
    pub fn meta(&self) -> Value {
        match self {
            Value::List(_, meta)
            | Value::Vector(_, meta)
            | Value::Map(_, meta)
            | Value::Builtin(_, meta)
            | Value::Closure(_, meta) => (**meta).clone(),
            _ => Value::Nil,
        }
    }

    /// A shallow copy with the metadata slot replaced. Container contents are
    /// shared with the original.
    pub fn with_meta(&self, meta: Value) -> Result<Value, LispError> {
        let meta = Rc::new(meta);
        match self {
            Value::List(items, _) => Ok(Value::List(items.clone(), meta)),
            Value::Vector(items, _) => Ok(Value::Vector(items.clone(), meta)),
            Value::Map(entries, _) => Ok(Value::Map(entries.clone(), meta)),
            Value::Builtin(builtin, _) => Ok(Value::Builtin(builtin.clone(), meta)),
            Value::Closure(closure, _) => Ok(Value::Closure(closure.clone(), meta)),
            other => Err(LispError::msg(format!(
                "with-meta: {} cannot carry metadata",
                other.type_name()
            ))),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality. Lists and vectors with the same elements are
    /// equal to each other; atoms and functions compare by identity;
    /// metadata is ignored.
    fn eq(&self, other: &Value) -> bool {
        use Value::*;
        match (self, other) {
            (Nil, Nil) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Symbol(a), Symbol(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Keyword(a), Keyword(b)) => a == b,
            (List(a, _) | Vector(a, _), List(b, _) | Vector(b, _)) => a == b,
            (Map(a, _), Map(b, _)) => a == b,
            (Atom(a), Atom(b)) => Rc::ptr_eq(a, b),
            (Builtin(a, _), Builtin(b, _)) => a == b,
            (Closure(a, _), Closure(b, _)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", crate::printer::pr_str(self, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_vector_equality() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let vector = Value::vector(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(list, vector);

        let shorter = Value::vector(vec![Value::Int(1)]);
        assert_ne!(list, shorter);
    }

    #[test]
    fn test_nested_equality_crosses_sequence_kinds() {
        let a = Value::list(vec![Value::Int(1), Value::vector(vec![Value::Int(2)])]);
        let b = Value::vector(vec![Value::Int(1), Value::list(vec![Value::Int(2)])]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_keyword_is_not_a_string() {
        assert_ne!(Value::keyword("a"), Value::string("a"));
        assert_eq!(Value::keyword("a"), Value::keyword("a"));
    }

    #[test]
    fn test_atom_equality_is_identity() {
        let a = Value::atom(Value::Int(1));
        let b = Value::atom(Value::Int(1));
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Nil.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::list(vec![]).is_truthy());
    }

    #[test]
    fn test_with_meta_shares_contents() {
        let list = Value::list(vec![Value::Int(1), Value::Int(2)]);
        let tagged = list.with_meta(Value::keyword("tag")).unwrap();
        assert_eq!(list, tagged); // metadata is invisible to equality
        assert_eq!(tagged.meta(), Value::keyword("tag"));
        assert_eq!(list.meta(), Value::Nil);
    }

    #[test]
    fn test_with_meta_rejects_scalars() {
        assert!(Value::Int(3).with_meta(Value::Nil).is_err());
        assert!(Value::string("s").with_meta(Value::Nil).is_err());
    }

    #[test]
    fn test_map_equality() {
        let mut a = HashMap::new();
        a.insert(MapKey::Keyword("x".into()), Value::Int(1));
        let mut b = HashMap::new();
        b.insert(MapKey::Keyword("x".into()), Value::Int(1));
        assert_eq!(Value::map(a.clone()), Value::map(b));

        let mut c = HashMap::new();
        c.insert(MapKey::Str("x".into()), Value::Int(1));
        assert_ne!(Value::map(a), Value::map(c));
    }
}
