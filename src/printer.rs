// ABOUTME: Rendering values back to source text, readable or display form

use crate::value::Value;

/// Render a value. With `readable` set, strings are quoted and escaped so
/// the output reads back as an equal value; otherwise they are emitted raw.
pub fn pr_str(value: &Value, readable: bool) -> String {
    match value {
        Value::Nil => "nil".to_string(),
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Symbol(name) => name.clone(),
        Value::Keyword(name) => format!(":{}", name),
        Value::Str(s) => {
            if readable {
                escape(s)
            } else {
                s.clone()
            }
        }
        Value::List(items, _) => format!("({})", pr_seq(items, readable, " ")),
        Value::Vector(items, _) => format!("[{}]", pr_seq(items, readable, " ")),
        Value::Map(entries, _) => {
            // Sort for stable output
            let mut sorted: Vec<_> = entries.iter().collect();
            sorted.sort_by_key(|(key, _)| (*key).clone());
            let body = sorted
                .iter()
                .map(|(key, val)| {
                    format!(
                        "{} {}",
                        pr_str(&key.to_value(), readable),
                        pr_str(val, readable)
                    )
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{{{}}}", body)
        }
        Value::Atom(cell) => format!("(atom {})", pr_str(&cell.borrow(), readable)),
        Value::Builtin(..) | Value::Closure(..) => "#<function>".to_string(),
    }
}

/// Join a slice of values with `sep`, rendering each with [`pr_str`].
pub fn pr_seq(items: &[Value], readable: bool, sep: &str) -> String {
    items
        .iter()
        .map(|item| pr_str(item, readable))
        .collect::<Vec<_>>()
        .join(sep)
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
