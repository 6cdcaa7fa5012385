//! Shared helpers used by more than one builtin.

use std::sync::Arc;

use crate::value::{Seq, SeqKind, Value};

/// Materializes anything iterable (per this language's builtins — `Str`,
/// `Bytes`, `Set`, `Seq`) into a plain `Vec<Value>`. Returns `None` for
/// values that aren't iterable at all.
pub(crate) fn to_items(v: &Value) -> Option<Vec<Value>> {
    match v {
        Value::Str(s) => Some(s.chars().map(|c| Value::str(c.to_string())).collect()),
        Value::Bytes(b) => Some(b.iter().map(|byte| Value::Int(*byte as i64)).collect()),
        Value::Set(s) => Some(s.iter().cloned().collect()),
        Value::Seq(s) => Some(s.items.clone()),
        _ => None,
    }
}

/// `getattr`/`hasattr` share this: `None` means "no such attribute",
/// distinct from an attribute whose value happens to be `Nothing`.
pub(crate) fn lookup_attr(obj: &Value, name: &str) -> Option<Value> {
    match obj {
        Value::Object(o) => o.get_attr(name),
        Value::Authorization(a) => a.attrs.get(name).cloned(),
        _ => None,
    }
}

pub(crate) fn tuple_of(items: Vec<Value>) -> Value {
    Value::Seq(Arc::new(Seq { kind: SeqKind::Tuple, items }))
}

pub(crate) fn seq_of(kind: SeqKind, items: Vec<Value>) -> Value {
    Value::Seq(Arc::new(Seq { kind, items }))
}

/// `str(value)` formatting — deliberately distinct from `Value`'s `Debug`
/// impl, which is repr-like (quotes strings). `None`/`True`/`False` use
/// their rule-syntax spelling since that's the only spelling a policy
/// author has ever seen for them.
pub(crate) fn display_string(v: &Value) -> String {
    match v {
        Value::Nothing => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Str(s) => s.to_string(),
        Value::Bytes(b) => format!("{b:?}"),
        Value::Set(s) => {
            let parts: Vec<String> = s.iter().map(display_string).collect();
            format!("{{{}}}", parts.join(", "))
        }
        Value::Seq(s) => {
            let parts: Vec<String> = s.items.iter().map(display_string).collect();
            match s.kind {
                SeqKind::Tuple => format!("({})", parts.join(", ")),
                _ => format!("[{}]", parts.join(", ")),
            }
        }
        Value::Object(_) => "<object>".to_string(),
        Value::Function(_) => "<function>".to_string(),
        Value::Authorization(a) => format!("Authorization(verdict={})", a.verdict),
    }
}
