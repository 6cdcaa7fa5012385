use super::support::to_items;
use crate::value::Value;

pub(super) fn type_call(args: &[Value]) -> Value {
    match args.first() {
        Some(v) => Value::str(v.type_name()),
        None => Value::Nothing,
    }
}

pub(super) fn isinstance_call(args: &[Value]) -> Value {
    let [value, types] = args else {
        return Value::Bool(false);
    };
    let name = value.type_name();
    let matches = match types {
        Value::Str(want) => want.as_ref() == name,
        other => to_items(other).is_some_and(|items| items.iter().any(|t| matches!(t, Value::Str(s) if s.as_ref() == name))),
    };
    Value::Bool(matches)
}
