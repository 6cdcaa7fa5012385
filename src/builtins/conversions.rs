//! `str`, `int`, `float` — conversions between the scalar value kinds.

use super::support::display_string;
use crate::value::Value;

pub(super) fn str_call(args: &[Value]) -> Value {
    match args.first() {
        Some(v) => Value::str(display_string(v)),
        None => Value::str(""),
    }
}

pub(super) fn int_call(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Int(i)) => Value::Int(*i),
        Some(Value::Bool(b)) => Value::Int(*b as i64),
        Some(Value::Float(f)) => Value::Int(*f as i64),
        Some(Value::Str(s)) => s.trim().parse::<i64>().map(Value::Int).unwrap_or(Value::Nothing),
        _ => Value::Nothing,
    }
}

pub(super) fn float_call(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Float(f)) => Value::Float(*f),
        Some(Value::Int(i)) => Value::Float(*i as f64),
        Some(Value::Bool(b)) => Value::Float(*b as i64 as f64),
        Some(Value::Str(s)) => s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Nothing),
        _ => Value::Nothing,
    }
}
