use crate::value::Value;

pub(super) fn call(args: &[Value]) -> Value {
    match args {
        [Value::Int(i)] => i.checked_abs().map(Value::Int).unwrap_or(Value::Int(*i)),
        [Value::Float(f)] => Value::Float(f.abs()),
        [Value::Bool(b)] => Value::Int(*b as i64),
        _ => Value::Nothing,
    }
}
