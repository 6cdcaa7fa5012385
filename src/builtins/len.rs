use crate::value::Value;

pub(super) fn call(args: &[Value]) -> Value {
    let count = match args.first() {
        Some(Value::Str(s)) => s.chars().count(),
        Some(Value::Bytes(b)) => b.len(),
        Some(Value::Set(s)) => s.len(),
        Some(Value::Seq(s)) => s.items.len(),
        _ => return Value::Nothing,
    };
    Value::Int(count as i64)
}
