use super::support::seq_of;
use crate::value::{SeqKind, Value};

pub(super) fn call(args: &[Value]) -> Value {
    let (start, stop, step) = match args {
        [Value::Int(stop)] => (0, *stop, 1),
        [Value::Int(start), Value::Int(stop)] => (*start, *stop, 1),
        [Value::Int(start), Value::Int(stop), Value::Int(step)] => (*start, *stop, *step),
        _ => return Value::Nothing,
    };
    if step == 0 {
        return Value::Nothing;
    }
    let mut items = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    seq_of(SeqKind::Range, items)
}
