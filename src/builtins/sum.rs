use super::support::to_items;
use crate::ops;
use crate::ast::BinOp;
use crate::value::Value;

pub(super) fn call(args: &[Value]) -> Value {
    let (iterable, start) = match args {
        [iterable] => (iterable, Value::Int(0)),
        [iterable, start] => (iterable, start.clone()),
        _ => return Value::Nothing,
    };
    let Some(items) = to_items(iterable) else {
        return Value::Nothing;
    };
    let mut acc = start;
    for item in items {
        match ops::binary(BinOp::Add, &acc, &item) {
            Ok(next) => acc = next,
            Err(_) => return Value::Nothing,
        }
    }
    acc
}
