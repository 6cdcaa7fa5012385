//! `zip` and `enumerate` share the "pair things up into tuples" shape.

use super::support::{seq_of, to_items, tuple_of};
use crate::value::{SeqKind, Value};

pub(super) fn zip_call(args: &[Value]) -> Value {
    let mut columns = Vec::with_capacity(args.len());
    for arg in args {
        match to_items(arg) {
            Some(items) => columns.push(items),
            None => return Value::Nothing,
        }
    }
    let len = columns.iter().map(Vec::len).min().unwrap_or(0);
    let mut rows = Vec::with_capacity(len);
    for i in 0..len {
        rows.push(tuple_of(columns.iter().map(|c| c[i].clone()).collect()));
    }
    seq_of(SeqKind::Zip, rows)
}

pub(super) fn enumerate_call(args: &[Value]) -> Value {
    let (iterable, start) = match args {
        [iterable] => (iterable, 0i64),
        [iterable, Value::Int(start)] => (iterable, *start),
        _ => return Value::Nothing,
    };
    let Some(items) = to_items(iterable) else {
        return Value::Nothing;
    };
    let rows = items.into_iter().enumerate().map(|(i, v)| tuple_of(vec![Value::Int(start + i as i64), v])).collect();
    seq_of(SeqKind::Enumerate, rows)
}
