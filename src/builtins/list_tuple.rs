//! `list` and `tuple` — both just tag a materialized sequence differently.

use super::support::{seq_of, to_items};
use crate::value::{SeqKind, Value};

fn call(kind: SeqKind, args: &[Value]) -> Value {
    let items = match args.first() {
        None => Vec::new(),
        Some(v) => match to_items(v) {
            Some(items) => items,
            None => return Value::Nothing,
        },
    };
    seq_of(kind, items)
}

pub(super) fn list_call(args: &[Value]) -> Value {
    call(SeqKind::List, args)
}

pub(super) fn tuple_call(args: &[Value]) -> Value {
    call(SeqKind::Tuple, args)
}
