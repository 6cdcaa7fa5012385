//! `set` and `frozenset` both produce the same `Value::Set` — spec.md §9(c)
//! and SPEC_FULL.md §9(c): this language doesn't distinguish a mutable set
//! from a frozen one.

use std::sync::Arc;

use super::support::to_items;
use crate::value::{Value, ValueSet};

pub(super) fn call(args: &[Value]) -> Value {
    let items = match args.first() {
        None => Vec::new(),
        Some(v) => match to_items(v) {
            Some(items) => items,
            None => return Value::Nothing,
        },
    };
    Value::Set(Arc::new(ValueSet::from_values(items)))
}
