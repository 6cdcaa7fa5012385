//! `min` and `max` share an implementation: both accept either several
//! positional arguments or a single iterable, and differ only in which
//! side of `value_cmp`'s ordering they keep.

use std::cmp::Ordering;

use super::support::to_items;
use crate::value::{value_cmp, Value};

fn candidates(args: &[Value]) -> Option<Vec<Value>> {
    match args {
        [] => None,
        [single] => to_items(single).or_else(|| Some(vec![single.clone()])),
        many => Some(many.to_vec()),
    }
}

fn pick(args: &[Value], want: Ordering) -> Value {
    let Some(items) = candidates(args) else {
        return Value::Nothing;
    };
    let mut iter = items.into_iter();
    let Some(mut best) = iter.next() else {
        return Value::Nothing;
    };
    for item in iter {
        if value_cmp(&item, &best) == Some(want) {
            best = item;
        }
    }
    best
}

pub(super) fn min_call(args: &[Value]) -> Value {
    pick(args, Ordering::Less)
}

pub(super) fn max_call(args: &[Value]) -> Value {
    pick(args, Ordering::Greater)
}
