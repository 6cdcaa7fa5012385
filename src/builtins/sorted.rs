use super::support::{seq_of, to_items};
use crate::value::{value_cmp, SeqKind, Value};

pub(super) fn call(args: &[Value]) -> Value {
    let Some(mut items) = args.first().and_then(to_items) else {
        return Value::Nothing;
    };
    items.sort_by(|a, b| value_cmp(a, b).unwrap_or(std::cmp::Ordering::Equal));
    seq_of(SeqKind::List, items)
}
