//! `getattr` and `hasattr`.
//!
//! Caveat documented in DESIGN.md: because `ObjectCapability::get_attr`
//! itself can't distinguish "no such attribute" from "attribute present
//! with value `Nothing`" any more precisely than returning `None`/`Some`,
//! `hasattr` is exactly as precise as the capability implementation makes
//! it — it is not a guess layered on top of `getattr`'s *result*.

use super::support::lookup_attr;
use crate::value::Value;

pub(super) fn getattr_call(args: &[Value]) -> Value {
    match args {
        [obj, Value::Str(name)] => lookup_attr(obj, name).unwrap_or(Value::Nothing),
        [obj, Value::Str(name), default] => lookup_attr(obj, name).unwrap_or_else(|| default.clone()),
        _ => Value::Nothing,
    }
}

pub(super) fn hasattr_call(args: &[Value]) -> Value {
    match args {
        [obj, Value::Str(name)] => Value::Bool(lookup_attr(obj, name).is_some()),
        _ => Value::Bool(false),
    }
}
