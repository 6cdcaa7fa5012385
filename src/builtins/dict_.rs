//! `dict(...)` — SPEC_FULL.md §3's supplemental mapping builtin.
//!
//! The language has no dedicated mapping `Value` variant (and no dict
//! *literal* syntax, per spec.md's non-goals), so `dict()` builds a
//! read-only association list wrapped as an `Object`, exposed through the
//! same capability contract any host object would use.

use std::fmt;
use std::hash::Hasher;

use super::support::to_items;
use crate::capability::ObjectCapability;
use crate::value::{hash_value, value_eq, Value};

struct DictObject {
    pairs: Vec<(Value, Value)>,
}

impl fmt::Debug for DictObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.pairs.iter().map(|(k, v)| (format!("{k:?}"), format!("{v:?}")))).finish()
    }
}

impl ObjectCapability for DictObject {
    fn get_item(&self, key: &Value) -> Option<Value> {
        self.pairs.iter().find(|(k, _)| value_eq(k, key)).map(|(_, v)| v.clone())
    }

    fn truthy(&self) -> bool {
        !self.pairs.is_empty()
    }

    fn hash_value(&self) -> u64 {
        let mut acc = 0u64;
        for (k, v) in &self.pairs {
            let mut h = ahash::AHasher::default();
            hash_value(k, &mut h);
            hash_value(v, &mut h);
            acc ^= h.finish();
        }
        acc
    }

    fn contains(&self, elem: &Value) -> Option<bool> {
        Some(self.pairs.iter().any(|(k, _)| value_eq(k, elem)))
    }
}

/// Accepts an iterable of 2-element `(key, value)` tuples, mirroring
/// Python's `dict(iterable_of_pairs)` constructor form (the only form that
/// makes sense without keyword arguments, which spec.md's non-goals
/// exclude).
pub(super) fn call(args: &[Value]) -> Value {
    let Some(items) = args.first().and_then(to_items) else {
        return if args.is_empty() {
            Value::Object(std::sync::Arc::new(DictObject { pairs: Vec::new() }))
        } else {
            Value::Nothing
        };
    };
    let mut pairs = Vec::with_capacity(items.len());
    for item in items {
        match to_items(&item).as_deref() {
            Some([k, v]) => pairs.push((k.clone(), v.clone())),
            _ => return Value::Nothing,
        }
    }
    Value::Object(std::sync::Arc::new(DictObject { pairs }))
}
