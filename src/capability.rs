//! The capability contract opaque host objects must implement.
//!
//! Mirrors `ouros::capability`'s framing — the VM never downcasts or
//! otherwise assumes anything about a host value's concrete type; it only
//! ever asks it to perform one of the operations below. Unlike `ouros`'s
//! capability set (which gates *permissions* for a sandboxed interpreter),
//! this one exists because `Value::Object` wraps a genuinely opaque
//! caller-supplied type (e.g. a `user` record) that the core has no other
//! way to inspect.
//!
//! A capability that isn't implemented returns `None` from the relevant
//! method; callers decide per §7 of the spec whether that's a silent
//! `Nothing` fallback (attribute/item/call) or an `EvaluationError`
//! (comparison/containment).

use std::cmp::Ordering;
use std::fmt;

use crate::value::Value;

/// Operations the evaluator may need to perform on an opaque host value.
pub trait ObjectCapability: fmt::Debug + Send + Sync {
    /// `obj.name` — returns `None` if the object has no such attribute.
    fn get_attr(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// `obj[key]` — returns `None` if the object isn't subscriptable or the
    /// key is absent.
    fn get_item(&self, key: &Value) -> Option<Value> {
        let _ = key;
        None
    }

    /// `obj(args…)` — returns `None` if the object isn't callable.
    fn call(&self, args: &[Value]) -> Option<Value> {
        let _ = args;
        None
    }

    /// Structural equality against another `Value`. Objects that don't
    /// override this compare equal only to themselves (`Rc`/`Arc` identity
    /// is not assumed — implementers decide).
    fn equals(&self, other: &Value) -> bool {
        let _ = other;
        false
    }

    /// Three-way comparison against another `Value`, or `None` if the
    /// object refuses to be ordered against it.
    fn compare(&self, other: &Value) -> Option<Ordering> {
        let _ = other;
        None
    }

    /// Truthiness used wherever a `Value::Object` appears in a boolean
    /// context (`if`, `and`, `or`, `not`, the rule verdict itself).
    /// Defaults to `true`, matching "everything including opaque objects is
    /// true unless the host-capability override reports false."
    fn truthy(&self) -> bool {
        true
    }

    /// Hash consistent with `equals`. Required for the object to be usable
    /// as a `Set` element.
    fn hash_value(&self) -> u64;

    /// `elem in obj` — returns `None` if the object doesn't support
    /// containment checks.
    fn contains(&self, elem: &Value) -> Option<bool> {
        let _ = elem;
        None
    }
}
