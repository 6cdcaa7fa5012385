//! The tagged union of runtime values flowing through the VM.
//!
//! Heavier variants (`Str`, `Bytes`, `Set`, `Seq`, `Object`, `Function`,
//! `Authorization`) are `Arc`-wrapped rather than deep-cloned on every
//! stack push — the language has no mutation, so structural sharing is
//! always safe. `Arc` (not `Rc`) because a `Policy` and the `Value`s it
//! hands out (builtin closures, cached entrypoint results) must be usable
//! across concurrently-running `evaluate` calls (spec §5).

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::authorization::Authorization;
use crate::capability::ObjectCapability;
use crate::context::PolicyContext;
use crate::error::EvalResult;

/// The kind tag carried on a `Seq` so `type()`/`isinstance()` can tell a
/// `list(...)` result from a `tuple(...)`/`range(...)`/`zip(...)` one
/// without the language needing distinct container variants. See
/// SPEC_FULL.md §3 for why `Seq` exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeqKind {
    List,
    Tuple,
    Range,
    Zip,
    Enumerate,
}

/// An immutable ordered sequence, backing the `list`/`tuple`/`range`/
/// `zip`/`enumerate`/`sorted` builtins.
#[derive(Debug, Clone, PartialEq)]
pub struct Seq {
    pub kind: SeqKind,
    pub items: Vec<Value>,
}

/// Runtime value. See spec §3 for the authoritative variant list; `Seq` is
/// a documented addition (SPEC_FULL.md §3).
#[derive(Clone)]
pub enum Value {
    /// The "unresolved / none" sentinel. Falsy.
    Nothing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Bytes(Arc<[u8]>),
    /// Unordered, hashable, immutable — set literals and `set`/`frozenset`
    /// both produce this (SPEC_FULL.md §9(c)).
    Set(Arc<ValueSet>),
    Seq(Arc<Seq>),
    /// Opaque host value, interacted with only through `ObjectCapability`.
    Object(Arc<dyn ObjectCapability>),
    Function(Function),
    Authorization(Arc<Authorization>),
}

/// A callable reference. The `ContextWanting` variant is the calling
/// convention spec §9 calls out: such a function receives the evaluation
/// context directly and is responsible for pushing its own result (or not)
/// onto the stack, rather than returning a `Value` the evaluator pushes
/// for it. `rule()` is the prototypical example (§4.6).
#[derive(Clone)]
pub enum Function {
    Normal(Arc<dyn Fn(&[Value]) -> Value + Send + Sync>),
    /// Receives the evaluation context directly and pushes its own result
    /// (or not) onto the stack, rather than returning a `Value` the
    /// evaluator pushes for it. Returns `EvalResult<()>` — unlike `Normal`,
    /// a context-wanting function (namely `rule()`) recurses into the
    /// evaluator itself and must be able to propagate a real
    /// `EvaluationError` (a `Timeout`, the one kind its own sub-rule handling
    /// doesn't degrade to falsy) out of the nested evaluation.
    ContextWanting(Arc<dyn Fn(&mut PolicyContext<'_>, &[Value]) -> EvalResult<()> + Send + Sync>),
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal(_) => f.write_str("Function::Normal(..)"),
            Self::ContextWanting(_) => f.write_str("Function::ContextWanting(..)"),
        }
    }
}

/// Backing storage for `Value::Set`. Insertion order is irrelevant (the
/// set is unordered) but kept stable for `Debug`/iteration convenience.
#[derive(Debug, Default)]
pub struct ValueSet {
    elems: Vec<Value>,
}

impl ValueSet {
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut elems: Vec<Value> = Vec::new();
        for v in values {
            if !elems.iter().any(|e| value_eq(e, &v)) {
                elems.push(v);
            }
        }
        Self { elems }
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn contains(&self, v: &Value) -> bool {
        self.elems.iter().any(|e| value_eq(e, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.elems.iter()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.elems.iter().all(|e| other.contains(e))
    }
}

impl Value {
    /// Truthiness per spec §3: `Nothing`, `False`, numeric zero, and empty
    /// string/bytes/set are false; everything else (including opaque
    /// objects, functions, authorizations, sequences) is true unless a
    /// host capability overrides it.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Nothing => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Set(s) => !s.is_empty(),
            Value::Seq(s) => !s.items.is_empty(),
            Value::Object(o) => o.truthy(),
            Value::Function(_) => true,
            Value::Authorization(a) => a.verdict,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nothing => "Nothing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Set(_) => "set",
            Value::Seq(s) => match s.kind {
                SeqKind::List => "list",
                SeqKind::Tuple => "tuple",
                SeqKind::Range => "range",
                SeqKind::Zip => "zip",
                SeqKind::Enumerate => "enumerate",
            },
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::Authorization(_) => "Authorization",
        }
    }

    pub fn as_callable(&self) -> Option<&Function> {
        match self {
            Value::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

/// Structural equality. `Function`s compare by pointer identity of their
/// closure (there's no other meaningful notion of function equality here);
/// `Object`s delegate to their capability.
///
/// `Bool` compares equal to the `Int`/`Float` it coerces to (`True == 1`,
/// `False == 0.0`) — `ops::as_i64`/`as_f64` already treat `Bool` as numeric
/// for every arithmetic operator, so equality/ordering must agree or
/// `True + 1 == 2` and `True == 1` would disagree about whether `Bool` is
/// a number.
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Nothing, Value::Nothing) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Int(x), Value::Float(y)) | (Value::Float(y), Value::Int(x)) => (*x as f64) == *y,
        (Value::Bool(x), Value::Int(y)) | (Value::Int(y), Value::Bool(x)) => (*x as i64) == *y,
        (Value::Bool(x), Value::Float(y)) | (Value::Float(y), Value::Bool(x)) => (*x as i64 as f64) == *y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Set(x), Value::Set(y)) => x == y,
        (Value::Seq(x), Value::Seq(y)) => x.items.len() == y.items.len() && x.items.iter().zip(y.items.iter()).all(|(a, b)| value_eq(a, b)),
        (Value::Function(Function::Normal(x)), Value::Function(Function::Normal(y))) => Arc::ptr_eq(x, y),
        (Value::Function(Function::ContextWanting(x)), Value::Function(Function::ContextWanting(y))) => Arc::ptr_eq(x, y),
        (Value::Authorization(x), Value::Authorization(y)) => x == y,
        (Value::Object(x), y) => x.equals(y),
        (x, Value::Object(y)) => y.equals(x),
        _ => false,
    }
}

/// Three-way comparison used by `Lt`/`Le`/`Gt`/`Ge`. `None` means the types
/// are incomparable and the caller should raise `EvaluationError::TypeMismatch`.
pub fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Int(x), Value::Int(y)) => x.partial_cmp(y),
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y),
        (Value::Int(x), Value::Float(y)) => (*x as f64).partial_cmp(y),
        (Value::Float(x), Value::Int(y)) => x.partial_cmp(&(*y as f64)),
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bytes(x), Value::Bytes(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Int(y)) => (*x as i64).partial_cmp(y),
        (Value::Int(x), Value::Bool(y)) => x.partial_cmp(&(*y as i64)),
        (Value::Bool(x), Value::Float(y)) => (*x as i64 as f64).partial_cmp(y),
        (Value::Float(x), Value::Bool(y)) => x.partial_cmp(&(*y as i64 as f64)),
        (Value::Object(x), y) => x.compare(y),
        (x, Value::Object(y)) => y.compare(x).map(Ordering::reverse),
        _ => None,
    }
}

/// Hash consistent with [`value_eq`]. Sets hash as the XOR of their
/// elements' hashes so that equal sets (regardless of insertion order)
/// hash identically.
pub fn hash_value<H: Hasher>(v: &Value, state: &mut H) {
    match v {
        Value::Nothing => 0u8.hash(state),
        // Hashed as the Int it's equal to under `value_eq` (True == 1),
        // not via bool's own Hash impl, which would disagree.
        Value::Bool(b) => (*b as i64).hash(state),
        Value::Int(i) => i.hash(state),
        Value::Float(f) => {
            if *f == f.trunc() && f.is_finite() && (i64::MIN as f64..=i64::MAX as f64).contains(f) {
                (*f as i64).hash(state);
            } else {
                f.to_bits().hash(state);
            }
        }
        Value::Str(s) => s.hash(state),
        Value::Bytes(b) => b.hash(state),
        Value::Set(s) => {
            let mut acc: u64 = 0;
            for e in s.iter() {
                let mut h = ahash::AHasher::default();
                hash_value(e, &mut h);
                acc ^= h.finish();
            }
            acc.hash(state);
        }
        Value::Object(o) => o.hash_value().hash(state),
        // Sequences, functions, and authorizations are not meaningfully
        // hashable; fall back to a type-discriminant hash so they can still
        // occupy a set slot (equality will just never match another value).
        Value::Seq(_) => 1u8.hash(state),
        Value::Function(_) => 2u8.hash(state),
        Value::Authorization(_) => 3u8.hash(state),
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nothing => f.write_str("Nothing"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b{b:?}"),
            Value::Set(s) => {
                f.write_str("{")?;
                for (i, e) in s.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e:?}")?;
                }
                f.write_str("}")
            }
            Value::Seq(s) => write!(f, "{:?}{:?}", s.kind, s.items),
            Value::Object(_) => f.write_str("<object>"),
            Value::Function(_) => f.write_str("<function>"),
            Value::Authorization(a) => write!(f, "{a:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash_of(v: &Value) -> u64 {
        let mut h = ahash::AHasher::default();
        hash_value(v, &mut h);
        h.finish()
    }

    #[test]
    fn bool_is_equal_to_the_int_it_coerces_to() {
        assert!(value_eq(&Value::Bool(true), &Value::Int(1)));
        assert!(value_eq(&Value::Int(1), &Value::Bool(true)));
        assert!(value_eq(&Value::Bool(false), &Value::Int(0)));
        assert!(!value_eq(&Value::Bool(true), &Value::Int(0)));
    }

    #[test]
    fn bool_is_equal_to_the_float_it_coerces_to() {
        assert!(value_eq(&Value::Bool(false), &Value::Float(0.0)));
        assert!(value_eq(&Value::Float(1.0), &Value::Bool(true)));
        assert!(!value_eq(&Value::Bool(true), &Value::Float(1.5)));
    }

    #[test]
    fn bool_orders_against_int_and_float_like_its_coercion() {
        assert_eq!(value_cmp(&Value::Bool(true), &Value::Int(2)), Some(Ordering::Less));
        assert_eq!(value_cmp(&Value::Int(2), &Value::Bool(true)), Some(Ordering::Greater));
        assert_eq!(value_cmp(&Value::Bool(true), &Value::Float(1.0)), Some(Ordering::Equal));
        assert_eq!(value_cmp(&Value::Float(0.5), &Value::Bool(false)), Some(Ordering::Greater));
    }

    #[test]
    fn bool_hashes_the_same_as_the_int_it_equals() {
        assert_eq!(hash_of(&Value::Bool(true)), hash_of(&Value::Int(1)));
        assert_eq!(hash_of(&Value::Bool(false)), hash_of(&Value::Int(0)));
        assert_ne!(hash_of(&Value::Bool(true)), hash_of(&Value::Int(0)));
    }
}
