//! The immutable result of evaluating a rule.

use indexmap::IndexMap;

use crate::value::{value_eq, Value};

/// Boolean verdict plus named sub-decisions ("authorization attributes").
///
/// Produced only by the `SetAuthz` instruction (or the implicit empty one
/// a rule with no `{{ … }}` block gets). Reading an unknown attribute
/// yields `Nothing`, never an error; equality is structural.
#[derive(Debug, Clone)]
pub struct Authorization {
    pub verdict: bool,
    pub attrs: IndexMap<String, Value>,
}

impl Authorization {
    pub fn new(verdict: bool, attrs: IndexMap<String, Value>) -> Self {
        Self { verdict, attrs }
    }

    /// A falsy Authorization with no attributes — returned when a named
    /// rule doesn't exist, or when the `rule()` builtin's recursion guard
    /// trips.
    pub fn falsy() -> Self {
        Self { verdict: false, attrs: IndexMap::new() }
    }

    pub fn get_attr(&self, name: &str) -> Value {
        self.attrs.get(name).cloned().unwrap_or(Value::Nothing)
    }
}

impl PartialEq for Authorization {
    fn eq(&self, other: &Self) -> bool {
        self.verdict == other.verdict
            && self.attrs.len() == other.attrs.len()
            && self.attrs.iter().all(|(k, v)| other.attrs.get(k).is_some_and(|ov| value_eq(v, ov)))
    }
}
