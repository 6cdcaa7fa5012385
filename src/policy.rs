//! `Policy`: the rule store, builtin registry, and entrypoint resolver a
//! caller evaluates rules against.
//!
//! Concurrency model (SPEC_FULL.md §5): the rule table and entrypoint
//! resolution cache each live behind an `RwLock`, read for lookups/
//! evaluation and briefly write-locked for mutation. A rule's own
//! compiled-instruction cache lives inside the `Rule` itself (`OnceLock`),
//! so it can be populated through a shared (read-locked) reference without
//! this outer lock ever needing to be held for the duration of a compile.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::authorization::Authorization;
use crate::builtins::{default_builtins, RULE_BUILTIN_NAME};
use crate::context::PolicyContext;
use crate::entrypoint::EntrypointResolver;
use crate::error::PolicyError;
use crate::evaluator;
use crate::rule::Rule;
use crate::value::{Function, Value};

pub struct Policy {
    rules: RwLock<IndexMap<String, Arc<Rule>>>,
    builtins: HashMap<String, Function>,
    entrypoint_group: Option<String>,
    resolver: RwLock<Option<Arc<dyn EntrypointResolver>>>,
    entrypoint_cache: RwLock<HashMap<String, Option<Value>>>,
}

impl Policy {
    /// `builtin_overrides` may replace any default builtin by name, except
    /// `"rule"` — the self-recursion builtin is always the one in
    /// `builtins::rule_fn`, regardless of what's passed here.
    pub fn new(entrypoint_group: Option<String>, builtin_overrides: HashMap<String, Function>) -> Self {
        let mut builtins = default_builtins();
        for (name, f) in builtin_overrides {
            if name != RULE_BUILTIN_NAME {
                builtins.insert(name, f);
            }
        }
        Self {
            rules: RwLock::new(IndexMap::new()),
            builtins,
            entrypoint_group,
            resolver: RwLock::new(None),
            entrypoint_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn set_entrypoint_resolver(&self, resolver: Arc<dyn EntrypointResolver>) {
        *self.resolver.write().unwrap() = Some(resolver);
        // A newly installed resolver invalidates any cached "not found"
        // entries from before it was set.
        self.entrypoint_cache.write().unwrap().clear();
    }

    pub(crate) fn builtins(&self) -> &HashMap<String, Function> {
        &self.builtins
    }

    pub(crate) fn entrypoint_group(&self) -> Option<&str> {
        self.entrypoint_group.as_deref()
    }

    pub(crate) fn entrypoint_resolver(&self) -> Option<Arc<dyn EntrypointResolver>> {
        self.resolver.read().unwrap().clone()
    }

    pub(crate) fn entrypoint_cache(&self) -> &RwLock<HashMap<String, Option<Value>>> {
        &self.entrypoint_cache
    }

    /// Declares (or updates) a rule's text, default attributes, and
    /// documentation. Compilation is lazy — this never fails even if
    /// `text` doesn't parse; the error surfaces from `evaluate`.
    ///
    /// `text: None` means "don't touch this rule's text" rather than
    /// "clear it" — `declare` is also how a caller attaches defaults/docs
    /// to a rule whose text was already set via `set_rule`, and that must
    /// merge into the existing rule rather than collapse it back to the
    /// implicit falsy verdict a brand-new, textless `Rule` would have.
    pub fn declare(
        &self,
        name: impl Into<String>,
        text: Option<String>,
        attrs: IndexMap<String, Value>,
        doc: Option<String>,
        attr_docs: IndexMap<String, String>,
    ) {
        let name = name.into();
        let mut rules = self.rules.write().unwrap();
        let existing_text = rules.get(&name).and_then(|r| r.text.clone());
        let mut rule = Rule::new(name.clone());
        rule.set_text(text.or(existing_text));
        rule.attrs = attrs;
        rule.attr_docs = attr_docs;
        rule.doc = doc;
        rules.insert(name, Arc::new(rule));
    }

    pub fn set_rule(&self, name: impl Into<String>, text: impl Into<String>) {
        self.declare(name, Some(text.into()), IndexMap::new(), None, IndexMap::new());
    }

    pub fn get_rule(&self, name: &str) -> Option<Arc<Rule>> {
        self.rules.read().unwrap().get(name).cloned()
    }

    pub fn del_rule(&self, name: &str) -> bool {
        self.rules.write().unwrap().shift_remove(name).is_some()
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.read().unwrap().keys().cloned().collect()
    }

    /// Evaluates the named rule against `variables`. A rule that doesn't
    /// exist evaluates to a falsy `Authorization` with no attributes — this
    /// is never an error (spec.md §4.8). `budget` caps the number of
    /// instructions executed (including in nested `rule()` calls sharing
    /// this same context); `None` means unbounded.
    pub fn evaluate(&self, name: &str, variables: HashMap<String, Value>) -> Result<Authorization, PolicyError> {
        self.evaluate_with_budget(name, variables, None)
    }

    pub fn evaluate_with_budget(
        &self,
        name: &str,
        variables: HashMap<String, Value>,
        budget: Option<usize>,
    ) -> Result<Authorization, PolicyError> {
        let Some(rule) = self.get_rule(name) else {
            return Ok(Authorization::falsy());
        };
        let instructions = rule.instructions().map_err(PolicyError::from)?;
        let mut ctx = PolicyContext::new(self, variables, budget);
        let mut authz = evaluator::run(instructions, &mut ctx).map_err(PolicyError::from)?;
        for (attr_name, value) in &rule.attrs {
            authz.attrs.entry(attr_name.clone()).or_insert_with(|| value.clone());
        }
        Ok(authz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rule_evaluates_falsy_not_an_error() {
        let policy = Policy::new(None, HashMap::new());
        let authz = policy.evaluate("nope", HashMap::new()).unwrap();
        assert!(!authz.verdict);
        assert!(authz.attrs.is_empty());
    }

    #[test]
    fn simple_rule_evaluates() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("allow", "x > 5");
        let mut vars = HashMap::new();
        vars.insert("x".to_string(), Value::Int(10));
        let authz = policy.evaluate("allow", vars).unwrap();
        assert!(authz.verdict);
    }

    #[test]
    fn declared_defaults_are_overridden_by_the_block() {
        let policy = Policy::new(None, HashMap::new());
        let mut attrs = IndexMap::new();
        attrs.insert("reason".to_string(), Value::str("default"));
        policy.declare("r", Some("True {{ reason = 'overridden' }}".to_string()), attrs, None, IndexMap::new());
        let authz = policy.evaluate("r", HashMap::new()).unwrap();
        assert!(matches!(authz.attrs.get("reason"), Some(Value::Str(s)) if &**s == "overridden"));
    }

    #[test]
    fn declared_defaults_survive_when_block_omits_them() {
        let policy = Policy::new(None, HashMap::new());
        let mut attrs = IndexMap::new();
        attrs.insert("reason".to_string(), Value::str("default"));
        policy.declare("r", Some("True {{ other = 1 }}".to_string()), attrs, None, IndexMap::new());
        let authz = policy.evaluate("r", HashMap::new()).unwrap();
        assert!(matches!(authz.attrs.get("reason"), Some(Value::Str(s)) if &**s == "default"));
    }

    #[test]
    fn rule_self_recursion_is_guarded() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("r", "rule('r')");
        let authz = policy.evaluate("r", HashMap::new()).unwrap();
        assert!(!authz.verdict);
    }

    #[test]
    fn rule_calls_are_memoized_within_one_evaluation() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("inner", "True");
        policy.set_rule("outer", "rule('inner') and rule('inner')");
        let authz = policy.evaluate("outer", HashMap::new()).unwrap();
        assert!(authz.verdict);
    }

    #[test]
    fn del_rule_removes_it() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("r", "True");
        assert!(policy.del_rule("r"));
        let authz = policy.evaluate("r", HashMap::new()).unwrap();
        assert!(!authz.verdict);
    }

    #[test]
    fn declare_without_text_merges_into_an_existing_rule_instead_of_wiping_it() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("r", "x > 5");
        let mut attrs = IndexMap::new();
        attrs.insert("reason".to_string(), Value::str("ok"));
        policy.declare("r", None, attrs, None, IndexMap::new());

        let mut vars = HashMap::new();
        vars.insert("x".to_string(), Value::Int(10));
        let authz = policy.evaluate("r", vars).unwrap();
        assert!(authz.verdict);
        assert!(matches!(authz.attrs.get("reason"), Some(Value::Str(s)) if &**s == "ok"));
    }

    #[test]
    fn a_sub_rule_that_raises_degrades_to_falsy_instead_of_unwinding() {
        let policy = Policy::new(None, HashMap::new());
        policy.set_rule("broken", "1 / 0");
        policy.set_rule("outer", "rule('broken') or True");
        let authz = policy.evaluate("outer", HashMap::new()).unwrap();
        assert!(authz.verdict);
    }
}
