//! Pluggable name resolution past variables and builtins.
//!
//! Spec.md §4.7's four-step chain — variables, then builtins, then an
//! injected "entrypoint" resolver, then `Nothing` — is implemented here as
//! an explicit chain-of-responsibility (`NameResolver`) rather than inlined
//! conditionals in the evaluator, per the design note in SPEC_FULL.md §4.7:
//! it lets tests substitute a stub `EntrypointResolver` without spinning up
//! whatever a real deployment wires entrypoints to.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::value::{Function, Value};

/// Supplies values for names a rule references that are neither a caller
/// variable nor a builtin — e.g. a host application's own plug-in
/// registry. Implementations decide what a "group" means (a namespace, a
/// plugin category); `Policy` just forwards whatever `entrypoint_group` it
/// was constructed with.
pub trait EntrypointResolver: Send + Sync {
    fn resolve(&self, group: Option<&str>, name: &str) -> Option<Value>;
}

/// Chain-of-responsibility name resolution: variables, then builtins, then
/// the entrypoint resolver (with positive/negative memoization) — skipped
/// entirely when no `entrypoint_group` is set, per spec.md §4.7 step 3 —
/// then `Nothing`. Missing names are never an error (spec.md's "missing
/// variables are never fatal" non-goal).
pub(crate) struct NameResolver<'a> {
    pub variables: &'a HashMap<String, Value>,
    pub builtins: &'a HashMap<String, Function>,
    pub entrypoint_group: Option<&'a str>,
    pub resolver: Option<Arc<dyn EntrypointResolver>>,
    pub cache: &'a RwLock<HashMap<String, Option<Value>>>,
}

impl<'a> NameResolver<'a> {
    pub fn resolve(&self, name: &str) -> Value {
        if let Some(v) = self.variables.get(name) {
            return v.clone();
        }
        if let Some(f) = self.builtins.get(name) {
            return Value::Function(f.clone());
        }
        if let Some(v) = self.resolve_entrypoint(name) {
            return v;
        }
        Value::Nothing
    }

    fn resolve_entrypoint(&self, name: &str) -> Option<Value> {
        // spec.md §4.7 step 3: with no entrypoint group configured, this
        // step is skipped entirely — the resolver is never consulted and
        // nothing is cached, regardless of whether one happens to be set.
        self.entrypoint_group?;
        if let Some(cached) = self.cache.read().unwrap().get(name) {
            return cached.clone();
        }
        let resolved = self.resolver.as_ref().and_then(|r| r.resolve(self.entrypoint_group, name));
        self.cache.write().unwrap().insert(name.to_string(), resolved.clone());
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubResolver;
    impl EntrypointResolver for StubResolver {
        fn resolve(&self, _group: Option<&str>, name: &str) -> Option<Value> {
            (name == "found").then(|| Value::Int(42))
        }
    }

    #[test]
    fn variables_win_over_builtins_and_entrypoints() {
        let mut variables = HashMap::new();
        variables.insert("x".to_string(), Value::Int(1));
        let builtins = HashMap::new();
        let cache = RwLock::new(HashMap::new());
        let stub: Arc<dyn EntrypointResolver> = Arc::new(StubResolver);
        let resolver =
            NameResolver { variables: &variables, builtins: &builtins, entrypoint_group: None, resolver: Some(stub), cache: &cache };
        assert!(matches!(resolver.resolve("x"), Value::Int(1)));
    }

    #[test]
    fn entrypoint_resolution_is_memoized_both_ways() {
        let variables = HashMap::new();
        let builtins = HashMap::new();
        let cache = RwLock::new(HashMap::new());
        let stub: Arc<dyn EntrypointResolver> = Arc::new(StubResolver);
        let resolver = NameResolver {
            variables: &variables,
            builtins: &builtins,
            entrypoint_group: Some("group"),
            resolver: Some(stub),
            cache: &cache,
        };
        assert!(matches!(resolver.resolve("found"), Value::Int(42)));
        assert!(cache.read().unwrap().contains_key("found"));
        assert!(matches!(resolver.resolve("missing"), Value::Nothing));
        assert_eq!(cache.read().unwrap().get("missing"), Some(&None));
    }

    #[test]
    fn unresolved_name_is_nothing_not_an_error() {
        let variables = HashMap::new();
        let builtins = HashMap::new();
        let cache = RwLock::new(HashMap::new());
        let resolver = NameResolver { variables: &variables, builtins: &builtins, entrypoint_group: None, resolver: None, cache: &cache };
        assert!(matches!(resolver.resolve("nope"), Value::Nothing));
    }

    #[test]
    fn no_entrypoint_group_skips_the_resolver_entirely() {
        let variables = HashMap::new();
        let builtins = HashMap::new();
        let cache = RwLock::new(HashMap::new());
        let stub: Arc<dyn EntrypointResolver> = Arc::new(StubResolver);
        let resolver =
            NameResolver { variables: &variables, builtins: &builtins, entrypoint_group: None, resolver: Some(stub), cache: &cache };
        assert!(matches!(resolver.resolve("found"), Value::Nothing));
        assert!(cache.read().unwrap().is_empty());
    }
}
