//! `rule(name)` — the builtin every `Policy` always injects (spec.md §4.6).
//!
//! Unlike every other builtin, this one is `Function::ContextWanting`: it
//! needs direct access to the evaluation context to memoize per-call, guard
//! against recursion, and recurse into `evaluator::run` for the named
//! rule's own instructions.
//!
//! A nested rule whose text fails to parse evaluates falsy rather than
//! surfacing a `ParseError` — `ContextWanting`'s signature can only
//! propagate an `EvaluationError`, not a compile failure. `Policy::evaluate`
//! (the top-level entry point) does not have this limitation and reports
//! `ParseError`s directly; this asymmetry is intentional and documented in
//! DESIGN.md.
//!
//! A sub-rule that parses fine but *raises* while running (`DivisionByZero`,
//! `TypeMismatch`, ...) degrades to a falsy Authorization the same way —
//! spec.md §7 says `rule()` treats a failing sub-rule as falsy and
//! continues. `Timeout` is the one exception that keeps propagating: it's
//! the shared instruction budget running out, not something specific to
//! this sub-rule, so substituting falsy and continuing would just burn
//! through the rest of the budget one failing call at a time.

use std::sync::Arc;

use crate::authorization::Authorization;
use crate::context::PolicyContext;
use crate::error::{EvalResult, EvaluationError};
use crate::evaluator;
use crate::value::Value;

pub(super) fn call(ctx: &mut PolicyContext<'_>, args: &[Value]) -> EvalResult<()> {
    let Some(Value::Str(name)) = args.first() else {
        ctx.push(Value::Authorization(Arc::new(Authorization::falsy())));
        return Ok(());
    };
    let name = name.to_string();

    if let Some(cached) = ctx.rule_cache.get(&name) {
        ctx.push(Value::Authorization(Arc::new(cached.clone())));
        return Ok(());
    }

    let Some(rule) = ctx.policy().get_rule(&name) else {
        ctx.push(Value::Authorization(Arc::new(Authorization::falsy())));
        return Ok(());
    };

    if ctx.enter_rule(&name).is_err() {
        ctx.push(Value::Authorization(Arc::new(Authorization::falsy())));
        return Ok(());
    }

    let outcome = match rule.instructions() {
        Ok(instructions) => evaluator::run(instructions, ctx),
        Err(_) => Ok(Authorization::falsy()),
    };
    ctx.exit_rule(&name);

    let authz = match outcome {
        Ok(authz) => with_defaults(&rule, authz),
        Err(EvaluationError::Timeout) => return Err(EvaluationError::Timeout),
        Err(_) => with_defaults(&rule, Authorization::falsy()),
    };
    ctx.rule_cache.insert(name, authz.clone());
    ctx.push(Value::Authorization(Arc::new(authz)));
    Ok(())
}

/// Layers a rule's declared attribute defaults under whatever its `{{ … }}`
/// block actually set — the block wins on conflict (spec.md §9(a)).
fn with_defaults(rule: &crate::rule::Rule, mut authz: Authorization) -> Authorization {
    for (name, value) in &rule.attrs {
        authz.attrs.entry(name.clone()).or_insert_with(|| value.clone());
    }
    authz
}
