//! Builtin functions every `Policy` offers by default (spec.md §4.8), one
//! submodule per builtin (or per closely related pair, mirroring the
//! teacher crate's own `min_max.rs` grouping).

mod abs;
mod attr;
mod bool_;
mod conversions;
mod dict_;
mod len;
mod list_tuple;
mod min_max;
mod range;
mod rule_fn;
mod set_frozenset;
mod sorted;
mod sum;
mod support;
mod type_;
mod zip_enumerate;

use std::collections::HashMap;
use std::sync::Arc;

use crate::value::Function;

/// The name `rule` is reserved: it always resolves to the context-wanting
/// builtin in `rule_fn`, regardless of what a caller passes as a builtins
/// override to `Policy::new` (spec.md §4.6 — this is the mechanism every
/// rule-recursion scenario depends on, so it can't be shadowed).
pub(crate) const RULE_BUILTIN_NAME: &str = "rule";

pub(crate) fn default_builtins() -> HashMap<String, Function> {
    let mut m: HashMap<String, Function> = HashMap::new();

    macro_rules! normal {
        ($name:literal, $f:expr) => {
            m.insert($name.to_string(), Function::Normal(Arc::new($f)));
        };
    }

    normal!("abs", abs::call);
    normal!("bool", bool_::call);
    normal!("len", len::call);
    normal!("min", min_max::min_call);
    normal!("max", min_max::max_call);
    normal!("sorted", sorted::call);
    normal!("set", set_frozenset::call);
    normal!("frozenset", set_frozenset::call);
    normal!("str", conversions::str_call);
    normal!("int", conversions::int_call);
    normal!("float", conversions::float_call);
    normal!("range", range::call);
    normal!("zip", zip_enumerate::zip_call);
    normal!("enumerate", zip_enumerate::enumerate_call);
    normal!("sum", sum::call);
    normal!("getattr", attr::getattr_call);
    normal!("hasattr", attr::hasattr_call);
    normal!("isinstance", type_::isinstance_call);
    normal!("type", type_::type_call);
    normal!("list", list_tuple::list_call);
    normal!("tuple", list_tuple::tuple_call);
    normal!("dict", dict_::call);

    m.insert(RULE_BUILTIN_NAME.to_string(), Function::ContextWanting(Arc::new(rule_fn::call)));
    m
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_is_always_present() {
        assert!(default_builtins().contains_key(RULE_BUILTIN_NAME));
    }

    #[test]
    fn every_default_builtin_is_callable_or_context_wanting() {
        for (name, f) in default_builtins() {
            match f {
                Function::Normal(_) | Function::ContextWanting(_) => {}
            }
            let _ = name;
        }
    }
}
