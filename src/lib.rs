//! A small, Python-flavored access-control policy expression language:
//! grammar, compiler (with constant folding), stack-based evaluator, rule
//! storage with recursion-safe memoization, and `Authorization` construction.
//!
//! A `Policy` holds named [`Rule`]s. Each rule's text compiles once (lazily,
//! memoized) into a flat instruction stream; [`Policy::evaluate`] runs that
//! stream against caller-supplied variables and returns an [`Authorization`]
//! — a boolean verdict plus an ordered map of named sub-decisions. Rules may
//! reference each other through the always-available `rule(name)` builtin,
//! which is itself memoized per top-level `evaluate` call and guarded
//! against recursion.
//!
//! ```
//! use std::collections::HashMap;
//! use authz_policy::{Policy, Value};
//!
//! let policy = Policy::new(None, HashMap::new());
//! policy.set_rule("can_view", "user_role == 'admin' or user_role == 'editor'");
//!
//! let mut vars = HashMap::new();
//! vars.insert("user_role".to_string(), Value::str("editor"));
//! let authz = policy.evaluate("can_view", vars).unwrap();
//! assert!(authz.verdict);
//! ```

mod ast;
mod authorization;
mod builtins;
mod capability;
mod compiler;
mod context;
mod entrypoint;
mod error;
mod evaluator;
mod instruction;
mod lexer;
mod ops;
mod parser;
mod policy;
mod rule;
mod value;

pub use authorization::Authorization;
pub use capability::ObjectCapability;
pub use context::PolicyContext;
pub use entrypoint::EntrypointResolver;
pub use error::{EvaluationError, ParseError, PolicyError};
pub use instruction::Instruction;
pub use parser::parse_rule;
pub use policy::Policy;
pub use rule::Rule;
pub use value::{Function, Seq, SeqKind, Value};
