//! A single named rule: its source text, lazily-compiled instruction
//! stream, and declared attribute defaults/documentation.

use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::compiler::lower;
use crate::error::{CompileResult, ParseError};
use crate::instruction::Instruction;
use crate::parser::parse_rule;
use crate::value::Value;

/// A rule as stored in a `Policy`. Compilation (lex + parse + lower) is
/// memoized in `compiled` the first time the rule runs, via `OnceLock` so a
/// shared (`RwLock`-read) reference to the rule table can still trigger and
/// observe the one-time compile (SPEC_FULL.md §5).
pub struct Rule {
    pub name: String,
    pub text: Option<String>,
    pub doc: Option<String>,
    /// Default attribute values, layered *under* whatever the rule's own
    /// `{{ … }}` block sets (spec.md §9(a): the block wins on conflict).
    pub attrs: IndexMap<String, Value>,
    pub attr_docs: IndexMap<String, String>,
    compiled: OnceLock<CompileResult<Vec<Instruction>>>,
}

impl Rule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            doc: None,
            attrs: IndexMap::new(),
            attr_docs: IndexMap::new(),
            compiled: OnceLock::new(),
        }
    }

    /// Replaces this rule's text, discarding any memoized compilation.
    pub fn set_text(&mut self, text: Option<String>) {
        self.text = text;
        self.compiled = OnceLock::new();
    }

    /// Returns the compiled instruction stream, compiling (and caching) on
    /// first use. A rule with no text compiles to a single falsy verdict.
    pub fn instructions(&self) -> Result<&[Instruction], ParseError> {
        let result = self.compiled.get_or_init(|| match &self.text {
            None => Ok(lower(&crate::ast::ParsedRule { verdict: crate::ast::Expr::Lit(crate::ast::Lit::Bool(false)), attrs: Vec::new() })),
            Some(text) => parse_rule(text).map(|parsed| lower(&parsed)),
        });
        match result {
            Ok(instructions) => Ok(instructions.as_slice()),
            Err(e) => Err(e.clone()),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("text", &self.text)
            .field("attrs", &self.attrs.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_rule_compiles_to_falsy_verdict() {
        let rule = Rule::new("r");
        let code = rule.instructions().unwrap();
        assert!(!code.is_empty());
    }

    #[test]
    fn compilation_is_memoized() {
        let mut rule = Rule::new("r");
        rule.set_text(Some("True".to_string()));
        let first = rule.instructions().unwrap().to_vec();
        let second = rule.instructions().unwrap().to_vec();
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn setting_text_clears_the_cache() {
        let mut rule = Rule::new("r");
        rule.set_text(Some("x".to_string()));
        let _ = rule.instructions();
        rule.set_text(Some("x + 1".to_string()));
        let code = rule.instructions().unwrap();
        assert!(code.iter().any(|i| matches!(i, Instruction::Add)));
    }

    #[test]
    fn syntax_error_is_reported_and_cached() {
        let mut rule = Rule::new("r");
        rule.set_text(Some("{}".to_string()));
        assert!(matches!(rule.instructions(), Err(ParseError::EmptySetLiteral { .. })));
        assert!(matches!(rule.instructions(), Err(ParseError::EmptySetLiteral { .. })));
    }
}
