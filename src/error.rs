//! Error types for the policy compiler and evaluator.
//!
//! Modeled on `ouros::exception_private`: plain enums with a hand-written
//! `Display`/`std::error::Error` impl rather than a derive-macro error
//! crate. `ParseError` is reported at `set_rule`/first-compile time;
//! `EvaluationError` is reported from `Policy::evaluate`. Neither is raised
//! for the tolerant "missing name" / "missing attribute" cases described in
//! the module docs for `evaluator` — those fall back to `Value::Nothing`.

use std::fmt;

/// Result alias for compilation (lexing + parsing + lowering).
pub type CompileResult<T> = Result<T, ParseError>;

/// Result alias for running a compiled instruction stream.
pub type EvalResult<T> = Result<T, EvaluationError>;

/// A source location, 1-indexed, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Syntax errors raised while lexing, parsing, or lowering a rule's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The lexer encountered a byte sequence that isn't a valid token
    /// (includes unterminated strings).
    UnexpectedToken { loc: SourceLoc, found: String },
    /// The parser expected one construct but found another.
    Expected { loc: SourceLoc, expected: &'static str, found: String },
    /// `{}` is reserved and may not appear as an empty set literal.
    EmptySetLiteral { loc: SourceLoc },
    /// An authorization attribute name began with `_`.
    ReservedAttrName { loc: SourceLoc, name: String },
    /// The same attribute name was assigned twice in one `{{ … }}` block.
    DuplicateAttrName { loc: SourceLoc, name: String },
    /// Non-whitespace content followed the closing `}}` of the attribute block.
    TrailingContent { loc: SourceLoc },
}

impl ParseError {
    /// Location the error was detected at.
    pub fn loc(&self) -> SourceLoc {
        match self {
            Self::UnexpectedToken { loc, .. }
            | Self::Expected { loc, .. }
            | Self::EmptySetLiteral { loc }
            | Self::ReservedAttrName { loc, .. }
            | Self::DuplicateAttrName { loc, .. }
            | Self::TrailingContent { loc } => *loc,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = self.loc();
        match self {
            Self::UnexpectedToken { found, .. } => {
                write!(f, "{loc}: unexpected token {found:?}")
            }
            Self::Expected { expected, found, .. } => {
                write!(f, "{loc}: expected {expected}, found {found:?}")
            }
            Self::EmptySetLiteral { .. } => write!(f, "{loc}: `{{}}` is reserved, not an empty set"),
            Self::ReservedAttrName { name, .. } => {
                write!(f, "{loc}: attribute name {name:?} may not begin with `_`")
            }
            Self::DuplicateAttrName { name, .. } => {
                write!(f, "{loc}: attribute {name:?} assigned more than once")
            }
            Self::TrailingContent { .. } => write!(f, "{loc}: trailing content after `}}}}`"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Failures raised from `Policy::evaluate`, distinct from a rule simply
/// producing a falsy `Authorization`.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationError {
    /// Division or modulo by zero.
    DivisionByZero,
    /// An arithmetic/bitwise/comparison operation was attempted between
    /// values whose types don't support it (including a host object
    /// explicitly refusing a comparison or containment check).
    TypeMismatch { op: &'static str, lhs: &'static str, rhs: &'static str },
    /// The evaluator tried to pop more values than the stack held. This
    /// indicates a compiler bug (stack-balance invariant violated), not a
    /// rule-author mistake.
    StackUnderflow,
    /// The optional instruction budget on `PolicyContext` was exhausted.
    Timeout,
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::TypeMismatch { op, lhs, rhs } => {
                write!(f, "unsupported operand types for {op}: {lhs} and {rhs}")
            }
            Self::StackUnderflow => write!(f, "evaluator stack underflow (compiler bug)"),
            Self::Timeout => write!(f, "evaluation exceeded its instruction budget"),
        }
    }
}

impl std::error::Error for EvaluationError {}

/// Everything `Policy::evaluate` can fail with: either the named rule's
/// text never parsed, or running its compiled instructions raised.
/// A rule that simply doesn't exist is *not* an error — `evaluate` returns
/// a falsy `Authorization` for that case (spec.md §4.8).
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    Parse(ParseError),
    Eval(EvaluationError),
}

impl From<ParseError> for PolicyError {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<EvaluationError> for PolicyError {
    fn from(e: EvaluationError) -> Self {
        Self::Eval(e)
    }
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "{e}"),
            Self::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PolicyError {}
