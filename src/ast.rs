//! Parsed syntax tree for a rule's expression (and optional attribute
//! block). One lowering pass (`compiler::lower`) turns this into
//! `Vec<Instruction>`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Invert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
}

#[derive(Debug, Clone)]
pub enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Lit(Lit),
    Name(String),
    SetLit(Vec<Expr>),
    Unary(UnOp, Box<Expr>),
    Bin(BinOp, Box<Expr>, Box<Expr>),
    Bool(BoolOp, Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    /// Chained comparison: `lhs op1 rhs1 op2 rhs2 ...`, all evaluated
    /// left-to-right with short-circuit on the first `False`.
    Compare(Box<Expr>, Vec<(CmpOp, Expr)>),
    /// `body if cond else orelse`.
    Ternary(Box<Expr>, Box<Expr>, Box<Expr>),
    Attr(Box<Expr>, String),
    Subscript(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
}

/// A fully parsed rule: the verdict expression plus its authorization
/// attribute block in declared order (empty if the rule had none).
#[derive(Debug, Clone)]
pub struct ParsedRule {
    pub verdict: Expr,
    pub attrs: Vec<(String, Expr)>,
}
