//! The opcode set the compiler emits and the evaluator runs.
//!
//! A plain `Vec<Instruction>` rather than a byte-packed tape — unlike
//! `ouros::bytecode::op::Opcode` (which feeds a real bytecode interpreter
//! over a much larger instruction set), this language's instruction set is
//! small enough that byte-encoding it would add complexity with no payoff.
//! Jump targets are absolute indices into that vector, resolved once during
//! lowering (see `compiler::CodeBuilder`).

use std::sync::Arc;

use crate::value::Value;

#[derive(Debug, Clone)]
pub enum Instruction {
    PushConst(Value),
    LoadName(Arc<str>),
    GetAttr(Arc<str>),
    GetItem,
    Call(usize),

    Neg,
    Pos,
    Not,
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
    Invert,

    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,

    /// Test TOS for falsiness; if false, jump to `target` *without popping*.
    /// If true, pop and fall through. Used for `and`.
    JumpIfFalseElseKeep(usize),
    /// Symmetric counterpart used for `or`.
    JumpIfTrueElseKeep(usize),
    /// Pop TOS; jump to `target` if it was falsy. Used for the `if`
    /// condition of the ternary.
    JumpIfFalsePop(usize),
    Jump(usize),

    /// Pop `names.len()` attribute values (in reverse declared order) plus
    /// the verdict, and push the resulting `Authorization`.
    SetAuthz(Arc<[Arc<str>]>),

    // --- Stack-shuffle opcodes -------------------------------------------------
    //
    // Spec.md §4.4 spells out the compiled form for `and`/`or`/ternary but is
    // silent on chained comparisons (`a < b < c`), which — per CPython's own
    // compiler — need more than a tape of pure push/pop instructions to
    // evaluate each shared operand exactly once while still short-circuiting.
    // These four give the compiler exactly what CPython's DUP_TOP/ROT_THREE/
    // ROT_TWO/POP_TOP give it, and are used nowhere else.
    /// Duplicate the top of stack.
    Dup,
    /// Swap the top two stack entries.
    Swap,
    /// Pop `c, b, a` (`c` = TOS) and push `c, a, b` — i.e. bury the
    /// original TOS two slots down while leaving `b` (the old middle
    /// value) on top.
    RotThree,
    /// Discard the top of stack.
    Pop,

    /// Pop `n` already-pushed elements and push the `Set` they form.
    ///
    /// Spec.md's instruction enumeration (§3) has no set-construction
    /// opcode, but grammar rule 15 allows arbitrary (non-constant)
    /// expressions as set elements — `{x, 1}` where `x` is a variable
    /// can't be constant-folded, so something has to build it at runtime.
    BuildSet(usize),
}
