//! Lowers a `ParsedRule` into the flat `Vec<Instruction>` the evaluator
//! runs, folding constant subtrees along the way.
//!
//! `CodeBuilder` is the forward-jump-and-patch helper described in
//! SPEC_FULL.md §4.3–4.4, modeled on `ouros::bytecode::builder::CodeBuilder`
//! but working over plain `Instruction`s instead of byte-packed opcodes.

use std::sync::Arc;

use crate::ast::{BoolOp, Expr, Lit, ParsedRule};
use crate::instruction::Instruction;
use crate::ops;
use crate::value::{Value, ValueSet};

struct CodeBuilder {
    code: Vec<Instruction>,
}

impl CodeBuilder {
    fn new() -> Self {
        Self { code: Vec::new() }
    }

    fn emit(&mut self, instr: Instruction) -> usize {
        self.code.push(instr);
        self.code.len() - 1
    }

    fn here(&self) -> usize {
        self.code.len()
    }

    /// Emits a jump with a placeholder target, returning its index for a
    /// later `patch_jump` call.
    fn emit_jump_if_false_else_keep(&mut self) -> usize {
        self.emit(Instruction::JumpIfFalseElseKeep(usize::MAX))
    }

    fn emit_jump_if_true_else_keep(&mut self) -> usize {
        self.emit(Instruction::JumpIfTrueElseKeep(usize::MAX))
    }

    fn emit_jump_if_false_pop(&mut self) -> usize {
        self.emit(Instruction::JumpIfFalsePop(usize::MAX))
    }

    fn emit_jump(&mut self) -> usize {
        self.emit(Instruction::Jump(usize::MAX))
    }

    /// Patches a previously emitted jump to target the current position.
    fn patch_jump(&mut self, idx: usize) {
        let target = self.here();
        self.code[idx] = match &self.code[idx] {
            Instruction::JumpIfFalseElseKeep(_) => Instruction::JumpIfFalseElseKeep(target),
            Instruction::JumpIfTrueElseKeep(_) => Instruction::JumpIfTrueElseKeep(target),
            Instruction::JumpIfFalsePop(_) => Instruction::JumpIfFalsePop(target),
            Instruction::Jump(_) => Instruction::Jump(target),
            other => unreachable!("patch_jump on non-jump instruction {other:?}"),
        };
    }
}

/// Lowers a fully parsed rule into its instruction stream.
pub fn lower(rule: &ParsedRule) -> Vec<Instruction> {
    let mut b = CodeBuilder::new();
    lower_expr(&mut b, &rule.verdict);

    let mut names: Vec<Arc<str>> = Vec::with_capacity(rule.attrs.len());
    for (name, expr) in &rule.attrs {
        lower_expr(&mut b, expr);
        names.push(Arc::from(name.as_str()));
    }
    b.emit(Instruction::SetAuthz(Arc::from(names)));
    b.code
}

fn lit_value(lit: &Lit) -> Value {
    match lit {
        Lit::Int(i) => Value::Int(*i),
        Lit::Float(f) => Value::Float(*f),
        Lit::Str(s) => Value::str(s.clone()),
        Lit::Bool(b) => Value::Bool(*b),
        Lit::None => Value::Nothing,
    }
}

/// Attempts to fully evaluate a literal-only subtree at compile time.
/// Returns `None` if the subtree references a name, call, attribute,
/// subscript, or ternary/comparison/bool-op (none of those are "pure
/// literal" per spec.md §4.4), or if evaluating it would raise (division by
/// zero, integer overflow) — in which case the runtime instruction is
/// emitted instead and the error (if any) surfaces only if that code path
/// actually executes.
fn try_fold(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(lit) => Some(lit_value(lit)),
        Expr::Unary(op, inner) => {
            let v = try_fold(inner)?;
            ops::unary(*op, &v).ok()
        }
        Expr::Bin(op, lhs, rhs) => {
            let a = try_fold(lhs)?;
            let b = try_fold(rhs)?;
            ops::binary(*op, &a, &b).ok()
        }
        Expr::SetLit(items) => {
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                values.push(try_fold(item)?);
            }
            Some(Value::Set(Arc::new(ValueSet::from_values(values))))
        }
        // Names, calls, attribute/subscript access, `and`/`or` (short-circuit
        // changes which side actually gets evaluated), `not`, comparisons,
        // and ternaries are never folded — their value depends on runtime
        // state or short-circuit control flow the folder doesn't model.
        _ => None,
    }
}

fn lower_expr(b: &mut CodeBuilder, expr: &Expr) {
    if let Some(folded) = try_fold(expr) {
        b.emit(Instruction::PushConst(folded));
        return;
    }

    match expr {
        Expr::Lit(lit) => {
            b.emit(Instruction::PushConst(lit_value(lit)));
        }
        Expr::Name(name) => {
            b.emit(Instruction::LoadName(Arc::from(name.as_str())));
        }
        Expr::SetLit(items) => {
            for item in items {
                lower_expr(b, item);
            }
            b.emit(Instruction::BuildSet(items.len()));
        }
        Expr::Unary(op, inner) => {
            lower_expr(b, inner);
            b.emit(unary_instruction(*op));
        }
        Expr::Bin(op, lhs, rhs) => {
            lower_expr(b, lhs);
            lower_expr(b, rhs);
            b.emit(binary_instruction(*op));
        }
        Expr::Bool(boolop, lhs, rhs) => {
            lower_expr(b, lhs);
            let jump = match boolop {
                BoolOp::And => b.emit_jump_if_false_else_keep(),
                BoolOp::Or => b.emit_jump_if_true_else_keep(),
            };
            lower_expr(b, rhs);
            b.patch_jump(jump);
        }
        Expr::Not(inner) => {
            lower_expr(b, inner);
            b.emit(Instruction::Not);
        }
        Expr::Compare(first, comparators) => lower_compare(b, first, comparators),
        Expr::Ternary(body, cond, orelse) => {
            lower_expr(b, cond);
            let to_else = b.emit_jump_if_false_pop();
            lower_expr(b, body);
            let to_end = b.emit_jump();
            b.patch_jump(to_else);
            lower_expr(b, orelse);
            b.patch_jump(to_end);
        }
        Expr::Attr(obj, name) => {
            lower_expr(b, obj);
            b.emit(Instruction::GetAttr(Arc::from(name.as_str())));
        }
        Expr::Subscript(obj, key) => {
            lower_expr(b, obj);
            lower_expr(b, key);
            b.emit(Instruction::GetItem);
        }
        Expr::Call(callee, args) => {
            lower_expr(b, callee);
            for arg in args {
                lower_expr(b, arg);
            }
            b.emit(Instruction::Call(args.len()));
        }
    }
}

/// Compiles a chained comparison (`a < b < c < ...`) so each shared operand
/// is evaluated exactly once and the chain short-circuits on the first
/// `False`. This needs more than plain push/pop: like CPython's own
/// compiler (`DUP_TOP`/`ROT_THREE`/`ROT_TWO`/`POP_TOP`), it has to stash a
/// copy of each middle operand below the comparison result so the next
/// comparison can reuse it, then clean that copy up if the chain exits
/// early. Spec.md §4.4 spells out the compiled form for `and`/`or`/ternary
/// but is silent on chained comparisons; this is the same technique.
fn lower_compare(b: &mut CodeBuilder, first: &Expr, comparators: &[(crate::ast::CmpOp, Expr)]) {
    lower_expr(b, first);

    if comparators.len() == 1 {
        let (op, rhs) = &comparators[0];
        lower_expr(b, rhs);
        b.emit(cmp_instruction(*op));
        return;
    }

    let mut early_exits = Vec::new();
    for (i, (op, rhs)) in comparators.iter().enumerate() {
        lower_expr(b, rhs);
        let is_last = i + 1 == comparators.len();
        if !is_last {
            b.emit(Instruction::Dup);
            b.emit(Instruction::RotThree);
        }
        b.emit(cmp_instruction(*op));
        if !is_last {
            early_exits.push(b.emit_jump_if_false_else_keep());
        }
    }
    // All-true path falls straight through with the final bool on top and
    // nothing buried beneath it (the last comparison never dup'd). Skip the
    // cleanup that the early-exit jumps below still need.
    let skip_cleanup = b.emit_jump();

    for idx in early_exits {
        b.patch_jump(idx);
    }
    b.emit(Instruction::Swap);
    b.emit(Instruction::Pop);

    b.patch_jump(skip_cleanup);
}

fn unary_instruction(op: crate::ast::UnOp) -> Instruction {
    use crate::ast::UnOp;
    match op {
        UnOp::Neg => Instruction::Neg,
        UnOp::Pos => Instruction::Pos,
        UnOp::Invert => Instruction::Invert,
    }
}

fn binary_instruction(op: crate::ast::BinOp) -> Instruction {
    use crate::ast::BinOp;
    match op {
        BinOp::Add => Instruction::Add,
        BinOp::Sub => Instruction::Sub,
        BinOp::Mul => Instruction::Mul,
        BinOp::Div => Instruction::Div,
        BinOp::FloorDiv => Instruction::FloorDiv,
        BinOp::Mod => Instruction::Mod,
        BinOp::Pow => Instruction::Pow,
        BinOp::BitAnd => Instruction::BitAnd,
        BinOp::BitOr => Instruction::BitOr,
        BinOp::BitXor => Instruction::BitXor,
        BinOp::Shl => Instruction::Shl,
        BinOp::Shr => Instruction::Shr,
    }
}

fn cmp_instruction(op: crate::ast::CmpOp) -> Instruction {
    use crate::ast::CmpOp;
    match op {
        CmpOp::Eq => Instruction::Eq,
        CmpOp::Ne => Instruction::Ne,
        CmpOp::Lt => Instruction::Lt,
        CmpOp::Le => Instruction::Le,
        CmpOp::Gt => Instruction::Gt,
        CmpOp::Ge => Instruction::Ge,
        CmpOp::In => Instruction::In,
        CmpOp::NotIn => Instruction::NotIn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rule;

    fn compile(src: &str) -> Vec<Instruction> {
        lower(&parse_rule(src).unwrap())
    }

    #[test]
    fn folds_pure_arithmetic() {
        let code = compile("1 + 2 * 3");
        assert!(matches!(code.as_slice(), [Instruction::PushConst(Value::Int(7)), Instruction::SetAuthz(_)]));
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let code = compile("1 / 0");
        assert!(code.iter().any(|i| matches!(i, Instruction::Div)));
    }

    #[test]
    fn does_not_fold_names() {
        let code = compile("x + 1");
        assert!(code.iter().any(|i| matches!(i, Instruction::LoadName(n) if &**n == "x")));
        assert!(code.iter().any(|i| matches!(i, Instruction::Add)));
    }

    #[test]
    fn and_or_compile_to_value_preserving_jumps() {
        let code = compile("x and y");
        assert!(code.iter().any(|i| matches!(i, Instruction::JumpIfFalseElseKeep(_))));
        let code = compile("x or y");
        assert!(code.iter().any(|i| matches!(i, Instruction::JumpIfTrueElseKeep(_))));
    }

    #[test]
    fn ternary_compiles_to_pop_jump_and_unconditional_jump() {
        let code = compile("a if c else b");
        assert!(code.iter().any(|i| matches!(i, Instruction::JumpIfFalsePop(_))));
        assert!(code.iter().any(|i| matches!(i, Instruction::Jump(_))));
    }

    #[test]
    fn chained_comparison_uses_dup_rotthree_swap_pop() {
        let code = compile("a < b < c");
        assert!(code.iter().any(|i| matches!(i, Instruction::Dup)));
        assert!(code.iter().any(|i| matches!(i, Instruction::RotThree)));
        assert!(code.iter().any(|i| matches!(i, Instruction::Swap)));
        assert!(code.iter().any(|i| matches!(i, Instruction::Pop)));
    }

    #[test]
    fn single_comparison_needs_no_shuffle_opcodes() {
        let code = compile("a < b");
        assert!(!code.iter().any(|i| matches!(i, Instruction::Dup | Instruction::RotThree)));
    }

    #[test]
    fn attr_block_compiles_verdict_then_attrs_then_set_authz() {
        let code = compile("True {{ reason = 1, count = 2 }}");
        match code.last().unwrap() {
            Instruction::SetAuthz(names) => {
                assert_eq!(&**names, &[Arc::from("reason"), Arc::from("count")][..]);
            }
            other => panic!("expected SetAuthz, got {other:?}"),
        }
    }

    #[test]
    fn dynamic_set_literal_builds_at_runtime() {
        let code = compile("{x, 1}");
        assert!(code.iter().any(|i| matches!(i, Instruction::BuildSet(2))));
    }

    #[test]
    fn constant_set_literal_folds() {
        let code = compile("{1, 2}");
        assert!(code.iter().any(|i| matches!(i, Instruction::PushConst(Value::Set(_)))));
        assert!(!code.iter().any(|i| matches!(i, Instruction::BuildSet(_))));
    }
}
