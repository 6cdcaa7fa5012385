//! Pure operator semantics shared by the constant folder and the evaluator.
//!
//! Kept as free functions rather than methods on `Value` so that
//! `compiler::try_fold` and `evaluator::run` are guaranteed to agree: a
//! constant-folded `1 + 2` and a runtime `a + b` with `a=1, b=2` go through
//! the exact same code path.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::ast::{BinOp, CmpOp, UnOp};
use crate::error::{EvalResult, EvaluationError};
use crate::value::{value_cmp, value_eq, Value, ValueSet};

fn mismatch(op: &'static str, lhs: &Value, rhs: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch { op, lhs: lhs.type_name(), rhs: rhs.type_name() }
}

fn mismatch1(op: &'static str, v: &Value) -> EvaluationError {
    EvaluationError::TypeMismatch { op, lhs: v.type_name(), rhs: "" }
}

pub fn unary(op: UnOp, v: &Value) -> EvalResult<Value> {
    match (op, v) {
        (UnOp::Pos, Value::Int(i)) => Ok(Value::Int(*i)),
        (UnOp::Pos, Value::Float(f)) => Ok(Value::Float(*f)),
        (UnOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or(EvaluationError::DivisionByZero),
        (UnOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (UnOp::Invert, Value::Int(i)) => Ok(Value::Int(!i)),
        (UnOp::Invert, Value::Bool(b)) => Ok(Value::Int(!(*b as i64))),
        _ => Err(mismatch1(unop_name(op), v)),
    }
}

fn unop_name(op: UnOp) -> &'static str {
    match op {
        UnOp::Neg => "unary -",
        UnOp::Pos => "unary +",
        UnOp::Invert => "~",
    }
}

fn binop_name(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::FloorDiv => "//",
        BinOp::Mod => "%",
        BinOp::Pow => "**",
        BinOp::BitAnd => "&",
        BinOp::BitOr => "|",
        BinOp::BitXor => "^",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Int(i) => Some(*i as f64),
        Value::Float(f) => Some(*f),
        Value::Bool(b) => Some(*b as i64 as f64),
        _ => None,
    }
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Int(i) => Some(*i),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

/// Floor division matching Python's `//`: rounds towards negative infinity.
fn ifloordiv(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let q = a.checked_div(b)?;
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Modulo matching Python's `%`: result takes the divisor's sign.
fn imod(a: i64, b: i64) -> Option<i64> {
    if b == 0 {
        return None;
    }
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn fmod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        r + b
    } else {
        r
    }
}

fn set_op(op: BinOp, a: &ValueSet, b: &ValueSet) -> Option<ValueSet> {
    match op {
        BinOp::BitOr => Some(ValueSet::from_values(a.iter().cloned().chain(b.iter().cloned()))),
        BinOp::BitAnd => Some(ValueSet::from_values(a.iter().filter(|x| b.contains(x)).cloned())),
        BinOp::BitXor => Some(ValueSet::from_values(
            a.iter().filter(|x| !b.contains(x)).cloned().chain(b.iter().filter(|x| !a.contains(x)).cloned()),
        )),
        _ => None,
    }
}

pub fn binary(op: BinOp, a: &Value, b: &Value) -> EvalResult<Value> {
    use BinOp::*;
    match op {
        Add => match (a, b) {
            (Value::Str(x), Value::Str(y)) => Ok(Value::str(format!("{x}{y}"))),
            (Value::Bytes(x), Value::Bytes(y)) => {
                Ok(Value::Bytes(Arc::from(x.iter().chain(y.iter()).copied().collect::<Vec<u8>>())))
            }
            _ => numeric(op, a, b),
        },
        Sub | Mul => numeric(op, a, b),
        Div => {
            let (x, y) = (as_f64(a), as_f64(b));
            match (x, y) {
                (Some(_), Some(y)) if y == 0.0 => Err(EvaluationError::DivisionByZero),
                (Some(x), Some(y)) => Ok(Value::Float(x / y)),
                _ => Err(mismatch(binop_name(op), a, b)),
            }
        }
        FloorDiv => match (as_i64(a), as_i64(b)) {
            (Some(x), Some(y)) => ifloordiv(x, y).map(Value::Int).ok_or(EvaluationError::DivisionByZero),
            _ => match (as_f64(a), as_f64(b)) {
                (Some(x), Some(y)) if y != 0.0 => Ok(Value::Float((x / y).floor())),
                (Some(_), Some(_)) => Err(EvaluationError::DivisionByZero),
                _ => Err(mismatch(binop_name(op), a, b)),
            },
        },
        Mod => match (as_i64(a), as_i64(b)) {
            (Some(x), Some(y)) => imod(x, y).map(Value::Int).ok_or(EvaluationError::DivisionByZero),
            _ => match (as_f64(a), as_f64(b)) {
                (Some(x), Some(y)) if y != 0.0 => Ok(Value::Float(fmod(x, y))),
                (Some(_), Some(_)) => Err(EvaluationError::DivisionByZero),
                _ => Err(mismatch(binop_name(op), a, b)),
            },
        },
        Pow => match (a, b) {
            (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
                let base = as_i64(a).unwrap();
                let exp = as_i64(b).unwrap();
                if exp >= 0 {
                    base.checked_pow(exp as u32).map(Value::Int).ok_or(EvaluationError::DivisionByZero)
                } else {
                    Ok(Value::Float((base as f64).powi(exp as i32)))
                }
            }
            _ => match (as_f64(a), as_f64(b)) {
                (Some(x), Some(y)) => Ok(Value::Float(x.powf(y))),
                _ => Err(mismatch(binop_name(op), a, b)),
            },
        },
        BitAnd | BitOr | BitXor => match (a, b) {
            (Value::Set(x), Value::Set(y)) => {
                set_op(op, x, y).map(|s| Value::Set(Arc::new(s))).ok_or_else(|| mismatch(binop_name(op), a, b))
            }
            _ => match (as_i64(a), as_i64(b)) {
                (Some(x), Some(y)) => Ok(Value::Int(match op {
                    BitAnd => x & y,
                    BitOr => x | y,
                    BitXor => x ^ y,
                    _ => unreachable!(),
                })),
                _ => Err(mismatch(binop_name(op), a, b)),
            },
        },
        Shl | Shr => match (as_i64(a), as_i64(b)) {
            (Some(x), Some(y)) if (0..64).contains(&y) => Ok(Value::Int(match op {
                Shl => x.checked_shl(y as u32).unwrap_or(0),
                Shr => x >> y,
                _ => unreachable!(),
            })),
            (Some(_), Some(_)) => Err(mismatch(binop_name(op), a, b)),
            _ => Err(mismatch(binop_name(op), a, b)),
        },
    }
}

fn numeric(op: BinOp, a: &Value, b: &Value) -> EvalResult<Value> {
    match (a, b) {
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            let x = as_i64(a).unwrap();
            let y = as_i64(b).unwrap();
            let result = match op {
                BinOp::Add => x.checked_add(y),
                BinOp::Sub => x.checked_sub(y),
                BinOp::Mul => x.checked_mul(y),
                _ => unreachable!(),
            };
            result.map(Value::Int).ok_or(EvaluationError::DivisionByZero)
        }
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => Ok(Value::Float(match op {
                BinOp::Add => x + y,
                BinOp::Sub => x - y,
                BinOp::Mul => x * y,
                _ => unreachable!(),
            })),
            _ => Err(mismatch(binop_name(op), a, b)),
        },
    }
}

fn cmpop_name(op: CmpOp) -> &'static str {
    match op {
        CmpOp::Eq => "==",
        CmpOp::Ne => "!=",
        CmpOp::Lt => "<",
        CmpOp::Le => "<=",
        CmpOp::Gt => ">",
        CmpOp::Ge => ">=",
        CmpOp::In => "in",
        CmpOp::NotIn => "not in",
    }
}

/// `elem in container`. `None` means the container type doesn't support
/// containment at all (an `EvaluationError`, not a silent `Nothing`, per
/// SPEC_FULL.md §4.1 — this is a rule-author type error, not a typo'd name).
fn contains(elem: &Value, container: &Value) -> Option<bool> {
    match container {
        Value::Set(s) => Some(s.contains(elem)),
        Value::Seq(s) => Some(s.items.iter().any(|v| value_eq(v, elem))),
        Value::Str(s) => match elem {
            Value::Str(needle) => Some(s.contains(needle.as_ref())),
            _ => None,
        },
        Value::Bytes(b) => match elem {
            Value::Int(needle) if (0..=255).contains(needle) => Some(b.contains(&(*needle as u8))),
            Value::Bytes(needle) => Some(windows_contain(b, needle)),
            _ => None,
        },
        Value::Object(o) => o.contains(elem),
        _ => None,
    }
}

fn windows_contain(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Evaluates one comparison operator, producing `Value::Bool`.
pub fn compare(op: CmpOp, a: &Value, b: &Value) -> EvalResult<Value> {
    match op {
        CmpOp::Eq => Ok(Value::Bool(value_eq(a, b))),
        CmpOp::Ne => Ok(Value::Bool(!value_eq(a, b))),
        CmpOp::Lt | CmpOp::Le | CmpOp::Gt | CmpOp::Ge => {
            let ord = value_cmp(a, b).ok_or_else(|| mismatch(cmpop_name(op), a, b))?;
            Ok(Value::Bool(match op {
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::Le => ord != Ordering::Greater,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::Ge => ord != Ordering::Less,
                _ => unreachable!(),
            }))
        }
        CmpOp::In | CmpOp::NotIn => {
            let found = contains(a, b).ok_or_else(|| mismatch(cmpop_name(op), a, b))?;
            Ok(Value::Bool(if op == CmpOp::In { found } else { !found }))
        }
    }
}
