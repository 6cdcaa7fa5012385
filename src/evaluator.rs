//! The tape interpreter: runs a compiled `Instruction` stream against a
//! `PolicyContext` and produces an `Authorization`.
//!
//! Instruction pointer is a plain `usize`; jump targets are the absolute
//! indices the compiler resolved during lowering, so dispatch never needs
//! to track block nesting.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::authorization::Authorization;
use crate::ast::{BinOp, CmpOp, UnOp};
use crate::entrypoint::NameResolver;
use crate::error::{EvalResult, EvaluationError};
use crate::instruction::Instruction;
use crate::context::PolicyContext;
use crate::ops;
use crate::value::{Value, ValueSet};

pub fn run(code: &[Instruction], ctx: &mut PolicyContext<'_>) -> EvalResult<Authorization> {
    let mut ip = 0usize;
    while ip < code.len() {
        ctx.tick()?;
        let instr = &code[ip];
        ip += 1;

        match instr {
            Instruction::PushConst(v) => ctx.push(v.clone()),
            Instruction::LoadName(name) => {
                let resolver = NameResolver {
                    variables: &ctx.variables,
                    builtins: ctx.policy.builtins(),
                    entrypoint_group: ctx.policy.entrypoint_group(),
                    resolver: ctx.policy.entrypoint_resolver(),
                    cache: ctx.policy.entrypoint_cache(),
                };
                ctx.push(resolver.resolve(name));
            }
            Instruction::GetAttr(name) => {
                let obj = ctx.pop()?;
                ctx.push(get_attr(&obj, name));
            }
            Instruction::GetItem => {
                let key = ctx.pop()?;
                let obj = ctx.pop()?;
                ctx.push(get_item(&obj, &key));
            }
            Instruction::Call(argc) => call(ctx, *argc)?,

            Instruction::Neg => unary(ctx, UnOp::Neg)?,
            Instruction::Pos => unary(ctx, UnOp::Pos)?,
            Instruction::Invert => unary(ctx, UnOp::Invert)?,
            Instruction::Not => {
                let v = ctx.pop()?;
                ctx.push(Value::Bool(!v.truthy()));
            }

            Instruction::Add => binary(ctx, BinOp::Add)?,
            Instruction::Sub => binary(ctx, BinOp::Sub)?,
            Instruction::Mul => binary(ctx, BinOp::Mul)?,
            Instruction::Div => binary(ctx, BinOp::Div)?,
            Instruction::FloorDiv => binary(ctx, BinOp::FloorDiv)?,
            Instruction::Mod => binary(ctx, BinOp::Mod)?,
            Instruction::Pow => binary(ctx, BinOp::Pow)?,
            Instruction::BitAnd => binary(ctx, BinOp::BitAnd)?,
            Instruction::BitOr => binary(ctx, BinOp::BitOr)?,
            Instruction::BitXor => binary(ctx, BinOp::BitXor)?,
            Instruction::Shl => binary(ctx, BinOp::Shl)?,
            Instruction::Shr => binary(ctx, BinOp::Shr)?,

            Instruction::Eq => compare(ctx, CmpOp::Eq)?,
            Instruction::Ne => compare(ctx, CmpOp::Ne)?,
            Instruction::Lt => compare(ctx, CmpOp::Lt)?,
            Instruction::Le => compare(ctx, CmpOp::Le)?,
            Instruction::Gt => compare(ctx, CmpOp::Gt)?,
            Instruction::Ge => compare(ctx, CmpOp::Ge)?,
            Instruction::In => compare(ctx, CmpOp::In)?,
            Instruction::NotIn => compare(ctx, CmpOp::NotIn)?,

            Instruction::JumpIfFalseElseKeep(target) => {
                let top = ctx.stack.last().ok_or(EvaluationError::StackUnderflow)?;
                if top.truthy() {
                    ctx.pop()?;
                } else {
                    ip = *target;
                }
            }
            Instruction::JumpIfTrueElseKeep(target) => {
                let top = ctx.stack.last().ok_or(EvaluationError::StackUnderflow)?;
                if top.truthy() {
                    ip = *target;
                } else {
                    ctx.pop()?;
                }
            }
            Instruction::JumpIfFalsePop(target) => {
                let top = ctx.pop()?;
                if !top.truthy() {
                    ip = *target;
                }
            }
            Instruction::Jump(target) => ip = *target,

            Instruction::Dup => {
                let top = ctx.stack.last().ok_or(EvaluationError::StackUnderflow)?.clone();
                ctx.push(top);
            }
            Instruction::Swap => {
                let top = ctx.pop()?;
                let second = ctx.pop()?;
                ctx.push(top);
                ctx.push(second);
            }
            Instruction::RotThree => {
                let c = ctx.pop()?;
                let b = ctx.pop()?;
                let a = ctx.pop()?;
                ctx.push(c);
                ctx.push(a);
                ctx.push(b);
            }
            Instruction::Pop => {
                ctx.pop()?;
            }

            Instruction::BuildSet(n) => {
                let mut items = Vec::with_capacity(*n);
                for _ in 0..*n {
                    items.push(ctx.pop()?);
                }
                ctx.push(Value::Set(Arc::new(ValueSet::from_values(items))));
            }

            Instruction::SetAuthz(names) => {
                let mut popped = Vec::with_capacity(names.len());
                for _ in 0..names.len() {
                    popped.push(ctx.pop()?);
                }
                popped.reverse();
                let verdict_value = ctx.pop()?;
                let mut attrs = IndexMap::with_capacity(names.len());
                for (name, value) in names.iter().zip(popped) {
                    attrs.insert(name.to_string(), value);
                }
                let authz = Authorization::new(verdict_value.truthy(), attrs);
                return Ok(authz);
            }
        }
    }
    Err(EvaluationError::StackUnderflow)
}

fn unary(ctx: &mut PolicyContext<'_>, op: UnOp) -> EvalResult<()> {
    let v = ctx.pop()?;
    ctx.push(ops::unary(op, &v)?);
    Ok(())
}

fn binary(ctx: &mut PolicyContext<'_>, op: BinOp) -> EvalResult<()> {
    let b = ctx.pop()?;
    let a = ctx.pop()?;
    ctx.push(ops::binary(op, &a, &b)?);
    Ok(())
}

fn compare(ctx: &mut PolicyContext<'_>, op: CmpOp) -> EvalResult<()> {
    let b = ctx.pop()?;
    let a = ctx.pop()?;
    ctx.push(ops::compare(op, &a, &b)?);
    Ok(())
}

fn call(ctx: &mut PolicyContext<'_>, argc: usize) -> EvalResult<()> {
    let mut args = Vec::with_capacity(argc);
    for _ in 0..argc {
        args.push(ctx.pop()?);
    }
    args.reverse();
    let callee = ctx.pop()?;

    match &callee {
        Value::Function(crate::value::Function::Normal(f)) => {
            let result = f(&args);
            ctx.push(result);
        }
        Value::Function(crate::value::Function::ContextWanting(f)) => {
            f(ctx, &args)?;
        }
        Value::Object(o) => {
            ctx.push(o.call(&args).unwrap_or(Value::Nothing));
        }
        // Calling anything else (Nothing, an int, ...) is tolerated and
        // yields Nothing, matching the "missing name" tolerance spirit —
        // a rule author calling something that turned out not to resolve
        // to a function shouldn't crash evaluation.
        _ => ctx.push(Value::Nothing),
    }
    Ok(())
}

fn get_attr(obj: &Value, name: &str) -> Value {
    match obj {
        Value::Object(o) => o.get_attr(name).unwrap_or(Value::Nothing),
        Value::Authorization(a) => a.get_attr(name),
        _ => Value::Nothing,
    }
}

fn get_item(obj: &Value, key: &Value) -> Value {
    match obj {
        Value::Object(o) => o.get_item(key).unwrap_or(Value::Nothing),
        Value::Seq(s) => index_into(&s.items, key).unwrap_or(Value::Nothing),
        Value::Str(s) => match key {
            Value::Int(i) => {
                let chars: Vec<char> = s.chars().collect();
                resolve_index(chars.len(), *i).and_then(|idx| chars.get(idx)).map(|c| Value::str(c.to_string())).unwrap_or(Value::Nothing)
            }
            _ => Value::Nothing,
        },
        Value::Bytes(b) => match key {
            Value::Int(i) => resolve_index(b.len(), *i).and_then(|idx| b.get(idx)).map(|byte| Value::Int(*byte as i64)).unwrap_or(Value::Nothing),
            _ => Value::Nothing,
        },
        _ => Value::Nothing,
    }
}

fn index_into(items: &[Value], key: &Value) -> Option<Value> {
    match key {
        Value::Int(i) => resolve_index(items.len(), *i).and_then(|idx| items.get(idx)).cloned(),
        _ => None,
    }
}

fn resolve_index(len: usize, i: i64) -> Option<usize> {
    let idx = if i < 0 { i + len as i64 } else { i };
    if idx < 0 || idx as usize >= len {
        None
    } else {
        Some(idx as usize)
    }
}
