//! Tree-walking interpreter for compiled formulas.

use std::cmp::Ordering;

use crate::error::FormulaError;
use crate::model::{Value, ValueMap};

use super::parser::{BinaryOp, Expr, Helper, UnaryOp};
use super::Helpers;

pub(crate) fn evaluate(
    expr: &Expr,
    values: &ValueMap,
    helpers: &Helpers,
) -> Result<Value, FormulaError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(key) => Ok(values.get(key).cloned().unwrap_or_default()),
        Expr::Call { helper, args } => {
            let arg = match args.first() {
                Some(arg) => evaluate(arg, values, helpers)?,
                None => Value::Null,
            };
            match helper {
                Helper::Age => helpers.age(&arg),
                Helper::Num => Ok(helpers.num(&arg)),
            }
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, values, helpers)?;
            Ok(match op {
                UnaryOp::Neg => Value::Number(-value.to_number()),
                UnaryOp::Plus => Value::Number(value.to_number()),
                UnaryOp::Not => Value::Bool(!value.is_truthy()),
            })
        }
        Expr::Binary { op, lhs, rhs } => {
            let left = evaluate(lhs, values, helpers)?;
            match op {
                BinaryOp::And if !left.is_truthy() => return Ok(left),
                BinaryOp::Or if left.is_truthy() => return Ok(left),
                BinaryOp::And | BinaryOp::Or => return evaluate(rhs, values, helpers),
                _ => {}
            }
            let right = evaluate(rhs, values, helpers)?;
            Ok(apply_binary(*op, &left, &right))
        }
        Expr::Conditional {
            cond,
            then,
            otherwise,
        } => {
            if evaluate(cond, values, helpers)?.is_truthy() {
                evaluate(then, values, helpers)
            } else {
                evaluate(otherwise, values, helpers)
            }
        }
    }
}

fn apply_binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Text(_), _) | (_, Value::Text(_)) => {
                Value::Text(format!("{}{}", left.to_form_string(), right.to_form_string()))
            }
            _ => Value::Number(left.to_number() + right.to_number()),
        },
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Less => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LessEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Greater => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GreaterEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Bool(left == right),
        BinaryOp::StrictNotEq => Value::Bool(left != right),
        // Short-circuit operators are handled before both sides are evaluated.
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

/// Text compares lexically against text; everything else numerically.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        _ => left.to_number().partial_cmp(&right.to_number()),
    }
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => left.to_number() == right.to_number(),
    }
}
