//! Primitive operations with JVM numeric semantics
//!
//! Integral results wrap to the width of the result type; `byte`, `short`
//! and `char` arithmetic runs on `int` and is narrowed afterwards.

use crate::features::shadow_store::ConcreteValue;
use crate::shared::models::{BinaryOp, TypeName};

#[derive(Debug, Clone, PartialEq)]
pub enum OpFault {
    DivideByZero,
    Mismatch(String),
}

pub type OpResult<T> = std::result::Result<T, OpFault>;

fn is_floating(value: &ConcreteValue) -> bool {
    matches!(value, ConcreteValue::Float(_) | ConcreteValue::Double(_))
}

fn is_reference(value: &ConcreteValue) -> bool {
    matches!(
        value,
        ConcreteValue::Null | ConcreteValue::Str(_) | ConcreteValue::Object(_)
    )
}

fn integral(value: &ConcreteValue) -> OpResult<i64> {
    value
        .as_long()
        .ok_or_else(|| OpFault::Mismatch(format!("expected an integral value, got {}", value)))
}

fn floating(value: &ConcreteValue) -> OpResult<f64> {
    value
        .as_double()
        .ok_or_else(|| OpFault::Mismatch(format!("expected a numeric value, got {}", value)))
}

/// Narrow an `int`/`long` computation to `type_name`
pub fn narrow(value: i64, type_name: &TypeName) -> ConcreteValue {
    match type_name.as_str() {
        TypeName::BOOLEAN => ConcreteValue::Bool(value != 0),
        TypeName::BYTE => ConcreteValue::Byte(value as i8),
        TypeName::CHAR => ConcreteValue::Char(value as u16),
        TypeName::SHORT => ConcreteValue::Short(value as i16),
        TypeName::LONG => ConcreteValue::Long(value),
        TypeName::FLOAT => ConcreteValue::Float(value as f32),
        TypeName::DOUBLE => ConcreteValue::Double(value as f64),
        _ => ConcreteValue::Int(value as i32),
    }
}

pub fn binary(op: BinaryOp, lhs: &ConcreteValue, rhs: &ConcreteValue, type_name: &TypeName) -> OpResult<ConcreteValue> {
    if op.is_condition() {
        return compare(op, lhs, rhs).map(ConcreteValue::Bool);
    }
    if op == BinaryOp::Cmp {
        return three_way(lhs, rhs).map(ConcreteValue::Int);
    }

    match type_name.as_str() {
        TypeName::FLOAT | TypeName::DOUBLE => {
            let (a, b) = (floating(lhs)?, floating(rhs)?);
            let result = match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                BinaryOp::Rem => a % b,
                other => {
                    return Err(OpFault::Mismatch(format!(
                        "'{}' is not defined on {}",
                        other.symbol(),
                        type_name
                    )))
                }
            };
            Ok(if type_name.as_str() == TypeName::FLOAT {
                ConcreteValue::Float(result as f32)
            } else {
                ConcreteValue::Double(result)
            })
        }
        TypeName::LONG => {
            let (a, b) = (integral(lhs)?, integral(rhs)?);
            long_op(op, a, b).map(ConcreteValue::Long)
        }
        _ => {
            let (a, b) = (integral(lhs)? as i32, integral(rhs)? as i32);
            int_op(op, a, b).map(|r| narrow(r as i64, type_name))
        }
    }
}

fn int_op(op: BinaryOp, a: i32, b: i32) -> OpResult<i32> {
    Ok(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(OpFault::DivideByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(OpFault::DivideByZero);
            }
            a.wrapping_rem(b)
        }
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => a.wrapping_shl(b as u32 & 31),
        BinaryOp::Shr => a.wrapping_shr(b as u32 & 31),
        BinaryOp::Ushr => ((a as u32) >> (b as u32 & 31)) as i32,
        other => return Err(OpFault::Mismatch(format!("'{}' is not arithmetic", other.symbol()))),
    })
}

fn long_op(op: BinaryOp, a: i64, b: i64) -> OpResult<i64> {
    Ok(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => {
            if b == 0 {
                return Err(OpFault::DivideByZero);
            }
            a.wrapping_div(b)
        }
        BinaryOp::Rem => {
            if b == 0 {
                return Err(OpFault::DivideByZero);
            }
            a.wrapping_rem(b)
        }
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Shl => a.wrapping_shl(b as u32 & 63),
        BinaryOp::Shr => a.wrapping_shr(b as u32 & 63),
        BinaryOp::Ushr => ((a as u64) >> (b as u32 & 63)) as i64,
        other => return Err(OpFault::Mismatch(format!("'{}' is not arithmetic", other.symbol()))),
    })
}

pub fn compare(op: BinaryOp, lhs: &ConcreteValue, rhs: &ConcreteValue) -> OpResult<bool> {
    if is_reference(lhs) || is_reference(rhs) {
        let same = match (lhs, rhs) {
            (ConcreteValue::Null, ConcreteValue::Null) => true,
            (ConcreteValue::Object(a), ConcreteValue::Object(b)) => a == b,
            (ConcreteValue::Str(a), ConcreteValue::Str(b)) => a == b,
            _ => false,
        };
        return match op {
            BinaryOp::Eq => Ok(same),
            BinaryOp::Neq => Ok(!same),
            other => Err(OpFault::Mismatch(format!(
                "'{}' can't order references",
                other.symbol()
            ))),
        };
    }

    if is_floating(lhs) || is_floating(rhs) {
        let (a, b) = (floating(lhs)?, floating(rhs)?);
        return Ok(match op {
            BinaryOp::Eq => a == b,
            BinaryOp::Neq => a != b,
            BinaryOp::Lt => a < b,
            BinaryOp::Le => a <= b,
            BinaryOp::Gt => a > b,
            BinaryOp::Ge => a >= b,
            other => return Err(OpFault::Mismatch(format!("'{}' is not a comparison", other.symbol()))),
        });
    }

    let (a, b) = (integral(lhs)?, integral(rhs)?);
    Ok(match op {
        BinaryOp::Eq => a == b,
        BinaryOp::Neq => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::Ge => a >= b,
        other => return Err(OpFault::Mismatch(format!("'{}' is not a comparison", other.symbol()))),
    })
}

/// `lcmp` / `dcmpl`; NaN compares as less
fn three_way(lhs: &ConcreteValue, rhs: &ConcreteValue) -> OpResult<i32> {
    if is_floating(lhs) || is_floating(rhs) {
        let (a, b) = (floating(lhs)?, floating(rhs)?);
        return Ok(match a.partial_cmp(&b) {
            Some(std::cmp::Ordering::Greater) => 1,
            Some(std::cmp::Ordering::Equal) => 0,
            _ => -1,
        });
    }
    let (a, b) = (integral(lhs)?, integral(rhs)?);
    Ok(match a.cmp(&b) {
        std::cmp::Ordering::Less => -1,
        std::cmp::Ordering::Equal => 0,
        std::cmp::Ordering::Greater => 1,
    })
}

pub fn negate(value: &ConcreteValue, type_name: &TypeName) -> OpResult<ConcreteValue> {
    match type_name.as_str() {
        TypeName::FLOAT => Ok(ConcreteValue::Float(-(floating(value)? as f32))),
        TypeName::DOUBLE => Ok(ConcreteValue::Double(-floating(value)?)),
        TypeName::LONG => Ok(ConcreteValue::Long(integral(value)?.wrapping_neg())),
        _ => Ok(narrow((integral(value)? as i32).wrapping_neg() as i64, type_name)),
    }
}

/// Primitive conversion (`i2b`, `d2i`, ...). Float to integral saturates and
/// maps NaN to zero, as Rust's `as` does.
pub fn convert(value: &ConcreteValue, target: &TypeName) -> OpResult<ConcreteValue> {
    if is_floating(value) {
        let v = floating(value)?;
        return Ok(match target.as_str() {
            TypeName::FLOAT => ConcreteValue::Float(v as f32),
            TypeName::DOUBLE => ConcreteValue::Double(v),
            TypeName::LONG => ConcreteValue::Long(v as i64),
            _ => narrow(v as i32 as i64, target),
        });
    }
    let v = integral(value)?;
    Ok(match target.as_str() {
        TypeName::LONG | TypeName::FLOAT | TypeName::DOUBLE => narrow(v, target),
        _ => narrow(v as i32 as i64, target),
    })
}
