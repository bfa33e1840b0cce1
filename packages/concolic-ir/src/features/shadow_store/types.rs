//! Values shared by the store, the tracers and the interpreter

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::features::encoding::InstructionId;

/// Symbolic flag byte; bit 0 is the live flag, the rest are reserved
pub type Flag = u8;

pub const CLEAN: Flag = 0;
pub const SYMBOLIC: Flag = 1;

/// Identity of a heap object, assigned at allocation
///
/// Two handles are equal only when they name the same allocation; object
/// contents never take part in hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectHandle(pub u32);

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// Uniform runtime value
///
/// Primitives are carried boxed; references are an object handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum ConcreteValue {
    Null,
    Bool(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Object(ObjectHandle),
}

impl ConcreteValue {
    pub fn as_handle(&self) -> Option<ObjectHandle> {
        match self {
            ConcreteValue::Object(handle) => Some(*handle),
            _ => None,
        }
    }

    /// Integral view; booleans and chars widen like JVM int operands
    pub fn as_long(&self) -> Option<i64> {
        match self {
            ConcreteValue::Bool(v) => Some(*v as i64),
            ConcreteValue::Byte(v) => Some(*v as i64),
            ConcreteValue::Char(v) => Some(*v as i64),
            ConcreteValue::Short(v) => Some(*v as i64),
            ConcreteValue::Int(v) => Some(*v as i64),
            ConcreteValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            ConcreteValue::Float(v) => Some(*v as f64),
            ConcreteValue::Double(v) => Some(*v),
            other => other.as_long().map(|v| v as f64),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConcreteValue::Null)
    }
}

impl fmt::Display for ConcreteValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcreteValue::Null => f.write_str("null"),
            ConcreteValue::Bool(v) => write!(f, "{}", v),
            ConcreteValue::Byte(v) => write!(f, "{}", v),
            ConcreteValue::Char(v) => write!(f, "'\\u{:04x}'", v),
            ConcreteValue::Short(v) => write!(f, "{}", v),
            ConcreteValue::Int(v) => write!(f, "{}", v),
            ConcreteValue::Long(v) => write!(f, "{}L", v),
            ConcreteValue::Float(v) => write!(f, "{}F", v),
            ConcreteValue::Double(v) => write!(f, "{}D", v),
            ConcreteValue::Str(v) => write!(f, "{:?}", v),
            ConcreteValue::Object(handle) => write!(f, "{}", handle),
        }
    }
}

/// One covered-instruction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedInstruction {
    pub id: InstructionId,
    /// `(operand ordinal, value)` in recording order
    pub concrete_args: Vec<(u32, ConcreteValue)>,
}
