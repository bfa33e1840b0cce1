//! Interpreter domain: heap objects and execution outcomes

pub mod errors;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::features::shadow_store::{ConcreteValue, ObjectHandle};
use crate::shared::models::{RawConstant, TypeName};

pub use errors::{ExecutionError, ExecutionResult};

pub const NULL_POINTER_EXCEPTION: &str = "java.lang.NullPointerException";
pub const ARITHMETIC_EXCEPTION: &str = "java.lang.ArithmeticException";
pub const ARRAY_INDEX_EXCEPTION: &str = "java.lang.ArrayIndexOutOfBoundsException";
pub const NEGATIVE_ARRAY_SIZE_EXCEPTION: &str = "java.lang.NegativeArraySizeException";
pub const CLASS_CAST_EXCEPTION: &str = "java.lang.ClassCastException";

/// How a top-level invocation ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome {
    Returned(Option<ConcreteValue>),
    /// An exception escaped the entry method
    Exception {
        handle: ObjectHandle,
        class_name: TypeName,
    },
}

impl ExecutionOutcome {
    pub fn is_exception(&self) -> bool {
        matches!(self, ExecutionOutcome::Exception { .. })
    }

    pub fn returned_value(&self) -> Option<&ConcreteValue> {
        match self {
            ExecutionOutcome::Returned(value) => value.as_ref(),
            ExecutionOutcome::Exception { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeapObject {
    /// Instance fields keyed by name
    Instance {
        class_name: TypeName,
        fields: FxHashMap<String, ConcreteValue>,
    },
    Array {
        element_type: TypeName,
        elements: Vec<ConcreteValue>,
    },
}

impl HeapObject {
    pub fn class_name(&self) -> TypeName {
        match self {
            HeapObject::Instance { class_name, .. } => class_name.clone(),
            HeapObject::Array { element_type, .. } => element_type.array_of(),
        }
    }
}

/// Zero value of a slot of type `type_name`
pub fn default_value(type_name: &TypeName) -> ConcreteValue {
    match type_name.as_str() {
        TypeName::BOOLEAN => ConcreteValue::Bool(false),
        TypeName::BYTE => ConcreteValue::Byte(0),
        TypeName::CHAR => ConcreteValue::Char(0),
        TypeName::SHORT => ConcreteValue::Short(0),
        TypeName::INT => ConcreteValue::Int(0),
        TypeName::LONG => ConcreteValue::Long(0),
        TypeName::FLOAT => ConcreteValue::Float(0.0),
        TypeName::DOUBLE => ConcreteValue::Double(0.0),
        _ => ConcreteValue::Null,
    }
}

pub fn constant_value(constant: &RawConstant) -> ConcreteValue {
    match constant {
        RawConstant::Bool(v) => ConcreteValue::Bool(*v),
        RawConstant::Byte(v) => ConcreteValue::Byte(*v),
        RawConstant::Char(v) => ConcreteValue::Char(*v),
        RawConstant::Short(v) => ConcreteValue::Short(*v),
        RawConstant::Int(v) => ConcreteValue::Int(*v),
        RawConstant::Long(v) => ConcreteValue::Long(*v),
        RawConstant::Float(v) => ConcreteValue::Float(*v),
        RawConstant::Double(v) => ConcreteValue::Double(*v),
        RawConstant::Str(v) => ConcreteValue::Str(v.clone()),
        RawConstant::Null => ConcreteValue::Null,
    }
}
