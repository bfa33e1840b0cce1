//! Encoding domain: packed ids and their decoded records

pub mod errors;
pub mod ids;

use serde::{Deserialize, Serialize};

use crate::shared::models::{FieldInfo, RawInst, TypeName};

pub use errors::{EncodingError, EncodingResult};
pub use ids::{pack, unpack, InstructionId, InstructionKey, StaticAccessId, StaticAccessKind};

/// Reverse-table entry for an encoded instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodedInstruction {
    pub id: InstructionId,
    pub class_name: TypeName,
    pub method_name: String,
    pub method_descriptor: String,
    /// Position in the method's original instruction list
    pub index: usize,
    pub instruction: RawInst,
}

/// Reverse-table entry for an encoded static field access
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaticFieldAccess {
    pub class_name: TypeName,
    pub field: FieldInfo,
    pub kind: StaticAccessKind,
}
