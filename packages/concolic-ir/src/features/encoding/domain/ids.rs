//! Packed 64-bit identifiers
//!
//! Instruction id:
//! ```text
//!  63            40 39       24 23             0
//! |   class id     | method id |    inst id     |
//! ```
//! Static field access id:
//! ```text
//!  63            40 39                        2 1  0
//! |   class id     |         field id          |kind|
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{EncodingError, EncodingResult};

pub const CLASS_ID_BITS: u32 = 24;
pub const METHOD_ID_BITS: u32 = 16;
pub const INST_ID_BITS: u32 = 24;
pub const FIELD_ID_BITS: u32 = 38;
pub const ACCESS_KIND_BITS: u32 = 2;

const CLASS_SHIFT: u32 = METHOD_ID_BITS + INST_ID_BITS;
const METHOD_SHIFT: u32 = INST_ID_BITS;
const FIELD_SHIFT: u32 = ACCESS_KIND_BITS;

const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}

fn checked(component: &'static str, value: u64, bits: u32) -> EncodingResult<u64> {
    if value > mask(bits) {
        return Err(EncodingError::Overflow {
            component,
            value,
            bits,
        });
    }
    Ok(value)
}

/// Encoded instruction identity, order-comparable within a method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionId(pub u64);

/// Unpacked components of an [`InstructionId`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstructionKey {
    pub class_id: u32,
    pub method_id: u32,
    pub inst_id: u32,
}

impl InstructionKey {
    pub fn new(class_id: u32, method_id: u32, inst_id: u32) -> Self {
        Self {
            class_id,
            method_id,
            inst_id,
        }
    }

    pub fn pack(&self) -> EncodingResult<InstructionId> {
        let class_id = checked("class_id", self.class_id as u64, CLASS_ID_BITS)?;
        let method_id = checked("method_id", self.method_id as u64, METHOD_ID_BITS)?;
        let inst_id = checked("inst_id", self.inst_id as u64, INST_ID_BITS)?;
        Ok(InstructionId(
            (class_id << CLASS_SHIFT) | (method_id << METHOD_SHIFT) | inst_id,
        ))
    }
}

impl InstructionId {
    pub fn unpack(self) -> InstructionKey {
        InstructionKey {
            class_id: ((self.0 >> CLASS_SHIFT) & mask(CLASS_ID_BITS)) as u32,
            method_id: ((self.0 >> METHOD_SHIFT) & mask(METHOD_ID_BITS)) as u32,
            inst_id: (self.0 & mask(INST_ID_BITS)) as u32,
        }
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstructionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.unpack();
        write!(f, "{}:{}:{}", key.class_id, key.method_id, key.inst_id)
    }
}

/// Pack `(class, method, inst)` into one key
pub fn pack(class_id: u32, method_id: u32, inst_id: u32) -> EncodingResult<InstructionId> {
    InstructionKey::new(class_id, method_id, inst_id).pack()
}

/// Exact inverse of [`pack`]
pub fn unpack(id: InstructionId) -> (u32, u32, u32) {
    let key = id.unpack();
    (key.class_id, key.method_id, key.inst_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StaticAccessKind {
    Get = 0,
    Set = 1,
}

impl StaticAccessKind {
    fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(StaticAccessKind::Get),
            1 => Some(StaticAccessKind::Set),
            _ => None,
        }
    }
}

impl fmt::Display for StaticAccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticAccessKind::Get => f.write_str("GET"),
            StaticAccessKind::Set => f.write_str("SET"),
        }
    }
}

/// Encoded `(class, field slot, access kind)` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticAccessId(pub u64);

impl StaticAccessId {
    pub fn pack(class_id: u32, field_id: u64, kind: StaticAccessKind) -> EncodingResult<Self> {
        let class_id = checked("class_id", class_id as u64, CLASS_ID_BITS)?;
        let field_id = checked("field_id", field_id, FIELD_ID_BITS)?;
        Ok(StaticAccessId(
            (class_id << CLASS_SHIFT) | (field_id << FIELD_SHIFT) | kind as u64,
        ))
    }

    pub fn unpack(self) -> EncodingResult<(u32, u64, StaticAccessKind)> {
        let class_id = ((self.0 >> CLASS_SHIFT) & mask(CLASS_ID_BITS)) as u32;
        let field_id = (self.0 >> FIELD_SHIFT) & mask(FIELD_ID_BITS);
        let kind = StaticAccessKind::from_bits(self.0 & mask(ACCESS_KIND_BITS))
            .ok_or(EncodingError::UnknownStaticAccess(self.0))?;
        Ok((class_id, field_id, kind))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}
