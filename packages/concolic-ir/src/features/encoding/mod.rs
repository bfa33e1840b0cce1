// Identifier encoding for classes, methods, fields and instructions
//
// Hexagonal Architecture:
// - domain: packed ids, reverse-table records, EncodingError
// - infrastructure: IdentifierEncoder (session tables)

pub mod domain;
pub mod infrastructure;

use parking_lot::RwLock;
use std::sync::Arc;

pub use domain::{
    pack, unpack, EncodedInstruction, EncodingError, EncodingResult, InstructionId,
    InstructionKey, StaticAccessId, StaticAccessKind, StaticFieldAccess,
};
pub use infrastructure::IdentifierEncoder;

/// Encoder shared between parallel rewrites and the tracers of one session
pub type SharedEncoder = Arc<RwLock<IdentifierEncoder>>;

pub fn shared_encoder() -> SharedEncoder {
    Arc::new(RwLock::new(IdentifierEncoder::new()))
}
