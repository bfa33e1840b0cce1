//! Encoding infrastructure

pub mod identifier_encoder;

pub use identifier_encoder::IdentifierEncoder;
