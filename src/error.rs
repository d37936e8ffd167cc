//! Error types for wire encoding and decoding

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WireError {
    #[error("Truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Oversized length for {field}: declared {declared}, max {max}")]
    OversizedLength {
        field: &'static str,
        declared: u64,
        max: u64,
    },

    #[error("Write failed: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Non-canonical varint: {value} encoded in {width} bytes")]
    NonCanonicalVarInt { value: u64, width: usize },

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Genesis self-check failed for {network}: expected {expected}, computed {computed}")]
    GenesisMismatch {
        network: String,
        expected: String,
        computed: String,
    },

    #[error("Unknown network: {0}")]
    UnknownNetwork(String),

    #[error("Invalid codec limits: {0}")]
    InvalidLimits(String),
}

pub type Result<T> = std::result::Result<T, WireError>;
