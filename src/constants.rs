//! Wire protocol constants

/// Protocol version exercised by the genesis fixtures
pub const PROTOCOL_VERSION: u32 = 60002;

/// Encoded block header size in bytes
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Hash size in bytes
pub const HASH_SIZE: usize = 32;

/// Maximum payload of a single network message: 32 MiB
pub const MAX_MESSAGE_PAYLOAD: usize = 1024 * 1024 * 32;

/// Maximum serialized block size: 1MB
pub const MAX_BLOCK_PAYLOAD: usize = 1_000_000;

/// Largest value a single-byte varint can carry
pub const VARINT_SINGLE_BYTE_MAX: u64 = 0xfc;

/// Varint tag for a 2-byte payload
pub const VARINT_TAG_U16: u8 = 0xfd;

/// Varint tag for a 4-byte payload
pub const VARINT_TAG_U32: u8 = 0xfe;

/// Varint tag for an 8-byte payload
pub const VARINT_TAG_U64: u8 = 0xff;

/// Smallest encoded input: outpoint(36) + script length(1) + sequence(4)
pub const MIN_TX_IN_SIZE: usize = 32 + 4 + 1 + 4;

/// Smallest encoded output: value(8) + script length(1)
pub const MIN_TX_OUT_SIZE: usize = 8 + 1;

/// Smallest encoded transaction: version(4) + counts(2) + lock time(4)
pub const MIN_TX_SIZE: usize = 4 + 1 + 1 + 4;

/// Outpoint index marking a coinbase input
pub const NULL_OUTPOINT_INDEX: u32 = 0xffffffff;

/// Sequence number for final transaction
pub const SEQUENCE_FINAL: u32 = 0xffffffff;

/// Satoshis per BTC
pub const SATOSHIS_PER_BTC: i64 = 100_000_000;
