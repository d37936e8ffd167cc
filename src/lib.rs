//! # Consensus-Wire
//!
//! Binary wire codec for Bitcoin block headers, transactions and blocks.
//!
//! This crate converts in-memory structures to and from the exact byte
//! sequences exchanged between nodes, and computes the double SHA-256
//! identity of a block header. A one-bit encoding difference changes every
//! hash derived from it, so the encoders here are exact and the decoders are
//! strict.
//!
//! ## Layers
//!
//! - `varint`: VarInt, VarBytes and fixed-width little-endian integers
//! - `hash`: double SHA-256 identity and merkle roots
//! - `transaction`: transaction codec
//! - `block`: 80-byte header codec and block codec
//! - `network`: genesis parameters for the known networks, self-checked on load
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: no I/O beyond caller-supplied sinks, no shared mutable state
//! 2. **Bounded Decoding**: every length read off the wire is checked against
//!    `CodecLimits` before payload is read or storage reserved
//! 3. **Atomic Decoding**: a decode either returns a complete value or an
//!    error, and leaves the reader where it started on failure
//! 4. **Exact Version Pinning**: the hashing dependency is pinned to an exact version
//!
//! ## Usage
//!
//! ```rust
//! use consensus_wire::{WireCodec, PROTOCOL_VERSION};
//! use consensus_wire::network::{Network, NetworkRegistry};
//!
//! let codec = WireCodec::new();
//! let registry = NetworkRegistry::standard();
//! let genesis = registry.genesis_block(Network::Main).unwrap();
//!
//! let bytes = codec.encode_block(genesis, PROTOCOL_VERSION);
//! let decoded = codec.decode_block(&bytes, PROTOCOL_VERSION).unwrap();
//! assert_eq!(&decoded, genesis);
//! assert_eq!(
//!     codec.block_hash(&decoded.header).to_string(),
//!     "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
//! );
//! ```

pub mod types;
pub mod constants;
pub mod config;
pub mod varint;
pub mod hash;
pub mod transaction;
pub mod block;
pub mod network;
pub mod error;

// Re-export commonly used types
pub use types::*;
pub use constants::*;
pub use config::CodecLimits;
pub use error::{WireError, Result};

use std::io::Write;
use varint::WireReader;

/// Codec bound to a set of decoding limits
///
/// # Examples
///
/// ```
/// use consensus_wire::*;
///
/// let codec = WireCodec::new();
/// let header = BlockHeader {
///     version: 1,
///     prev_block_hash: Hash::ZERO,
///     merkle_root: Hash::ZERO,
///     timestamp: 1231006505,
///     bits: 0x1d00ffff,
///     nonce: 0,
/// };
///
/// let bytes = codec.encode_header(&header);
/// assert_eq!(bytes.len(), 80);
/// assert_eq!(codec.decode_header(&bytes).unwrap(), header);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WireCodec {
    limits: CodecLimits,
}

impl WireCodec {
    /// Create a codec with the default protocol limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with custom limits
    pub fn with_limits(limits: CodecLimits) -> Result<Self> {
        limits.validate()?;
        Ok(Self { limits })
    }

    pub fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    pub fn encode_transaction(&self, tx: &Transaction, pver: ProtocolVersion) -> Vec<u8> {
        transaction::serialize_transaction(tx, pver)
    }

    /// Decode one transaction from the front of `data`
    ///
    /// # Examples
    ///
    /// ```
    /// use consensus_wire::*;
    ///
    /// let codec = WireCodec::new();
    /// let tx = Transaction {
    ///     version: 1,
    ///     inputs: vec![TransactionInput {
    ///         prevout: OutPoint::null(),
    ///         script_sig: vec![0x51],
    ///         sequence: SEQUENCE_FINAL,
    ///     }],
    ///     outputs: vec![TransactionOutput {
    ///         value: 5000000000,
    ///         script_pubkey: vec![0x51],
    ///     }],
    ///     lock_time: 0,
    /// };
    ///
    /// let bytes = codec.encode_transaction(&tx, PROTOCOL_VERSION);
    /// assert_eq!(codec.decode_transaction(&bytes, PROTOCOL_VERSION).unwrap(), tx);
    /// ```
    pub fn decode_transaction(&self, data: &[u8], pver: ProtocolVersion) -> Result<Transaction> {
        transaction::decode_transaction(&mut WireReader::new(data), pver, &self.limits)
    }

    pub fn encode_header(&self, header: &BlockHeader) -> [u8; BLOCK_HEADER_SIZE] {
        block::serialize_block_header(header)
    }

    pub fn decode_header(&self, data: &[u8]) -> Result<BlockHeader> {
        block::deserialize_block_header(data)
    }

    pub fn encode_block(&self, block: &Block, pver: ProtocolVersion) -> Vec<u8> {
        block::serialize_block(block, pver)
    }

    /// Write a block to `writer`; a rejected write surfaces as `WriteFailed`
    pub fn write_block<W: Write>(
        &self,
        writer: &mut W,
        block: &Block,
        pver: ProtocolVersion,
    ) -> Result<usize> {
        block::write_block(writer, block, pver)
    }

    /// Decode one block from the front of `data`
    pub fn decode_block(&self, data: &[u8], pver: ProtocolVersion) -> Result<Block> {
        block::decode_block(&mut WireReader::new(data), pver, &self.limits)
    }

    /// Decode a block from a shared reader, advancing it past the block
    pub fn read_block(&self, reader: &mut WireReader<'_>, pver: ProtocolVersion) -> Result<Block> {
        block::decode_block(reader, pver, &self.limits)
    }

    /// Block identity hash
    pub fn block_hash(&self, header: &BlockHeader) -> Hash {
        block::calculate_block_hash(header)
    }

    /// Transaction identity hash
    pub fn txid(&self, tx: &Transaction, pver: ProtocolVersion) -> Hash {
        transaction::calculate_txid(tx, pver)
    }
}
