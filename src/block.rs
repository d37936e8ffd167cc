//! Block header and block wire format
//!
//! Block header is exactly 80 bytes:
//! - Version (4 bytes, little-endian, signed)
//! - Previous block hash (32 bytes, internal order)
//! - Merkle root (32 bytes, internal order)
//! - Timestamp (4 bytes, little-endian)
//! - Bits (4 bytes, little-endian)
//! - Nonce (4 bytes, little-endian)
//!
//! A block is the header followed by a VarInt transaction count and the
//! transactions. Nothing here checks consensus rules: proof of work and
//! merkle consistency belong to the caller.

use crate::config::CodecLimits;
use crate::constants::{BLOCK_HEADER_SIZE, MIN_TX_SIZE};
use crate::error::Result;
use crate::hash::{double_sha256, merkle_root};
use crate::transaction::{bounded_capacity, decode_transaction, encode_transaction, transaction_size};
use crate::types::*;
use crate::varint::{varint_size, write_varint, WireReader};
use std::io::Write;

/// Serialize a block header to its fixed 80 bytes
pub fn serialize_block_header(header: &BlockHeader) -> [u8; BLOCK_HEADER_SIZE] {
    let mut out = [0u8; BLOCK_HEADER_SIZE];
    out[0..4].copy_from_slice(&header.version.to_le_bytes());
    out[4..36].copy_from_slice(header.prev_block_hash.as_bytes());
    out[36..68].copy_from_slice(header.merkle_root.as_bytes());
    out[68..72].copy_from_slice(&header.timestamp.to_le_bytes());
    out[72..76].copy_from_slice(&header.bits.to_le_bytes());
    out[76..80].copy_from_slice(&header.nonce.to_le_bytes());
    out
}

/// Decode a block header from `reader`
///
/// Fails with `Truncated` if fewer than 80 bytes remain, consuming nothing.
pub fn decode_block_header(reader: &mut WireReader<'_>) -> Result<BlockHeader> {
    // One bounds check up front; the field reads below cannot fail after it.
    let raw = reader.read_bytes(BLOCK_HEADER_SIZE)?;
    let mut r = WireReader::new(raw);
    Ok(BlockHeader {
        version: r.read_i32_le()?,
        prev_block_hash: r.read_hash()?,
        merkle_root: r.read_hash()?,
        timestamp: r.read_u32_le()?,
        bits: r.read_u32_le()?,
        nonce: r.read_u32_le()?,
    })
}

/// Deserialize a block header from the front of `data`
pub fn deserialize_block_header(data: &[u8]) -> Result<BlockHeader> {
    decode_block_header(&mut WireReader::new(data))
}

/// Write the 80 header bytes to a sink
pub fn write_block_header<W: Write>(writer: &mut W, header: &BlockHeader) -> Result<usize> {
    writer.write_all(&serialize_block_header(header))?;
    Ok(BLOCK_HEADER_SIZE)
}

/// Block identity: double SHA-256 of the encoded header
pub fn calculate_block_hash(header: &BlockHeader) -> Hash {
    double_sha256(&serialize_block_header(header))
}

/// Serialize a block
pub fn serialize_block(block: &Block, pver: ProtocolVersion) -> Vec<u8> {
    let mut out = Vec::with_capacity(block_size(block));
    encode_block(&mut out, block, pver);
    out
}

/// Append the encoding of `block` to `out`
pub fn encode_block(out: &mut Vec<u8>, block: &Block, pver: ProtocolVersion) {
    out.extend_from_slice(&serialize_block_header(&block.header));
    write_varint(out, block.transactions.len() as u64);
    for tx in &block.transactions {
        encode_transaction(out, tx, pver);
    }
}

/// Write the encoding of `block` to a sink, returning the bytes written
pub fn write_block<W: Write>(writer: &mut W, block: &Block, pver: ProtocolVersion) -> Result<usize> {
    let bytes = serialize_block(block, pver);
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Decode a block from `reader`
///
/// The transaction count is checked against `limits.max_block_transactions`
/// before any storage is reserved. On failure the reader is left where it started.
pub fn decode_block(
    reader: &mut WireReader<'_>,
    pver: ProtocolVersion,
    limits: &CodecLimits,
) -> Result<Block> {
    reader.atomically(|r| {
        let header = decode_block_header(r)?;

        let tx_count = r.read_count(limits.max_block_transactions, "block transactions")?;
        let mut transactions = Vec::with_capacity(bounded_capacity(tx_count, r, MIN_TX_SIZE));
        for _ in 0..tx_count {
            transactions.push(decode_transaction(r, pver, limits)?);
        }

        Ok(Block {
            header,
            transactions,
        })
    })
}

/// Deserialize a block from the front of `data` using default limits
pub fn deserialize_block(data: &[u8], pver: ProtocolVersion) -> Result<Block> {
    decode_block(&mut WireReader::new(data), pver, &CodecLimits::default())
}

/// Exact encoded size of `block`
pub fn block_size(block: &Block) -> usize {
    BLOCK_HEADER_SIZE
        + varint_size(block.transactions.len() as u64)
        + block.transactions.iter().map(transaction_size).sum::<usize>()
}

impl BlockHeader {
    pub fn block_hash(&self) -> Hash {
        calculate_block_hash(self)
    }

    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        serialize_block_header(self)
    }
}

impl Block {
    pub fn block_hash(&self) -> Hash {
        self.header.block_hash()
    }

    /// Transaction hashes in block order
    pub fn tx_hashes(&self) -> Vec<Hash> {
        self.transactions.iter().map(Transaction::txid).collect()
    }

    /// Merkle root recomputed from the transactions, `None` for an empty block
    pub fn compute_merkle_root(&self) -> Option<Hash> {
        merkle_root(&self.tx_hashes())
    }

    pub fn serialized_size(&self) -> usize {
        block_size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PROTOCOL_VERSION;
    use crate::error::WireError;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 2,
            prev_block_hash: Hash::from_bytes([0xaa; 32]),
            merkle_root: Hash::from_bytes([0xbb; 32]),
            timestamp: 1231006505,
            bits: 0x1d00ffff,
            nonce: 2083236893,
        }
    }

    fn sample_block() -> Block {
        let coinbase = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint::null(),
                script_sig: vec![0x04, 0xff, 0xff, 0x00, 0x1d],
                sequence: 0xffffffff,
            }],
            outputs: vec![TransactionOutput {
                value: 50 * crate::constants::SATOSHIS_PER_BTC,
                script_pubkey: vec![0x51],
            }],
            lock_time: 0,
        };
        let spend = Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: coinbase.txid(),
                    index: 0,
                },
                script_sig: vec![],
                sequence: 0xffffffff,
            }],
            outputs: vec![],
            lock_time: 0,
        };
        let mut block = Block {
            header: sample_header(),
            transactions: vec![coinbase, spend],
        };
        block.header.merkle_root = block.compute_merkle_root().unwrap();
        block
    }

    #[test]
    fn test_header_layout() {
        let bytes = serialize_block_header(&sample_header());
        assert_eq!(bytes.len(), 80);
        assert_eq!(&bytes[0..4], &[2, 0, 0, 0]);
        assert_eq!(&bytes[4..36], &[0xaa; 32]);
        assert_eq!(&bytes[36..68], &[0xbb; 32]);
        assert_eq!(&bytes[68..72], &[0x29, 0xab, 0x5f, 0x49]);
        assert_eq!(&bytes[72..76], &[0xff, 0xff, 0x00, 0x1d]);
        assert_eq!(&bytes[76..80], &[0x1d, 0xac, 0x2b, 0x7c]);
    }

    #[test]
    fn test_header_negative_version() {
        let mut header = sample_header();
        header.version = -1;
        let decoded = deserialize_block_header(&serialize_block_header(&header)).unwrap();
        assert_eq!(decoded.version, -1);
    }

    #[test]
    fn test_header_truncated() {
        let bytes = serialize_block_header(&sample_header());
        let mut reader = WireReader::new(&bytes[..79]);
        assert!(matches!(
            decode_block_header(&mut reader),
            Err(WireError::Truncated { needed: 80, remaining: 79 })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_block_round_trip() {
        let block = sample_block();
        let bytes = serialize_block(&block, PROTOCOL_VERSION);
        assert_eq!(bytes.len(), block.serialized_size());
        assert_eq!(deserialize_block(&bytes, PROTOCOL_VERSION).unwrap(), block);
    }

    #[test]
    fn test_empty_block_round_trip() {
        let block = Block {
            header: sample_header(),
            transactions: vec![],
        };
        let bytes = serialize_block(&block, PROTOCOL_VERSION);
        assert_eq!(bytes.len(), 81);
        assert_eq!(deserialize_block(&bytes, PROTOCOL_VERSION).unwrap(), block);
        assert_eq!(block.compute_merkle_root(), None);
    }

    #[test]
    fn test_block_hash_covers_header_only() {
        let block = sample_block();
        let mut other = block.clone();
        other.transactions.pop();
        assert_eq!(block.block_hash(), other.block_hash());
        other.header.nonce += 1;
        assert_ne!(block.block_hash(), other.block_hash());
    }

    #[test]
    fn test_transaction_count_over_limit() {
        let limits = CodecLimits {
            max_block_transactions: 1,
            ..CodecLimits::default()
        };
        let bytes = serialize_block(&sample_block(), PROTOCOL_VERSION);
        let mut reader = WireReader::new(&bytes);
        assert!(matches!(
            decode_block(&mut reader, PROTOCOL_VERSION, &limits),
            Err(WireError::OversizedLength { field: "block transactions", declared: 2, max: 1 })
        ));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_write_block_matches_serialize() {
        let block = sample_block();
        let mut sink = Vec::new();
        let written = write_block(&mut sink, &block, PROTOCOL_VERSION).unwrap();
        assert_eq!(written, sink.len());
        assert_eq!(sink, serialize_block(&block, PROTOCOL_VERSION));
    }
}
