//! Transaction wire format
//!
//! Format:
//! - Version (4 bytes, little-endian, signed)
//! - Input count (VarInt)
//! - For each input:
//!   - Previous output hash (32 bytes, internal order)
//!   - Previous output index (4 bytes, little-endian)
//!   - Script (VarBytes)
//!   - Sequence (4 bytes, little-endian)
//! - Output count (VarInt)
//! - For each output:
//!   - Value (8 bytes, little-endian, signed)
//!   - Script (VarBytes)
//! - Lock time (4 bytes, little-endian)
//!
//! The protocol version does not alter this framing for any version the
//! crate knows about; it is threaded through so later fields can be gated on it.

use crate::config::CodecLimits;
use crate::constants::{MIN_TX_IN_SIZE, MIN_TX_OUT_SIZE};
use crate::error::Result;
use crate::hash::double_sha256;
use crate::types::*;
use crate::varint::{varbytes_size, varint_size, write_varbytes, write_varint, WireReader};
use std::io::Write;

/// Serialize a transaction
pub fn serialize_transaction(tx: &Transaction, pver: ProtocolVersion) -> Vec<u8> {
    let mut out = Vec::with_capacity(transaction_size(tx));
    encode_transaction(&mut out, tx, pver);
    out
}

/// Append the encoding of `tx` to `out`
pub fn encode_transaction(out: &mut Vec<u8>, tx: &Transaction, pver: ProtocolVersion) {
    out.extend_from_slice(&tx.version.to_le_bytes());

    write_varint(out, tx.inputs.len() as u64);
    for input in &tx.inputs {
        encode_input(out, input, pver);
    }

    write_varint(out, tx.outputs.len() as u64);
    for output in &tx.outputs {
        encode_output(out, output, pver);
    }

    out.extend_from_slice(&tx.lock_time.to_le_bytes());
}

fn encode_input(out: &mut Vec<u8>, input: &TransactionInput, _pver: ProtocolVersion) {
    out.extend_from_slice(input.prevout.hash.as_bytes());
    out.extend_from_slice(&input.prevout.index.to_le_bytes());
    write_varbytes(out, &input.script_sig);
    out.extend_from_slice(&input.sequence.to_le_bytes());
}

fn encode_output(out: &mut Vec<u8>, output: &TransactionOutput, _pver: ProtocolVersion) {
    out.extend_from_slice(&output.value.to_le_bytes());
    write_varbytes(out, &output.script_pubkey);
}

/// Write the encoding of `tx` to a sink, returning the bytes written
pub fn write_transaction<W: Write>(
    writer: &mut W,
    tx: &Transaction,
    pver: ProtocolVersion,
) -> Result<usize> {
    let bytes = serialize_transaction(tx, pver);
    writer.write_all(&bytes)?;
    Ok(bytes.len())
}

/// Deserialize one transaction from the front of `data` using default limits
///
/// Trailing bytes after the transaction are ignored; use `decode_transaction`
/// with a `WireReader` to learn how much was consumed.
pub fn deserialize_transaction(data: &[u8], pver: ProtocolVersion) -> Result<Transaction> {
    let mut reader = WireReader::new(data);
    decode_transaction(&mut reader, pver, &CodecLimits::default())
}

/// Decode a transaction from `reader`
///
/// On failure the reader is left where it started.
pub fn decode_transaction(
    reader: &mut WireReader<'_>,
    pver: ProtocolVersion,
    limits: &CodecLimits,
) -> Result<Transaction> {
    reader.atomically(|r| {
        let version = r.read_i32_le()?;

        let input_count = r.read_count(limits.max_tx_inputs, "transaction inputs")?;
        let mut inputs = Vec::with_capacity(bounded_capacity(input_count, r, MIN_TX_IN_SIZE));
        for _ in 0..input_count {
            inputs.push(decode_input(r, pver, limits)?);
        }

        let output_count = r.read_count(limits.max_tx_outputs, "transaction outputs")?;
        let mut outputs = Vec::with_capacity(bounded_capacity(output_count, r, MIN_TX_OUT_SIZE));
        for _ in 0..output_count {
            outputs.push(decode_output(r, pver, limits)?);
        }

        let lock_time = r.read_u32_le()?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    })
}

fn decode_input(
    r: &mut WireReader<'_>,
    _pver: ProtocolVersion,
    limits: &CodecLimits,
) -> Result<TransactionInput> {
    let hash = r.read_hash()?;
    let index = r.read_u32_le()?;
    let script_sig = r.read_varbytes(limits.max_varbytes_len, "signature script")?;
    let sequence = r.read_u32_le()?;
    Ok(TransactionInput {
        prevout: OutPoint { hash, index },
        script_sig,
        sequence,
    })
}

fn decode_output(
    r: &mut WireReader<'_>,
    _pver: ProtocolVersion,
    limits: &CodecLimits,
) -> Result<TransactionOutput> {
    let value = r.read_i64_le()?;
    let script_pubkey = r.read_varbytes(limits.max_varbytes_len, "public key script")?;
    Ok(TransactionOutput {
        value,
        script_pubkey,
    })
}

/// Preallocation for `count` elements, capped by what the remaining bytes could hold
pub(crate) fn bounded_capacity(count: u64, reader: &WireReader<'_>, min_element_size: usize) -> usize {
    let fits = reader.remaining() / min_element_size;
    usize::try_from(count).unwrap_or(usize::MAX).min(fits)
}

/// Exact encoded size of `tx`
pub fn transaction_size(tx: &Transaction) -> usize {
    let inputs: usize = tx
        .inputs
        .iter()
        .map(|i| 32 + 4 + varbytes_size(i.script_sig.len()) + 4)
        .sum();
    let outputs: usize = tx
        .outputs
        .iter()
        .map(|o| 8 + varbytes_size(o.script_pubkey.len()))
        .sum();
    4 + varint_size(tx.inputs.len() as u64)
        + inputs
        + varint_size(tx.outputs.len() as u64)
        + outputs
        + 4
}

/// Transaction hash: double SHA-256 of the encoding
pub fn calculate_txid(tx: &Transaction, pver: ProtocolVersion) -> Hash {
    double_sha256(&serialize_transaction(tx, pver))
}

impl Transaction {
    /// Transaction hash under the current protocol version
    pub fn txid(&self) -> Hash {
        calculate_txid(self, crate::constants::PROTOCOL_VERSION)
    }

    pub fn serialized_size(&self) -> usize {
        transaction_size(self)
    }

    /// A coinbase has exactly one input, spending the null outpoint
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }
}
