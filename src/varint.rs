//! Primitive wire codec: VarInt, VarBytes and fixed-width little-endian integers
//!
//! VarInt encoding rules:
//! - If value < 0xfd: single byte
//! - If value <= 0xffff: 0xfd prefix + 2 bytes (little-endian)
//! - If value <= 0xffffffff: 0xfe prefix + 4 bytes (little-endian)
//! - Otherwise: 0xff prefix + 8 bytes (little-endian)
//!
//! Decoding rejects values encoded with a wider tag than necessary, so every
//! accepted byte sequence re-encodes to itself.

use crate::constants::{VARINT_SINGLE_BYTE_MAX, VARINT_TAG_U16, VARINT_TAG_U32, VARINT_TAG_U64};
use crate::error::{Result, WireError};
use crate::types::Hash;
use tracing::debug;

/// Encode a u64 value as a VarInt
///
/// # Examples
///
/// ```
/// use consensus_wire::varint::encode_varint;
///
/// assert_eq!(encode_varint(0), vec![0]);
/// assert_eq!(encode_varint(252), vec![252]);
/// assert_eq!(encode_varint(253), vec![0xfd, 253, 0]);
/// assert_eq!(encode_varint(65536), vec![0xfe, 0, 0, 1, 0]);
/// ```
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_size(value));
    write_varint(&mut out, value);
    out
}

/// Append a VarInt to `out`
pub fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value <= VARINT_SINGLE_BYTE_MAX {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(VARINT_TAG_U16);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffffffff {
        out.push(VARINT_TAG_U32);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(VARINT_TAG_U64);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Number of bytes `encode_varint(value)` produces
pub fn varint_size(value: u64) -> usize {
    if value <= VARINT_SINGLE_BYTE_MAX {
        1
    } else if value <= 0xffff {
        3
    } else if value <= 0xffffffff {
        5
    } else {
        9
    }
}

/// Decode a VarInt from the front of `data`
///
/// Returns the decoded value and the number of bytes consumed.
///
/// ```
/// use consensus_wire::varint::decode_varint;
///
/// assert_eq!(decode_varint(&[0xfd, 0xfd, 0]).unwrap(), (253, 3));
/// assert!(decode_varint(&[0xfe, 0, 0]).is_err());
/// ```
pub fn decode_varint(data: &[u8]) -> Result<(u64, usize)> {
    let mut reader = WireReader::new(data);
    let value = reader.read_varint()?;
    Ok((value, reader.position()))
}

/// Encode a byte string as VarInt length followed by the raw bytes
pub fn encode_varbytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(varint_size(bytes.len() as u64) + bytes.len());
    write_varbytes(&mut out, bytes);
    out
}

/// Append VarBytes to `out`
pub fn write_varbytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_varint(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Number of bytes `encode_varbytes` produces for a payload of `len` bytes
pub fn varbytes_size(len: usize) -> usize {
    varint_size(len as u64) + len
}

/// Decode VarBytes from the front of `data`, refusing lengths above `max_len`
///
/// Returns the payload and the number of bytes consumed.
pub fn decode_varbytes(data: &[u8], max_len: u64) -> Result<(Vec<u8>, usize)> {
    let mut reader = WireReader::new(data);
    let bytes = reader.read_varbytes(max_len, "varbytes")?;
    Ok((bytes, reader.position()))
}

/// Forward-only cursor over caller-owned wire bytes
///
/// Every read either consumes exactly the bytes it needs or fails with
/// `Truncated` without moving the cursor.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Run `f`, rewinding to the starting position if it fails
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let start = self.pos;
        let result = f(self);
        if result.is_err() {
            self.pos = start;
        }
        result
    }

    /// Borrow the next `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(WireError::Truncated {
                needed: len,
                remaining,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64_le(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read a 32-byte hash in internal byte order
    pub fn read_hash(&mut self) -> Result<Hash> {
        Ok(Hash::from_bytes(self.read_array()?))
    }

    /// Read a VarInt, rejecting truncated and non-canonical encodings
    pub fn read_varint(&mut self) -> Result<u64> {
        self.atomically(|r| {
            let tag = r.read_u8()?;
            let (value, width, min) = match tag {
                VARINT_TAG_U16 => (r.read_u16_le()? as u64, 3, VARINT_SINGLE_BYTE_MAX + 1),
                VARINT_TAG_U32 => (r.read_u32_le()? as u64, 5, 0x1_0000),
                VARINT_TAG_U64 => (r.read_u64_le()?, 9, 0x1_0000_0000),
                b => return Ok(b as u64),
            };
            if value < min {
                return Err(WireError::NonCanonicalVarInt { value, width });
            }
            Ok(value)
        })
    }

    /// Read a VarInt count and check it against `max` before anything is allocated
    pub fn read_count(&mut self, max: u64, field: &'static str) -> Result<u64> {
        let start = self.pos;
        let declared = self.read_varint()?;
        if declared > max {
            self.pos = start;
            debug!(field, declared, max, "rejecting oversized length");
            return Err(WireError::OversizedLength {
                field,
                declared,
                max,
            });
        }
        Ok(declared)
    }

    /// Read VarBytes whose declared length must not exceed `max_len`
    pub fn read_varbytes(&mut self, max_len: u64, field: &'static str) -> Result<Vec<u8>> {
        self.atomically(|r| {
            let declared = r.read_count(max_len, field)?;
            let len = usize::try_from(declared).map_err(|_| WireError::OversizedLength {
                field,
                declared,
                max: usize::MAX as u64,
            })?;
            Ok(r.read_bytes(len)?.to_vec())
        })
    }
}
