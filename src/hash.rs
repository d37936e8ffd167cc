//! Hash identity: double SHA-256 and merkle roots

use crate::types::Hash;
use sha2::{Digest, Sha256};

/// SHA256(SHA256(data))
///
/// ```
/// use consensus_wire::hash::double_sha256;
///
/// let hash = double_sha256(b"");
/// assert_eq!(
///     hash.to_string(),
///     "56944c5d3f98413ef45cf54545538103cc9f298e0575820ad3591376e2e0f65d"
/// );
/// ```
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&second);
    Hash::from_bytes(hash)
}

/// Merkle root over hashes in internal byte order
///
/// Levels with an odd number of entries pair the last entry with itself.
/// Returns `None` for an empty list.
pub fn merkle_root(hashes: &[Hash]) -> Option<Hash> {
    let mut level: Vec<Hash> = hashes.to_vec();
    if level.is_empty() {
        return None;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut combined = [0u8; 64];
                combined[..32].copy_from_slice(left.as_bytes());
                combined[32..].copy_from_slice(right.as_bytes());
                double_sha256(&combined)
            })
            .collect();
    }

    level.first().copied()
}
