//! Network parameters and genesis blocks
//!
//! Each known network has a hardcoded genesis block and the identity hash it
//! must produce. `NetworkRegistry` checks every entry once when it is built;
//! after that it is read-only and can be shared freely across threads.

use crate::block::{calculate_block_hash, decode_block, serialize_block};
use crate::config::CodecLimits;
use crate::constants::{PROTOCOL_VERSION, SATOSHIS_PER_BTC, SEQUENCE_FINAL};
use crate::error::{Result, WireError};
use crate::types::*;
use crate::varint::WireReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::{debug, error};

/// Networks with a known genesis block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network
    Main,
    /// Regression test network
    Regtest,
    /// Public test network, version 3
    Testnet3,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Main, Network::Regtest, Network::Testnet3];

    pub fn name(self) -> &'static str {
        match self {
            Network::Main => "mainnet",
            Network::Regtest => "regtest",
            Network::Testnet3 => "testnet3",
        }
    }

    /// Message start bytes, as a little-endian u32
    pub fn magic(self) -> u32 {
        match self {
            Network::Main => 0xd9b4bef9,
            Network::Regtest => 0xdab5bffa,
            Network::Testnet3 => 0x0709110b,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            Network::Main => 8333,
            Network::Regtest => 18444,
            Network::Testnet3 => 18333,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Network {
    type Err = WireError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Ok(Network::Main),
            "test" | "regtest" => Ok(Network::Regtest),
            "test3" | "testnet3" => Ok(Network::Testnet3),
            _ => Err(WireError::UnknownNetwork(s.to_string())),
        }
    }
}

/// A network's genesis block and its expected identity hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkGenesis {
    pub network: Network,
    pub block: Block,
    pub hash: Hash,
}

impl NetworkGenesis {
    /// Built-in genesis parameters for `network`
    pub fn builtin(network: Network) -> Self {
        let (timestamp, bits, nonce, hash) = match network {
            Network::Main => (1231006505, 0x1d00ffff, 2083236893, MAIN_GENESIS_HASH),
            Network::Regtest => (1296688602, 0x207fffff, 2, REGTEST_GENESIS_HASH),
            Network::Testnet3 => (1296688602, 0x1d00ffff, 414098458, TESTNET3_GENESIS_HASH),
        };
        NetworkGenesis {
            network,
            block: Block {
                header: BlockHeader {
                    version: 1,
                    prev_block_hash: Hash::ZERO,
                    merkle_root: GENESIS_MERKLE_ROOT,
                    timestamp,
                    bits,
                    nonce,
                },
                transactions: vec![genesis_coinbase()],
            },
            hash,
        }
    }

    /// Run the block through the encoder and decoder, then check that the
    /// decoded block hashes to `hash` and commits to its own transactions
    pub fn verify(&self) -> Result<()> {
        let encoded = serialize_block(&self.block, PROTOCOL_VERSION);
        let mut reader = WireReader::new(&encoded);
        let decoded = decode_block(&mut reader, PROTOCOL_VERSION, &CodecLimits::default())?;

        let computed = calculate_block_hash(&decoded.header);
        if computed != self.hash {
            return Err(self.mismatch(self.hash, computed));
        }
        let merkle = decoded.compute_merkle_root().unwrap_or(Hash::ZERO);
        if merkle != self.block.header.merkle_root {
            return Err(self.mismatch(self.block.header.merkle_root, merkle));
        }
        if !reader.is_empty() || decoded != self.block {
            let reencoded = serialize_block(&decoded, PROTOCOL_VERSION);
            error!(network = %self.network, "genesis block does not survive a decode round trip");
            return Err(WireError::GenesisMismatch {
                network: self.network.to_string(),
                expected: hex::encode(&encoded),
                computed: hex::encode(reencoded),
            });
        }
        Ok(())
    }

    fn mismatch(&self, expected: Hash, computed: Hash) -> WireError {
        error!(network = %self.network, %expected, %computed, "genesis self-check failed");
        WireError::GenesisMismatch {
            network: self.network.to_string(),
            expected: expected.to_string(),
            computed: computed.to_string(),
        }
    }
}

/// Verified, read-only table of genesis parameters
#[derive(Debug, Clone)]
pub struct NetworkRegistry {
    entries: Vec<NetworkGenesis>,
}

impl NetworkRegistry {
    /// Build a registry, verifying every entry
    ///
    /// A later entry for the same network replaces an earlier one.
    pub fn new(entries: Vec<NetworkGenesis>) -> Result<Self> {
        let mut unique: Vec<NetworkGenesis> = Vec::with_capacity(entries.len());
        for entry in entries {
            entry.verify()?;
            debug!(network = %entry.network, hash = %entry.hash, "genesis verified");
            match unique.iter_mut().find(|e| e.network == entry.network) {
                Some(existing) => *existing = entry,
                None => unique.push(entry),
            }
        }
        Ok(Self { entries: unique })
    }

    /// Registry of the built-in networks
    pub fn builtin() -> Result<Self> {
        Self::new(Network::ALL.iter().map(|n| NetworkGenesis::builtin(*n)).collect())
    }

    /// Process-wide built-in registry, verified on first use
    ///
    /// # Panics
    ///
    /// Panics if a built-in genesis block fails its self-check. That means the
    /// build itself is corrupt, never that some input was bad.
    pub fn standard() -> &'static NetworkRegistry {
        static STANDARD: OnceLock<NetworkRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| match Self::builtin() {
            Ok(registry) => registry,
            Err(e) => panic!("built-in network parameters are corrupt: {e}"),
        })
    }

    pub fn genesis(&self, network: Network) -> Option<&NetworkGenesis> {
        self.entries.iter().find(|e| e.network == network)
    }

    pub fn genesis_block(&self, network: Network) -> Option<&Block> {
        self.genesis(network).map(|e| &e.block)
    }

    pub fn genesis_hash(&self, network: Network) -> Option<Hash> {
        self.genesis(network).map(|e| e.hash)
    }

    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.entries.iter().map(|e| e.network)
    }
}

/// Genesis block of `network` from the built-in registry
pub fn genesis_block(network: Network) -> &'static Block {
    &NetworkRegistry::standard().entries[index_of(network)].block
}

/// Genesis hash of `network` from the built-in registry
pub fn genesis_hash(network: Network) -> Hash {
    NetworkRegistry::standard().entries[index_of(network)].hash
}

fn index_of(network: Network) -> usize {
    // builtin() inserts Network::ALL in order
    match network {
        Network::Main => 0,
        Network::Regtest => 1,
        Network::Testnet3 => 2,
    }
}

/// Merkle root shared by every built-in genesis block, internal order
pub const GENESIS_MERKLE_ROOT: Hash = Hash::from_bytes([
    0x3b, 0xa3, 0xed, 0xfd, 0x7a, 0x7b, 0x12, 0xb2, 0x7a, 0xc7, 0x2c, 0x3e, 0x67, 0x76, 0x8f, 0x61,
    0x7f, 0xc8, 0x1b, 0xc3, 0x88, 0x8a, 0x51, 0x32, 0x3a, 0x9f, 0xb8, 0xaa, 0x4b, 0x1e, 0x5e, 0x4a,
]);

/// 000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f
pub const MAIN_GENESIS_HASH: Hash = Hash::from_bytes([
    0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72, 0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7, 0x4f,
    0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c, 0x68, 0xd6, 0x19, 0x00, 0x00, 0x00, 0x00, 0x00,
]);

/// 0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206
pub const REGTEST_GENESIS_HASH: Hash = Hash::from_bytes([
    0x06, 0x22, 0x6e, 0x46, 0x11, 0x1a, 0x0b, 0x59, 0xca, 0xaf, 0x12, 0x60, 0x43, 0xeb, 0x5b, 0xbf,
    0x28, 0xc3, 0x4f, 0x3a, 0x5e, 0x33, 0x2a, 0x1f, 0xc7, 0xb2, 0xb7, 0x3c, 0xf1, 0x88, 0x91, 0x0f,
]);

/// 000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943
pub const TESTNET3_GENESIS_HASH: Hash = Hash::from_bytes([
    0x43, 0x49, 0x7f, 0xd7, 0xf8, 0x26, 0x95, 0x71, 0x08, 0xf4, 0xa3, 0x0f, 0xd9, 0xce, 0xc3, 0xae,
    0xba, 0x79, 0x97, 0x20, 0x84, 0xe9, 0x0e, 0xad, 0x01, 0xea, 0x33, 0x09, 0x00, 0x00, 0x00, 0x00,
]);

const GENESIS_HEADLINE: &[u8] = b"The Times 03/Jan/2009 Chancellor on brink of second bailout for banks";

const GENESIS_OUTPUT_KEY: [u8; 65] = [
    0x04, 0x67, 0x8a, 0xfd, 0xb0, 0xfe, 0x55, 0x48, 0x27, 0x19, 0x67, 0xf1, 0xa6, 0x71, 0x30, 0xb7,
    0x10, 0x5c, 0xd6, 0xa8, 0x28, 0xe0, 0x39, 0x09, 0xa6, 0x79, 0x62, 0xe0, 0xea, 0x1f, 0x61, 0xde,
    0xb6, 0x49, 0xf6, 0xbc, 0x3f, 0x4c, 0xef, 0x38, 0xc4, 0xf3, 0x55, 0x04, 0xe5, 0x1e, 0xc1, 0x12,
    0xde, 0x5c, 0x38, 0x4d, 0xf7, 0xba, 0x0b, 0x8d, 0x57, 0x8a, 0x4c, 0x70, 0x2b, 0x6b, 0xf1, 0x1d,
    0x5f,
];

/// The coinbase every built-in genesis block carries
fn genesis_coinbase() -> Transaction {
    // push(0x1d00ffff) push(0x04) push(headline)
    let mut script_sig = vec![0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04, GENESIS_HEADLINE.len() as u8];
    script_sig.extend_from_slice(GENESIS_HEADLINE);

    // push(pubkey) OP_CHECKSIG
    let mut script_pubkey = vec![GENESIS_OUTPUT_KEY.len() as u8];
    script_pubkey.extend_from_slice(&GENESIS_OUTPUT_KEY);
    script_pubkey.push(0xac);

    Transaction {
        version: 1,
        inputs: vec![TransactionInput {
            prevout: OutPoint::null(),
            script_sig,
            sequence: SEQUENCE_FINAL,
        }],
        outputs: vec![TransactionOutput {
            value: 50 * SATOSHIS_PER_BTC,
            script_pubkey,
        }],
        lock_time: 0,
    }
}
