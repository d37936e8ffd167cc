//! Decoder safety ceilings
//!
//! Every VarInt-prefixed count or length read off the wire is checked against
//! one of these ceilings before any payload is read or storage is reserved.
//! Limits can be loaded from JSON or built programmatically; missing fields
//! fall back to the protocol defaults.

use crate::constants::{MAX_BLOCK_PAYLOAD, MAX_MESSAGE_PAYLOAD, MIN_TX_IN_SIZE, MIN_TX_OUT_SIZE, MIN_TX_SIZE};
use crate::error::{Result, WireError};
use serde::{Deserialize, Serialize};

/// Length and count ceilings applied while decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodecLimits {
    /// Maximum length of any VarBytes payload (scripts)
    #[serde(default = "default_max_varbytes_len")]
    pub max_varbytes_len: u64,

    /// Maximum inputs in one transaction
    #[serde(default = "default_max_tx_inputs")]
    pub max_tx_inputs: u64,

    /// Maximum outputs in one transaction
    #[serde(default = "default_max_tx_outputs")]
    pub max_tx_outputs: u64,

    /// Maximum transactions in one block
    #[serde(default = "default_max_block_transactions")]
    pub max_block_transactions: u64,
}

fn default_max_varbytes_len() -> u64 {
    MAX_MESSAGE_PAYLOAD as u64
}

fn default_max_tx_inputs() -> u64 {
    (MAX_MESSAGE_PAYLOAD / MIN_TX_IN_SIZE) as u64 + 1
}

fn default_max_tx_outputs() -> u64 {
    (MAX_MESSAGE_PAYLOAD / MIN_TX_OUT_SIZE) as u64 + 1
}

fn default_max_block_transactions() -> u64 {
    (MAX_BLOCK_PAYLOAD / MIN_TX_SIZE) as u64 + 1
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            max_varbytes_len: default_max_varbytes_len(),
            max_tx_inputs: default_max_tx_inputs(),
            max_tx_outputs: default_max_tx_outputs(),
            max_block_transactions: default_max_block_transactions(),
        }
    }
}

impl CodecLimits {
    /// Parse limits from a JSON object; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let limits: CodecLimits =
            serde_json::from_str(json).map_err(|e| WireError::InvalidLimits(e.to_string()))?;
        limits.validate()?;
        Ok(limits)
    }

    /// Reject ceilings that would make every non-empty structure undecodable
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("max_varbytes_len", self.max_varbytes_len),
            ("max_tx_inputs", self.max_tx_inputs),
            ("max_tx_outputs", self.max_tx_outputs),
            ("max_block_transactions", self.max_block_transactions),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(WireError::InvalidLimits(format!("{name} must be non-zero")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = CodecLimits::default();
        assert_eq!(limits.max_varbytes_len, 33_554_432);
        assert_eq!(limits.max_tx_inputs, 818_401);
        assert_eq!(limits.max_tx_outputs, 3_728_271);
        assert_eq!(limits.max_block_transactions, 100_001);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let limits = CodecLimits::from_json(r#"{"max_tx_inputs": 10}"#).unwrap();
        assert_eq!(limits.max_tx_inputs, 10);
        assert_eq!(limits.max_tx_outputs, CodecLimits::default().max_tx_outputs);
    }

    #[test]
    fn test_from_json_empty_object() {
        let limits = CodecLimits::from_json("{}").unwrap();
        assert_eq!(limits, CodecLimits::default());
    }

    #[test]
    fn test_from_json_rejects_zero() {
        let result = CodecLimits::from_json(r#"{"max_block_transactions": 0}"#);
        assert!(matches!(result, Err(WireError::InvalidLimits(_))));
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let result = CodecLimits::from_json(r#"{"max_tx_input": 10}"#);
        assert!(matches!(result, Err(WireError::InvalidLimits(msg)) if msg.contains("max_tx_input")));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = CodecLimits::from_json("not json");
        assert!(matches!(result, Err(WireError::InvalidLimits(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let limits = CodecLimits {
            max_varbytes_len: 520,
            max_tx_inputs: 5,
            max_tx_outputs: 6,
            max_block_transactions: 7,
        };
        let json = serde_json::to_string(&limits).unwrap();
        assert_eq!(CodecLimits::from_json(&json).unwrap(), limits);
    }
}
