//! Property tests for the wire codec

use consensus_wire::block::*;
use consensus_wire::transaction::*;
use consensus_wire::varint::*;
use consensus_wire::*;
use proptest::prelude::*;

fn arb_hash() -> impl Strategy<Value = Hash> {
    any::<[u8; 32]>().prop_map(Hash::from_bytes)
}

fn arb_input() -> impl Strategy<Value = TransactionInput> {
    (arb_hash(), any::<u32>(), prop::collection::vec(any::<u8>(), 0..300), any::<u32>()).prop_map(
        |(hash, index, script_sig, sequence)| TransactionInput {
            prevout: OutPoint { hash, index },
            script_sig,
            sequence,
        },
    )
}

fn arb_output() -> impl Strategy<Value = TransactionOutput> {
    (any::<i64>(), prop::collection::vec(any::<u8>(), 0..100)).prop_map(|(value, script_pubkey)| {
        TransactionOutput {
            value,
            script_pubkey,
        }
    })
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        any::<i32>(),
        prop::collection::vec(arb_input(), 0..4),
        prop::collection::vec(arb_output(), 0..4),
        any::<u32>(),
    )
        .prop_map(|(version, inputs, outputs, lock_time)| Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
}

fn arb_header() -> impl Strategy<Value = BlockHeader> {
    (any::<i32>(), arb_hash(), arb_hash(), any::<u32>(), any::<u32>(), any::<u32>()).prop_map(
        |(version, prev_block_hash, merkle_root, timestamp, bits, nonce)| BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
        },
    )
}

fn arb_block() -> impl Strategy<Value = Block> {
    (arb_header(), prop::collection::vec(arb_transaction(), 0..4)).prop_map(
        |(header, transactions)| Block {
            header,
            transactions,
        },
    )
}

proptest! {
    /// Invariant: VarInt encoding is minimal and round-trips
    #[test]
    fn prop_varint_round_trip(value in any::<u64>()) {
        let encoded = encode_varint(value);
        let expected_width = if value < 0xfd { 1 } else if value <= 0xffff { 3 } else if value <= 0xffff_ffff { 5 } else { 9 };
        prop_assert_eq!(encoded.len(), expected_width);
        prop_assert_eq!(decode_varint(&encoded).unwrap(), (value, expected_width));
    }

    /// Invariant: header encoding is always exactly 80 bytes
    #[test]
    fn prop_header_fixed_size(header in arb_header()) {
        let bytes = serialize_block_header(&header);
        prop_assert_eq!(bytes.len(), BLOCK_HEADER_SIZE);
        prop_assert_eq!(deserialize_block_header(&bytes).unwrap(), header);
    }

    /// Invariant: decode(encode(tx)) == tx, and the size estimate is exact
    #[test]
    fn prop_transaction_round_trip(tx in arb_transaction()) {
        let bytes = serialize_transaction(&tx, PROTOCOL_VERSION);
        prop_assert_eq!(bytes.len(), tx.serialized_size());
        prop_assert_eq!(deserialize_transaction(&bytes, PROTOCOL_VERSION).unwrap(), tx);
    }

    /// Invariant: decode(encode(block)) == block
    #[test]
    fn prop_block_round_trip(block in arb_block()) {
        let bytes = serialize_block(&block, PROTOCOL_VERSION);
        prop_assert_eq!(bytes.len(), block.serialized_size());
        prop_assert_eq!(deserialize_block(&bytes, PROTOCOL_VERSION).unwrap(), block);
    }

    /// Invariant: any strict prefix of an encoded block fails with Truncated
    #[test]
    fn prop_block_prefix_truncated(block in arb_block(), cut in any::<prop::sample::Index>()) {
        let bytes = serialize_block(&block, PROTOCOL_VERSION);
        let len = cut.index(bytes.len());
        let result = deserialize_block(&bytes[..len], PROTOCOL_VERSION);
        prop_assert!(matches!(result, Err(WireError::Truncated { .. })), "len {}: {:?}", len, result);
    }

    /// Invariant: arbitrary bytes never panic the decoder
    #[test]
    fn prop_arbitrary_bytes_do_not_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = deserialize_block(&data, PROTOCOL_VERSION);
        let _ = deserialize_transaction(&data, PROTOCOL_VERSION);
    }

    /// Invariant: display order round-trips through Display and FromStr
    #[test]
    fn prop_hash_display_round_trip(hash in arb_hash()) {
        let parsed: Hash = hash.to_string().parse().unwrap();
        prop_assert_eq!(parsed, hash);
        prop_assert_eq!(Hash::from_display(hash.to_display()), hash);
    }
}
