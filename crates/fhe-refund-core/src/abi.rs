//! ABI encoding of decrypted clear values.
//!
//! A verify-decryption transaction carries the cleartexts as consecutive
//! 32-byte big-endian words, one per requested handle, in request order.
//! Only values that fit in 64 bits are produced or accepted.

use crate::error::CoreError;

/// Size of one ABI word.
pub const WORD_SIZE: usize = 32;

/// Encode clear values as ABI words.
pub fn encode_clear_values(values: &[u64]) -> Vec<u8> {
    let mut out = vec![0u8; values.len() * WORD_SIZE];
    for (i, value) in values.iter().enumerate() {
        let end = (i + 1) * WORD_SIZE;
        out[end - 8..end].copy_from_slice(&value.to_be_bytes());
    }
    out
}

/// Decode exactly `count` clear values from ABI words.
pub fn decode_clear_values(bytes: &[u8], count: usize) -> Result<Vec<u64>, CoreError> {
    let expected = count * WORD_SIZE;
    if bytes.len() != expected {
        return Err(CoreError::ClearValueLength {
            expected,
            actual: bytes.len(),
        });
    }

    bytes
        .chunks_exact(WORD_SIZE)
        .enumerate()
        .map(|(i, word)| {
            let (high, low) = word.split_at(WORD_SIZE - 8);
            if high.iter().any(|b| *b != 0) {
                return Err(CoreError::ClearValueOverflow(i));
            }
            let mut arr = [0u8; 8];
            arr.copy_from_slice(low);
            Ok(u64::from_be_bytes(arr))
        })
        .collect()
}
