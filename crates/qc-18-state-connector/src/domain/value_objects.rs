//! # Domain Value Objects
//!
//! Immutable, round-scoped value types for the State Connector.

use super::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Width of one ABI word.
pub const WORD_SIZE: usize = 32;

/// Width of an attestor answer.
pub const ANSWER_WIDTH: usize = WORD_SIZE;

/// 4-byte function selector.
pub type Selector = [u8; 4];

/// 20-byte account / contract address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Parse a hex address, with or without `0x` prefix.
    pub fn from_hex(value: &str) -> Result<Self, ConfigError> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        let invalid = |reason: String| ConfigError::InvalidAddress {
            value: value.to_string(),
            reason,
        };

        let bytes = hex::decode(digits).map_err(|e| invalid(e.to_string()))?;
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| invalid(format!("expected 20 bytes, got {}", b.len())))?;
        Ok(Self(raw))
    }

    /// Address held in the low 20 bytes of an ABI word.
    pub fn from_word(word: &[u8; WORD_SIZE]) -> Self {
        let mut raw = [0u8; 20];
        raw.copy_from_slice(&word[WORD_SIZE - 20..]);
        Self(raw)
    }

    /// Left-pad into an ABI word.
    pub fn to_word(&self) -> [u8; WORD_SIZE] {
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - 20..].copy_from_slice(&self.0);
        word
    }
}

impl FromStr for Address {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Identifier of an attestation round (big-endian counter bytes).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundId(Vec<u8>);

impl RoundId {
    /// Wrap caller-supplied bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encode a round counter as a 32-byte big-endian word.
    pub fn from_counter(counter: u64) -> Self {
        let mut word = vec![0u8; WORD_SIZE];
        word[WORD_SIZE - 8..].copy_from_slice(&counter.to_be_bytes());
        Self(word)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RoundId(0x{})", hex::encode(&self.0))
    }
}

/// Raw answer bytes returned by one attestor.
///
/// Compared by exact byte equality; never normalized.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Answer(Vec<u8>);

impl Answer {
    /// Wrap raw response bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Answer encoding a single unsigned value in one word.
    pub fn from_u64(value: u64) -> Self {
        let mut word = vec![0u8; ANSWER_WIDTH];
        word[ANSWER_WIDTH - 8..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Answer(0x{})", hex::encode(&self.0))
    }
}

/// `selector || round_id`, sent to every attestor of a round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionPayload(Vec<u8>);

impl InstructionPayload {
    /// Build the payload for a round.
    pub fn new(selector: Selector, round: &RoundId) -> Self {
        let mut bytes = Vec::with_capacity(4 + round.as_bytes().len());
        bytes.extend_from_slice(&selector);
        bytes.extend_from_slice(round.as_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// `selector || round_id || majority_answer`, delivered on finality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalityPayload(Vec<u8>);

impl FinalityPayload {
    /// Build the emission payload for a finalized round.
    pub fn new(selector: Selector, round: &RoundId, answer: &Answer) -> Self {
        let mut bytes = Vec::with_capacity(4 + round.as_bytes().len() + answer.len());
        bytes.extend_from_slice(&selector);
        bytes.extend_from_slice(round.as_bytes());
        bytes.extend_from_slice(answer.as_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Which committee a tally belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitteeKind {
    /// Network-wide committee from the on-chain registry.
    Canonical,
    /// Operator-configured override committee.
    Local,
}

impl fmt::Display for CommitteeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitteeKind::Canonical => write!(f, "canonical"),
            CommitteeKind::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_from_hex_with_prefix() {
        let addr = Address::from_hex("0x1000000000000000000000000000000000000001").unwrap();
        assert_eq!(addr.0[0], 0x10);
        assert_eq!(addr.0[19], 0x01);
    }

    #[test]
    fn test_address_from_hex_without_prefix() {
        let addr: Address = "1000000000000000000000000000000000000002".parse().unwrap();
        assert_eq!(addr.to_string(), "0x1000000000000000000000000000000000000002");
    }

    #[test]
    fn test_address_wrong_length_fails() {
        let err = Address::from_hex("0x1234").unwrap_err();
        assert!(err.to_string().contains("expected 20 bytes"));
    }

    #[test]
    fn test_address_word_layout() {
        let addr = Address([0xAB; 20]);
        let word = addr.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(Address::from_word(&word), addr);
    }

    #[test]
    fn test_round_id_is_big_endian() {
        let round = RoundId::from_counter(0x0102);
        assert_eq!(round.as_bytes().len(), WORD_SIZE);
        assert_eq!(round.as_bytes()[30], 0x01);
        assert_eq!(round.as_bytes()[31], 0x02);
    }

    #[test]
    fn test_instruction_payload_layout() {
        let round = RoundId::from_bytes(vec![0xAA, 0xBB]);
        let payload = InstructionPayload::new([0x29, 0xbe, 0x4d, 0xb2], &round);
        assert_eq!(payload.as_bytes(), &[0x29, 0xbe, 0x4d, 0xb2, 0xAA, 0xBB]);
    }

    #[test]
    fn test_finality_payload_layout() {
        let round = RoundId::from_bytes(vec![0x07]);
        let answer = Answer::from_bytes(vec![0x01, 0x02]);
        let payload = FinalityPayload::new([1, 2, 3, 4], &round, &answer);
        assert_eq!(payload.as_bytes(), &[1, 2, 3, 4, 0x07, 0x01, 0x02]);
    }

    #[test]
    fn test_answers_compare_bytewise() {
        // Same numeric value, different width: distinct answers.
        let wide = Answer::from_u64(1);
        let narrow = Answer::from_bytes(vec![1u8]);
        assert_ne!(wide, narrow);
        assert_eq!(wide, Answer::from_u64(1));
    }
}
