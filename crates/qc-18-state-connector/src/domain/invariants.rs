//! # Domain Invariants
//!
//! Quorum and wire-format rules for the State Connector.

use super::value_objects::{ANSWER_WIDTH, WORD_SIZE};

/// Invariant: strict quorum over the whole committee.
///
/// `votes / committee_size > numerator / denominator`, evaluated without
/// division. Abstentions count against the denominator. For 1/2 this is
/// exactly `votes > committee_size / 2` with floor division.
pub fn invariant_strict_majority(
    votes: usize,
    committee_size: usize,
    numerator: u64,
    denominator: u64,
) -> bool {
    if committee_size == 0 || denominator == 0 {
        return false;
    }
    (votes as u128) * (denominator as u128) > (committee_size as u128) * (numerator as u128)
}

/// Invariant: an answer is exactly one word wide.
pub fn invariant_answer_width(len: usize) -> bool {
    len == ANSWER_WIDTH
}

/// Invariant: a registry buffer is a whole number of words.
pub fn invariant_word_aligned(len: usize) -> bool {
    len % WORD_SIZE == 0
}
