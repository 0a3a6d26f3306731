//! # Domain Entities
//!
//! Committees, tallies, verdicts and round outcomes. Everything here is
//! round-scoped: built for one resolution attempt and dropped afterwards.

use super::invariants::invariant_strict_majority;
use super::value_objects::{Address, Answer, CommitteeKind, RoundId, WORD_SIZE};
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Ordered set of attestors polled for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committee {
    kind: CommitteeKind,
    members: Vec<Address>,
}

impl Committee {
    /// Build a committee, collapsing repeated members (first occurrence wins).
    pub fn new(kind: CommitteeKind, members: impl IntoIterator<Item = Address>) -> Self {
        let mut seen = HashSet::new();
        let members = members.into_iter().filter(|m| seen.insert(*m)).collect();
        Self { kind, members }
    }

    /// Empty committee of the given kind.
    pub fn empty(kind: CommitteeKind) -> Self {
        Self {
            kind,
            members: Vec::new(),
        }
    }

    /// Committee kind.
    pub fn kind(&self) -> CommitteeKind {
        self.kind
    }

    /// Members in order.
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when there is nobody to poll.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Why an attestor did not contribute an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbstainReason {
    /// Host call failed.
    CallFailed(String),
    /// Probe exceeded its time budget.
    TimedOut,
    /// Response was not exactly one answer wide.
    MalformedLength(usize),
}

/// Result of probing one attestor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    /// Well-formed answer.
    Answer(Answer),
    /// No usable answer.
    Abstain(AbstainReason),
}

/// Answers of one committee grouped by exact byte equality.
///
/// INVARIANT: every recorded attestor is a committee member, and sits either
/// in exactly one answer bucket or in the abstained set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tally {
    kind: CommitteeKind,
    members: BTreeSet<Address>,
    buckets: BTreeMap<Answer, BTreeSet<Address>>,
    abstained: BTreeSet<Address>,
}

impl Tally {
    /// Empty tally for a committee.
    pub fn new(committee: &Committee) -> Self {
        Self {
            kind: committee.kind(),
            members: committee.members().iter().copied().collect(),
            buckets: BTreeMap::new(),
            abstained: BTreeSet::new(),
        }
    }

    /// Record one probe result. A member recorded twice keeps its first
    /// result; non-members are ignored.
    pub fn record(&mut self, attestor: Address, result: ProbeResult) {
        if !self.members.contains(&attestor) || self.contains(&attestor) {
            return;
        }
        match result {
            ProbeResult::Answer(answer) => {
                self.buckets.entry(answer).or_default().insert(attestor);
            }
            ProbeResult::Abstain(_) => {
                self.abstained.insert(attestor);
            }
        }
    }

    fn contains(&self, attestor: &Address) -> bool {
        self.abstained.contains(attestor) || self.buckets.values().any(|b| b.contains(attestor))
    }

    /// Committee kind.
    pub fn kind(&self) -> CommitteeKind {
        self.kind
    }

    /// Size of the polled committee (abstentions included).
    pub fn committee_size(&self) -> usize {
        self.members.len()
    }

    /// Answer buckets.
    pub fn buckets(&self) -> &BTreeMap<Answer, BTreeSet<Address>> {
        &self.buckets
    }

    /// Attestors that abstained.
    pub fn abstained(&self) -> &BTreeSet<Address> {
        &self.abstained
    }

    /// Number of attestors accounted for.
    pub fn recorded(&self) -> usize {
        self.abstained.len() + self.buckets.values().map(BTreeSet::len).sum::<usize>()
    }

    /// Plurality bucket: the answer with the most votes.
    ///
    /// Ties resolve to the smallest answer bytes. Callers must not depend on
    /// this; a tied bucket can never hold a strict majority.
    pub fn plurality(&self) -> Option<(&Answer, &BTreeSet<Address>)> {
        let mut best: Option<(&Answer, &BTreeSet<Address>)> = None;
        for (answer, voters) in &self.buckets {
            match best {
                Some((_, top)) if voters.len() <= top.len() => {}
                _ => best = Some((answer, voters)),
            }
        }
        best
    }

    /// Compute the verdict under a `numerator/denominator` quorum.
    pub fn verdict(&self, quorum_numerator: u64, quorum_denominator: u64) -> Verdict {
        let Some((answer, voters)) = self.plurality() else {
            return Verdict {
                kind: self.kind,
                committee_size: self.committee_size(),
                reached_majority: false,
                majority_answer: None,
                majority_attestors: BTreeSet::new(),
                divergent_attestors: BTreeSet::new(),
                abstained_attestors: self.abstained.clone(),
            };
        };

        let reached = invariant_strict_majority(
            voters.len(),
            self.committee_size(),
            quorum_numerator,
            quorum_denominator,
        );

        let divergent = self
            .buckets
            .iter()
            .filter(|(a, _)| *a != answer)
            .flat_map(|(_, v)| v.iter().copied())
            .collect();

        Verdict {
            kind: self.kind,
            committee_size: self.committee_size(),
            reached_majority: reached,
            majority_answer: reached.then(|| answer.clone()),
            majority_attestors: voters.clone(),
            divergent_attestors: divergent,
            abstained_attestors: self.abstained.clone(),
        }
    }
}

/// Outcome of tallying one committee.
///
/// `majority_attestors` always lists the plurality bucket; `majority_answer`
/// is only set once that bucket holds a strict majority of the committee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Committee the verdict belongs to.
    pub kind: CommitteeKind,
    /// Committee size, abstentions included.
    pub committee_size: usize,
    /// Plurality bucket strictly exceeds the quorum.
    pub reached_majority: bool,
    /// Agreed answer, only when `reached_majority`.
    pub majority_answer: Option<Answer>,
    /// Attestors in the plurality bucket.
    pub majority_attestors: BTreeSet<Address>,
    /// Attestors that answered something else.
    pub divergent_attestors: BTreeSet<Address>,
    /// Attestors that abstained.
    pub abstained_attestors: BTreeSet<Address>,
}

impl Verdict {
    /// Agreed answer, if the majority was reached.
    pub fn agreed_answer(&self) -> Option<&Answer> {
        self.majority_answer.as_ref()
    }
}

/// One resolution request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundRequest {
    /// Chain the round is resolved for.
    pub chain_id: u64,
    /// Block time used for policy lookup.
    pub time: u64,
    /// Round being resolved.
    pub round_id: RoundId,
}

impl RoundRequest {
    /// Create a new request.
    pub fn new(chain_id: u64, time: u64, round_id: RoundId) -> Self {
        Self {
            chain_id,
            time,
            round_id,
        }
    }
}

/// Where a resolution attempt ended. Every state but `Finalized` may be
/// retried with the same round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Majority answer accepted.
    Finalized,
    /// Insufficient agreement this attempt.
    NotYetFinal,
    /// Local committee disagrees with the canonical majority.
    Diverged,
    /// Mechanism not engaged for this chain at this time.
    Inactive,
}

impl RoundState {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Finalized => "finalized",
            Self::NotYetFinal => "not_yet_final",
            Self::Diverged => "diverged",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for RoundState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Round is final with the canonical verdict's answer.
    Finalized(Verdict),
    /// Not enough agreement yet; retry later with the same round.
    NotYetFinal {
        /// Canonical verdict.
        canonical: Verdict,
        /// Local verdict, if a local committee is configured.
        local: Option<Verdict>,
    },
    /// Canonical majority reached but the local committee disagrees.
    Diverged {
        /// Canonical verdict.
        canonical: Verdict,
        /// Local verdict.
        local: Verdict,
    },
    /// Mechanism not engaged for this chain at this time.
    Inactive,
}

impl RoundOutcome {
    /// State this outcome represents.
    pub fn state(&self) -> RoundState {
        match self {
            RoundOutcome::Finalized(_) => RoundState::Finalized,
            RoundOutcome::NotYetFinal { .. } => RoundState::NotYetFinal,
            RoundOutcome::Diverged { .. } => RoundState::Diverged,
            RoundOutcome::Inactive => RoundState::Inactive,
        }
    }

    /// True if the round finalized.
    pub fn is_finalized(&self) -> bool {
        matches!(self, RoundOutcome::Finalized(_))
    }

    /// Finalized answer, if any.
    pub fn finalized_answer(&self) -> Option<&Answer> {
        match self {
            RoundOutcome::Finalized(verdict) => verdict.agreed_answer(),
            _ => None,
        }
    }
}

/// Mint amount requested by the daemon, decoded from a signed 256-bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintRequest {
    /// Absolute value.
    pub magnitude: U256,
    /// Sign bit.
    pub negative: bool,
}

impl MintRequest {
    /// Non-negative request.
    pub fn positive(amount: U256) -> Self {
        Self {
            magnitude: amount,
            negative: false,
        }
    }

    /// Decode a two's-complement big-endian word.
    pub fn from_word(word: &[u8; WORD_SIZE]) -> Self {
        let raw = U256::from_big_endian(word);
        if word[0] & 0x80 == 0 {
            return Self::positive(raw);
        }
        let (magnitude, _) = (!raw).overflowing_add(U256::one());
        Self {
            magnitude,
            negative: true,
        }
    }
}
