//! # Vote Aggregator
//!
//! Fans a probe out to every committee member concurrently, joins on all
//! results and groups answers by exact byte equality.

use super::probe::probe;
use crate::domain::{Committee, InstructionPayload, ProbeResult, Tally};
use crate::metrics;
use crate::ports::outbound::HostCaller;
use futures::future::join_all;
use std::time::Duration;
use tracing::debug;

/// Per-probe budget shared by every member of a committee.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProbeBudget {
    /// Gas per probe.
    pub gas: u64,
    /// Wall-clock limit per probe.
    pub timeout: Duration,
}

/// Probe every member once and build the tally.
///
/// A hung attestor only delays its own future up to `budget.timeout` and
/// then counts as an abstention.
pub async fn tally<H>(
    host: &H,
    committee: &Committee,
    payload: &InstructionPayload,
    budget: ProbeBudget,
) -> Tally
where
    H: HostCaller + ?Sized,
{
    let mut tally = Tally::new(committee);
    if committee.is_empty() {
        return tally;
    }

    let probes = committee.members().iter().map(|attestor| async move {
        let result = probe(host, *attestor, payload, budget.gas, budget.timeout).await;
        (*attestor, result)
    });

    let mut abstentions = 0u64;
    for (attestor, result) in join_all(probes).await {
        if matches!(result, ProbeResult::Abstain(_)) {
            abstentions += 1;
        }
        tally.record(attestor, result);
    }

    metrics::record_abstentions(committee.kind(), abstentions);
    debug!(
        "[qc-18] {} committee tallied: {} members, {} distinct answers, {} abstained",
        committee.kind(),
        committee.len(),
        tally.buckets().len(),
        abstentions
    );

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{word_from_u64, InMemoryHost, Responder};
    use crate::domain::{Address, Answer, CallError, CommitteeKind, RoundId};

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    fn payload() -> InstructionPayload {
        InstructionPayload::new([0x29, 0xbe, 0x4d, 0xb2], &RoundId::from_counter(7))
    }

    fn budget() -> ProbeBudget {
        ProbeBudget {
            gas: 20_000,
            timeout: Duration::from_secs(2),
        }
    }

    /// Committee of `n` where the first `k` answer 1 and the rest answer 2.
    fn split_host(n: u8, k: u8) -> (InMemoryHost, Committee) {
        let mut host = InMemoryHost::new();
        for i in 1..=n {
            let answer = if i <= k { 1 } else { 2 };
            host = host.with_responder(addr(i), Responder::Fixed(word_from_u64(answer)));
        }
        let committee = Committee::new(CommitteeKind::Canonical, (1..=n).map(addr));
        (host, committee)
    }

    #[tokio::test]
    async fn test_majority_threshold_over_committee_sizes() {
        for n in 1u8..=9 {
            for k in 0..=n {
                let (host, committee) = split_host(n, k);
                let verdict = tally(&host, &committee, &payload(), budget())
                    .await
                    .verdict(1, 2);
                let ones_win = k > n / 2;
                let twos_win = (n - k) > n / 2;
                assert_eq!(verdict.reached_majority, ones_win || twos_win, "n={n} k={k}");
                if ones_win {
                    assert_eq!(verdict.agreed_answer(), Some(&Answer::from_u64(1)));
                }
            }
        }
    }

    #[tokio::test]
    async fn test_empty_committee() {
        let host = InMemoryHost::new();
        let committee = Committee::empty(CommitteeKind::Local);
        let result = tally(&host, &committee, &payload(), budget()).await;
        assert_eq!(result.recorded(), 0);
        assert!(host.calls().is_empty());
        assert!(!result.verdict(1, 2).reached_majority);
    }

    #[tokio::test]
    async fn test_abstentions_count_against_committee() {
        // 2 agree, 2 fail: 2 > 4/2 is false.
        let host = InMemoryHost::new()
            .with_responder(addr(1), Responder::Fixed(word_from_u64(1)))
            .with_responder(addr(2), Responder::Fixed(word_from_u64(1)))
            .with_responder(addr(3), Responder::Fail(CallError::Reverted("x".into())))
            .with_responder(addr(4), Responder::Fixed(vec![1, 2, 3]));
        let committee = Committee::new(CommitteeKind::Canonical, (1..=4).map(addr));

        let result = tally(&host, &committee, &payload(), budget()).await;
        let verdict = result.verdict(1, 2);
        assert!(!verdict.reached_majority);
        assert_eq!(verdict.abstained_attestors.len(), 2);
        assert_eq!(result.recorded(), 4);
    }

    #[tokio::test]
    async fn test_every_member_probed_once() {
        let (host, committee) = split_host(5, 3);
        tally(&host, &committee, &payload(), budget()).await;
        for i in 1..=5 {
            assert_eq!(host.calls_to(addr(i)).len(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attestor_does_not_stall_round() {
        let host = InMemoryHost::new()
            .with_responder(addr(1), Responder::Fixed(word_from_u64(1)))
            .with_responder(addr(2), Responder::Fixed(word_from_u64(1)))
            .with_responder(
                addr(3),
                Responder::Delayed(Duration::from_secs(3600), word_from_u64(1)),
            );
        let committee = Committee::new(CommitteeKind::Canonical, (1..=3).map(addr));

        let started = tokio::time::Instant::now();
        let result = tally(&host, &committee, &payload(), budget()).await;
        assert!(started.elapsed() < Duration::from_secs(3));

        let verdict = result.verdict(1, 2);
        assert!(verdict.reached_majority);
        assert!(verdict.abstained_attestors.contains(&addr(3)));
    }
}
