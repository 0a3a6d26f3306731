//! State Connector Service - committee resolution and finality
//!
//! Resolves one attestation round against the canonical committee and the
//! optional node-local committee, then emits the finality signal when both
//! agree.
//!
//! ```text
//! ActivationPolicy ──params──→ registry lookup ──→ canonical committee ──┐
//!                                                                        ├─→ tally ─→ cross-check
//! StateConnectorConfig ──────────────────────────→ local committee ──────┘                │
//!                                                                                         ↓
//!                                                          Finalized ──→ FinalityEmitter
//! ```

use crate::algorithms::{emit, fetch_canonical_committee, tally, trigger_and_mint, ProbeBudget};
use crate::config::StateConnectorConfig;
use crate::domain::{
    ActivationPolicy, Committee, CommitteeKind, FinalityPayload, InstructionPayload, RoundOutcome,
    RoundRequest, StateConnectorResult, Verdict,
};
use crate::metrics;
use crate::ports::inbound::StateConnectorApi;
use crate::ports::outbound::{BalanceLedger, HostCaller, ProvenanceContext};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Apply the dual-committee rule to two verdicts.
///
/// - No local committee: the canonical majority alone decides.
/// - Local committee present: both must reach majority on byte-identical
///   answers. A canonical majority the local committee does not back is a
///   divergence.
pub fn cross_check(canonical: Verdict, local: Option<Verdict>) -> RoundOutcome {
    let Some(local) = local else {
        return if canonical.reached_majority {
            RoundOutcome::Finalized(canonical)
        } else {
            RoundOutcome::NotYetFinal {
                canonical,
                local: None,
            }
        };
    };

    match (canonical.agreed_answer(), local.agreed_answer()) {
        (Some(a), Some(b)) if a == b => RoundOutcome::Finalized(canonical),
        (Some(_), _) => RoundOutcome::Diverged { canonical, local },
        (None, _) => RoundOutcome::NotYetFinal {
            canonical,
            local: Some(local),
        },
    }
}

/// State Connector service.
///
/// Host calls made while resolving or minting hold the read side of
/// `provenance`; a finality emission holds the write side, so no other call
/// on this service runs under the overridden origin.
pub struct StateConnectorService<H>
where
    H: HostCaller + ProvenanceContext + BalanceLedger,
{
    config: StateConnectorConfig,
    policy: ActivationPolicy,
    host: Arc<H>,
    provenance: RwLock<()>,
}

impl<H> StateConnectorService<H>
where
    H: HostCaller + ProvenanceContext + BalanceLedger,
{
    /// Create a new service.
    pub fn new(config: StateConnectorConfig, policy: ActivationPolicy, host: Arc<H>) -> Self {
        Self {
            config,
            policy,
            host,
            provenance: RwLock::new(()),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &StateConnectorConfig {
        &self.config
    }

    /// Activation policy in use.
    pub fn policy(&self) -> &ActivationPolicy {
        &self.policy
    }

    fn local_committee(&self) -> Committee {
        Committee::new(
            CommitteeKind::Local,
            self.config.local_attestors.iter().copied(),
        )
    }

    fn report(&self, request: &RoundRequest, outcome: &RoundOutcome) {
        let state = outcome.state();
        match outcome {
            RoundOutcome::Finalized(verdict) => {
                info!(
                    round = ?request.round_id,
                    %state,
                    answer = ?verdict.majority_answer,
                    votes = verdict.majority_attestors.len(),
                    committee = verdict.committee_size,
                    "[qc-18] Round finalized"
                );
            }
            RoundOutcome::NotYetFinal { canonical, local } => {
                debug!(
                    round = ?request.round_id,
                    %state,
                    canonical_votes = canonical.majority_attestors.len(),
                    canonical_abstained = canonical.abstained_attestors.len(),
                    local_majority = local.as_ref().map(|v| v.reached_majority),
                    "[qc-18] Round not yet final, retry later"
                );
            }
            RoundOutcome::Diverged { canonical, local } => {
                warn!(
                    round = ?request.round_id,
                    %state,
                    canonical_answer = ?canonical.majority_answer,
                    local_answer = ?local.majority_answer,
                    local_reached_majority = local.reached_majority,
                    "[qc-18] Local attestors disagree with the canonical result: \
                     this node is about to diverge, snapshot state before proceeding"
                );
            }
            RoundOutcome::Inactive => {
                debug!(
                    chain_id = request.chain_id,
                    time = request.time,
                    %state,
                    "[qc-18] State connector inactive"
                );
            }
        }
        metrics::record_round(state.as_str());
    }
}

#[async_trait]
impl<H> StateConnectorApi for StateConnectorService<H>
where
    H: HostCaller + ProvenanceContext + BalanceLedger,
{
    async fn resolve(&self, request: &RoundRequest) -> StateConnectorResult<RoundOutcome> {
        let params = self.policy.policy(request.chain_id, request.time);
        if !params.is_active {
            let outcome = RoundOutcome::Inactive;
            self.report(request, &outcome);
            return Ok(outcome);
        }

        let _calls = self.provenance.read().await;
        let host = self.host.as_ref();
        let canonical = fetch_canonical_committee(host, params).await?;
        let local = self.local_committee();

        let payload = InstructionPayload::new(params.selectors.get_attestation, &request.round_id);
        let budget = ProbeBudget {
            gas: params.attestor_gas_budget,
            timeout: self.config.probe_timeout,
        };

        let (canonical_tally, local_tally) = tokio::join!(
            tally(host, &canonical, &payload, budget),
            tally(host, &local, &payload, budget),
        );

        let (num, den) = (params.quorum_numerator, params.quorum_denominator);
        let canonical_verdict = canonical_tally.verdict(num, den);
        let local_verdict = (!local.is_empty()).then(|| local_tally.verdict(num, den));

        let outcome = cross_check(canonical_verdict, local_verdict);
        self.report(request, &outcome);
        Ok(outcome)
    }

    async fn finalize_round(&self, request: &RoundRequest) -> StateConnectorResult<RoundOutcome> {
        let outcome = self.resolve(request).await?;

        if let Some(answer) = outcome.finalized_answer() {
            let params = self.policy.policy(request.chain_id, request.time);
            let payload =
                FinalityPayload::new(params.selectors.prove_transaction, &request.round_id, answer);
            let _emission = self.provenance.write().await;
            emit(self.host.as_ref(), params, &payload).await?;
        }

        Ok(outcome)
    }

    async fn trigger_and_mint(&self, chain_id: u64, time: u64) -> Option<U256> {
        let params = self.policy.policy(chain_id, time);
        let _calls = self.provenance.read().await;
        trigger_and_mint(self.host.as_ref(), params).await
    }

    fn is_active(&self, chain_id: u64, time: u64) -> bool {
        self.policy.is_active(chain_id, time)
    }
}
