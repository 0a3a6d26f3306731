//! # Attestor Probe
//!
//! One read-only call to one attestor. Every failure mode collapses into an
//! abstention so a single uncooperative attestor can never abort a round.

use crate::domain::{
    invariant_answer_width, AbstainReason, Address, Answer, InstructionPayload, ProbeResult,
};
use crate::ports::outbound::HostCaller;
use std::time::Duration;
use tracing::debug;

/// Probe one attestor. Single attempt, no retries.
pub async fn probe<H>(
    host: &H,
    attestor: Address,
    payload: &InstructionPayload,
    gas: u64,
    timeout: Duration,
) -> ProbeResult
where
    H: HostCaller + ?Sized,
{
    let call = host.call(attestor, attestor, payload.as_bytes(), gas);

    let response = match tokio::time::timeout(timeout, call).await {
        Err(_) => {
            debug!("[qc-18] Attestor {} timed out after {:?}", attestor, timeout);
            return ProbeResult::Abstain(AbstainReason::TimedOut);
        }
        Ok(Err(err)) => {
            debug!("[qc-18] Attestor {} call failed: {}", attestor, err);
            return ProbeResult::Abstain(AbstainReason::CallFailed(err.to_string()));
        }
        Ok(Ok(bytes)) => bytes,
    };

    if !invariant_answer_width(response.len()) {
        debug!(
            "[qc-18] Attestor {} returned {} bytes, abstaining",
            attestor,
            response.len()
        );
        return ProbeResult::Abstain(AbstainReason::MalformedLength(response.len()));
    }

    ProbeResult::Answer(Answer::from_bytes(response))
}
