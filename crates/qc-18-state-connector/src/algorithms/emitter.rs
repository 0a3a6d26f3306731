//! # Finality Emitter
//!
//! Delivers the finality payload into the host under the protocol origin.
//!
//! The origin swap is held by [`ProvenanceGuard`], which restores the previous
//! origin when dropped. Success, call failure, early return and cancellation
//! of the emitting future all pass through the drop.
//!
//! Callers must serialize emissions against one execution context.

use crate::domain::{
    Address, FinalityPayload, ProtocolParams, StateConnectorError, StateConnectorResult,
};
use crate::ports::outbound::{HostCaller, ProvenanceContext};
use tracing::{info, warn};

/// Scoped origin override.
pub struct ProvenanceGuard<'a, C: ProvenanceContext + ?Sized> {
    context: &'a C,
    previous: Address,
}

impl<'a, C: ProvenanceContext + ?Sized> ProvenanceGuard<'a, C> {
    /// Swap in `origin`, remembering the current one.
    pub fn acquire(context: &'a C, origin: Address) -> Self {
        let previous = context.origin();
        context.set_origin(origin);
        Self { context, previous }
    }

    /// Origin that will be restored.
    pub fn previous(&self) -> Address {
        self.previous
    }
}

impl<C: ProvenanceContext + ?Sized> Drop for ProvenanceGuard<'_, C> {
    fn drop(&mut self) {
        self.context.set_origin(self.previous);
    }
}

/// Emit the finality signal for a finalized round.
pub async fn emit<H>(
    host: &H,
    params: &ProtocolParams,
    payload: &FinalityPayload,
) -> StateConnectorResult<()>
where
    H: HostCaller + ProvenanceContext + ?Sized,
{
    let target = params.state_connector_contract;
    let gas = params.system_call_gas(host.gas_limit());

    let guard = ProvenanceGuard::acquire(host, params.provenance_override);
    let result = host
        .call(params.provenance_override, target, payload.as_bytes(), gas)
        .await;
    drop(guard);

    match result {
        Ok(_) => {
            info!(
                "[qc-18] Finality emitted to {} ({} bytes)",
                target,
                payload.as_bytes().len()
            );
            Ok(())
        }
        Err(err) => {
            warn!("[qc-18] Finality emission to {} failed: {}", target, err);
            Err(StateConnectorError::EmissionFailed(err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryHost, Responder};
    use crate::domain::{Answer, CallError, RoundId, PROTOCOL_ORIGIN};

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    fn payload(params: &ProtocolParams) -> FinalityPayload {
        FinalityPayload::new(
            params.selectors.prove_transaction,
            &RoundId::from_counter(3),
            &Answer::from_u64(1),
        )
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let host = InMemoryHost::new().with_origin(addr(7));
        {
            let guard = ProvenanceGuard::acquire(&host, addr(9));
            assert_eq!(host.origin(), addr(9));
            assert_eq!(guard.previous(), addr(7));
        }
        assert_eq!(host.origin(), addr(7));
    }

    #[tokio::test]
    async fn test_emission_runs_under_override() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new()
            .with_origin(addr(7))
            .with_responder(params.state_connector_contract, Responder::Fixed(vec![]));

        emit(&host, &params, &payload(&params)).await.unwrap();

        let calls = host.calls_to(params.state_connector_contract);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].origin, PROTOCOL_ORIGIN);
        assert_eq!(calls[0].payload, payload(&params).as_bytes());
        assert_eq!(calls[0].gas, params.system_call_gas(host.gas_limit()));
        assert_eq!(host.origin(), addr(7));
    }

    #[tokio::test]
    async fn test_origin_restored_after_call_failure() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new().with_origin(addr(7)).with_responder(
            params.state_connector_contract,
            Responder::Fail(CallError::Reverted("rejected".into())),
        );

        let err = emit(&host, &params, &payload(&params)).await.unwrap_err();
        assert!(matches!(err, StateConnectorError::EmissionFailed(_)));
        assert_eq!(host.origin(), addr(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_origin_restored_when_emission_cancelled() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new().with_origin(addr(7)).with_responder(
            params.state_connector_contract,
            Responder::Delayed(std::time::Duration::from_secs(60), vec![]),
        );

        let payload = payload(&params);
        let cancelled = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            emit(&host, &params, &payload),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(host.origin(), addr(7));
    }
}
