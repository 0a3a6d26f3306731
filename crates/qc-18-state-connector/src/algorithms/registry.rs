//! # Canonical Committee Lookup
//!
//! Two-step registry call: the locator contract names the current attestor
//! registry, which returns the canonical committee as a flat buffer of
//! 32-byte words.

use crate::domain::{
    invariant_word_aligned, Address, Committee, CommitteeKind, ProtocolParams,
    StateConnectorError, StateConnectorResult, WORD_SIZE,
};
use crate::ports::outbound::HostCaller;
use tracing::debug;

/// Decode a flat buffer of address words.
pub fn decode_committee(target: Address, buffer: &[u8]) -> StateConnectorResult<Vec<Address>> {
    if !invariant_word_aligned(buffer.len()) {
        return Err(StateConnectorError::MalformedRegistryResponse {
            target,
            len: buffer.len(),
        });
    }

    Ok(buffer
        .chunks_exact(WORD_SIZE)
        .map(|chunk| {
            let mut word = [0u8; WORD_SIZE];
            word.copy_from_slice(chunk);
            Address::from_word(&word)
        })
        .collect())
}

/// Fetch the canonical committee for the current round.
pub async fn fetch_canonical_committee<H>(
    host: &H,
    params: &ProtocolParams,
) -> StateConnectorResult<Committee>
where
    H: HostCaller + ?Sized,
{
    let gas = params.system_call_gas(host.gas_limit());
    let caller = params.state_connector_contract;
    let locator = params.registry_locator_contract;

    let located = host
        .call(caller, locator, &params.selectors.registry_lookup, gas)
        .await
        .map_err(|source| StateConnectorError::RegistryLookup {
            target: locator,
            source,
        })?;

    let registry = match <&[u8; WORD_SIZE]>::try_from(located.as_slice()) {
        Ok(word) => Address::from_word(word),
        Err(_) => {
            return Err(StateConnectorError::MalformedRegistryResponse {
                target: locator,
                len: located.len(),
            })
        }
    };

    let buffer = host
        .call(caller, registry, &params.selectors.committee_query, gas)
        .await
        .map_err(|source| StateConnectorError::RegistryLookup {
            target: registry,
            source,
        })?;

    let members = decode_committee(registry, &buffer)?;
    debug!(
        "[qc-18] Registry {} returned {} canonical attestors",
        registry,
        members.len()
    );

    Ok(Committee::new(CommitteeKind::Canonical, members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{InMemoryHost, Responder};
    use crate::domain::CallError;

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    #[test]
    fn test_decode_committee() {
        let buffer: Vec<u8> = [addr(1), addr(2)].iter().flat_map(|a| a.to_word()).collect();
        let members = decode_committee(addr(0), &buffer).unwrap();
        assert_eq!(members, vec![addr(1), addr(2)]);
    }

    #[test]
    fn test_decode_empty_buffer() {
        assert!(decode_committee(addr(0), &[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_unaligned_buffer_fails() {
        let err = decode_committee(addr(0), &[0u8; 40]).unwrap_err();
        assert!(matches!(
            err,
            StateConnectorError::MalformedRegistryResponse { len: 40, .. }
        ));
    }

    #[tokio::test]
    async fn test_fetch_two_step() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new().with_registry(
            params.registry_locator_contract,
            addr(0x42),
            &[addr(1), addr(2), addr(3)],
        );

        let committee = fetch_canonical_committee(&host, &params).await.unwrap();
        assert_eq!(committee.kind(), CommitteeKind::Canonical);
        assert_eq!(committee.members(), &[addr(1), addr(2), addr(3)]);

        let calls = host.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].target, params.registry_locator_contract);
        assert_eq!(calls[0].payload, params.selectors.registry_lookup.to_vec());
        assert_eq!(calls[1].target, addr(0x42));
        assert_eq!(calls[1].payload, params.selectors.committee_query.to_vec());
    }

    #[tokio::test]
    async fn test_locator_failure_propagates() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new().with_responder(
            params.registry_locator_contract,
            Responder::Fail(CallError::Reverted("paused".into())),
        );

        let err = fetch_canonical_committee(&host, &params).await.unwrap_err();
        assert!(matches!(err, StateConnectorError::RegistryLookup { .. }));
    }

    #[tokio::test]
    async fn test_missing_registry_propagates() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new().with_responder(
            params.registry_locator_contract,
            Responder::Fixed(addr(0x42).to_word().to_vec()),
        );

        let err = fetch_canonical_committee(&host, &params).await.unwrap_err();
        assert!(matches!(
            err,
            StateConnectorError::RegistryLookup { target, .. } if target == addr(0x42)
        ));
    }

    #[tokio::test]
    async fn test_short_locator_answer_is_malformed() {
        let params = ProtocolParams::baseline();
        let host = InMemoryHost::new()
            .with_responder(params.registry_locator_contract, Responder::Fixed(vec![1u8; 20]));

        let err = fetch_canonical_committee(&host, &params).await.unwrap_err();
        assert!(matches!(
            err,
            StateConnectorError::MalformedRegistryResponse { len: 20, .. }
        ));
    }
}
