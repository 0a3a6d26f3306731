//! # Daemon Trigger and Bounded Mint
//!
//! Collaborator run from the same host tick as attestation rounds: the
//! daemon contract is triggered, returns a signed mint request, and the
//! request is credited to the daemon contract only when it lies within
//! `(0, max_mint_request]`.

use crate::domain::{DaemonError, MintError, MintRequest, ProtocolParams, WORD_SIZE};
use crate::metrics;
use crate::ports::outbound::{BalanceLedger, HostCaller};
use primitive_types::U256;
use tracing::{info, warn};

/// Trigger the daemon and decode its mint request.
pub async fn trigger_daemon<H>(
    host: &H,
    params: &ProtocolParams,
) -> Result<MintRequest, DaemonError>
where
    H: HostCaller + ?Sized,
{
    let daemon = params.daemon_contract;
    let gas = params.daemon_gas(host.gas_limit());

    let response = host
        .call(daemon, daemon, &params.selectors.daemon_trigger, gas)
        .await?;

    if response.is_empty() {
        return Err(DaemonError::DataEmpty);
    }

    let word = <&[u8; WORD_SIZE]>::try_from(response.as_slice())
        .map_err(|_| DaemonError::InvalidData {
            len: response.len(),
        })?;

    Ok(MintRequest::from_word(word))
}

/// Check a mint request against the ceiling.
///
/// Returns `Ok(None)` for a zero request (nothing to mint).
pub fn check_mint_bounds(request: &MintRequest, max: U256) -> Result<Option<U256>, MintError> {
    if request.negative && !request.magnitude.is_zero() {
        return Err(MintError::Negative);
    }
    if request.magnitude > max {
        return Err(MintError::MaxExceeded {
            requested: request.magnitude,
            max,
        });
    }
    if request.magnitude.is_zero() {
        return Ok(None);
    }
    Ok(Some(request.magnitude))
}

/// Trigger the daemon and mint within bounds.
///
/// Every failure is logged and swallowed: a bad mint never aborts the tick.
pub async fn trigger_and_mint<H>(host: &H, params: &ProtocolParams) -> Option<U256>
where
    H: HostCaller + BalanceLedger + ?Sized,
{
    let request = match trigger_daemon(host, params).await {
        Ok(request) => request,
        Err(err) => {
            warn!("[qc-18] Daemon trigger in error: {}", err);
            metrics::record_mint_rejected("trigger");
            return None;
        }
    };

    match check_mint_bounds(&request, params.max_mint_request) {
        Ok(Some(amount)) => {
            host.add_balance(params.daemon_contract, amount);
            info!("[qc-18] Minted {} to {}", amount, params.daemon_contract);
            Some(amount)
        }
        Ok(None) => None,
        Err(err) => {
            warn!("[qc-18] Error minting inflation request: {}", err);
            let reason = match err {
                MintError::Negative => "negative",
                MintError::MaxExceeded { .. } => "max_exceeded",
            };
            metrics::record_mint_rejected(reason);
            None
        }
    }
}
