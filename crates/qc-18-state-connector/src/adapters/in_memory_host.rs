//! In-Memory Host Adapter
//!
//! Implements the outbound ports against a scripted, in-process execution
//! environment. Used by tests and local simulations.

use crate::domain::{Address, CallError, WORD_SIZE};
use crate::ports::outbound::{BalanceLedger, HostCaller, ProvenanceContext};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use primitive_types::U256;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Default block gas limit.
pub const DEFAULT_GAS_LIMIT: u64 = 8_000_000;

/// Scripted behaviour of one contract.
#[derive(Clone, Debug)]
pub enum Responder {
    /// Always return these bytes.
    Fixed(Vec<u8>),
    /// Always fail.
    Fail(CallError),
    /// Return these bytes after a delay.
    Delayed(Duration, Vec<u8>),
}

/// One recorded call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRecord {
    /// Caller passed to the call.
    pub caller: Address,
    /// Contract called.
    pub target: Address,
    /// Input bytes.
    pub payload: Vec<u8>,
    /// Gas budget.
    pub gas: u64,
    /// Context origin at the time of the call.
    pub origin: Address,
}

/// In-memory execution environment.
pub struct InMemoryHost {
    responders: RwLock<HashMap<Address, Responder>>,
    calls: Mutex<Vec<CallRecord>>,
    balances: RwLock<HashMap<Address, U256>>,
    origin: Mutex<Address>,
    gas_limit: u64,
}

impl InMemoryHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self {
            responders: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            balances: RwLock::new(HashMap::new()),
            origin: Mutex::new(Address::ZERO),
            gas_limit: DEFAULT_GAS_LIMIT,
        }
    }

    /// Override the block gas limit.
    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Set the initial origin.
    pub fn with_origin(self, origin: Address) -> Self {
        *self.origin.lock() = origin;
        self
    }

    /// Script a contract.
    pub fn with_responder(self, target: Address, responder: Responder) -> Self {
        self.set_responder(target, responder);
        self
    }

    /// Script a two-step registry: `locator` points at `registry`, which
    /// returns `committee` as 32-byte words.
    pub fn with_registry(self, locator: Address, registry: Address, committee: &[Address]) -> Self {
        let buffer = committee.iter().flat_map(|a| a.to_word()).collect::<Vec<_>>();
        self.with_responder(locator, Responder::Fixed(registry.to_word().to_vec()))
            .with_responder(registry, Responder::Fixed(buffer))
    }

    /// Replace a contract's behaviour.
    pub fn set_responder(&self, target: Address, responder: Responder) {
        self.responders.write().insert(target, responder);
    }

    /// Recorded calls, oldest first.
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    /// Recorded calls to `target`.
    pub fn calls_to(&self, target: Address) -> Vec<CallRecord> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.target == target)
            .cloned()
            .collect()
    }

    /// Balance of an account.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances
            .read()
            .get(&account)
            .copied()
            .unwrap_or_default()
    }
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode a single value as one answer word.
pub fn word_from_u64(value: u64) -> Vec<u8> {
    let mut word = vec![0u8; WORD_SIZE];
    word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

#[async_trait]
impl HostCaller for InMemoryHost {
    async fn call(
        &self,
        caller: Address,
        target: Address,
        payload: &[u8],
        gas: u64,
    ) -> Result<Vec<u8>, CallError> {
        self.calls.lock().push(CallRecord {
            caller,
            target,
            payload: payload.to_vec(),
            gas,
            origin: *self.origin.lock(),
        });

        // Clone out so no lock is held across the await below.
        let responder = self.responders.read().get(&target).cloned();
        debug!("[qc-18] Host call {} -> {} ({} gas)", caller, target, gas);

        match responder {
            Some(Responder::Fixed(bytes)) => Ok(bytes),
            Some(Responder::Fail(err)) => Err(err),
            Some(Responder::Delayed(delay, bytes)) => {
                tokio::time::sleep(delay).await;
                Ok(bytes)
            }
            None => Err(CallError::Unreachable(target)),
        }
    }

    fn gas_limit(&self) -> u64 {
        self.gas_limit
    }
}

impl ProvenanceContext for InMemoryHost {
    fn origin(&self) -> Address {
        *self.origin.lock()
    }

    fn set_origin(&self, origin: Address) {
        *self.origin.lock() = origin;
    }
}

impl BalanceLedger for InMemoryHost {
    fn add_balance(&self, account: Address, amount: U256) {
        let mut balances = self.balances.write();
        let entry = balances.entry(account).or_default();
        *entry = entry.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address([n; 20])
    }

    #[tokio::test]
    async fn test_fixed_responder() {
        let host = InMemoryHost::new().with_responder(addr(1), Responder::Fixed(vec![7]));
        let out = host.call(addr(9), addr(1), &[1, 2], 100).await.unwrap();
        assert_eq!(out, vec![7]);
        assert_eq!(host.calls_to(addr(1)).len(), 1);
        assert_eq!(host.calls()[0].payload, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_unknown_target_is_unreachable() {
        let host = InMemoryHost::new();
        let err = host.call(addr(9), addr(2), &[], 100).await.unwrap_err();
        assert_eq!(err, CallError::Unreachable(addr(2)));
    }

    #[tokio::test]
    async fn test_call_records_current_origin() {
        let host = InMemoryHost::new()
            .with_origin(addr(5))
            .with_responder(addr(1), Responder::Fixed(vec![]));
        host.set_origin(addr(6));
        host.call(addr(9), addr(1), &[], 1).await.unwrap();
        assert_eq!(host.calls()[0].origin, addr(6));
    }

    #[tokio::test]
    async fn test_registry_script() {
        let host = InMemoryHost::new().with_registry(addr(1), addr(2), &[addr(3), addr(4)]);
        let located = host.call(addr(0), addr(1), &[], 1).await.unwrap();
        assert_eq!(located, addr(2).to_word().to_vec());
        let buffer = host.call(addr(0), addr(2), &[], 1).await.unwrap();
        assert_eq!(buffer.len(), 2 * WORD_SIZE);
    }

    #[test]
    fn test_add_balance_accumulates() {
        let host = InMemoryHost::new();
        host.add_balance(addr(1), U256::from(5u64));
        host.add_balance(addr(1), U256::from(7u64));
        assert_eq!(host.balance_of(addr(1)), U256::from(12u64));
        assert_eq!(host.balance_of(addr(2)), U256::zero());
    }

    #[test]
    fn test_word_from_u64() {
        let word = word_from_u64(1);
        assert_eq!(word.len(), WORD_SIZE);
        assert_eq!(word[31], 1);
    }
}
