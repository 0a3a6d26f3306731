//! # Activation Policy
//!
//! Versioned protocol parameters keyed by `(network, time range)`.
//!
//! Every historical variant of the protocol is a row in one table instead of
//! a separate code path. Lookup is total: when no row matches, the baseline
//! parameters apply, so an unknown network never blocks a caller.

use super::value_objects::{Address, Selector};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Chain id of the testing network where the mechanism is live from genesis.
pub const TESTING_CHAIN_ID: u64 = 16;

/// Planned network-wide activation time (unix seconds).
pub const NETWORK_ACTIVATION_TIME: u64 = 1_636_070_400;

/// Gas budget for a single attestor probe.
pub const ATTESTOR_GAS_BUDGET: u64 = 20_000;

/// Sentinel origin marking protocol-finalized effects.
pub const PROTOCOL_ORIGIN: Address = Address([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0xff, 0xfe,
]);

const fn system_contract(last: u8) -> Address {
    let mut raw = [0u8; 20];
    raw[0] = 0x10;
    raw[19] = last;
    Address(raw)
}

/// Function selectors used by the protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selectors {
    /// `requestAttestations(...)` on the state connector contract.
    pub request_attestations: Selector,
    /// `proveTransaction(...)`: finality emission.
    pub prove_transaction: Selector,
    /// `getAttestation(round)`: attestor probe.
    pub get_attestation: Selector,
    /// Registry locator: returns the current attestor registry.
    pub registry_lookup: Selector,
    /// Registry: returns the canonical committee.
    pub committee_query: Selector,
    /// Daemon trigger.
    pub daemon_trigger: Selector,
}

/// Protocol parameters in force for one `(network, time)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolParams {
    /// Function selectors.
    pub selectors: Selectors,
    /// State connector contract (emission target).
    pub state_connector_contract: Address,
    /// Contract that locates the attestor registry.
    pub registry_locator_contract: Address,
    /// Daemon contract (trigger target and mint recipient).
    pub daemon_contract: Address,
    /// Daemon gas = multiplier × block gas limit.
    pub gas_budget_multiplier: u64,
    /// Registry/emission gas = block gas limit / divisor.
    pub gas_divisor: u64,
    /// Gas for one attestor probe.
    pub attestor_gas_budget: u64,
    /// Quorum numerator (strict).
    pub quorum_numerator: u64,
    /// Quorum denominator.
    pub quorum_denominator: u64,
    /// Origin substituted during finality emission.
    pub provenance_override: Address,
    /// Ceiling for a single mint request.
    pub max_mint_request: U256,
    /// Whether the attestation mechanism is engaged.
    pub is_active: bool,
}

impl ProtocolParams {
    /// Baseline parameters.
    pub fn baseline() -> Self {
        Self {
            selectors: Selectors {
                request_attestations: [0x06, 0x95, 0xef, 0x28],
                prove_transaction: [0xf6, 0x03, 0x58, 0x6a],
                get_attestation: [0x29, 0xbe, 0x4d, 0xb2],
                registry_lookup: [0x3f, 0x57, 0x98, 0x7d],
                committee_query: [0x8a, 0x0c, 0x1f, 0x26],
                daemon_trigger: [0x7f, 0xec, 0x8d, 0x38],
            },
            state_connector_contract: system_contract(0x01),
            registry_locator_contract: system_contract(0x03),
            daemon_contract: system_contract(0x02),
            gas_budget_multiplier: 100,
            gas_divisor: 3,
            attestor_gas_budget: ATTESTOR_GAS_BUDGET,
            quorum_numerator: 1,
            quorum_denominator: 2,
            provenance_override: PROTOCOL_ORIGIN,
            // 50M tokens at 18 decimals
            max_mint_request: U256::from(50_000_000u64) * U256::exp10(18),
            is_active: false,
        }
    }

    /// Gas for registry lookups and finality emission.
    pub fn system_call_gas(&self, block_gas_limit: u64) -> u64 {
        block_gas_limit / self.gas_divisor.max(1)
    }

    /// Gas for the daemon trigger.
    pub fn daemon_gas(&self, block_gas_limit: u64) -> u64 {
        self.gas_budget_multiplier.saturating_mul(block_gas_limit)
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self::baseline()
    }
}

/// One versioned row of the policy table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyRule {
    /// Network the row applies to; `None` matches every network.
    pub network: Option<u64>,
    /// First second (inclusive) the row applies.
    pub active_from: u64,
    /// Last second (exclusive); `None` is open-ended.
    pub active_until: Option<u64>,
    /// Parameters in force.
    pub params: ProtocolParams,
}

impl PolicyRule {
    fn matches(&self, network_id: u64, at_time: u64) -> bool {
        self.network.map_or(true, |n| n == network_id)
            && at_time >= self.active_from
            && self.active_until.map_or(true, |until| at_time < until)
    }
}

/// Pure lookup from `(network, time)` to protocol parameters.
#[derive(Clone, Debug)]
pub struct ActivationPolicy {
    baseline: ProtocolParams,
    rules: Vec<PolicyRule>,
}

impl ActivationPolicy {
    /// Policy with only the baseline (inactive everywhere).
    pub fn baseline_only() -> Self {
        Self {
            baseline: ProtocolParams::baseline(),
            rules: Vec::new(),
        }
    }

    /// Add a versioned row.
    pub fn with_rule(mut self, rule: PolicyRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Activate the mechanism for `network` from `from_time` onwards.
    pub fn with_activation(self, network: u64, from_time: u64) -> Self {
        let params = ProtocolParams {
            is_active: true,
            ..ProtocolParams::baseline()
        };
        self.with_rule(PolicyRule {
            network: Some(network),
            active_from: from_time,
            active_until: None,
            params,
        })
    }

    /// Parameters in force. The matching row with the latest activation wins;
    /// among equal activations the row added last wins.
    pub fn policy(&self, network_id: u64, at_time: u64) -> &ProtocolParams {
        self.rules
            .iter()
            .filter(|rule| rule.matches(network_id, at_time))
            .max_by_key(|rule| rule.active_from)
            .map(|rule| &rule.params)
            .unwrap_or(&self.baseline)
    }

    /// Whether the attestation mechanism is engaged.
    pub fn is_active(&self, chain_id: u64, at_time: u64) -> bool {
        self.policy(chain_id, at_time).is_active
    }
}

impl Default for ActivationPolicy {
    /// Live on the testing chain only.
    fn default() -> Self {
        Self::baseline_only().with_activation(TESTING_CHAIN_ID, 0)
    }
}
