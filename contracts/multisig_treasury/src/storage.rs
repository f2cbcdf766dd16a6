//! Storage keys and helpers for the Multisig Treasury contract

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::error::TreasuryError;
use crate::types::{
    AdminCap, AuditEntry, EmergencyCooldown, EmergencyProposal, EngineConfig, Policy, Proposal,
    SpendingTracker, Treasury,
};

pub const INSTANCE_BUMP_CONSTANT: u32 = 1036800;
pub const INSTANCE_BUMP_CONSTANT_THRESHOLD: u32 = 518400;
pub const PERSISTENT_BUMP_CONSTANT: u32 = 1036800;
pub const PERSISTENT_BUMP_CONSTANT_THRESHOLD: u32 = 518400;

/// Storage keys for the treasury contract
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Boolean flag indicating contract initialization
    Initialized,
    /// Contract administrator (instance storage)
    Admin,
    /// Engine configuration (instance storage)
    Config,
    /// Id counters (instance storage)
    NextTreasuryId,
    NextCapId,
    NextProposalId,
    NextPolicyId,
    NextEmergencyId,
    /// Treasury by id (persistent storage)
    Treasury(u64),
    /// Admin capability of a treasury (persistent storage)
    AdminCap(u64),
    /// Balance of one asset held by a treasury (persistent storage)
    Balance(u64, Address),
    Proposal(u64),
    Policy(u64),
    /// Spending tracker for a treasury and category (persistent storage)
    Tracker(u64, u32),
    EmergencyProposal(u64),
    /// Emergency cooldown of a treasury (persistent storage)
    Cooldown(u64),
    /// Audit log entry by treasury and position (persistent storage)
    AuditEntry(u64, u32),
    /// Number of audit log entries of a treasury (persistent storage)
    AuditCount(u64),
}

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage().persistent().extend_ttl(
        key,
        PERSISTENT_BUMP_CONSTANT_THRESHOLD,
        PERSISTENT_BUMP_CONSTANT,
    );
}

fn write<V>(env: &Env, key: DataKey, value: &V)
where
    V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
{
    env.storage().persistent().set(&key, value);
    bump_persistent(env, &key);
}

// ============================================================================
// Initialization Helpers
// ============================================================================

pub fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_BUMP_CONSTANT_THRESHOLD, INSTANCE_BUMP_CONSTANT);
}

/// Check if the contract is initialized
pub fn is_initialized(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<DataKey, bool>(&DataKey::Initialized)
        .unwrap_or(false)
}

/// Mark the contract as initialized
pub fn set_initialized(env: &Env) {
    env.storage().instance().set(&DataKey::Initialized, &true);
}

pub fn require_initialized(env: &Env) -> Result<(), TreasuryError> {
    if !is_initialized(env) {
        return Err(TreasuryError::NotInitialized);
    }
    bump_instance(env);
    Ok(())
}

pub fn get_admin(env: &Env) -> Result<Address, TreasuryError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(TreasuryError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

// ============================================================================
// Configuration Helpers
// ============================================================================

/// Get the engine configuration
pub fn get_config(env: &Env) -> Result<EngineConfig, TreasuryError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(TreasuryError::NotInitialized)
}

/// Set the engine configuration
pub fn set_config(env: &Env, config: &EngineConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}

/// Allocate the next id from a counter; ids start at 1
pub fn next_id(env: &Env, counter: DataKey) -> u64 {
    let id = env
        .storage()
        .instance()
        .get::<DataKey, u64>(&counter)
        .unwrap_or(0)
        + 1;
    env.storage().instance().set(&counter, &id);
    id
}

// ============================================================================
// Treasury Helpers
// ============================================================================

pub fn get_treasury(env: &Env, treasury_id: u64) -> Result<Treasury, TreasuryError> {
    env.storage()
        .persistent()
        .get(&DataKey::Treasury(treasury_id))
        .ok_or(TreasuryError::TreasuryNotFound)
}

pub fn set_treasury(env: &Env, treasury: &Treasury) {
    write(env, DataKey::Treasury(treasury.id), treasury);
}

pub fn get_admin_cap(env: &Env, treasury_id: u64) -> Result<AdminCap, TreasuryError> {
    env.storage()
        .persistent()
        .get(&DataKey::AdminCap(treasury_id))
        .ok_or(TreasuryError::TreasuryNotFound)
}

pub fn set_admin_cap(env: &Env, cap: &AdminCap) {
    write(env, DataKey::AdminCap(cap.treasury_id), cap);
}

/// Balance of `asset`, zero when nothing was ever deposited
pub fn get_balance(env: &Env, treasury_id: u64, asset: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&DataKey::Balance(treasury_id, asset.clone()))
        .unwrap_or(0)
}

pub fn set_balance(env: &Env, treasury_id: u64, asset: &Address, balance: i128) {
    write(env, DataKey::Balance(treasury_id, asset.clone()), &balance);
}

// ============================================================================
// Proposal Helpers
// ============================================================================

/// Get a proposal by ID
pub fn get_proposal(env: &Env, proposal_id: u64) -> Result<Proposal, TreasuryError> {
    env.storage()
        .persistent()
        .get(&DataKey::Proposal(proposal_id))
        .ok_or(TreasuryError::ProposalNotFound)
}

/// Set a proposal
pub fn set_proposal(env: &Env, proposal: &Proposal) {
    write(env, DataKey::Proposal(proposal.id), proposal);
}

// ============================================================================
// Policy Helpers
// ============================================================================

pub fn get_policy(env: &Env, policy_id: u64) -> Result<Policy, TreasuryError> {
    env.storage()
        .persistent()
        .get(&DataKey::Policy(policy_id))
        .ok_or(TreasuryError::PolicyNotFound)
}

pub fn set_policy(env: &Env, policy: &Policy) {
    write(env, DataKey::Policy(policy.id), policy);
}

/// Active policies bound to a treasury, in creation order
pub fn get_active_policies(
    env: &Env,
    treasury: &Treasury,
) -> Result<Vec<Policy>, TreasuryError> {
    let mut policies = Vec::new(env);
    for policy_id in treasury.policy_ids.iter() {
        let policy = get_policy(env, policy_id)?;
        if policy.active {
            policies.push_back(policy);
        }
    }
    Ok(policies)
}

pub fn get_tracker(env: &Env, treasury_id: u64, category: u32) -> Option<SpendingTracker> {
    env.storage()
        .persistent()
        .get(&DataKey::Tracker(treasury_id, category))
}

pub fn set_tracker(env: &Env, treasury_id: u64, tracker: &SpendingTracker) {
    write(env, DataKey::Tracker(treasury_id, tracker.category), tracker);
}

// ============================================================================
// Emergency Helpers
// ============================================================================

pub fn get_emergency_proposal(
    env: &Env,
    emergency_id: u64,
) -> Result<EmergencyProposal, TreasuryError> {
    env.storage()
        .persistent()
        .get(&DataKey::EmergencyProposal(emergency_id))
        .ok_or(TreasuryError::EmergencyProposalNotFound)
}

pub fn set_emergency_proposal(env: &Env, proposal: &EmergencyProposal) {
    write(env, DataKey::EmergencyProposal(proposal.id), proposal);
}

/// Cooldown of a treasury, empty until its first emergency withdrawal
pub fn get_cooldown(env: &Env, treasury_id: u64) -> EmergencyCooldown {
    env.storage()
        .persistent()
        .get(&DataKey::Cooldown(treasury_id))
        .unwrap_or(EmergencyCooldown {
            treasury_id,
            last_emergency: None,
        })
}

pub fn set_cooldown(env: &Env, cooldown: &EmergencyCooldown) {
    write(env, DataKey::Cooldown(cooldown.treasury_id), cooldown);
}

pub fn get_audit_count(env: &Env, treasury_id: u64) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::AuditCount(treasury_id))
        .unwrap_or(0)
}

/// Append an entry to the treasury audit log and return its position
pub fn append_audit_entry(env: &Env, entry: &AuditEntry) -> u32 {
    let index = get_audit_count(env, entry.treasury_id);
    write(env, DataKey::AuditEntry(entry.treasury_id, index), entry);
    write(env, DataKey::AuditCount(entry.treasury_id), &(index + 1));
    index
}

pub fn get_audit_log(env: &Env, treasury_id: u64) -> Vec<AuditEntry> {
    let mut entries = Vec::new(env);
    for index in 0..get_audit_count(env, treasury_id) {
        if let Some(entry) = env
            .storage()
            .persistent()
            .get(&DataKey::AuditEntry(treasury_id, index))
        {
            entries.push_back(entry);
        }
    }
    entries
}
