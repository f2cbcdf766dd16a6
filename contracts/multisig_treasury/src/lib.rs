#![no_std]

//! # Multisig Treasury
//!
//! A Soroban smart contract holding an organization's assets under an N-of-M
//! signer policy. Spending goes through collectively approved, time-locked
//! proposals gated by a programmable policy engine, and a separate emergency
//! path allows rapid response under a distinct signer set.
//!
//! ## Features
//! - Any number of treasuries per deployment, each with an admin capability
//! - Batched spending proposals (up to 50 transfers) with time-lock
//! - Policies: spending limits over rolling windows, recipient white/blacklists,
//!   amount-scaled time-locks, amount-tiered signature requirements and
//!   category approvals with veto
//! - Emergency withdrawals with cooldown, single-signature freeze, audit log
//! - Optional external verifier contract for recorded signatures
//!
//! ## Security
//! - Each signer signs a proposal at most once
//! - Proposal status only moves forward; executed and cancelled are final
//! - Execution re-checks threshold, time-lock, freeze flag and policies
//! - Batch debits are all-or-nothing
//! - Every rejected call leaves state unchanged

use soroban_sdk::{contract, contractimpl, Address, Bytes, Env, String, Vec};

mod emergency;
mod error;
mod events;
mod policy;
mod proposal;
mod storage;
mod treasury;
mod types;

pub use error::{ErrorClass, TreasuryError};
pub use types::{
    AdminCap, AmountThresholdRule, ApprovalRule, AuditAction, AuditEntry, CancelMode,
    EmergencyCooldown, EmergencyProposal, EngineConfig, Policy, PolicyKind, PolicyRule,
    PolicyViolation, Proposal, ProposalStatus, SignatureRecord, SpendingLimitRule,
    SpendingTracker, ThresholdTier, TimelockRule, Transaction, Treasury, ViolationKind,
    WhitelistRule, ANY_CATEGORY, DAY, MAX_BATCH_SIZE, MAX_CATEGORY, MONTH, WEEK,
};

fn validate_config(config: &EngineConfig) -> Result<(), TreasuryError> {
    if config.max_batch_size == 0
        || config.max_batch_size > MAX_BATCH_SIZE
        || config.max_signers < types::MIN_SIGNERS
    {
        return Err(TreasuryError::InvalidConfig);
    }
    Ok(())
}

fn require_admin(env: &Env, admin: &Address) -> Result<(), TreasuryError> {
    admin.require_auth();
    if &storage::get_admin(env)? != admin {
        return Err(TreasuryError::NotAdmin);
    }
    Ok(())
}

// ============================================================================
// Contract Implementation
// ============================================================================

#[contract]
pub struct MultisigTreasury;

#[contractimpl]
impl MultisigTreasury {
    // ========================================================================
    // Initialization
    // ========================================================================

    /// Initialize the contract with its administrator and engine settings
    ///
    /// # Errors
    /// * `AlreadyInitialized` - Contract has already been initialized
    /// * `InvalidConfig` - Batch size outside 1..=50 or max signers below 2
    pub fn initialize(env: Env, admin: Address, config: EngineConfig) -> Result<(), TreasuryError> {
        if storage::is_initialized(&env) {
            return Err(TreasuryError::AlreadyInitialized);
        }
        admin.require_auth();
        validate_config(&config)?;

        storage::set_admin(&env, &admin);
        storage::set_config(&env, &config);
        storage::set_initialized(&env);
        storage::bump_instance(&env);

        events::emit_config_updated(&env, &admin, &config);
        Ok(())
    }

    /// Replace the engine settings (contract admin only)
    pub fn update_config(env: Env, admin: Address, config: EngineConfig) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        require_admin(&env, &admin)?;
        validate_config(&config)?;

        storage::set_config(&env, &config);
        events::emit_config_updated(&env, &admin, &config);
        Ok(())
    }

    pub fn get_config(env: Env) -> Result<EngineConfig, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_config(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    // ========================================================================
    // Treasury
    // ========================================================================

    /// Create a treasury and mint its admin capability to `creator`
    ///
    /// # Arguments
    /// * `signers` - Regular signer set, at least two unique addresses
    /// * `threshold` - Signatures required per proposal, in `[2, signers]`
    /// * `emergency_signers` - Emergency signer set, may be empty
    /// * `emergency_threshold` - In `[1, emergency_signers]` when the set is non-empty
    ///
    /// # Errors
    /// * `TooFewSigners`, `TooManySigners`, `DuplicateSigner`
    /// * `InvalidThreshold` - Threshold outside `[2, signers]`
    /// * `InvalidEmergencyThreshold` - Emergency threshold out of range
    pub fn create_treasury(
        env: Env,
        creator: Address,
        signers: Vec<Address>,
        threshold: u32,
        emergency_signers: Vec<Address>,
        emergency_threshold: u32,
    ) -> Result<AdminCap, TreasuryError> {
        storage::require_initialized(&env)?;
        creator.require_auth();
        treasury::create(
            &env,
            &creator,
            signers,
            threshold,
            emergency_signers,
            emergency_threshold,
        )
    }

    /// Credit funds to a treasury; returns the new balance of `asset`
    ///
    /// # Errors
    /// * `InvalidAmount` - Amount is not positive
    /// * `TreasuryFrozen` - Treasury is frozen
    pub fn deposit(
        env: Env,
        treasury_id: u64,
        from: Address,
        asset: Address,
        amount: i128,
    ) -> Result<i128, TreasuryError> {
        storage::require_initialized(&env)?;
        from.require_auth();
        treasury::deposit(&env, treasury_id, &from, &asset, amount)
    }

    /// Freeze a treasury on the signature of a single emergency signer
    pub fn emergency_freeze(
        env: Env,
        treasury_id: u64,
        signer: Address,
        reason: String,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        signer.require_auth();
        emergency::freeze(&env, treasury_id, &signer, reason)
    }

    /// Lift a freeze (admin capability holder only)
    pub fn unfreeze(env: Env, treasury_id: u64, holder: Address) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        emergency::unfreeze(&env, treasury_id, &holder)
    }

    /// Replace the regular signer set and threshold (admin capability holder only)
    pub fn reconfigure_signers(
        env: Env,
        treasury_id: u64,
        holder: Address,
        new_signers: Vec<Address>,
        new_threshold: u32,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        treasury::reconfigure_signers(&env, treasury_id, &holder, new_signers, new_threshold)
    }

    pub fn reconfigure_emergency_signers(
        env: Env,
        treasury_id: u64,
        holder: Address,
        new_signers: Vec<Address>,
        new_threshold: u32,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        treasury::reconfigure_emergency_signers(
            &env,
            treasury_id,
            &holder,
            new_signers,
            new_threshold,
        )
    }

    /// Set or clear the contract consulted for every recorded signature
    pub fn set_verifier(
        env: Env,
        treasury_id: u64,
        holder: Address,
        verifier: Option<Address>,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        treasury::set_verifier(&env, treasury_id, &holder, verifier)
    }

    pub fn transfer_admin_cap(
        env: Env,
        treasury_id: u64,
        holder: Address,
        new_holder: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        treasury::transfer_admin_cap(&env, treasury_id, &holder, &new_holder)
    }

    pub fn get_treasury(env: Env, treasury_id: u64) -> Result<Treasury, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_treasury(&env, treasury_id)
    }

    pub fn get_balance(env: Env, treasury_id: u64, asset: Address) -> Result<i128, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_treasury(&env, treasury_id)?;
        Ok(storage::get_balance(&env, treasury_id, &asset))
    }

    pub fn get_admin_cap(env: Env, treasury_id: u64) -> Result<AdminCap, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_admin_cap(&env, treasury_id)
    }

    // ========================================================================
    // Proposals
    // ========================================================================

    /// Create a spending proposal
    ///
    /// The proposer must be a signer of the treasury and authorize this call.
    ///
    /// # Errors
    /// * `TreasuryFrozen` - Treasury is frozen
    /// * `NotASigner` - Proposer is not a signer
    /// * `EmptyBatch`, `BatchTooLarge`, `InvalidAmount`, `InvalidCategory`
    /// * `TimeLockBelowMinimum` - Time-lock below the configured minimum
    /// * Policy violation codes when an active policy rejects the batch
    pub fn create_proposal(
        env: Env,
        treasury_id: u64,
        proposer: Address,
        transactions: Vec<Transaction>,
        category: u32,
        time_lock_duration: u64,
        metadata: Bytes,
    ) -> Result<u64, TreasuryError> {
        storage::require_initialized(&env)?;
        proposer.require_auth();
        proposal::create(
            &env,
            treasury_id,
            &proposer,
            transactions,
            category,
            time_lock_duration,
            metadata,
        )
    }

    /// Sign a proposal; returns its status after the signature is counted
    ///
    /// # Errors
    /// * `InvalidProposalStatus` - Proposal is final, or executable with enough signatures
    /// * `NotASigner` - Signer is not in the treasury signer set
    /// * `AlreadySigned` - Signer has already signed this proposal
    /// * `InvalidSignature` - The treasury verifier rejected the signature
    pub fn sign_proposal(
        env: Env,
        proposal_id: u64,
        signer: Address,
        signature: Bytes,
    ) -> Result<ProposalStatus, TreasuryError> {
        storage::require_initialized(&env)?;
        signer.require_auth();
        proposal::sign(&env, proposal_id, &signer, signature)
    }

    /// Execute an executable proposal
    ///
    /// # Errors
    /// * `InvalidProposalStatus` - Proposal is not executable
    /// * `TreasuryFrozen` - Treasury is frozen
    /// * `TimeLockActive` - Time-lock has not elapsed
    /// * `InsufficientSignatures` - Signer set or threshold changed since signing
    /// * `InsufficientFunds` - A balance cannot cover the batch
    /// * Policy violation codes when an active policy rejects the batch
    pub fn execute_proposal(
        env: Env,
        proposal_id: u64,
        executor: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        executor.require_auth();
        proposal::execute(&env, proposal_id, &executor)
    }

    /// Cancel a proposal (proposer, or veto signer of a matching approval policy)
    pub fn cancel_proposal(
        env: Env,
        proposal_id: u64,
        caller: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        caller.require_auth();
        proposal::cancel(&env, proposal_id, &caller)
    }

    /// Cancel a proposal with the authorization of every current signer
    ///
    /// `caller` must be one of them; the authorizations of all signers,
    /// including the caller, are required in the same invocation.
    pub fn veto_proposal(
        env: Env,
        proposal_id: u64,
        caller: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        proposal::veto(&env, proposal_id, &caller)
    }

    /// Evaluate the proposal against active policies without failing
    pub fn validate_proposal(
        env: Env,
        proposal_id: u64,
    ) -> Result<Option<PolicyViolation>, TreasuryError> {
        storage::require_initialized(&env)?;
        proposal::validate(&env, proposal_id)
    }

    pub fn get_proposal(env: Env, proposal_id: u64) -> Result<Proposal, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_proposal(&env, proposal_id)
    }

    /// Sum of the proposal's transaction amounts
    pub fn get_batch_total(env: Env, proposal_id: u64) -> Result<i128, TreasuryError> {
        storage::require_initialized(&env)?;
        proposal::batch_total(&env, proposal_id)
    }

    // ========================================================================
    // Policies
    // ========================================================================

    /// Bind a new active policy to a treasury (admin capability holder only)
    pub fn create_policy(
        env: Env,
        treasury_id: u64,
        holder: Address,
        rule: PolicyRule,
    ) -> Result<u64, TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        policy::create_policy(&env, treasury_id, &holder, rule)
    }

    pub fn activate_policy(env: Env, policy_id: u64, holder: Address) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        policy::set_active(&env, policy_id, &holder, true)
    }

    pub fn deactivate_policy(
        env: Env,
        policy_id: u64,
        holder: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        holder.require_auth();
        policy::set_active(&env, policy_id, &holder, false)
    }

    pub fn get_policy(env: Env, policy_id: u64) -> Result<Policy, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_policy(&env, policy_id)
    }

    pub fn get_policies(env: Env, treasury_id: u64) -> Result<Vec<Policy>, TreasuryError> {
        storage::require_initialized(&env)?;
        policy::get_policies(&env, treasury_id)
    }

    /// Current spend of a category with elapsed windows already reset
    pub fn get_spending_tracker(
        env: Env,
        treasury_id: u64,
        category: u32,
    ) -> Result<SpendingTracker, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_treasury(&env, treasury_id)?;
        Ok(policy::load_tracker(&env, treasury_id, category))
    }

    // ========================================================================
    // Emergency path
    // ========================================================================

    /// Propose an emergency withdrawal (emergency signers only)
    pub fn create_emergency_proposal(
        env: Env,
        treasury_id: u64,
        proposer: Address,
        recipient: Address,
        amount: i128,
        asset: Address,
        reason: String,
    ) -> Result<u64, TreasuryError> {
        storage::require_initialized(&env)?;
        proposer.require_auth();
        emergency::create(&env, treasury_id, &proposer, recipient, amount, asset, reason)
    }

    /// Sign an emergency proposal; returns the signature count
    pub fn sign_emergency_proposal(
        env: Env,
        emergency_id: u64,
        signer: Address,
        signature: Bytes,
    ) -> Result<u32, TreasuryError> {
        storage::require_initialized(&env)?;
        signer.require_auth();
        emergency::sign(&env, emergency_id, &signer, signature)
    }

    /// Execute an emergency withdrawal
    ///
    /// # Errors
    /// * `AlreadyExecuted` - Emergency proposal was already executed
    /// * `NotAnEmergencySigner` - Executor is not an emergency signer
    /// * `InsufficientSignatures` - Emergency threshold not met
    /// * `CooldownActive` - Previous emergency withdrawal is too recent
    /// * `InsufficientFunds` - Balance cannot cover the amount
    pub fn execute_emergency_withdrawal(
        env: Env,
        emergency_id: u64,
        executor: Address,
    ) -> Result<(), TreasuryError> {
        storage::require_initialized(&env)?;
        executor.require_auth();
        emergency::execute(&env, emergency_id, &executor)
    }

    pub fn get_emergency_proposal(
        env: Env,
        emergency_id: u64,
    ) -> Result<EmergencyProposal, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_emergency_proposal(&env, emergency_id)
    }

    pub fn get_cooldown(env: Env, treasury_id: u64) -> Result<EmergencyCooldown, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_treasury(&env, treasury_id)?;
        Ok(storage::get_cooldown(&env, treasury_id))
    }

    pub fn get_audit_log(env: Env, treasury_id: u64) -> Result<Vec<AuditEntry>, TreasuryError> {
        storage::require_initialized(&env)?;
        storage::get_treasury(&env, treasury_id)?;
        Ok(storage::get_audit_log(&env, treasury_id))
    }
}

#[cfg(test)]
mod tests;
