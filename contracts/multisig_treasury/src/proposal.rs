//! Spending proposals: batch creation, signature collection, time-locked
//! execution and cancellation.

use soroban_sdk::{log, Address, Bytes, Env, Map, Vec};

use crate::error::TreasuryError;
use crate::events;
use crate::policy::{self, Stage};
use crate::storage::{self, DataKey};
use crate::treasury::{self, WithdrawalPath};
use crate::types::{
    CancelMode, PolicyViolation, Proposal, ProposalStatus, SignatureRecord, Transaction,
    MAX_CATEGORY,
};

fn validate_batch(
    transactions: &Vec<Transaction>,
    max_batch_size: u32,
) -> Result<(), TreasuryError> {
    if transactions.is_empty() {
        return Err(TreasuryError::EmptyBatch);
    }
    if transactions.len() > max_batch_size {
        return Err(TreasuryError::BatchTooLarge);
    }
    if transactions.iter().any(|tx| tx.amount <= 0) {
        return Err(TreasuryError::InvalidAmount);
    }
    Ok(())
}

/// Create a proposal against a live, unfrozen treasury. The proposer must
/// be a signer and the batch must pass every active policy.
pub fn create(
    env: &Env,
    treasury_id: u64,
    proposer: &Address,
    transactions: Vec<Transaction>,
    category: u32,
    time_lock_duration: u64,
    metadata: Bytes,
) -> Result<u64, TreasuryError> {
    let config = storage::get_config(env)?;
    let treasury = storage::get_treasury(env, treasury_id)?;
    if treasury.frozen {
        return Err(TreasuryError::TreasuryFrozen);
    }
    treasury::require_signer(&treasury, proposer)?;

    validate_batch(&transactions, config.max_batch_size)?;
    if category > MAX_CATEGORY {
        return Err(TreasuryError::InvalidCategory);
    }
    if time_lock_duration < config.min_time_lock {
        return Err(TreasuryError::TimeLockBelowMinimum);
    }

    let now = env.ledger().timestamp();
    let time_lock_end = now
        .checked_add(time_lock_duration)
        .ok_or(TreasuryError::ArithmeticOverflow)?;
    let id = storage::next_id(env, DataKey::NextProposalId);

    let proposal = Proposal {
        id,
        treasury_id,
        proposer: proposer.clone(),
        payload_hash: treasury::payload_hash(env, (id, treasury_id, transactions.clone())),
        transactions,
        category,
        signatures: Vec::new(env),
        created_at: now,
        time_lock_end,
        status: ProposalStatus::Created,
        metadata,
        executed_at: None,
    };

    policy::enforce(env, &treasury, &proposal, Stage::Creation)?;

    storage::set_proposal(env, &proposal);

    let total = policy::batch_total(&proposal.transactions)?;
    events::emit_proposal_created(env, &proposal, total);

    Ok(id)
}

/// Record one signature and recompute the status. Executable proposals
/// accept signatures only while the current signer set and signature rules
/// are no longer satisfied.
pub fn sign(
    env: &Env,
    proposal_id: u64,
    signer: &Address,
    signature: Bytes,
) -> Result<ProposalStatus, TreasuryError> {
    let mut proposal = storage::get_proposal(env, proposal_id)?;
    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    match proposal.status {
        ProposalStatus::Created | ProposalStatus::Signed => {}
        // A reconfiguration or a new signature rule can leave an executable
        // proposal short of signatures again
        ProposalStatus::Executable
            if !policy::signatures_satisfied(env, &treasury, &proposal)? => {}
        _ => return Err(TreasuryError::InvalidProposalStatus),
    }

    treasury::require_signer(&treasury, signer)?;

    if proposal
        .signatures
        .iter()
        .any(|record| &record.signer == signer)
    {
        return Err(TreasuryError::AlreadySigned);
    }

    treasury::verify_signature(env, &treasury, signer, &proposal.payload_hash, &signature)?;

    proposal.signatures.push_back(SignatureRecord {
        signer: signer.clone(),
        signature,
        signed_at: env.ledger().timestamp(),
    });

    let executable = policy::signatures_satisfied(env, &treasury, &proposal)?;
    proposal.status = if executable {
        ProposalStatus::Executable
    } else {
        ProposalStatus::Signed
    };
    storage::set_proposal(env, &proposal);

    events::emit_proposal_signed(env, &proposal, signer, executable);
    Ok(proposal.status)
}

/// Release every transaction of an executable proposal once its time-lock
/// has elapsed. Either all transfers apply or none do.
pub fn execute(env: &Env, proposal_id: u64, executor: &Address) -> Result<(), TreasuryError> {
    let mut proposal = storage::get_proposal(env, proposal_id)?;
    if proposal.status != ProposalStatus::Executable {
        return Err(TreasuryError::InvalidProposalStatus);
    }

    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    treasury::require_signer(&treasury, executor)?;
    if treasury.frozen {
        return Err(TreasuryError::TreasuryFrozen);
    }

    let now = env.ledger().timestamp();
    if now < proposal.time_lock_end {
        return Err(TreasuryError::TimeLockActive);
    }

    // Stale-state guard: the signer set or threshold may have changed
    if policy::count_signed_by(&treasury.signers, &proposal.signatures) < treasury.threshold {
        return Err(TreasuryError::InsufficientSignatures);
    }

    policy::enforce(env, &treasury, &proposal, Stage::Execution)?;

    // Check every asset total before the first debit
    let mut required: Map<Address, i128> = Map::new(env);
    for tx in proposal.transactions.iter() {
        let sum = required
            .get(tx.asset.clone())
            .unwrap_or(0)
            .checked_add(tx.amount)
            .ok_or(TreasuryError::ArithmeticOverflow)?;
        required.set(tx.asset, sum);
    }
    for (asset, amount) in required.iter() {
        if storage::get_balance(env, treasury.id, &asset) < amount {
            return Err(TreasuryError::InsufficientFunds);
        }
    }

    for tx in proposal.transactions.iter() {
        treasury::withdraw(env, &treasury, &tx.asset, tx.amount, WithdrawalPath::Proposal)?;
        events::emit_funds_transferred(env, treasury.id, &tx.recipient, &tx.asset, tx.amount);
    }

    proposal.status = ProposalStatus::Executed;
    proposal.executed_at = Some(now);
    storage::set_proposal(env, &proposal);

    let total = policy::batch_total(&proposal.transactions)?;
    policy::record_execution(env, treasury.id, proposal.category, total)?;

    log!(env, "proposal executed", proposal_id, total);
    events::emit_proposal_executed(env, &proposal, executor, total);
    Ok(())
}

fn mark_cancelled(
    env: &Env,
    mut proposal: Proposal,
    cancelled_by: &Address,
) -> Result<(), TreasuryError> {
    proposal.status = ProposalStatus::Cancelled;
    storage::set_proposal(env, &proposal);

    events::emit_proposal_cancelled(env, proposal.id, cancelled_by);
    Ok(())
}

/// Cancel a pending proposal. Allowed for the proposer and for veto
/// signers of an active approval policy covering its category.
pub fn cancel(env: &Env, proposal_id: u64, caller: &Address) -> Result<(), TreasuryError> {
    let proposal = storage::get_proposal(env, proposal_id)?;
    if proposal.status.is_terminal() {
        return Err(TreasuryError::InvalidProposalStatus);
    }

    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    if caller != &proposal.proposer && !policy::can_veto(env, &treasury, &proposal, caller)? {
        return Err(TreasuryError::CancelNotAuthorized);
    }

    mark_cancelled(env, proposal, caller)
}

/// Cancel a pending proposal with the authorization of every current
/// signer. Only available in `CancelMode::ProposerOrUnanimous`.
pub fn veto(env: &Env, proposal_id: u64, caller: &Address) -> Result<(), TreasuryError> {
    let config = storage::get_config(env)?;
    if config.cancel_mode != CancelMode::ProposerOrUnanimous {
        return Err(TreasuryError::CancelNotAuthorized);
    }

    let proposal = storage::get_proposal(env, proposal_id)?;
    if proposal.status.is_terminal() {
        return Err(TreasuryError::InvalidProposalStatus);
    }

    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    treasury::require_signer(&treasury, caller)?;
    for signer in treasury.signers.iter() {
        signer.require_auth();
    }

    mark_cancelled(env, proposal, caller)
}

/// Advisory policy check. Reports the first violation without aborting
/// and records it for indexers.
pub fn validate(env: &Env, proposal_id: u64) -> Result<Option<PolicyViolation>, TreasuryError> {
    let proposal = storage::get_proposal(env, proposal_id)?;
    let treasury = storage::get_treasury(env, proposal.treasury_id)?;

    let stage = if proposal.status == ProposalStatus::Executable {
        Stage::Execution
    } else {
        Stage::Creation
    };
    let found = policy::evaluate(env, &treasury, &proposal, stage)?;
    if let Some(violation) = &found {
        events::emit_policy_violated(env, proposal_id, violation);
    }
    Ok(found)
}

pub fn batch_total(env: &Env, proposal_id: u64) -> Result<i128, TreasuryError> {
    let proposal = storage::get_proposal(env, proposal_id)?;
    policy::batch_total(&proposal.transactions)
}
