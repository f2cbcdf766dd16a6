//! Emergency path: withdrawals approved by the emergency signer set that
//! skip the time-lock and policy checks, rate limited by a per-treasury
//! cooldown, plus immediate freezing. Every action lands in the audit log.

use soroban_sdk::{log, Address, Bytes, Env, String, Vec};

use crate::error::TreasuryError;
use crate::events;
use crate::policy::count_signed_by;
use crate::storage::{self, DataKey};
use crate::treasury::{self, WithdrawalPath};
use crate::types::{AuditAction, AuditEntry, EmergencyProposal, SignatureRecord};

fn record_audit(
    env: &Env,
    treasury_id: u64,
    action: AuditAction,
    actor: &Address,
    amount: i128,
    asset: Option<Address>,
    reason: String,
) {
    let entry = AuditEntry {
        treasury_id,
        action,
        actor: actor.clone(),
        amount,
        asset,
        timestamp: env.ledger().timestamp(),
        reason,
    };
    let index = storage::append_audit_entry(env, &entry);
    events::emit_audit_recorded(env, treasury_id, index, action, actor, &entry.reason);
}

pub fn create(
    env: &Env,
    treasury_id: u64,
    proposer: &Address,
    recipient: Address,
    amount: i128,
    asset: Address,
    reason: String,
) -> Result<u64, TreasuryError> {
    let treasury = storage::get_treasury(env, treasury_id)?;
    treasury::require_emergency_signer(&treasury, proposer)?;
    if amount <= 0 {
        return Err(TreasuryError::InvalidAmount);
    }

    let id = storage::next_id(env, DataKey::NextEmergencyId);
    let proposal = EmergencyProposal {
        id,
        treasury_id,
        proposer: proposer.clone(),
        payload_hash: treasury::payload_hash(
            env,
            (id, treasury_id, recipient.clone(), amount, asset.clone()),
        ),
        recipient,
        amount,
        asset,
        reason,
        signatures: Vec::new(env),
        created_at: env.ledger().timestamp(),
        executed: false,
    };
    storage::set_emergency_proposal(env, &proposal);

    events::emit_emergency_created(
        env,
        id,
        treasury_id,
        proposer,
        &proposal.recipient,
        &proposal.asset,
        amount,
    );
    Ok(id)
}

pub fn sign(
    env: &Env,
    emergency_id: u64,
    signer: &Address,
    signature: Bytes,
) -> Result<u32, TreasuryError> {
    let mut proposal = storage::get_emergency_proposal(env, emergency_id)?;
    if proposal.executed {
        return Err(TreasuryError::AlreadyExecuted);
    }

    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    treasury::require_emergency_signer(&treasury, signer)?;
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
    storage::set_emergency_proposal(env, &proposal);

    let count = proposal.signatures.len();
    events::emit_emergency_signed(env, emergency_id, signer, count);
    Ok(count)
}

/// Withdraw directly from the treasury, frozen or not, once the emergency
/// threshold is met and the cooldown has elapsed.
pub fn execute(env: &Env, emergency_id: u64, executor: &Address) -> Result<(), TreasuryError> {
    let config = storage::get_config(env)?;
    let mut proposal = storage::get_emergency_proposal(env, emergency_id)?;
    if proposal.executed {
        return Err(TreasuryError::AlreadyExecuted);
    }

    let treasury = storage::get_treasury(env, proposal.treasury_id)?;
    treasury::require_emergency_signer(&treasury, executor)?;

    if count_signed_by(&treasury.emergency_signers, &proposal.signatures)
        < treasury.emergency_threshold
    {
        return Err(TreasuryError::InsufficientSignatures);
    }

    let now = env.ledger().timestamp();
    let mut cooldown = storage::get_cooldown(env, treasury.id);
    if let Some(last) = cooldown.last_emergency {
        if now < last.saturating_add(config.emergency_cooldown) {
            return Err(TreasuryError::CooldownActive);
        }
    }

    treasury::withdraw(
        env,
        &treasury,
        &proposal.asset,
        proposal.amount,
        WithdrawalPath::Emergency,
    )?;
    events::emit_funds_transferred(
        env,
        treasury.id,
        &proposal.recipient,
        &proposal.asset,
        proposal.amount,
    );

    proposal.executed = true;
    storage::set_emergency_proposal(env, &proposal);

    cooldown.last_emergency = Some(now);
    storage::set_cooldown(env, &cooldown);

    record_audit(
        env,
        treasury.id,
        AuditAction::EmergencyWithdrawal,
        executor,
        proposal.amount,
        Some(proposal.asset.clone()),
        proposal.reason.clone(),
    );

    log!(env, "emergency withdrawal", emergency_id, proposal.amount);
    events::emit_emergency_executed(env, emergency_id, treasury.id, executor, proposal.amount);
    Ok(())
}

/// Freeze on a single emergency signature
pub fn freeze(
    env: &Env,
    treasury_id: u64,
    signer: &Address,
    reason: String,
) -> Result<(), TreasuryError> {
    treasury::freeze(env, treasury_id, signer)?;
    record_audit(
        env,
        treasury_id,
        AuditAction::EmergencyFreeze,
        signer,
        0,
        None,
        reason,
    );
    log!(env, "treasury frozen", treasury_id);
    Ok(())
}

pub fn unfreeze(env: &Env, treasury_id: u64, holder: &Address) -> Result<(), TreasuryError> {
    treasury::unfreeze(env, treasury_id, holder)?;
    record_audit(
        env,
        treasury_id,
        AuditAction::Unfreeze,
        holder,
        0,
        None,
        String::from_str(env, ""),
    );
    Ok(())
}
