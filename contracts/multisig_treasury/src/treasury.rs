//! Treasury accounts: signer configuration, balances, freeze flag and the
//! admin capability.

use soroban_sdk::{log, xdr::ToXdr, Address, Bytes, BytesN, Env, IntoVal, Symbol, Val, Vec};

use crate::error::TreasuryError;
use crate::events;
use crate::storage::{self, DataKey};
use crate::types::{AdminCap, EngineConfig, Treasury, MIN_SIGNERS};

/// Which authorization channel is moving funds
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum WithdrawalPath {
    /// Time-locked proposal; blocked while frozen
    Proposal,
    /// Emergency withdrawal; allowed while frozen
    Emergency,
}

pub fn contains(list: &Vec<Address>, address: &Address) -> bool {
    list.iter().any(|entry| &entry == address)
}

fn check_unique(list: &Vec<Address>) -> Result<(), TreasuryError> {
    for i in 0..list.len() {
        for j in (i + 1)..list.len() {
            if list.get_unchecked(i) == list.get_unchecked(j) {
                return Err(TreasuryError::DuplicateSigner);
            }
        }
    }
    Ok(())
}

/// Validate a regular signer set: at least two unique signers and a
/// threshold in `[2, signer count]`.
pub fn validate_signers(
    config: &EngineConfig,
    signers: &Vec<Address>,
    threshold: u32,
) -> Result<(), TreasuryError> {
    if signers.len() < MIN_SIGNERS {
        return Err(TreasuryError::TooFewSigners);
    }
    if signers.len() > config.max_signers {
        return Err(TreasuryError::TooManySigners);
    }
    check_unique(signers)?;
    if threshold < MIN_SIGNERS || threshold > signers.len() {
        return Err(TreasuryError::InvalidThreshold);
    }
    Ok(())
}

/// Validate an emergency signer set. An empty set disables the emergency
/// path and its threshold is stored as zero.
pub fn validate_emergency_signers(
    config: &EngineConfig,
    signers: &Vec<Address>,
    threshold: u32,
) -> Result<u32, TreasuryError> {
    if signers.is_empty() {
        return Ok(0);
    }
    if signers.len() > config.max_signers {
        return Err(TreasuryError::TooManySigners);
    }
    check_unique(signers)?;
    if threshold == 0 || threshold > signers.len() {
        return Err(TreasuryError::InvalidEmergencyThreshold);
    }
    Ok(threshold)
}

pub fn require_signer(treasury: &Treasury, address: &Address) -> Result<(), TreasuryError> {
    if !contains(&treasury.signers, address) {
        return Err(TreasuryError::NotASigner);
    }
    Ok(())
}

pub fn require_emergency_signer(
    treasury: &Treasury,
    address: &Address,
) -> Result<(), TreasuryError> {
    if !contains(&treasury.emergency_signers, address) {
        return Err(TreasuryError::NotAnEmergencySigner);
    }
    Ok(())
}

/// Check that `holder` owns the admin capability of the treasury
pub fn require_cap_holder(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
) -> Result<AdminCap, TreasuryError> {
    let cap = storage::get_admin_cap(env, treasury_id)?;
    if &cap.holder != holder {
        return Err(TreasuryError::NotCapHolder);
    }
    Ok(cap)
}

/// Message digest a signer commits to: SHA-256 of the payload's XDR
pub fn payload_hash<T: IntoVal<Env, Val>>(env: &Env, payload: T) -> BytesN<32> {
    env.crypto().sha256(&payload.to_xdr(env)).to_bytes()
}

/// Consult the treasury's verifier contract, if any, for one signature
pub fn verify_signature(
    env: &Env,
    treasury: &Treasury,
    signer: &Address,
    payload_hash: &BytesN<32>,
    signature: &Bytes,
) -> Result<(), TreasuryError> {
    let Some(verifier) = &treasury.verifier else {
        return Ok(());
    };
    let valid: bool = env.invoke_contract(
        verifier,
        &Symbol::new(env, "verify"),
        (signer.clone(), payload_hash.clone(), signature.clone()).into_val(env),
    );
    if !valid {
        return Err(TreasuryError::InvalidSignature);
    }
    Ok(())
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Create a treasury and mint its admin capability to `creator`
pub fn create(
    env: &Env,
    creator: &Address,
    signers: Vec<Address>,
    threshold: u32,
    emergency_signers: Vec<Address>,
    emergency_threshold: u32,
) -> Result<AdminCap, TreasuryError> {
    let config = storage::get_config(env)?;
    validate_signers(&config, &signers, threshold)?;
    let emergency_threshold =
        validate_emergency_signers(&config, &emergency_signers, emergency_threshold)?;

    let treasury = Treasury {
        id: storage::next_id(env, DataKey::NextTreasuryId),
        signers,
        threshold,
        emergency_signers,
        emergency_threshold,
        frozen: false,
        policy_ids: Vec::new(env),
        verifier: None,
        created_at: env.ledger().timestamp(),
    };
    let cap = AdminCap {
        id: storage::next_id(env, DataKey::NextCapId),
        treasury_id: treasury.id,
        holder: creator.clone(),
    };

    storage::set_treasury(env, &treasury);
    storage::set_admin_cap(env, &cap);

    log!(env, "treasury created", treasury.id, threshold);
    events::emit_treasury_created(env, &treasury, cap.id, creator);

    Ok(cap)
}

/// Credit `amount` of `asset` to the treasury
pub fn deposit(
    env: &Env,
    treasury_id: u64,
    from: &Address,
    asset: &Address,
    amount: i128,
) -> Result<i128, TreasuryError> {
    if amount <= 0 {
        return Err(TreasuryError::InvalidAmount);
    }
    let treasury = storage::get_treasury(env, treasury_id)?;
    if treasury.frozen {
        return Err(TreasuryError::TreasuryFrozen);
    }

    let balance = storage::get_balance(env, treasury_id, asset)
        .checked_add(amount)
        .ok_or(TreasuryError::ArithmeticOverflow)?;
    storage::set_balance(env, treasury_id, asset, balance);

    events::emit_deposited(env, treasury_id, from, asset, amount, balance);
    Ok(balance)
}

/// Debit `amount` of `asset`. Only reachable from the proposal and
/// emergency paths, which have already authorized the movement.
pub(crate) fn withdraw(
    env: &Env,
    treasury: &Treasury,
    asset: &Address,
    amount: i128,
    path: WithdrawalPath,
) -> Result<i128, TreasuryError> {
    if path == WithdrawalPath::Proposal && treasury.frozen {
        return Err(TreasuryError::TreasuryFrozen);
    }
    if amount <= 0 {
        return Err(TreasuryError::InvalidAmount);
    }
    let balance = storage::get_balance(env, treasury.id, asset);
    if balance < amount {
        return Err(TreasuryError::InsufficientFunds);
    }
    let remaining = balance - amount;
    storage::set_balance(env, treasury.id, asset, remaining);
    Ok(remaining)
}

/// Set the frozen flag. Any emergency signer may freeze; freezing an
/// already frozen treasury succeeds.
pub fn freeze(env: &Env, treasury_id: u64, signer: &Address) -> Result<(), TreasuryError> {
    let mut treasury = storage::get_treasury(env, treasury_id)?;
    require_emergency_signer(&treasury, signer)?;

    treasury.frozen = true;
    storage::set_treasury(env, &treasury);

    events::emit_frozen(env, treasury_id, signer);
    Ok(())
}

pub fn unfreeze(env: &Env, treasury_id: u64, holder: &Address) -> Result<(), TreasuryError> {
    require_cap_holder(env, treasury_id, holder)?;
    let mut treasury = storage::get_treasury(env, treasury_id)?;

    treasury.frozen = false;
    storage::set_treasury(env, &treasury);

    events::emit_unfrozen(env, treasury_id, holder);
    Ok(())
}

// ============================================================================
// Reconfiguration (admin capability)
// ============================================================================

pub fn reconfigure_signers(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
    new_signers: Vec<Address>,
    new_threshold: u32,
) -> Result<(), TreasuryError> {
    require_cap_holder(env, treasury_id, holder)?;
    let config = storage::get_config(env)?;
    validate_signers(&config, &new_signers, new_threshold)?;

    let mut treasury = storage::get_treasury(env, treasury_id)?;
    treasury.signers = new_signers;
    treasury.threshold = new_threshold;
    storage::set_treasury(env, &treasury);

    log!(env, "signers reconfigured", treasury_id, new_threshold);
    events::emit_signers_reconfigured(env, &treasury);
    Ok(())
}

pub fn reconfigure_emergency_signers(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
    new_signers: Vec<Address>,
    new_threshold: u32,
) -> Result<(), TreasuryError> {
    require_cap_holder(env, treasury_id, holder)?;
    let config = storage::get_config(env)?;
    let new_threshold = validate_emergency_signers(&config, &new_signers, new_threshold)?;

    let mut treasury = storage::get_treasury(env, treasury_id)?;
    treasury.emergency_signers = new_signers;
    treasury.emergency_threshold = new_threshold;
    storage::set_treasury(env, &treasury);

    events::emit_emergency_signers_reconfigured(env, &treasury);
    Ok(())
}

pub fn set_verifier(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
    verifier: Option<Address>,
) -> Result<(), TreasuryError> {
    require_cap_holder(env, treasury_id, holder)?;
    let mut treasury = storage::get_treasury(env, treasury_id)?;
    treasury.verifier = verifier;
    storage::set_treasury(env, &treasury);

    events::emit_verifier_updated(env, &treasury);
    Ok(())
}

pub fn transfer_admin_cap(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
    new_holder: &Address,
) -> Result<(), TreasuryError> {
    let mut cap = require_cap_holder(env, treasury_id, holder)?;
    cap.holder = new_holder.clone();
    storage::set_admin_cap(env, &cap);

    events::emit_admin_cap_transferred(env, treasury_id, cap.id, holder, new_holder);
    Ok(())
}
