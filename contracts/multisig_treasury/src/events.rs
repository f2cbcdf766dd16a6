//! Events published for external indexers, one per state transition

use soroban_sdk::{contractevent, Address, Env, String};

use crate::types::{
    AuditAction, EngineConfig, PolicyKind, PolicyViolation, Proposal, Treasury, ViolationKind,
};

#[contractevent(topics = ["Treasury", "CONFIG"])]
pub struct ConfigUpdated {
    pub admin: Address,
    pub max_batch_size: u32,
    pub min_time_lock: u64,
    pub emergency_cooldown: u64,
}

#[contractevent(topics = ["Treasury", "CREATED"])]
pub struct TreasuryCreated {
    pub treasury_id: u64,
    pub cap_id: u64,
    pub creator: Address,
    pub signer_count: u32,
    pub threshold: u32,
    pub emergency_signer_count: u32,
    pub emergency_threshold: u32,
}

#[contractevent(topics = ["Treasury", "DEPOSIT"])]
pub struct Deposited {
    pub treasury_id: u64,
    pub from: Address,
    pub asset: Address,
    pub amount: i128,
    pub balance: i128,
}

#[contractevent(topics = ["Treasury", "FROZEN"])]
pub struct Frozen {
    pub treasury_id: u64,
    pub by: Address,
}

#[contractevent(topics = ["Treasury", "UNFROZEN"])]
pub struct Unfrozen {
    pub treasury_id: u64,
    pub by: Address,
}

#[contractevent(topics = ["Treasury", "RECONFIG"])]
pub struct SignersReconfigured {
    pub treasury_id: u64,
    pub signer_count: u32,
    pub threshold: u32,
}

#[contractevent(topics = ["Treasury", "EMRG_RECONFIG"])]
pub struct EmergencySignersReconfigured {
    pub treasury_id: u64,
    pub signer_count: u32,
    pub threshold: u32,
}

#[contractevent(topics = ["Treasury", "VERIFIER"])]
pub struct VerifierUpdated {
    pub treasury_id: u64,
    pub verifier: Option<Address>,
}

#[contractevent(topics = ["Treasury", "CAP_MOVED"])]
pub struct AdminCapTransferred {
    pub treasury_id: u64,
    pub cap_id: u64,
    pub from: Address,
    pub to: Address,
}

#[contractevent(topics = ["Treasury", "PROPOSED"])]
pub struct ProposalCreated {
    pub proposal_id: u64,
    pub treasury_id: u64,
    pub proposer: Address,
    pub category: u32,
    pub transaction_count: u32,
    pub total: i128,
    pub time_lock_end: u64,
}

#[contractevent(topics = ["Treasury", "SIGNED"])]
pub struct ProposalSigned {
    pub proposal_id: u64,
    pub signer: Address,
    pub signature_count: u32,
    pub executable: bool,
}

#[contractevent(topics = ["Treasury", "EXECUTED"])]
pub struct ProposalExecuted {
    pub proposal_id: u64,
    pub treasury_id: u64,
    pub executor: Address,
    pub total: i128,
}

#[contractevent(topics = ["Treasury", "CANCELLED"])]
pub struct ProposalCancelled {
    pub proposal_id: u64,
    pub cancelled_by: Address,
}

#[contractevent(topics = ["Treasury", "TRANSFER"])]
pub struct FundsTransferred {
    pub treasury_id: u64,
    pub recipient: Address,
    pub asset: Address,
    pub amount: i128,
}

#[contractevent(topics = ["Treasury", "POLICY_NEW"])]
pub struct PolicyCreated {
    pub policy_id: u64,
    pub treasury_id: u64,
    pub kind: PolicyKind,
}

#[contractevent(topics = ["Treasury", "POLICY_SET"])]
pub struct PolicyToggled {
    pub policy_id: u64,
    pub active: bool,
}

#[contractevent(topics = ["Treasury", "VIOLATION"])]
pub struct PolicyViolated {
    pub proposal_id: u64,
    pub policy_id: u64,
    pub kind: ViolationKind,
    pub limit: i128,
    pub actual: i128,
}

#[contractevent(topics = ["Treasury", "EMRG_NEW"])]
pub struct EmergencyProposalCreated {
    pub emergency_id: u64,
    pub treasury_id: u64,
    pub proposer: Address,
    pub recipient: Address,
    pub asset: Address,
    pub amount: i128,
}

#[contractevent(topics = ["Treasury", "EMRG_SIGNED"])]
pub struct EmergencyProposalSigned {
    pub emergency_id: u64,
    pub signer: Address,
    pub signature_count: u32,
}

#[contractevent(topics = ["Treasury", "EMRG_EXEC"])]
pub struct EmergencyExecuted {
    pub emergency_id: u64,
    pub treasury_id: u64,
    pub executor: Address,
    pub amount: i128,
}

#[contractevent(topics = ["Treasury", "AUDIT"])]
pub struct AuditRecorded {
    pub treasury_id: u64,
    pub index: u32,
    pub action: AuditAction,
    pub actor: Address,
    pub reason: String,
}

pub fn emit_config_updated(env: &Env, admin: &Address, config: &EngineConfig) {
    ConfigUpdated {
        admin: admin.clone(),
        max_batch_size: config.max_batch_size,
        min_time_lock: config.min_time_lock,
        emergency_cooldown: config.emergency_cooldown,
    }
    .publish(env);
}

pub fn emit_treasury_created(env: &Env, treasury: &Treasury, cap_id: u64, creator: &Address) {
    TreasuryCreated {
        treasury_id: treasury.id,
        cap_id,
        creator: creator.clone(),
        signer_count: treasury.signers.len(),
        threshold: treasury.threshold,
        emergency_signer_count: treasury.emergency_signers.len(),
        emergency_threshold: treasury.emergency_threshold,
    }
    .publish(env);
}

pub fn emit_deposited(
    env: &Env,
    treasury_id: u64,
    from: &Address,
    asset: &Address,
    amount: i128,
    balance: i128,
) {
    Deposited {
        treasury_id,
        from: from.clone(),
        asset: asset.clone(),
        amount,
        balance,
    }
    .publish(env);
}

pub fn emit_frozen(env: &Env, treasury_id: u64, by: &Address) {
    Frozen {
        treasury_id,
        by: by.clone(),
    }
    .publish(env);
}

pub fn emit_unfrozen(env: &Env, treasury_id: u64, by: &Address) {
    Unfrozen {
        treasury_id,
        by: by.clone(),
    }
    .publish(env);
}

pub fn emit_signers_reconfigured(env: &Env, treasury: &Treasury) {
    SignersReconfigured {
        treasury_id: treasury.id,
        signer_count: treasury.signers.len(),
        threshold: treasury.threshold,
    }
    .publish(env);
}

pub fn emit_emergency_signers_reconfigured(env: &Env, treasury: &Treasury) {
    EmergencySignersReconfigured {
        treasury_id: treasury.id,
        signer_count: treasury.emergency_signers.len(),
        threshold: treasury.emergency_threshold,
    }
    .publish(env);
}

pub fn emit_verifier_updated(env: &Env, treasury: &Treasury) {
    VerifierUpdated {
        treasury_id: treasury.id,
        verifier: treasury.verifier.clone(),
    }
    .publish(env);
}

pub fn emit_admin_cap_transferred(
    env: &Env,
    treasury_id: u64,
    cap_id: u64,
    from: &Address,
    to: &Address,
) {
    AdminCapTransferred {
        treasury_id,
        cap_id,
        from: from.clone(),
        to: to.clone(),
    }
    .publish(env);
}

pub fn emit_proposal_created(env: &Env, proposal: &Proposal, total: i128) {
    ProposalCreated {
        proposal_id: proposal.id,
        treasury_id: proposal.treasury_id,
        proposer: proposal.proposer.clone(),
        category: proposal.category,
        transaction_count: proposal.transactions.len(),
        total,
        time_lock_end: proposal.time_lock_end,
    }
    .publish(env);
}

pub fn emit_proposal_signed(env: &Env, proposal: &Proposal, signer: &Address, executable: bool) {
    ProposalSigned {
        proposal_id: proposal.id,
        signer: signer.clone(),
        signature_count: proposal.signatures.len(),
        executable,
    }
    .publish(env);
}

pub fn emit_proposal_executed(env: &Env, proposal: &Proposal, executor: &Address, total: i128) {
    ProposalExecuted {
        proposal_id: proposal.id,
        treasury_id: proposal.treasury_id,
        executor: executor.clone(),
        total,
    }
    .publish(env);
}

pub fn emit_proposal_cancelled(env: &Env, proposal_id: u64, cancelled_by: &Address) {
    ProposalCancelled {
        proposal_id,
        cancelled_by: cancelled_by.clone(),
    }
    .publish(env);
}

pub fn emit_funds_transferred(
    env: &Env,
    treasury_id: u64,
    recipient: &Address,
    asset: &Address,
    amount: i128,
) {
    FundsTransferred {
        treasury_id,
        recipient: recipient.clone(),
        asset: asset.clone(),
        amount,
    }
    .publish(env);
}

pub fn emit_policy_created(env: &Env, policy_id: u64, treasury_id: u64, kind: PolicyKind) {
    PolicyCreated {
        policy_id,
        treasury_id,
        kind,
    }
    .publish(env);
}

pub fn emit_policy_toggled(env: &Env, policy_id: u64, active: bool) {
    PolicyToggled { policy_id, active }.publish(env);
}

pub fn emit_policy_violated(env: &Env, proposal_id: u64, violation: &PolicyViolation) {
    PolicyViolated {
        proposal_id,
        policy_id: violation.policy_id,
        kind: violation.kind,
        limit: violation.limit,
        actual: violation.actual,
    }
    .publish(env);
}

pub fn emit_emergency_created(
    env: &Env,
    emergency_id: u64,
    treasury_id: u64,
    proposer: &Address,
    recipient: &Address,
    asset: &Address,
    amount: i128,
) {
    EmergencyProposalCreated {
        emergency_id,
        treasury_id,
        proposer: proposer.clone(),
        recipient: recipient.clone(),
        asset: asset.clone(),
        amount,
    }
    .publish(env);
}

pub fn emit_emergency_signed(env: &Env, emergency_id: u64, signer: &Address, count: u32) {
    EmergencyProposalSigned {
        emergency_id,
        signer: signer.clone(),
        signature_count: count,
    }
    .publish(env);
}

pub fn emit_emergency_executed(
    env: &Env,
    emergency_id: u64,
    treasury_id: u64,
    executor: &Address,
    amount: i128,
) {
    EmergencyExecuted {
        emergency_id,
        treasury_id,
        executor: executor.clone(),
        amount,
    }
    .publish(env);
}

pub fn emit_audit_recorded(
    env: &Env,
    treasury_id: u64,
    index: u32,
    action: AuditAction,
    actor: &Address,
    reason: &String,
) {
    AuditRecorded {
        treasury_id,
        index,
        action,
        actor: actor.clone(),
        reason: reason.clone(),
    }
    .publish(env);
}
