//! Policy engine: typed rules bound to a treasury, evaluated against
//! proposals, and the rolling spend trackers they read.

use soroban_sdk::{log, Address, Env, Vec};

use crate::error::TreasuryError;
use crate::events;
use crate::storage::{self, DataKey};
use crate::treasury::{self, contains};
use crate::types::{
    Policy, PolicyRule, PolicyViolation, Proposal, SignatureRecord, SpendingTracker,
    ThresholdTier, Transaction, Treasury, ViolationKind, ANY_CATEGORY, DAY, MAX_CATEGORY, MONTH,
    WEEK,
};

/// Point in the proposal lifecycle at which rules are evaluated.
/// Signature-dependent rules only apply at execution.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Stage {
    Creation,
    Execution,
}

impl From<ViolationKind> for TreasuryError {
    fn from(kind: ViolationKind) -> Self {
        match kind {
            ViolationKind::SpendingLimit => TreasuryError::SpendingLimitExceeded,
            ViolationKind::Blacklisted => TreasuryError::RecipientBlacklisted,
            ViolationKind::NotWhitelisted => TreasuryError::RecipientNotWhitelisted,
            ViolationKind::TimeLockTooShort => TreasuryError::TimeLockTooShort,
            ViolationKind::ThresholdNotMet => TreasuryError::PolicyThresholdNotMet,
            ViolationKind::ApprovalMissing => TreasuryError::RequiredApprovalMissing,
        }
    }
}

/// Sum of all transaction amounts. Recomputed on every call.
pub fn batch_total(transactions: &Vec<Transaction>) -> Result<i128, TreasuryError> {
    let mut total: i128 = 0;
    for tx in transactions.iter() {
        total = total
            .checked_add(tx.amount)
            .ok_or(TreasuryError::ArithmeticOverflow)?;
    }
    Ok(total)
}

/// Number of signatures made by addresses still present in `signers`
pub fn count_signed_by(signers: &Vec<Address>, signatures: &Vec<SignatureRecord>) -> u32 {
    signatures
        .iter()
        .filter(|record| contains(signers, &record.signer))
        .count() as u32
}

fn has_signed(signatures: &Vec<SignatureRecord>, signer: &Address) -> bool {
    signatures.iter().any(|record| &record.signer == signer)
}

fn category_matches(rule_category: u32, category: u32) -> bool {
    rule_category == ANY_CATEGORY || rule_category == category
}

fn valid_rule_category(category: u32) -> bool {
    category <= MAX_CATEGORY || category == ANY_CATEGORY
}

fn tier_matches(tier: &ThresholdTier, total: i128) -> bool {
    tier.min_amount <= total && (tier.max_amount == 0 || total < tier.max_amount)
}

// ============================================================================
// Spending trackers
// ============================================================================

fn new_tracker(category: u32, now: u64) -> SpendingTracker {
    SpendingTracker {
        category,
        daily_spent: 0,
        weekly_spent: 0,
        monthly_spent: 0,
        last_daily_reset: now,
        last_weekly_reset: now,
        last_monthly_reset: now,
    }
}

/// Zero every bucket whose window has elapsed since its last reset
pub fn refresh_tracker(mut tracker: SpendingTracker, now: u64) -> SpendingTracker {
    if now >= tracker.last_daily_reset.saturating_add(DAY) {
        tracker.daily_spent = 0;
        tracker.last_daily_reset = now;
    }
    if now >= tracker.last_weekly_reset.saturating_add(WEEK) {
        tracker.weekly_spent = 0;
        tracker.last_weekly_reset = now;
    }
    if now >= tracker.last_monthly_reset.saturating_add(MONTH) {
        tracker.monthly_spent = 0;
        tracker.last_monthly_reset = now;
    }
    tracker
}

/// Current view of a tracker with lazy resets applied. Nothing is written.
pub fn load_tracker(env: &Env, treasury_id: u64, category: u32) -> SpendingTracker {
    let now = env.ledger().timestamp();
    match storage::get_tracker(env, treasury_id, category) {
        Some(tracker) => refresh_tracker(tracker, now),
        None => new_tracker(category, now),
    }
}

fn add_spend(env: &Env, treasury_id: u64, category: u32, amount: i128) -> Result<(), TreasuryError> {
    let mut tracker = load_tracker(env, treasury_id, category);
    tracker.daily_spent = tracker
        .daily_spent
        .checked_add(amount)
        .ok_or(TreasuryError::ArithmeticOverflow)?;
    tracker.weekly_spent = tracker
        .weekly_spent
        .checked_add(amount)
        .ok_or(TreasuryError::ArithmeticOverflow)?;
    tracker.monthly_spent = tracker
        .monthly_spent
        .checked_add(amount)
        .ok_or(TreasuryError::ArithmeticOverflow)?;
    storage::set_tracker(env, treasury_id, &tracker);
    Ok(())
}

/// Add an executed proposal's total to its category tracker and to the
/// wildcard tracker used by all-category limits.
pub fn record_execution(
    env: &Env,
    treasury_id: u64,
    category: u32,
    amount: i128,
) -> Result<(), TreasuryError> {
    add_spend(env, treasury_id, category, amount)?;
    add_spend(env, treasury_id, ANY_CATEGORY, amount)
}

// ============================================================================
// Policy management
// ============================================================================

fn validate_rule(treasury: &Treasury, rule: &PolicyRule) -> Result<(), TreasuryError> {
    let valid = match rule {
        PolicyRule::SpendingLimit(limit) => {
            valid_rule_category(limit.category)
                && limit.max_per_transaction >= 0
                && limit.daily_limit >= 0
                && limit.weekly_limit >= 0
                && limit.monthly_limit >= 0
        }
        PolicyRule::Whitelist(_) => true,
        PolicyRule::Timelock(timelock) => timelock.amount_factor >= 0,
        PolicyRule::AmountThreshold(threshold) => {
            !threshold.tiers.is_empty()
                && threshold.tiers.iter().all(|tier| {
                    tier.min_amount >= 0
                        && (tier.max_amount == 0 || tier.max_amount > tier.min_amount)
                        && tier.required_signatures >= 1
                })
        }
        PolicyRule::Approval(approval) => {
            valid_rule_category(approval.category)
                && approval
                    .required_signers
                    .iter()
                    .chain(approval.veto_signers.iter())
                    .all(|signer| contains(&treasury.signers, &signer))
        }
    };
    if !valid {
        return Err(TreasuryError::InvalidPolicyConfig);
    }
    Ok(())
}

/// Bind a new, active policy to a treasury
pub fn create_policy(
    env: &Env,
    treasury_id: u64,
    holder: &Address,
    rule: PolicyRule,
) -> Result<u64, TreasuryError> {
    treasury::require_cap_holder(env, treasury_id, holder)?;
    let mut treasury = storage::get_treasury(env, treasury_id)?;
    validate_rule(&treasury, &rule)?;

    let now = env.ledger().timestamp();
    if let PolicyRule::SpendingLimit(limit) = &rule {
        if storage::get_tracker(env, treasury_id, limit.category).is_none() {
            storage::set_tracker(env, treasury_id, &new_tracker(limit.category, now));
        }
    }

    let policy = Policy {
        id: storage::next_id(env, DataKey::NextPolicyId),
        treasury_id,
        rule,
        active: true,
        created_at: now,
    };
    storage::set_policy(env, &policy);

    treasury.policy_ids.push_back(policy.id);
    storage::set_treasury(env, &treasury);

    events::emit_policy_created(env, policy.id, treasury_id, policy.rule.kind());
    Ok(policy.id)
}

/// Activate or deactivate a policy. Setting the current value again is
/// accepted and leaves the policy unchanged.
pub fn set_active(
    env: &Env,
    policy_id: u64,
    holder: &Address,
    active: bool,
) -> Result<(), TreasuryError> {
    let mut policy = storage::get_policy(env, policy_id)?;
    treasury::require_cap_holder(env, policy.treasury_id, holder)?;

    policy.active = active;
    storage::set_policy(env, &policy);

    events::emit_policy_toggled(env, policy_id, active);
    Ok(())
}

pub fn get_policies(env: &Env, treasury_id: u64) -> Result<Vec<Policy>, TreasuryError> {
    let treasury = storage::get_treasury(env, treasury_id)?;
    let mut policies = Vec::new(env);
    for policy_id in treasury.policy_ids.iter() {
        policies.push_back(storage::get_policy(env, policy_id)?);
    }
    Ok(policies)
}

// ============================================================================
// Evaluation
// ============================================================================

fn violation(policy_id: u64, kind: ViolationKind, limit: i128, actual: i128) -> PolicyViolation {
    PolicyViolation {
        policy_id,
        kind,
        limit,
        actual,
    }
}

fn evaluate_policy(
    env: &Env,
    treasury: &Treasury,
    proposal: &Proposal,
    policy: &Policy,
    total: i128,
    stage: Stage,
) -> Result<Option<PolicyViolation>, TreasuryError> {
    match &policy.rule {
        PolicyRule::SpendingLimit(limit) => {
            if !category_matches(limit.category, proposal.category) {
                return Ok(None);
            }
            if limit.max_per_transaction > 0 && total > limit.max_per_transaction {
                return Ok(Some(violation(
                    policy.id,
                    ViolationKind::SpendingLimit,
                    limit.max_per_transaction,
                    total,
                )));
            }
            let tracker = load_tracker(env, treasury.id, limit.category);
            let windows = [
                (tracker.daily_spent, limit.daily_limit),
                (tracker.weekly_spent, limit.weekly_limit),
                (tracker.monthly_spent, limit.monthly_limit),
            ];
            for (spent, cap) in windows {
                if cap == 0 {
                    continue;
                }
                let projected = spent
                    .checked_add(total)
                    .ok_or(TreasuryError::ArithmeticOverflow)?;
                if projected > cap {
                    return Ok(Some(violation(
                        policy.id,
                        ViolationKind::SpendingLimit,
                        cap,
                        projected,
                    )));
                }
            }
        }
        PolicyRule::Whitelist(list) => {
            for (index, tx) in proposal.transactions.iter().enumerate() {
                if contains(&list.blacklist, &tx.recipient) {
                    return Ok(Some(violation(
                        policy.id,
                        ViolationKind::Blacklisted,
                        0,
                        index as i128,
                    )));
                }
                if list.enforce_whitelist && !contains(&list.whitelist, &tx.recipient) {
                    return Ok(Some(violation(
                        policy.id,
                        ViolationKind::NotWhitelisted,
                        0,
                        index as i128,
                    )));
                }
            }
        }
        PolicyRule::Timelock(timelock) => {
            let mut required = timelock.base_duration as i128;
            if timelock.amount_factor > 0 {
                required = required
                    .checked_add(total / timelock.amount_factor)
                    .ok_or(TreasuryError::ArithmeticOverflow)?;
            }
            let actual = proposal.time_lock_end.saturating_sub(proposal.created_at) as i128;
            if actual < required {
                return Ok(Some(violation(
                    policy.id,
                    ViolationKind::TimeLockTooShort,
                    required,
                    actual,
                )));
            }
        }
        PolicyRule::AmountThreshold(threshold) => {
            if stage == Stage::Creation {
                return Ok(None);
            }
            if let Some(tier) = threshold.tiers.iter().find(|tier| tier_matches(tier, total)) {
                let count = count_signed_by(&treasury.signers, &proposal.signatures);
                if count < tier.required_signatures {
                    return Ok(Some(violation(
                        policy.id,
                        ViolationKind::ThresholdNotMet,
                        tier.required_signatures as i128,
                        count as i128,
                    )));
                }
            }
        }
        PolicyRule::Approval(approval) => {
            if stage == Stage::Creation || !category_matches(approval.category, proposal.category)
            {
                return Ok(None);
            }
            let missing = approval
                .required_signers
                .iter()
                .filter(|signer| !has_signed(&proposal.signatures, signer))
                .count();
            if missing > 0 {
                return Ok(Some(violation(
                    policy.id,
                    ViolationKind::ApprovalMissing,
                    approval.required_signers.len() as i128,
                    (approval.required_signers.len() as usize - missing) as i128,
                )));
            }
        }
    }
    Ok(None)
}

/// Evaluate every active policy of the treasury in creation order and
/// return the first violation.
pub fn evaluate(
    env: &Env,
    treasury: &Treasury,
    proposal: &Proposal,
    stage: Stage,
) -> Result<Option<PolicyViolation>, TreasuryError> {
    let total = batch_total(&proposal.transactions)?;
    for policy in storage::get_active_policies(env, treasury)?.iter() {
        if let Some(found) = evaluate_policy(env, treasury, proposal, &policy, total, stage)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Fail with the typed error of the first violated policy
pub fn enforce(
    env: &Env,
    treasury: &Treasury,
    proposal: &Proposal,
    stage: Stage,
) -> Result<(), TreasuryError> {
    match evaluate(env, treasury, proposal, stage)? {
        Some(found) => {
            log!(env, "policy violation", proposal.id, found.policy_id);
            Err(found.kind.into())
        }
        None => Ok(()),
    }
}

/// Whether the collected signatures satisfy the treasury threshold and
/// every active signature-dependent policy.
pub fn signatures_satisfied(
    env: &Env,
    treasury: &Treasury,
    proposal: &Proposal,
) -> Result<bool, TreasuryError> {
    if count_signed_by(&treasury.signers, &proposal.signatures) < treasury.threshold {
        return Ok(false);
    }
    let total = batch_total(&proposal.transactions)?;
    for policy in storage::get_active_policies(env, treasury)?.iter() {
        let signature_rule = matches!(
            policy.rule,
            PolicyRule::AmountThreshold(_) | PolicyRule::Approval(_)
        );
        if signature_rule
            && evaluate_policy(env, treasury, proposal, &policy, total, Stage::Execution)?
                .is_some()
        {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whether `caller` is a veto signer of an active approval policy that
/// covers the proposal's category.
pub fn can_veto(
    env: &Env,
    treasury: &Treasury,
    proposal: &Proposal,
    caller: &Address,
) -> Result<bool, TreasuryError> {
    let policies = storage::get_active_policies(env, treasury)?;
    Ok(policies.iter().any(|policy| match &policy.rule {
        PolicyRule::Approval(approval) => {
            category_matches(approval.category, proposal.category)
                && contains(&approval.veto_signers, caller)
        }
        _ => false,
    }))
}
