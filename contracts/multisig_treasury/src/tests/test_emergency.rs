use soroban_sdk::testutils::Address as _;
use soroban_sdk::{vec, Address, Env, Vec};

use crate::tests::test_utils::{
    advance_time, create_base_data, fund, propose_and_sign, reason, set_time, signature, TestData,
    HOUR, START_TIME,
};
use crate::{AuditAction, TreasuryError, DAY};

fn emergency_proposal(env: &Env, data: &TestData, amount: i128) -> u64 {
    data.client.create_emergency_proposal(
        &data.treasury_id,
        &data.emergency1,
        &Address::generate(env),
        &amount,
        &data.asset,
        &reason(env, "key compromise"),
    )
}

fn signed_emergency_proposal(env: &Env, data: &TestData, amount: i128) -> u64 {
    let emergency_id = emergency_proposal(env, data, amount);
    data.client
        .sign_emergency_proposal(&emergency_id, &data.emergency1, &signature(env, 1));
    data.client
        .sign_emergency_proposal(&emergency_id, &data.emergency2, &signature(env, 2));
    emergency_id
}

// ============================================================================
// Proposal and Signing
// ============================================================================

#[test]
fn test_create_emergency_proposal() {
    let env = Env::default();
    let data = create_base_data(&env);

    let emergency_id = emergency_proposal(&env, &data, 700);
    let proposal = data.client.get_emergency_proposal(&emergency_id);
    assert_eq!(proposal.treasury_id, data.treasury_id);
    assert_eq!(proposal.proposer, data.emergency1);
    assert_eq!(proposal.amount, 700);
    assert_eq!(proposal.created_at, START_TIME);
    assert!(!proposal.executed);
    assert!(proposal.signatures.is_empty());
}

#[test]
fn test_create_emergency_proposal_validation() {
    let env = Env::default();
    let data = create_base_data(&env);
    let recipient = Address::generate(&env);

    let result = data.client.try_create_emergency_proposal(
        &data.treasury_id,
        &data.signer1,
        &recipient,
        &100,
        &data.asset,
        &reason(&env, "not allowed"),
    );
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));

    let result = data.client.try_create_emergency_proposal(
        &data.treasury_id,
        &data.emergency1,
        &recipient,
        &0,
        &data.asset,
        &reason(&env, "zero"),
    );
    assert_eq!(result, Err(Ok(TreasuryError::InvalidAmount)));
}

#[test]
fn test_sign_emergency_proposal() {
    let env = Env::default();
    let data = create_base_data(&env);
    let emergency_id = emergency_proposal(&env, &data, 100);

    let count = data
        .client
        .sign_emergency_proposal(&emergency_id, &data.emergency1, &signature(&env, 1));
    assert_eq!(count, 1);

    let result = data.client.try_sign_emergency_proposal(
        &emergency_id,
        &data.emergency1,
        &signature(&env, 1),
    );
    assert_eq!(result, Err(Ok(TreasuryError::AlreadySigned)));

    let result =
        data.client
            .try_sign_emergency_proposal(&emergency_id, &data.signer1, &signature(&env, 5));
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));

    let result = data
        .client
        .try_sign_emergency_proposal(&99, &data.emergency1, &signature(&env, 1));
    assert_eq!(result, Err(Ok(TreasuryError::EmergencyProposalNotFound)));
}

// ============================================================================
// Execution
// ============================================================================

#[test]
fn test_emergency_withdrawal_requires_threshold() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 1_000);

    let emergency_id = emergency_proposal(&env, &data, 400);
    data.client
        .sign_emergency_proposal(&emergency_id, &data.emergency1, &signature(&env, 1));

    let result = data
        .client
        .try_execute_emergency_withdrawal(&emergency_id, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::InsufficientSignatures)));

    let result = data
        .client
        .try_execute_emergency_withdrawal(&emergency_id, &data.signer1);
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));
    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 1_000);
}

#[test]
fn test_emergency_withdrawal_success() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 1_000);

    let emergency_id = signed_emergency_proposal(&env, &data, 400);
    data.client
        .execute_emergency_withdrawal(&emergency_id, &data.emergency2);

    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 600);
    assert!(data.client.get_emergency_proposal(&emergency_id).executed);

    let cooldown = data.client.get_cooldown(&data.treasury_id);
    assert_eq!(cooldown.last_emergency, Some(START_TIME));

    let log = data.client.get_audit_log(&data.treasury_id);
    assert_eq!(log.len(), 1);
    let entry = log.get(0).unwrap();
    assert_eq!(entry.action, AuditAction::EmergencyWithdrawal);
    assert_eq!(entry.actor, data.emergency2);
    assert_eq!(entry.amount, 400);
    assert_eq!(entry.asset, Some(data.asset.clone()));
    assert_eq!(entry.timestamp, START_TIME);
    assert_eq!(entry.reason, reason(&env, "key compromise"));

    let result = data
        .client
        .try_execute_emergency_withdrawal(&emergency_id, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::AlreadyExecuted)));
    let result = data.client.try_sign_emergency_proposal(
        &emergency_id,
        &data.emergency1,
        &signature(&env, 1),
    );
    assert_eq!(result, Err(Ok(TreasuryError::AlreadyExecuted)));
}

#[test]
fn test_emergency_cooldown() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 1_000);
    assert_eq!(data.client.get_cooldown(&data.treasury_id).last_emergency, None);

    let first = signed_emergency_proposal(&env, &data, 100);
    let second = signed_emergency_proposal(&env, &data, 100);
    data.client.execute_emergency_withdrawal(&first, &data.emergency1);

    advance_time(&env, DAY - HOUR);
    let result = data
        .client
        .try_execute_emergency_withdrawal(&second, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::CooldownActive)));
    assert!(!data.client.get_emergency_proposal(&second).executed);

    set_time(&env, START_TIME + DAY);
    data.client
        .execute_emergency_withdrawal(&second, &data.emergency1);
    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 800);
    assert_eq!(
        data.client.get_cooldown(&data.treasury_id).last_emergency,
        Some(START_TIME + DAY)
    );
}

#[test]
fn test_emergency_bypasses_freeze_and_time_lock() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 1_000);

    let proposal_id = propose_and_sign(&env, &data, 100, 0, 0);
    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "breach"));

    let emergency_id = signed_emergency_proposal(&env, &data, 900);
    data.client
        .execute_emergency_withdrawal(&emergency_id, &data.emergency1);
    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 100);

    let result = data.client.try_execute_proposal(&proposal_id, &data.signer1);
    assert_eq!(result, Err(Ok(TreasuryError::TreasuryFrozen)));
}

#[test]
fn test_emergency_insufficient_funds() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 50);

    let emergency_id = signed_emergency_proposal(&env, &data, 51);
    let result = data
        .client
        .try_execute_emergency_withdrawal(&emergency_id, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::InsufficientFunds)));

    assert!(!data.client.get_emergency_proposal(&emergency_id).executed);
    assert_eq!(data.client.get_cooldown(&data.treasury_id).last_emergency, None);
    assert!(data.client.get_audit_log(&data.treasury_id).is_empty());
}

#[test]
fn test_removed_emergency_signer_not_counted() {
    let env = Env::default();
    let data = create_base_data(&env);
    fund(&env, &data, 1_000);

    let emergency_id = signed_emergency_proposal(&env, &data, 100);
    let replacement = Address::generate(&env);
    data.client.reconfigure_emergency_signers(
        &data.treasury_id,
        &data.creator,
        &vec![&env, data.emergency1.clone(), replacement],
        &2,
    );

    let result = data
        .client
        .try_execute_emergency_withdrawal(&emergency_id, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::InsufficientSignatures)));
}

#[test]
fn test_treasury_without_emergency_set() {
    let env = Env::default();
    let data = create_base_data(&env);

    let cap = data.client.create_treasury(
        &data.creator,
        &vec![&env, data.signer1.clone(), data.signer2.clone()],
        &2,
        &Vec::new(&env),
        &0,
    );

    let result = data.client.try_create_emergency_proposal(
        &cap.treasury_id,
        &data.emergency1,
        &Address::generate(&env),
        &10,
        &data.asset,
        &reason(&env, "none"),
    );
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));

    let result =
        data.client
            .try_emergency_freeze(&cap.treasury_id, &data.emergency1, &reason(&env, "none"));
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));
}

// ============================================================================
// Audit Log
// ============================================================================

#[test]
fn test_freeze_and_unfreeze_are_audited() {
    let env = Env::default();
    let data = create_base_data(&env);

    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "breach"));
    advance_time(&env, HOUR);
    data.client.unfreeze(&data.treasury_id, &data.creator);

    let log = data.client.get_audit_log(&data.treasury_id);
    assert_eq!(log.len(), 2);

    let freeze = log.get(0).unwrap();
    assert_eq!(freeze.action, AuditAction::EmergencyFreeze);
    assert_eq!(freeze.actor, data.emergency1);
    assert_eq!(freeze.amount, 0);
    assert_eq!(freeze.asset, None);
    assert_eq!(freeze.reason, reason(&env, "breach"));

    let unfreeze = log.get(1).unwrap();
    assert_eq!(unfreeze.action, AuditAction::Unfreeze);
    assert_eq!(unfreeze.actor, data.creator);
    assert_eq!(unfreeze.timestamp, START_TIME + HOUR);
}

#[test]
fn test_audit_log_is_per_treasury() {
    let env = Env::default();
    let data = create_base_data(&env);

    let cap = data.client.create_treasury(
        &data.creator,
        &vec![&env, data.signer1.clone(), data.signer2.clone()],
        &2,
        &vec![&env, data.emergency1.clone()],
        &1,
    );
    data.client
        .emergency_freeze(&cap.treasury_id, &data.emergency1, &reason(&env, "other"));

    assert!(data.client.get_audit_log(&data.treasury_id).is_empty());
    assert_eq!(data.client.get_audit_log(&cap.treasury_id).len(), 1);
}
