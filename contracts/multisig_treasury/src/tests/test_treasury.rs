use soroban_sdk::testutils::Address as _;
use soroban_sdk::{vec, Address, Env, Vec};

use crate::tests::test_utils::{create_base_data, fund, reason, register_contract};
use crate::{EngineConfig, ErrorClass, TreasuryError};

// ============================================================================
// Initialization Tests
// ============================================================================

#[test]
fn test_initialize_twice_fails() {
    let env = Env::default();
    let data = create_base_data(&env);

    let result = data
        .client
        .try_initialize(&data.admin, &EngineConfig::default());
    assert_eq!(result, Err(Ok(TreasuryError::AlreadyInitialized)));
}

#[test]
fn test_calls_before_initialize_fail() {
    let env = Env::default();
    env.mock_all_auths();
    let client = register_contract(&env);

    assert!(!client.is_initialized());
    let signers = vec![&env, Address::generate(&env), Address::generate(&env)];
    let result = client.try_create_treasury(
        &Address::generate(&env),
        &signers,
        &2,
        &Vec::new(&env),
        &0,
    );
    assert_eq!(result, Err(Ok(TreasuryError::NotInitialized)));
}

#[test]
fn test_initialize_rejects_invalid_config() {
    let env = Env::default();
    env.mock_all_auths();
    let client = register_contract(&env);
    let admin = Address::generate(&env);

    let mut config = EngineConfig::default();
    config.max_batch_size = 51;
    assert_eq!(
        client.try_initialize(&admin, &config),
        Err(Ok(TreasuryError::InvalidConfig))
    );

    config.max_batch_size = 0;
    assert_eq!(
        client.try_initialize(&admin, &config),
        Err(Ok(TreasuryError::InvalidConfig))
    );
}

#[test]
fn test_update_config_requires_admin() {
    let env = Env::default();
    let data = create_base_data(&env);

    let mut config = EngineConfig::default();
    config.min_time_lock = 3600;

    let result = data.client.try_update_config(&data.signer1, &config);
    assert_eq!(result, Err(Ok(TreasuryError::NotAdmin)));

    data.client.update_config(&data.admin, &config);
    assert_eq!(data.client.get_config().min_time_lock, 3600);
}

// ============================================================================
// Creation Tests
// ============================================================================

#[test]
fn test_create_treasury_success() {
    let env = Env::default();
    let data = create_base_data(&env);

    let treasury = data.client.get_treasury(&data.treasury_id);
    assert_eq!(treasury.signers.len(), 3);
    assert_eq!(treasury.threshold, 2);
    assert_eq!(treasury.emergency_signers.len(), 2);
    assert_eq!(treasury.emergency_threshold, 2);
    assert!(!treasury.frozen);
    assert!(treasury.policy_ids.is_empty());
    assert_eq!(treasury.verifier, None);

    let cap = data.client.get_admin_cap(&data.treasury_id);
    assert_eq!(cap.holder, data.creator);
    assert_eq!(cap.treasury_id, data.treasury_id);
}

#[test]
fn test_create_treasury_signer_validation() {
    let env = Env::default();
    let data = create_base_data(&env);
    let s1 = Address::generate(&env);
    let s2 = Address::generate(&env);
    let none: Vec<Address> = Vec::new(&env);

    let result =
        data.client
            .try_create_treasury(&data.creator, &vec![&env, s1.clone()], &1, &none, &0);
    assert_eq!(result, Err(Ok(TreasuryError::TooFewSigners)));

    let result = data.client.try_create_treasury(
        &data.creator,
        &vec![&env, s1.clone(), s1.clone()],
        &2,
        &none,
        &0,
    );
    assert_eq!(result, Err(Ok(TreasuryError::DuplicateSigner)));

    let pair = vec![&env, s1.clone(), s2.clone()];
    for threshold in [0u32, 1, 3] {
        let result = data
            .client
            .try_create_treasury(&data.creator, &pair, &threshold, &none, &0);
        assert_eq!(result, Err(Ok(TreasuryError::InvalidThreshold)));
    }

    let mut many = Vec::new(&env);
    for _ in 0..21 {
        many.push_back(Address::generate(&env));
    }
    let result = data
        .client
        .try_create_treasury(&data.creator, &many, &2, &none, &0);
    assert_eq!(result, Err(Ok(TreasuryError::TooManySigners)));
}

#[test]
fn test_create_treasury_emergency_validation() {
    let env = Env::default();
    let data = create_base_data(&env);
    let pair = vec![&env, Address::generate(&env), Address::generate(&env)];
    let emergency = vec![&env, Address::generate(&env), Address::generate(&env)];

    for threshold in [0u32, 3] {
        let result =
            data.client
                .try_create_treasury(&data.creator, &pair, &2, &emergency, &threshold);
        assert_eq!(result, Err(Ok(TreasuryError::InvalidEmergencyThreshold)));
    }

    let cap = data
        .client
        .create_treasury(&data.creator, &pair, &2, &emergency, &1);
    assert_eq!(
        data.client.get_treasury(&cap.treasury_id).emergency_threshold,
        1
    );

    // An empty emergency set disables the path whatever threshold is given
    let cap = data
        .client
        .create_treasury(&data.creator, &pair, &2, &Vec::new(&env), &5);
    assert_eq!(
        data.client.get_treasury(&cap.treasury_id).emergency_threshold,
        0
    );
}

#[test]
fn test_treasury_ids_are_distinct() {
    let env = Env::default();
    let data = create_base_data(&env);
    let pair = vec![&env, data.signer1.clone(), data.signer2.clone()];

    let cap = data
        .client
        .create_treasury(&data.creator, &pair, &2, &Vec::new(&env), &0);
    assert_ne!(cap.treasury_id, data.treasury_id);
    assert_eq!(
        data.client.try_get_treasury(&999),
        Err(Ok(TreasuryError::TreasuryNotFound))
    );
}

// ============================================================================
// Deposit Tests
// ============================================================================

#[test]
fn test_deposit_merges_balances() {
    let env = Env::default();
    let data = create_base_data(&env);
    let other_asset = Address::generate(&env);
    let depositor = Address::generate(&env);

    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 0);

    data.client
        .deposit(&data.treasury_id, &depositor, &data.asset, &500);
    let balance = data
        .client
        .deposit(&data.treasury_id, &depositor, &data.asset, &700);
    assert_eq!(balance, 1200);
    data.client
        .deposit(&data.treasury_id, &depositor, &other_asset, &5);

    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 1200);
    assert_eq!(data.client.get_balance(&data.treasury_id, &other_asset), 5);
}

#[test]
fn test_deposit_rejects_non_positive_amount() {
    let env = Env::default();
    let data = create_base_data(&env);
    let depositor = Address::generate(&env);

    for amount in [0i128, -10] {
        let result = data
            .client
            .try_deposit(&data.treasury_id, &depositor, &data.asset, &amount);
        assert_eq!(result, Err(Ok(TreasuryError::InvalidAmount)));
    }
}

#[test]
fn test_deposit_unknown_treasury() {
    let env = Env::default();
    let data = create_base_data(&env);

    let result = data
        .client
        .try_deposit(&42, &Address::generate(&env), &data.asset, &10);
    assert_eq!(result, Err(Ok(TreasuryError::TreasuryNotFound)));
    fund(&env, &data, 100);
    assert_eq!(data.client.get_balance(&data.treasury_id, &data.asset), 100);
}

// ============================================================================
// Freeze Tests
// ============================================================================

#[test]
fn test_freeze_blocks_deposits() {
    let env = Env::default();
    let data = create_base_data(&env);

    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "breach"));
    assert!(data.client.get_treasury(&data.treasury_id).frozen);

    let result = data.client.try_deposit(
        &data.treasury_id,
        &Address::generate(&env),
        &data.asset,
        &10,
    );
    assert_eq!(result, Err(Ok(TreasuryError::TreasuryFrozen)));
}

#[test]
fn test_freeze_is_idempotent() {
    let env = Env::default();
    let data = create_base_data(&env);

    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "first"));
    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency2, &reason(&env, "second"));
    assert!(data.client.get_treasury(&data.treasury_id).frozen);
}

#[test]
fn test_freeze_requires_emergency_signer() {
    let env = Env::default();
    let data = create_base_data(&env);

    let result =
        data.client
            .try_emergency_freeze(&data.treasury_id, &data.signer1, &reason(&env, "no"));
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));
}

#[test]
fn test_unfreeze_requires_cap_holder() {
    let env = Env::default();
    let data = create_base_data(&env);

    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "breach"));

    let result = data.client.try_unfreeze(&data.treasury_id, &data.emergency1);
    assert_eq!(result, Err(Ok(TreasuryError::NotCapHolder)));

    data.client.unfreeze(&data.treasury_id, &data.creator);
    assert!(!data.client.get_treasury(&data.treasury_id).frozen);
}

// ============================================================================
// Reconfiguration Tests
// ============================================================================

#[test]
fn test_reconfigure_signers() {
    let env = Env::default();
    let data = create_base_data(&env);
    let new_signer = Address::generate(&env);
    let signers = vec![&env, data.signer1.clone(), new_signer.clone()];

    let result = data
        .client
        .try_reconfigure_signers(&data.treasury_id, &data.signer1, &signers, &2);
    assert_eq!(result, Err(Ok(TreasuryError::NotCapHolder)));

    let result = data
        .client
        .try_reconfigure_signers(&data.treasury_id, &data.creator, &signers, &3);
    assert_eq!(result, Err(Ok(TreasuryError::InvalidThreshold)));

    data.client
        .reconfigure_signers(&data.treasury_id, &data.creator, &signers, &2);
    let treasury = data.client.get_treasury(&data.treasury_id);
    assert_eq!(treasury.signers, signers);
    assert_eq!(treasury.threshold, 2);
}

#[test]
fn test_reconfigure_emergency_signers() {
    let env = Env::default();
    let data = create_base_data(&env);
    let responder = Address::generate(&env);

    data.client.reconfigure_emergency_signers(
        &data.treasury_id,
        &data.creator,
        &vec![&env, responder.clone()],
        &1,
    );
    let treasury = data.client.get_treasury(&data.treasury_id);
    assert_eq!(treasury.emergency_signers, vec![&env, responder]);
    assert_eq!(treasury.emergency_threshold, 1);

    let result = data.client.try_emergency_freeze(
        &data.treasury_id,
        &data.emergency1,
        &reason(&env, "removed"),
    );
    assert_eq!(result, Err(Ok(TreasuryError::NotAnEmergencySigner)));
}

#[test]
fn test_transfer_admin_cap() {
    let env = Env::default();
    let data = create_base_data(&env);
    let successor = Address::generate(&env);

    data.client
        .transfer_admin_cap(&data.treasury_id, &data.creator, &successor);
    assert_eq!(data.client.get_admin_cap(&data.treasury_id).holder, successor);

    data.client
        .emergency_freeze(&data.treasury_id, &data.emergency1, &reason(&env, "breach"));
    let result = data.client.try_unfreeze(&data.treasury_id, &data.creator);
    assert_eq!(result, Err(Ok(TreasuryError::NotCapHolder)));
    data.client.unfreeze(&data.treasury_id, &successor);
}

// ============================================================================
// Error Classification
// ============================================================================

#[test]
fn test_error_classes() {
    assert_eq!(
        TreasuryError::InvalidThreshold.class(),
        ErrorClass::Configuration
    );
    assert_eq!(TreasuryError::NotASigner.class(), ErrorClass::Authorization);
    assert_eq!(TreasuryError::AlreadySigned.class(), ErrorClass::State);
    assert_eq!(TreasuryError::TreasuryFrozen.class(), ErrorClass::Frozen);
    assert_eq!(
        TreasuryError::InsufficientFunds.class(),
        ErrorClass::InsufficientFunds
    );
    assert_eq!(
        TreasuryError::SpendingLimitExceeded.class(),
        ErrorClass::PolicyViolation
    );
    assert_eq!(TreasuryError::CooldownActive.class(), ErrorClass::Timing);

    assert!(TreasuryError::TimeLockActive.is_retryable());
    assert!(TreasuryError::CooldownActive.is_retryable());
    assert!(TreasuryError::InsufficientSignatures.is_retryable());
    assert!(TreasuryError::PolicyThresholdNotMet.is_retryable());
    assert!(!TreasuryError::InsufficientFunds.is_retryable());
    assert!(!TreasuryError::AlreadySigned.is_retryable());
}
