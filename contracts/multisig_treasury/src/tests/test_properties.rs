mod treasury_properties {
    extern crate std;

    use soroban_sdk::testutils::Address as _;
    use soroban_sdk::{Address, Bytes, Env, Vec};

    use crate::tests::test_utils::{
        create_base_data, fund, propose, propose_and_sign, signature, single_transfer,
    };
    use crate::{PolicyRule, ProposalStatus, SpendingLimitRule, TreasuryError};

    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]
        #[test]
        /// A proposal becomes executable exactly when the number of distinct
        /// signer signatures reaches the threshold
        fn threshold_gates_execution(signer_count in 2_u32..=6, threshold_seed in 0_u32..100, signed in 0_u32..=6) {
            let env = Env::default();
            let data = create_base_data(&env);
            let threshold = 2 + threshold_seed % (signer_count - 1);
            let signed = signed.min(signer_count);

            let mut signers = Vec::new(&env);
            for _ in 0..signer_count {
                signers.push_back(Address::generate(&env));
            }
            let cap = data.client.create_treasury(&data.creator, &signers, &threshold, &Vec::new(&env), &0);

            let recipient = Address::generate(&env);
            let proposal_id = data.client.create_proposal(
                &cap.treasury_id,
                &signers.get(0).unwrap(),
                &single_transfer(&env, &recipient, 10, &data.asset),
                &0,
                &0,
                &Bytes::new(&env),
            );

            for index in 0..signed {
                let result = data.client.try_sign_proposal(
                    &proposal_id,
                    &signers.get(index).unwrap(),
                    &signature(&env, index as u8 + 1),
                );
                if index < threshold {
                    assert!(result.is_ok());
                } else {
                    assert_eq!(result, Err(Ok(TreasuryError::InvalidProposalStatus)));
                }
            }

            let status = data.client.get_proposal(&proposal_id).status;
            if signed >= threshold {
                assert_eq!(status, ProposalStatus::Executable);
            } else if signed == 0 {
                assert_eq!(status, ProposalStatus::Created);
            } else {
                assert_eq!(status, ProposalStatus::Signed);
            }
        }

        #[test]
        /// Executing never moves more than the balance and a rejected
        /// execution leaves the balance untouched
        fn execution_conserves_balance(deposit in 1_i128..1_000_000, amount in 1_i128..2_000_000) {
            let env = Env::default();
            let data = create_base_data(&env);
            fund(&env, &data, deposit);

            let proposal_id = propose_and_sign(&env, &data, amount, 0, 0);
            let result = data.client.try_execute_proposal(&proposal_id, &data.signer1);
            let balance = data.client.get_balance(&data.treasury_id, &data.asset);

            if amount <= deposit {
                assert!(result.is_ok());
                assert_eq!(balance, deposit - amount);
            } else {
                assert_eq!(result, Err(Ok(TreasuryError::InsufficientFunds)));
                assert_eq!(balance, deposit);
            }
        }

        #[test]
        /// Within one day the tracked spend of a category never exceeds its
        /// daily limit
        fn daily_limit_bounds_spend(limit in 1_i128..100_000, first in 1_i128..100_000, second in 1_i128..100_000) {
            let env = Env::default();
            let data = create_base_data(&env);
            fund(&env, &data, 1_000_000);
            data.client.create_policy(
                &data.treasury_id,
                &data.creator,
                &PolicyRule::SpendingLimit(SpendingLimitRule {
                    category: 1,
                    max_per_transaction: 0,
                    daily_limit: limit,
                    weekly_limit: 0,
                    monthly_limit: 0,
                }),
            );

            for amount in [first, second] {
                let recipient = Address::generate(&env);
                let created = data.client.try_create_proposal(
                    &data.treasury_id,
                    &data.signer1,
                    &single_transfer(&env, &recipient, amount, &data.asset),
                    &1,
                    &0,
                    &Bytes::new(&env),
                );
                let spent = data.client.get_spending_tracker(&data.treasury_id, &1).daily_spent;
                match created {
                    Ok(Ok(proposal_id)) => {
                        assert!(spent + amount <= limit);
                        data.client.sign_proposal(&proposal_id, &data.signer1, &signature(&env, 1));
                        data.client.sign_proposal(&proposal_id, &data.signer2, &signature(&env, 2));
                        data.client.execute_proposal(&proposal_id, &data.signer1);
                    }
                    _ => {
                        assert!(spent + amount > limit);
                        assert_eq!(created, Err(Ok(TreasuryError::SpendingLimitExceeded)));
                    }
                }
            }

            let tracker = data.client.get_spending_tracker(&data.treasury_id, &1);
            assert!(tracker.daily_spent <= limit);

            // Unlimited categories accept the same amounts
            propose(&env, &data, first, 2, 0);
        }
    }
}
