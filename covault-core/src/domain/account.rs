use crate::domain::cohort::CohortDescriptor;
use crate::foundation::{DeploySalt, CovaultError, UserId, SALT_ORIGIN_LABEL, SALT_TENANT_LABEL};
use alloy_primitives::{keccak256, Address, B256, U256};
use serde::Serialize;

/// Factory parameters that pin the account addressing scheme for a chain.
///
/// Both fields are deployment constants published with the factory; with them
/// the counterfactual address is reproducible fully off-chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountFactory {
    pub address: Address,
    pub proxy_init_code_hash: B256,
}

/// A deterministically derived smart account. `deployed` is always false
/// here: this module only computes the counterfactual address and never
/// touches the chain.
#[derive(Clone, Debug, Serialize)]
pub struct AccountDescriptor {
    pub address: Address,
    pub deploy_salt: DeploySalt,
    pub deployed: bool,
}

/// The single salt-computation routine.
///
/// Every path that maps an external user identifier to an account (sender
/// derivation, receiver reinterpretation, the account endpoint) must go
/// through here. Two call sites hashing the identifier differently would
/// disagree on "which address belongs to this user", and value sent to the
/// wrong derivation is unrecoverable.
pub fn compute_deploy_salt(user_id: &UserId) -> DeploySalt {
    let preimage = format!("{}|{}|{}", user_id.as_str(), SALT_ORIGIN_LABEL, SALT_TENANT_LABEL);
    DeploySalt::from(keccak256(preimage.as_bytes()))
}

/// CREATE2 address of the account the factory would deploy for
/// `(signers, threshold, salt)`.
///
/// The factory folds the deploy parameters into the CREATE2 salt, so the
/// address commits to the exact signer ordering as published by the
/// coordinator.
pub fn counterfactual_address(
    factory: &AccountFactory,
    cohort: &CohortDescriptor,
    salt: DeploySalt,
) -> Result<Address, CovaultError> {
    cohort.validate()?;

    let mut preimage = Vec::with_capacity(32 * (cohort.signers.len() + 2));
    for signer in &cohort.signers {
        preimage.extend_from_slice(B256::left_padding_from(signer.as_slice()).as_slice());
    }
    preimage.extend_from_slice(&B256::from(U256::from(cohort.threshold)).0);
    preimage.extend_from_slice(salt.as_ref());
    let create2_salt = keccak256(&preimage);

    Ok(factory.address.create2(create2_salt, factory.proxy_init_code_hash))
}

/// Derive the full account descriptor for a user against a resolved cohort.
pub fn derive_account(
    factory: &AccountFactory,
    cohort: &CohortDescriptor,
    user_id: &UserId,
) -> Result<AccountDescriptor, CovaultError> {
    let salt = compute_deploy_salt(user_id);
    let address = counterfactual_address(factory, cohort, salt)?;
    Ok(AccountDescriptor { address, deploy_salt: salt, deployed: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    fn factory() -> AccountFactory {
        AccountFactory { address: addr(0xFA), proxy_init_code_hash: B256::from([0x11; 32]) }
    }

    fn cohort() -> CohortDescriptor {
        CohortDescriptor { multisig: addr(0xEE), signers: vec![addr(1), addr(2), addr(3)], threshold: 2 }
    }

    #[test]
    fn salt_is_deterministic_and_separates_users() {
        let alice = UserId::new("alice");
        assert_eq!(compute_deploy_salt(&alice), compute_deploy_salt(&alice));
        assert_ne!(compute_deploy_salt(&alice), compute_deploy_salt(&UserId::new("bob")));
    }

    #[test]
    fn salt_matches_pinned_preimage() {
        // keccak256("alice|Discord|Collab.Land") computed independently.
        let salt = compute_deploy_salt(&UserId::new("alice"));
        let expected = keccak256("alice|Discord|Collab.Land".as_bytes());
        assert_eq!(B256::from(salt), expected);
    }

    #[test]
    fn address_is_pure_function_of_inputs() {
        let alice = UserId::new("alice");
        let a1 = derive_account(&factory(), &cohort(), &alice).expect("derive");
        let a2 = derive_account(&factory(), &cohort(), &alice).expect("derive");
        assert_eq!(a1.address, a2.address);
        assert_eq!(a1.deploy_salt, a2.deploy_salt);
        assert!(!a1.deployed);
    }

    #[test]
    fn distinct_users_get_distinct_addresses() {
        let a = derive_account(&factory(), &cohort(), &UserId::new("alice")).expect("derive");
        let b = derive_account(&factory(), &cohort(), &UserId::new("bob")).expect("derive");
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn signer_order_is_part_of_the_address() {
        let mut reordered = cohort();
        reordered.signers.reverse();
        let alice = UserId::new("alice");
        let a = derive_account(&factory(), &cohort(), &alice).expect("derive");
        let b = derive_account(&factory(), &reordered, &alice).expect("derive");
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn malformed_cohort_is_a_derivation_error() {
        let mut bad = cohort();
        bad.threshold = 0;
        assert!(matches!(derive_account(&factory(), &bad, &UserId::new("alice")), Err(CovaultError::DerivationError(_))));

        bad.threshold = 9;
        assert!(matches!(derive_account(&factory(), &bad, &UserId::new("alice")), Err(CovaultError::DerivationError(_))));
    }
}
