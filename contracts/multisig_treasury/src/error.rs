//! Error types for the Multisig Treasury contract
//!
//! Codes are grouped in ranges so off-chain callers can classify a failure
//! without matching every variant.

use soroban_sdk::contracterror;

/// Treasury contract errors
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TreasuryError {
    /// Contract has already been initialized
    AlreadyInitialized = 1,
    /// Contract has not been initialized
    NotInitialized = 2,

    // Configuration
    /// Fewer than two signers supplied
    TooFewSigners = 100,
    /// Signer list exceeds the configured maximum
    TooManySigners = 101,
    /// The same address appears twice in a signer list
    DuplicateSigner = 102,
    /// Threshold outside `[2, signer count]`
    InvalidThreshold = 103,
    /// Emergency threshold outside `[1, emergency signer count]`
    InvalidEmergencyThreshold = 104,
    /// Engine configuration values are out of range
    InvalidConfig = 105,
    /// Policy rule configuration is malformed
    InvalidPolicyConfig = 106,
    /// Category outside the accepted range
    InvalidCategory = 107,
    /// Amount must be strictly positive
    InvalidAmount = 108,
    /// Proposal carries no transactions
    EmptyBatch = 109,
    /// Proposal carries more transactions than allowed
    BatchTooLarge = 110,
    /// Requested time-lock is below the configured minimum
    TimeLockBelowMinimum = 111,

    // Authorization
    /// Caller is not the contract admin
    NotAdmin = 200,
    /// Caller is not in the treasury signer set
    NotASigner = 201,
    /// Caller is not in the treasury emergency signer set
    NotAnEmergencySigner = 202,
    /// Caller does not hold the treasury admin capability
    NotCapHolder = 203,
    /// Caller may not cancel this proposal
    CancelNotAuthorized = 204,
    /// The configured verifier rejected the signature
    InvalidSignature = 205,

    // State
    /// Treasury with given ID was not found
    TreasuryNotFound = 300,
    /// Proposal with given ID was not found
    ProposalNotFound = 301,
    /// Policy with given ID was not found
    PolicyNotFound = 302,
    /// Emergency proposal with given ID was not found
    EmergencyProposalNotFound = 303,
    /// Operation is not valid for the proposal's current status
    InvalidProposalStatus = 304,
    /// Signer has already signed this proposal
    AlreadySigned = 305,
    /// Not enough signatures to execute
    InsufficientSignatures = 306,
    /// Emergency proposal has already been executed
    AlreadyExecuted = 307,

    // Frozen
    /// Treasury is frozen
    TreasuryFrozen = 400,

    // Funds
    /// Balance is lower than the requested amount
    InsufficientFunds = 500,
    /// Amount arithmetic overflowed
    ArithmeticOverflow = 501,

    // Policy violations
    /// A spending limit would be exceeded
    SpendingLimitExceeded = 600,
    /// A recipient is blacklisted
    RecipientBlacklisted = 601,
    /// A recipient is missing from an enforced whitelist
    RecipientNotWhitelisted = 602,
    /// Proposal time-lock is shorter than the policy requires
    TimeLockTooShort = 603,
    /// Amount tier requires more signatures than collected
    PolicyThresholdNotMet = 604,
    /// A signer required by an approval policy has not signed
    RequiredApprovalMissing = 605,

    // Timing
    /// Proposal time-lock has not elapsed
    TimeLockActive = 700,
    /// Emergency cooldown has not elapsed
    CooldownActive = 701,
}

/// Coarse classification of [`TreasuryError`] codes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Lifecycle,
    Configuration,
    Authorization,
    State,
    Frozen,
    InsufficientFunds,
    PolicyViolation,
    Timing,
}

impl TreasuryError {
    pub fn class(&self) -> ErrorClass {
        match *self as u32 {
            0..=99 => ErrorClass::Lifecycle,
            100..=199 => ErrorClass::Configuration,
            200..=299 => ErrorClass::Authorization,
            300..=399 => ErrorClass::State,
            400..=499 => ErrorClass::Frozen,
            500..=599 => ErrorClass::InsufficientFunds,
            600..=699 => ErrorClass::PolicyViolation,
            _ => ErrorClass::Timing,
        }
    }

    /// Whether the caller can succeed later without changing the request,
    /// by waiting or by collecting more signatures.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TreasuryError::InsufficientSignatures
                | TreasuryError::PolicyThresholdNotMet
                | TreasuryError::RequiredApprovalMissing
        ) || self.class() == ErrorClass::Timing
    }
}
