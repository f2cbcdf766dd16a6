//! Data types for the Multisig Treasury contract

use soroban_sdk::{contracttype, Address, Bytes, BytesN, String, Vec};

pub const DAY: u64 = 24 * 60 * 60;
pub const WEEK: u64 = 7 * DAY;
pub const MONTH: u64 = 30 * DAY;

/// Highest category a proposal may carry.
pub const MAX_CATEGORY: u32 = 254;
/// Policy category matching every proposal category.
pub const ANY_CATEGORY: u32 = 255;

/// Hard ceiling for `EngineConfig::max_batch_size`.
pub const MAX_BATCH_SIZE: u32 = 50;
pub const MIN_SIGNERS: u32 = 2;

// ============================================================================
// Engine configuration
// ============================================================================

/// Who may cancel a pending proposal besides approval-policy veto signers
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum CancelMode {
    /// Only the original proposer
    ProposerOnly = 0,
    /// The proposer, or every current signer acting together
    ProposerOrUnanimous = 1,
}

/// Contract-wide settings (instance storage)
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of transactions in one proposal (1..=50)
    pub max_batch_size: u32,
    /// Maximum size of a signer or emergency signer set
    pub max_signers: u32,
    /// Lower bound for every proposal time-lock, in seconds
    pub min_time_lock: u64,
    /// Minimum delay between two emergency withdrawals on one treasury
    pub emergency_cooldown: u64,
    pub cancel_mode: CancelMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_batch_size: MAX_BATCH_SIZE,
            max_signers: 20,
            min_time_lock: 0,
            emergency_cooldown: DAY,
            cancel_mode: CancelMode::ProposerOnly,
        }
    }
}

// ============================================================================
// Treasury
// ============================================================================

/// Signer policy and status of one custody account. Balances are stored
/// separately, one entry per asset.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Treasury {
    pub id: u64,
    pub signers: Vec<Address>,
    /// Number of distinct signatures required to execute a proposal
    pub threshold: u32,
    /// May be empty, in which case the emergency path is disabled
    pub emergency_signers: Vec<Address>,
    pub emergency_threshold: u32,
    pub frozen: bool,
    /// Policies bound to this treasury, in creation order
    pub policy_ids: Vec<u64>,
    /// Optional contract consulted for every recorded signature
    pub verifier: Option<Address>,
    pub created_at: u64,
}

/// Administrative capability for one treasury. Exactly one exists per
/// treasury and it only changes hands through an explicit transfer.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AdminCap {
    pub id: u64,
    pub treasury_id: u64,
    pub holder: Address,
}

// ============================================================================
// Proposals
// ============================================================================

/// Status of a spending proposal
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalStatus {
    /// Created, no signatures yet
    Created = 0,
    /// Collecting signatures
    Signed = 1,
    /// Enough signatures; waiting for the time-lock
    Executable = 2,
    /// Funds released
    Executed = 3,
    /// Withdrawn before execution
    Cancelled = 4,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStatus::Executed | ProposalStatus::Cancelled)
    }
}

/// One outbound transfer inside a proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    pub recipient: Address,
    pub amount: i128,
    pub asset: Address,
}

/// A signature recorded against a proposal
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignatureRecord {
    pub signer: Address,
    pub signature: Bytes,
    pub signed_at: u64,
}

/// A batch of transfers awaiting collective approval
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: u64,
    pub treasury_id: u64,
    pub proposer: Address,
    /// Executed in this order
    pub transactions: Vec<Transaction>,
    pub category: u32,
    pub signatures: Vec<SignatureRecord>,
    pub created_at: u64,
    /// Earliest execution timestamp
    pub time_lock_end: u64,
    pub status: ProposalStatus,
    pub metadata: Bytes,
    /// SHA-256 over the proposal id, treasury id and transactions
    pub payload_hash: BytesN<32>,
    pub executed_at: Option<u64>,
}

// ============================================================================
// Policies
// ============================================================================

/// Type tag of a policy rule
#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum PolicyKind {
    SpendingLimit = 0,
    Whitelist = 1,
    Timelock = 2,
    AmountThreshold = 3,
    Approval = 4,
}

/// Caps on spend per category. A limit of 0 disables that check.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendingLimitRule {
    /// Category this limit applies to, or `ANY_CATEGORY`
    pub category: u32,
    /// Cap on the total of a single proposal
    pub max_per_transaction: i128,
    pub daily_limit: i128,
    pub weekly_limit: i128,
    pub monthly_limit: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WhitelistRule {
    pub whitelist: Vec<Address>,
    pub blacklist: Vec<Address>,
    /// When set, every recipient must appear in `whitelist`
    pub enforce_whitelist: bool,
}

/// Requires `base_duration + total / amount_factor` seconds of time-lock
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimelockRule {
    pub base_duration: u64,
    /// Amount per additional second; 0 disables the extension
    pub amount_factor: i128,
}

/// `min_amount <= total < max_amount`; a `max_amount` of 0 is unbounded
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ThresholdTier {
    pub min_amount: i128,
    pub max_amount: i128,
    pub required_signatures: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AmountThresholdRule {
    /// Evaluated in order; the first matching tier applies
    pub tiers: Vec<ThresholdTier>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ApprovalRule {
    pub category: u32,
    /// Every one of these must have signed before execution
    pub required_signers: Vec<Address>,
    /// Any one of these may cancel a proposal in the category
    pub veto_signers: Vec<Address>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PolicyRule {
    SpendingLimit(SpendingLimitRule),
    Whitelist(WhitelistRule),
    Timelock(TimelockRule),
    AmountThreshold(AmountThresholdRule),
    Approval(ApprovalRule),
}

impl PolicyRule {
    pub fn kind(&self) -> PolicyKind {
        match self {
            PolicyRule::SpendingLimit(_) => PolicyKind::SpendingLimit,
            PolicyRule::Whitelist(_) => PolicyKind::Whitelist,
            PolicyRule::Timelock(_) => PolicyKind::Timelock,
            PolicyRule::AmountThreshold(_) => PolicyKind::AmountThreshold,
            PolicyRule::Approval(_) => PolicyKind::Approval,
        }
    }
}

/// A rule bound to a treasury
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Policy {
    pub id: u64,
    pub treasury_id: u64,
    pub rule: PolicyRule,
    pub active: bool,
    pub created_at: u64,
}

/// Rolling spend per category. Buckets reset once their window has
/// elapsed since the matching `last_*_reset`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SpendingTracker {
    pub category: u32,
    pub daily_spent: i128,
    pub weekly_spent: i128,
    pub monthly_spent: i128,
    pub last_daily_reset: u64,
    pub last_weekly_reset: u64,
    pub last_monthly_reset: u64,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ViolationKind {
    SpendingLimit = 0,
    Blacklisted = 1,
    NotWhitelisted = 2,
    TimeLockTooShort = 3,
    ThresholdNotMet = 4,
    ApprovalMissing = 5,
}

/// The first rule a proposal fails, with the bound it failed against
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PolicyViolation {
    pub policy_id: u64,
    pub kind: ViolationKind,
    pub limit: i128,
    pub actual: i128,
}

// ============================================================================
// Emergency path
// ============================================================================

/// Single withdrawal approved by the emergency signer set, without time-lock
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyProposal {
    pub id: u64,
    pub treasury_id: u64,
    pub proposer: Address,
    pub recipient: Address,
    pub amount: i128,
    pub asset: Address,
    pub reason: String,
    pub signatures: Vec<SignatureRecord>,
    pub created_at: u64,
    pub executed: bool,
    pub payload_hash: BytesN<32>,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyCooldown {
    pub treasury_id: u64,
    /// `None` until the first emergency withdrawal
    pub last_emergency: Option<u64>,
}

#[contracttype]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum AuditAction {
    EmergencyWithdrawal = 0,
    EmergencyFreeze = 1,
    Unfreeze = 2,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditEntry {
    pub treasury_id: u64,
    pub action: AuditAction,
    pub actor: Address,
    pub amount: i128,
    pub asset: Option<Address>,
    pub timestamp: u64,
    pub reason: String,
}
