use thiserror::Error;

/// Errors surfaced anywhere in the Sorcha workspace.
///
/// Grouped by the pipeline stage that raises them, matching the error
/// taxonomy of the governance/genesis specification.
#[derive(Error, Debug)]
pub enum SorchaError {
    // ── Request validation ───────────────────────────────────────────────
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("tenant rejected: {0}")]
    TenantRejected(String),

    // ── Not found ─────────────────────────────────────────────────────────
    #[error("register not found: {0}")]
    RegisterNotFound(String),

    #[error("transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("pending registration not found for register {register_id}")]
    PendingNotFound { register_id: String },

    #[error("DID could not be resolved: {0}")]
    DidNotFound(String),

    // ── Orchestrator / registration ──────────────────────────────────────
    #[error("pending registration for register {register_id} expired at {expired_at}")]
    PendingExpired {
        register_id: String,
        expired_at: i64,
    },

    #[error("signature invalid for subject {subject}")]
    SignatureInvalid { subject: String },

    #[error("conflict: {0}")]
    Conflict(String),

    // ── Governance ────────────────────────────────────────────────────────
    #[error("proposal expired (proposed_at={proposed_at}, expires_at={expires_at}, now={now})")]
    ProposalExpired {
        proposed_at: i64,
        expires_at: i64,
        now: i64,
    },

    #[error("proposal window exceeds the 7-day maximum (proposed_at={proposed_at}, expires_at={expires_at})")]
    ProposalWindowTooLong { proposed_at: i64, expires_at: i64 },

    #[error("proposer is not a member of the roster: {0}")]
    ProposerNotMember(String),

    #[error("target is already a member of the roster: {0}")]
    TargetAlreadyMember(String),

    #[error("target is not a member of the roster: {0}")]
    TargetNotMember(String),

    #[error("roster is full (max {max} members)")]
    RosterFull { max: usize },

    #[error("target role {0:?} is not permitted for this operation")]
    InvalidTargetRole(crate::types::Role),

    #[error("proposer role {0:?} may not submit this operation")]
    InvalidProposerRole(crate::types::Role),

    #[error("owner removal must go through Transfer, not Remove")]
    OwnerRemovalRequiresTransfer,

    #[error("transfer target is not a current member: {0}")]
    TransferTargetNotMember(String),

    #[error("transfer target does not hold role Admin: {0}")]
    TransferTargetNotAdmin(String),

    #[error("transfer proposer is not the current owner: {0}")]
    TransferProposerNotOwner(String),

    #[error("argument error: {0}")]
    ArgumentError(String),

    // ── Validator / docket ────────────────────────────────────────────────
    #[error("duplicate transaction id: {0}")]
    DuplicateTxId(String),

    #[error("register {register_id} is not accepting transactions of type {kind} in status {status:?}")]
    RegisterNotAcceptingTransactions {
        register_id: String,
        kind: String,
        status: crate::register::RegisterStatus,
    },

    #[error("previous transaction {0} not found in register")]
    PrevTransactionNotFound(String),

    #[error("control payload rejected by roster rules: {0}")]
    IllegalRosterSuccessor(String),

    #[error("docket chain broken for register {register_id} at docket {at}")]
    DocketChainBroken { register_id: String, at: u64 },

    // ── Crypto ────────────────────────────────────────────────────────────
    #[error("invalid key format: {0}")]
    InvalidKeyFormat(String),

    #[error("invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    #[error("signature verification failed")]
    VerificationFailed,

    // ── Canonical encoding ────────────────────────────────────────────────
    #[error("canonical encoding error: {0}")]
    CanonicalEncoding(String),

    // ── Storage ───────────────────────────────────────────────────────────
    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    // ── Cancellation ──────────────────────────────────────────────────────
    #[error("operation cancelled")]
    Cancelled,

    /// A downstream collaborator (wallet store, validator) is unavailable.
    /// Caller may retry; no partial state is retained.
    #[error("upstream transient failure: {0}")]
    UpstreamTransient(String),
}

pub type Result<T> = std::result::Result<T, SorchaError>;
