use jsonrpsee::core::RpcResult;
use jsonrpsee::proc_macros::rpc;

use sorcha_core::{AdminRoster, GovernanceOperation, RegisterAttestation, RegisterControlRecord};
use sorcha_did::resolver::ResolvedKey;
use sorcha_governance::{QuorumResult, ValidationOutcome};
use sorcha_validator::ChainReport;

use crate::types::{
    RpcFinalizeRequest, RpcFinalizeResponse, RpcInitiateRequest, RpcInitiateResponse,
    RpcRegisterInfo,
};

/// Sorcha's JSON-RPC 2.0 API. Every method name is prefixed with
/// "sorcha_" via `namespace = "sorcha"`.
#[rpc(server, namespace = "sorcha")]
pub trait SorchaApi {
    /// Stage a pending registration and return the per-owner attestation
    /// templates to sign (§4.3 step 1-2).
    #[method(name = "registerInitiate")]
    async fn register_initiate(&self, req: RpcInitiateRequest) -> RpcResult<RpcInitiateResponse>;

    /// Verify signed attestations, assemble the genesis control record, and
    /// submit the genesis transaction (§4.3 step 3-4).
    #[method(name = "registerFinalize")]
    async fn register_finalize(&self, req: RpcFinalizeRequest) -> RpcResult<RpcFinalizeResponse>;

    /// Look up a register's control-plane record by hex register id.
    #[method(name = "getRegister")]
    async fn get_register(&self, register_id: String) -> RpcResult<Option<RpcRegisterInfo>>;

    /// Reconstruct the current roster snapshot for a register.
    #[method(name = "getRoster")]
    async fn get_roster(&self, register_id: String) -> RpcResult<Option<AdminRoster>>;

    /// Validate a proposed governance operation against a register's
    /// current roster, collecting every violated precondition.
    #[method(name = "validateProposal")]
    async fn validate_proposal(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        now: i64,
    ) -> RpcResult<ValidationOutcome>;

    /// Evaluate quorum for a proposed operation against the current roster
    /// and a set of approvals.
    #[method(name = "validateQuorum")]
    async fn validate_quorum(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        approvals: Vec<sorcha_core::ApprovalSignature>,
    ) -> RpcResult<QuorumResult>;

    /// Apply a proposed operation to a register's current roster snapshot
    /// (§4.4 `ApplyOperation`), returning the successor control record.
    /// Pure computation — callers are expected to have already cleared
    /// `validateProposal`/`validateQuorum` and are responsible for
    /// embedding the result into a signed control transaction themselves.
    /// `attestation` is required for `Add` and ignored otherwise.
    #[method(name = "applyOperation")]
    async fn apply_operation(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        attestation: Option<RegisterAttestation>,
    ) -> RpcResult<RegisterControlRecord>;

    /// Submit a signed transaction for mempool admission. `tx_hex` is
    /// hex-encoded bincode(Transaction). Returns the txId hex on success.
    #[method(name = "submitTransaction")]
    async fn submit_transaction(&self, tx_hex: String) -> RpcResult<String>;

    /// Trigger an out-of-schedule docket build for a register. Returns the
    /// sealed docket, or null if the mempool was empty.
    #[method(name = "buildDocket")]
    async fn build_docket(&self, register_id: String) -> RpcResult<Option<sorcha_core::Docket>>;

    /// Run the composite chain audit (§4.5) for a register.
    #[method(name = "validateChain")]
    async fn validate_chain(&self, register_id: String) -> RpcResult<ChainReport>;

    /// Resolve a DID token to the verification key it names.
    #[method(name = "resolveDid")]
    async fn resolve_did(&self, did: String) -> RpcResult<ResolvedKey>;
}
