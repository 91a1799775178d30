use std::net::SocketAddr;
use std::sync::Arc;

use jsonrpsee::core::{async_trait, RpcResult};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObject;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use sorcha_core::register::RegisterStatus;
use sorcha_core::types::RegisterId;
use sorcha_core::{AdminRoster, Docket, GovernanceOperation, RegisterAttestation, RegisterControlRecord, SorchaError, Transaction};
use sorcha_did::resolver::{DidResolver, ResolvedKey};
use sorcha_governance::{QuorumResult, RosterReconstructor, ValidationOutcome};
use sorcha_orchestrator::{FinalizeRequest, InitiateRequest, OwnerProposal, RegistrationOrchestrator, SignedAttestation};
use sorcha_repository::RegisterRepository;
use sorcha_validator::{validate_complete_chain, ChainReport, DocketBuilder, Validator};

use crate::api::SorchaApiServer;
use crate::types::{
    RpcFinalizeRequest, RpcFinalizeResponse, RpcInitiateRequest, RpcInitiateResponse, RpcRegisterInfo,
    RpcStagedAttestation,
};

fn rpc_err(code: i32, msg: impl Into<String>) -> ErrorObject<'static> {
    ErrorObject::owned(code, msg.into(), None::<()>)
}

fn err_of(e: SorchaError) -> ErrorObject<'static> {
    rpc_err(-32000, e.to_string())
}

fn register_status_str(status: RegisterStatus) -> String {
    match status {
        RegisterStatus::Initializing => "Initializing".to_string(),
        RegisterStatus::Online => "Online".to_string(),
        RegisterStatus::Quiesced => "Quiesced".to_string(),
        RegisterStatus::Deleted => "Deleted".to_string(),
    }
}

/// Shared state passed to the RPC server: one handle per collaborator,
/// each independently constructible and testable (§4's component split).
pub struct RpcServerState {
    pub repository: Arc<dyn RegisterRepository>,
    pub orchestrator: Arc<RegistrationOrchestrator>,
    pub validator: Arc<Validator>,
    pub docket_builder: Arc<DocketBuilder>,
    pub did_resolver: Arc<DidResolver>,
}

pub struct RpcServer {
    state: Arc<RpcServerState>,
}

impl RpcServer {
    pub fn new(state: Arc<RpcServerState>) -> Self {
        Self { state }
    }

    /// Start the JSON-RPC server on `addr` with permissive CORS headers.
    pub async fn start(self, addr: SocketAddr) -> anyhow::Result<ServerHandle> {
        let cors = CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any)
            .allow_headers(Any);

        let server = Server::builder()
            .set_http_middleware(tower::ServiceBuilder::new().layer(cors))
            .build(addr)
            .await?;

        let module = self.into_rpc();
        let handle = server.start(module);
        info!(%addr, "RPC server started");
        Ok(handle)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[async_trait]
impl SorchaApiServer for RpcServer {
    async fn register_initiate(&self, req: RpcInitiateRequest) -> RpcResult<RpcInitiateResponse> {
        let owners = req
            .owners
            .into_iter()
            .map(|o| OwnerProposal {
                user_id: o.user_id,
                wallet_id: o.wallet_id,
                role: o.role,
            })
            .collect();

        let response = self
            .state
            .orchestrator
            .initiate(
                InitiateRequest {
                    name: req.name,
                    description: req.description,
                    tenant_id: req.tenant_id,
                    owners,
                },
                now(),
            )
            .map_err(err_of)?;

        Ok(RpcInitiateResponse {
            register_id: response.register_id.to_hex(),
            nonce: response.nonce,
            attestations_to_sign: response
                .attestations_to_sign
                .into_iter()
                .map(|a| RpcStagedAttestation {
                    user_id: a.user_id,
                    wallet_id: a.wallet_id,
                    role: a.role,
                    attestation_data_hex: hex::encode(a.attestation_data),
                    data_to_sign: a.data_to_sign,
                })
                .collect(),
            expires_at: response.expires_at,
        })
    }

    async fn register_finalize(&self, req: RpcFinalizeRequest) -> RpcResult<RpcFinalizeResponse> {
        let register_id = RegisterId::from_hex(&req.register_id).map_err(err_of)?;

        let mut signed_attestations = Vec::with_capacity(req.signed_attestations.len());
        for s in req.signed_attestations {
            signed_attestations.push(SignedAttestation {
                attestation_data: hex::decode(&s.attestation_data_hex)
                    .map_err(|e| rpc_err(-32602, format!("invalid attestation hex: {e}")))?,
                public_key: hex::decode(&s.public_key_hex)
                    .map_err(|e| rpc_err(-32602, format!("invalid public key hex: {e}")))?,
                signature: hex::decode(&s.signature_hex)
                    .map_err(|e| rpc_err(-32602, format!("invalid signature hex: {e}")))?,
                algorithm: s.algorithm,
            });
        }

        let response = self
            .state
            .orchestrator
            .finalize(
                FinalizeRequest {
                    register_id,
                    nonce: req.nonce,
                    signed_attestations,
                },
                now(),
            )
            .map_err(err_of)?;

        Ok(RpcFinalizeResponse {
            register_id: response.register_id.to_hex(),
            status: response.status,
            genesis_transaction_id: response.genesis_transaction_id.to_hex(),
        })
    }

    async fn get_register(&self, register_id: String) -> RpcResult<Option<RpcRegisterInfo>> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        let register = self.state.repository.get_register(&id).map_err(err_of)?;
        Ok(register.map(|r| RpcRegisterInfo {
            id: r.id.to_hex(),
            name: r.name,
            tenant_id: r.tenant_id,
            height: r.height,
            status: register_status_str(r.status),
            created_at: r.created_at,
            advertise: r.advertise,
        }))
    }

    async fn get_roster(&self, register_id: String) -> RpcResult<Option<AdminRoster>> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        let reconstructor = RosterReconstructor::new(Arc::clone(&self.state.repository));
        reconstructor.get_current_roster(&id).map_err(err_of)
    }

    async fn validate_proposal(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        now: i64,
    ) -> RpcResult<ValidationOutcome> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        let reconstructor = RosterReconstructor::new(Arc::clone(&self.state.repository));
        let roster = reconstructor
            .get_current_roster(&id)
            .map_err(err_of)?
            .ok_or_else(|| err_of(SorchaError::RegisterNotFound(register_id)))?;
        Ok(sorcha_governance::validate_proposal(&roster.control_record, &operation, now))
    }

    async fn validate_quorum(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        approvals: Vec<sorcha_core::ApprovalSignature>,
    ) -> RpcResult<QuorumResult> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        let reconstructor = RosterReconstructor::new(Arc::clone(&self.state.repository));
        let roster = reconstructor
            .get_current_roster(&id)
            .map_err(err_of)?
            .ok_or_else(|| err_of(SorchaError::RegisterNotFound(register_id)))?;
        Ok(sorcha_governance::validate_quorum(&roster.control_record, &operation, &approvals))
    }

    async fn apply_operation(
        &self,
        register_id: String,
        operation: GovernanceOperation,
        attestation: Option<RegisterAttestation>,
    ) -> RpcResult<RegisterControlRecord> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        let reconstructor = RosterReconstructor::new(Arc::clone(&self.state.repository));
        let roster = reconstructor
            .get_current_roster(&id)
            .map_err(err_of)?
            .ok_or_else(|| err_of(SorchaError::RegisterNotFound(register_id)))?;
        sorcha_governance::apply_operation(&roster.control_record, &operation, attestation.as_ref())
            .map_err(err_of)
    }

    async fn submit_transaction(&self, tx_hex: String) -> RpcResult<String> {
        let bytes = hex::decode(&tx_hex).map_err(|e| rpc_err(-32602, format!("invalid hex: {e}")))?;
        let tx: Transaction =
            bincode::deserialize(&bytes).map_err(|e| rpc_err(-32602, format!("invalid transaction encoding: {e}")))?;
        let tx_id = tx.tx_id;
        sorcha_core::TransactionAdmitter::admit(self.state.validator.as_ref(), tx).map_err(err_of)?;
        Ok(tx_id.to_hex())
    }

    async fn build_docket(&self, register_id: String) -> RpcResult<Option<Docket>> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        self.state.docket_builder.build(id, now()).map_err(err_of)
    }

    async fn validate_chain(&self, register_id: String) -> RpcResult<ChainReport> {
        let id = RegisterId::from_hex(&register_id).map_err(err_of)?;
        validate_complete_chain(&self.state.repository, &id).map_err(err_of)
    }

    async fn resolve_did(&self, did: String) -> RpcResult<ResolvedKey> {
        let did = sorcha_core::types::Did::new(did);
        self.state.did_resolver.resolve(&did).await.map_err(err_of)
    }
}

