//! Wire types for the JSON-RPC surface. Kept separate from the domain
//! types in `sorcha-orchestrator`/`sorcha-core` wherever those aren't
//! themselves serde-enabled, mirroring this corpus's Rpc-prefixed DTO
//! convention.

use serde::{Deserialize, Serialize};

use sorcha_core::types::{Algorithm, Role};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcOwnerProposal {
    pub user_id: String,
    pub wallet_id: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcInitiateRequest {
    pub name: String,
    pub description: String,
    pub tenant_id: String,
    pub owners: Vec<RpcOwnerProposal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcStagedAttestation {
    pub user_id: String,
    pub wallet_id: String,
    pub role: Role,
    /// Hex-encoded raw attestation bytes.
    pub attestation_data_hex: String,
    /// Canonical hash the owner must sign, already hex-encoded.
    pub data_to_sign: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcInitiateResponse {
    pub register_id: String,
    pub nonce: String,
    pub attestations_to_sign: Vec<RpcStagedAttestation>,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSignedAttestation {
    /// Hex-encoded raw attestation bytes, echoed back from `initiate`.
    pub attestation_data_hex: String,
    pub public_key_hex: String,
    pub signature_hex: String,
    pub algorithm: Algorithm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcFinalizeRequest {
    pub register_id: String,
    pub nonce: String,
    pub signed_attestations: Vec<RpcSignedAttestation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcFinalizeResponse {
    pub register_id: String,
    pub status: String,
    pub genesis_transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRegisterInfo {
    pub id: String,
    pub name: String,
    pub tenant_id: String,
    pub height: u64,
    pub status: String,
    pub created_at: i64,
    pub advertise: bool,
}
