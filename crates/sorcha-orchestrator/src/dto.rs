use sorcha_core::types::{Algorithm, RegisterId, Role, TxId};

/// One proposed owner in an `initiate` request.
#[derive(Clone, Debug)]
pub struct OwnerProposal {
    pub user_id: String,
    pub wallet_id: String,
    pub role: Role,
}

#[derive(Clone, Debug)]
pub struct InitiateRequest {
    pub name: String,
    pub description: String,
    pub tenant_id: String,
    pub owners: Vec<OwnerProposal>,
}

/// One attestation template handed back to the client to sign.
#[derive(Clone, Debug)]
pub struct StagedAttestation {
    pub user_id: String,
    pub wallet_id: String,
    pub role: Role,
    pub attestation_data: Vec<u8>,
    pub data_to_sign: String,
}

#[derive(Clone, Debug)]
pub struct InitiateResponse {
    pub register_id: RegisterId,
    pub nonce: String,
    pub attestations_to_sign: Vec<StagedAttestation>,
    pub expires_at: i64,
}

/// One owner's signature over the attestation template bytes they were
/// handed at `initiate` time.
#[derive(Clone, Debug)]
pub struct SignedAttestation {
    pub attestation_data: Vec<u8>,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub algorithm: Algorithm,
}

#[derive(Clone, Debug)]
pub struct FinalizeRequest {
    pub register_id: RegisterId,
    pub nonce: String,
    pub signed_attestations: Vec<SignedAttestation>,
}

#[derive(Clone, Debug)]
pub struct FinalizeResponse {
    pub register_id: RegisterId,
    pub status: String,
    pub genesis_transaction_id: TxId,
}
