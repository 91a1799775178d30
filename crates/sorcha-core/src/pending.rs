use serde::{Deserialize, Serialize};

use crate::types::{RegisterId, Role};

/// One owner's not-yet-signed attestation template, staged between
/// `Initiate` and `Finalize`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttestationToSign {
    pub user_id: String,
    pub wallet_id: String,
    pub role: Role,
    /// The exact canonical-encoded bytes that must be signed verbatim.
    pub raw_attestation_bytes: Vec<u8>,
    /// `sha256(raw_attestation_bytes)`, lowercase hex.
    pub hash_to_sign: String,
}

/// Transient, TTL-bounded state between `Initiate` and `Finalize` (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub register_id: RegisterId,
    pub nonce: String,
    pub name: String,
    pub description: String,
    pub tenant_id: String,
    pub attestations_to_sign: Vec<AttestationToSign>,
    pub created_at: i64,
    pub expires_at: i64,
}

impl PendingRegistration {
    pub fn is_expired(&self, now: i64) -> bool {
        now >= self.expires_at
    }
}
