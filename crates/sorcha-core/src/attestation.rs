use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_ROSTER_SIZE;
use crate::error::{Result, SorchaError};
use crate::types::{Algorithm, Did, Role, RegisterId, TxId};

/// A single grant of authority over a register, signed by the subject's key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterAttestation {
    pub role: Role,
    pub subject: Did,
    pub public_key: Vec<u8>,
    pub algorithm: Algorithm,
    pub signature: Vec<u8>,
    pub granted_at: i64,
}

impl RegisterAttestation {
    /// Checks the key-length/algorithm consistency invariant from §3.
    pub fn key_matches_algorithm(&self) -> bool {
        use crate::constants::*;
        match self.algorithm {
            Algorithm::Ed25519 => self.public_key.len() == ED25519_PUBLIC_KEY_LEN,
            Algorithm::NistP256 => {
                let (lo, hi) = P256_PUBLIC_KEY_LEN_RANGE;
                (lo..=hi).contains(&self.public_key.len())
            }
            Algorithm::Rsa4096 => self.public_key.len() >= RSA4096_MIN_MODULUS_DER_LEN,
        }
    }
}

/// The full control surface for a register: its current owner/admin/auditor
/// roster, attached to the register's identity and metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterControlRecord {
    pub register_id: RegisterId,
    pub name: String,
    pub tenant_id: String,
    pub created_at: i64,
    pub attestations: Vec<RegisterAttestation>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RegisterControlRecord {
    /// Enforces the §3 roster invariants: at most one Owner, size bound,
    /// distinct subjects.
    pub fn validate_invariants(&self) -> Result<()> {
        let owners = self
            .attestations
            .iter()
            .filter(|a| a.role == Role::Owner)
            .count();
        if owners > 1 {
            return Err(SorchaError::InvalidRequest(
                "at most one Owner attestation is permitted".into(),
            ));
        }
        if self.attestations.len() > MAX_ROSTER_SIZE {
            return Err(SorchaError::RosterFull {
                max: MAX_ROSTER_SIZE,
            });
        }
        let mut seen = std::collections::HashSet::new();
        for a in &self.attestations {
            if !seen.insert(a.subject.clone()) {
                return Err(SorchaError::InvalidRequest(format!(
                    "duplicate subject in roster: {}",
                    a.subject
                )));
            }
        }
        Ok(())
    }

    pub fn find(&self, subject: &Did) -> Option<&RegisterAttestation> {
        self.attestations.iter().find(|a| &a.subject == subject)
    }

    pub fn owner(&self) -> Option<&RegisterAttestation> {
        self.attestations.iter().find(|a| a.role == Role::Owner)
    }

    /// Members eligible to vote: Owner + Admin.
    pub fn voting_pool(&self) -> Vec<&RegisterAttestation> {
        self.attestations
            .iter()
            .filter(|a| matches!(a.role, Role::Owner | Role::Admin))
            .collect()
    }
}

/// Purely-derived snapshot of a register's current roster, reconstructed
/// from the control-transaction chain (§4.4 `GetCurrentRoster`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminRoster {
    pub register_id: RegisterId,
    pub control_record: RegisterControlRecord,
    pub control_transaction_count: u64,
    pub last_control_tx_id: TxId,
}
