use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SorchaError};

// ── TxId ─────────────────────────────────────────────────────────────────────

/// A 32-byte transaction identifier, displayed and exchanged as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId([u8; 32]);

impl TxId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| SorchaError::InvalidRequest(format!("invalid TxId hex: {e}")))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| SorchaError::InvalidRequest("TxId must be 32 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.to_hex();
        write!(f, "TxId({}…{})", &h[..8], &h[h.len() - 8..])
    }
}

// ── RegisterId ───────────────────────────────────────────────────────────────

/// A 128-bit register identifier, generated fresh at `Initiate` time.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegisterId([u8; 16]);

impl RegisterId {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Generate a fresh, cryptographically-random register id.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s)
            .map_err(|e| SorchaError::InvalidRequest(format!("invalid RegisterId hex: {e}")))?;
        let arr: [u8; 16] = bytes
            .try_into()
            .map_err(|_| SorchaError::InvalidRequest("RegisterId must be 16 bytes".into()))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegisterId({})", self.to_hex())
    }
}

// ── DID ──────────────────────────────────────────────────────────────────────

/// Identity token: either `w:<wallet-address>` or `r:<registerId>:t:<txId>`.
///
/// Equality is by-value and case-sensitive; parsing is intentionally strict
/// since a malformed DID must surface as `InvalidFormat`, never be guessed at.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Did(String);

/// The two grammars a DID can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DidForm {
    Wallet { address: String },
    Register { register_id: String, tx_id: String },
}

impl Did {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn wallet(address: impl AsRef<str>) -> Self {
        Self(format!("w:{}", address.as_ref()))
    }

    /// Parse into one of the two recognized grammars.
    ///
    /// Neither grammar matching is the caller's `InvalidFormat` case — it
    /// is represented here as `None` rather than an error so callers that
    /// only need shape validation don't have to pattern-match on `Result`.
    pub fn parse(&self) -> Option<DidForm> {
        if let Some(rest) = self.0.strip_prefix("w:") {
            if rest.is_empty() {
                return None;
            }
            return Some(DidForm::Wallet {
                address: rest.to_string(),
            });
        }
        if let Some(rest) = self.0.strip_prefix("r:") {
            let mut parts = rest.splitn(2, ":t:");
            let register_id = parts.next()?;
            let tx_id = parts.next()?;
            if register_id.is_empty() || tx_id.is_empty() {
                return None;
            }
            return Some(DidForm::Register {
                register_id: register_id.to_string(),
                tx_id: tx_id.to_string(),
            });
        }
        None
    }

    pub fn is_well_formed(&self) -> bool {
        self.parse().is_some()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Did({})", self.0)
    }
}

// ── Role ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Admin,
    Auditor,
}

// ── Algorithm ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    #[serde(rename = "ED25519")]
    Ed25519,
    #[serde(rename = "NIST_P256")]
    NistP256,
    #[serde(rename = "RSA_4096")]
    Rsa4096,
}

// ── Transaction type & priority ───────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionType {
    Genesis,
    Control,
    Action,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionPriority {
    Normal,
    High,
}

impl TransactionType {
    /// Genesis transactions are admitted ahead of Actions and Controls;
    /// everything else shares a single priority class (§4.5 admission rules).
    pub fn default_priority(self) -> TransactionPriority {
        match self {
            TransactionType::Genesis => TransactionPriority::High,
            TransactionType::Control | TransactionType::Action => TransactionPriority::Normal,
        }
    }
}

// ── Docket state ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocketState {
    Proposed,
    Accepted,
    Sealed,
}

// ── Governance operation type ─────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Add,
    Remove,
    Transfer,
}
