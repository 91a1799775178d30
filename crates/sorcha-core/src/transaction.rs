use serde::{Deserialize, Serialize};

use crate::types::{RegisterId, TransactionPriority, TransactionType, TxId};

/// An opaque payload chunk carried by a transaction. The validator never
/// interprets `data` — only the Governance/Orchestrator layers decode the
/// specific payloads they expect (e.g. a control-transaction payload).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payload {
    pub data: Vec<u8>,
    pub hash: [u8; 32],
    pub size: u64,
}

impl Payload {
    pub fn new(data: Vec<u8>) -> Self {
        let hash = blake3_hash(&data);
        let size = data.len() as u64;
        Self { data, hash, size }
    }
}

fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionMetadata {
    pub blueprint_id: String,
    pub action_id: String,
    pub transaction_type: TransactionType,
}

/// A signed, sequenced unit of work within a register.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_id: TxId,
    pub register_id: RegisterId,
    pub sender_wallet: String,
    pub recipients: Vec<String>,
    pub prev_tx_id: Option<TxId>,
    pub payloads: Vec<Payload>,
    pub metadata: TransactionMetadata,
    pub signature: Vec<u8>,
    pub created_at: i64,
}

impl Transaction {
    pub fn priority(&self) -> TransactionPriority {
        self.metadata.transaction_type.default_priority()
    }

    /// Derive a transaction's id as BLAKE3 of every field except `tx_id`
    /// and `signature`, bincode-encoded in field order. Mirrors this
    /// corpus's convention of deriving an id from a transaction's body
    /// rather than assigning one arbitrarily.
    pub fn derive_tx_id(
        register_id: &RegisterId,
        sender_wallet: &str,
        recipients: &[String],
        prev_tx_id: &Option<TxId>,
        payloads: &[Payload],
        metadata: &TransactionMetadata,
        created_at: i64,
    ) -> TxId {
        #[derive(Serialize)]
        struct IdBody<'a> {
            register_id: &'a RegisterId,
            sender_wallet: &'a str,
            recipients: &'a [String],
            prev_tx_id: &'a Option<TxId>,
            payloads: &'a [Payload],
            metadata: &'a TransactionMetadata,
            created_at: i64,
        }
        let body = IdBody {
            register_id,
            sender_wallet,
            recipients,
            prev_tx_id,
            payloads,
            metadata,
            created_at,
        };
        let bytes = bincode::serialize(&body).expect("transaction id body is always serializable");
        TxId::from_bytes(*blake3::hash(&bytes).as_bytes())
    }

    /// The bytes that were signed: every field except `signature` itself,
    /// bincode-encoded in field order. Mirrors the borrowed-body pattern
    /// used elsewhere in this corpus for hash/signature stability.
    pub fn signing_body(&self) -> Vec<u8> {
        #[derive(Serialize)]
        struct Body<'a> {
            tx_id: &'a TxId,
            register_id: &'a RegisterId,
            sender_wallet: &'a str,
            recipients: &'a [String],
            prev_tx_id: &'a Option<TxId>,
            payloads: &'a [Payload],
            metadata: &'a TransactionMetadata,
            created_at: i64,
        }
        let body = Body {
            tx_id: &self.tx_id,
            register_id: &self.register_id,
            sender_wallet: &self.sender_wallet,
            recipients: &self.recipients,
            prev_tx_id: &self.prev_tx_id,
            payloads: &self.payloads,
            metadata: &self.metadata,
            created_at: self.created_at,
        };
        bincode::serialize(&body).expect("transaction body is always serializable")
    }
}
