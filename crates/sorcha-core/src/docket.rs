use serde::{Deserialize, Serialize};

use crate::types::{DocketState, RegisterId, TxId};

/// A sealed batch of transactions, hash-linked to its predecessor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Docket {
    pub id: u64,
    pub register_id: RegisterId,
    /// 64-hex previous docket hash, or empty for docket 1.
    pub previous_hash: String,
    /// 64-hex hash of this docket.
    pub hash: String,
    pub transaction_ids: Vec<TxId>,
    pub state: DocketState,
    pub timestamp: i64,
    pub signature: Vec<u8>,
}

impl Docket {
    /// Computes `H(id ∥ previousHash ∥ concat(sorted(transactionIds)) ∥ timestamp)`
    /// per the §3 docket-hash invariant.
    pub fn compute_hash(
        id: u64,
        previous_hash: &str,
        transaction_ids: &[TxId],
        timestamp: i64,
    ) -> String {
        let mut sorted_ids: Vec<String> = transaction_ids.iter().map(|t| t.to_hex()).collect();
        sorted_ids.sort();

        let mut hasher_input = Vec::new();
        hasher_input.extend_from_slice(&id.to_be_bytes());
        hasher_input.extend_from_slice(previous_hash.as_bytes());
        for tid in &sorted_ids {
            hasher_input.extend_from_slice(tid.as_bytes());
        }
        hasher_input.extend_from_slice(&timestamp.to_be_bytes());

        blake3::hash(&hasher_input).to_hex().to_string()
    }
}
