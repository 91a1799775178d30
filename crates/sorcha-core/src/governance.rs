use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Did, OperationType, Role};

/// A proposed roster mutation, awaiting (or having gathered) approvals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GovernanceOperation {
    pub operation_type: OperationType,
    pub proposer_did: Did,
    pub target_did: Did,
    pub target_role: Role,
    pub proposed_at: i64,
    pub expires_at: i64,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl GovernanceOperation {
    pub fn is_within_window(&self) -> bool {
        self.expires_at - self.proposed_at
            <= crate::constants::MAX_PROPOSAL_WINDOW_SECS
    }
}

/// A single vote cast against a `GovernanceOperation`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalSignature {
    pub approver_did: Did,
    pub is_approval: bool,
    pub voted_at: i64,
    pub signature_over_proposal_hash: Vec<u8>,
}
