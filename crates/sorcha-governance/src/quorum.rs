//! `ValidateQuorum` (§4.4): voting-pool computation, Owner-override, and
//! simple-majority threshold arithmetic.

use std::collections::HashSet;

use serde::Serialize;
use sorcha_core::types::{Did, OperationType, Role};
use sorcha_core::{ApprovalSignature, GovernanceOperation, RegisterControlRecord};

/// The outcome of evaluating a proposal's approvals against its register's
/// current voting pool.
#[derive(Debug, Clone, Serialize)]
pub struct QuorumResult {
    pub votes_required: usize,
    pub votes_received: usize,
    pub voting_pool: Vec<Did>,
    pub is_quorum_met: bool,
    pub is_owner_override: bool,
}

/// Evaluate quorum for `op` against `roster`'s current membership and the
/// collected `approvals`.
pub fn validate_quorum(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    approvals: &[ApprovalSignature],
) -> QuorumResult {
    let mut pool: Vec<Did> = roster
        .voting_pool()
        .into_iter()
        .map(|a| a.subject.clone())
        .collect();

    if op.operation_type == OperationType::Remove
        && matches!(op.target_role, Role::Owner | Role::Admin)
    {
        pool.retain(|subject| subject != &op.target_did);
    }

    let proposer_is_owner = roster
        .owner()
        .map(|o| o.subject == op.proposer_did)
        .unwrap_or(false);

    let is_owner_override = matches!(op.operation_type, OperationType::Add | OperationType::Remove)
        && proposer_is_owner;

    if is_owner_override {
        return QuorumResult {
            votes_required: 0,
            votes_received: 0,
            voting_pool: pool,
            is_quorum_met: true,
            is_owner_override: true,
        };
    }

    let votes_required = pool.len() / 2 + 1;

    let pool_set: HashSet<&Did> = pool.iter().collect();
    let mut approved: HashSet<&Did> = HashSet::new();
    for approval in approvals {
        if approval.is_approval && pool_set.contains(&approval.approver_did) {
            approved.insert(&approval.approver_did);
        }
    }
    let votes_received = approved.len();

    QuorumResult {
        votes_required,
        votes_received,
        voting_pool: pool,
        is_quorum_met: votes_received >= votes_required,
        is_owner_override: false,
    }
}
