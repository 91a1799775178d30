//! `ApplyOperation` (§4.4): the pure roster mutation applied once a proposal
//! has cleared [`crate::validate_proposal_strict`] and
//! [`crate::validate_quorum`]. Takes the prior snapshot and returns the next
//! one — register identity and creation metadata pass through unchanged.

use sorcha_core::types::{OperationType, Role};
use sorcha_core::{GovernanceOperation, RegisterAttestation, RegisterControlRecord, Result, SorchaError};

/// Apply `op` to `roster`, producing the successor control record.
///
/// `attestation` is required for `Add` (the caller-supplied, signature-bearing
/// attestation for the new member) and ignored otherwise. Callers are
/// expected to have already run [`crate::validate_proposal_strict`] and
/// confirmed quorum; this function re-checks only the invariants that would
/// otherwise corrupt the roster if skipped.
pub fn apply_operation(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    attestation: Option<&RegisterAttestation>,
) -> Result<RegisterControlRecord> {
    let mut attestations = roster.attestations.clone();

    match op.operation_type {
        OperationType::Add => {
            let attestation = attestation
                .ok_or_else(|| SorchaError::ArgumentError("Add requires an attestation".into()))?;
            if attestation.subject != op.target_did {
                return Err(SorchaError::ArgumentError(
                    "attestation subject does not match op.target_did".into(),
                ));
            }
            if attestation.role != op.target_role {
                return Err(SorchaError::ArgumentError(
                    "attestation role does not match op.target_role".into(),
                ));
            }
            if attestations.iter().any(|a| a.subject == op.target_did) {
                return Err(SorchaError::TargetAlreadyMember(op.target_did.to_string()));
            }
            attestations.push(attestation.clone());
        }
        OperationType::Remove => {
            let before = attestations.len();
            attestations.retain(|a| a.subject != op.target_did);
            if attestations.len() == before {
                return Err(SorchaError::TargetNotMember(op.target_did.to_string()));
            }
        }
        OperationType::Transfer => {
            let proposer_idx = attestations
                .iter()
                .position(|a| a.subject == op.proposer_did && a.role == Role::Owner)
                .ok_or_else(|| SorchaError::TransferProposerNotOwner(op.proposer_did.to_string()))?;
            let target_idx = attestations
                .iter()
                .position(|a| a.subject == op.target_did && a.role == Role::Admin)
                .ok_or_else(|| SorchaError::TransferTargetNotAdmin(op.target_did.to_string()))?;

            attestations[proposer_idx].role = Role::Admin;
            attestations[target_idx].role = Role::Owner;
        }
    }

    let mut next = roster.clone();
    next.attestations = attestations;
    next.validate_invariants()?;
    Ok(next)
}
