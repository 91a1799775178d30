//! `ValidateProposal` (§4.4): common preconditions plus per-variant rules,
//! dispatched by value on `OperationType` — mirroring this corpus's
//! per-variant match style for pure validation functions.

use serde::Serialize;
use sorcha_core::types::{OperationType, Role};
use sorcha_core::{GovernanceOperation, RegisterControlRecord, Result, SorchaError};

/// The result of validating a proposal against a roster: every violated
/// precondition is reported, not just the first (the spec's `{isValid,
/// errors[]}` shape), so a caller can surface all problems at once.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate `op` against `roster`, collecting every violated precondition.
pub fn validate_proposal(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    now: i64,
) -> ValidationOutcome {
    let mut errors = Vec::new();

    if !(op.proposed_at <= now && now <= op.expires_at) {
        errors.push(format!(
            "proposal expired or not yet active (proposed_at={}, expires_at={}, now={now})",
            op.proposed_at, op.expires_at
        ));
    }
    if !op.is_within_window() {
        errors.push(format!(
            "proposal window exceeds the 7-day maximum (proposed_at={}, expires_at={})",
            op.proposed_at, op.expires_at
        ));
    }

    let proposer = roster.find(&op.proposer_did);
    if proposer.is_none() {
        errors.push(format!("proposer is not a roster member: {}", op.proposer_did));
    }

    match op.operation_type {
        OperationType::Add => validate_add(roster, op, proposer, &mut errors),
        OperationType::Remove => validate_remove(roster, op, proposer, &mut errors),
        OperationType::Transfer => validate_transfer(roster, op, proposer, &mut errors),
    }

    ValidationOutcome::from_errors(errors)
}

fn validate_add(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    proposer: Option<&sorcha_core::RegisterAttestation>,
    errors: &mut Vec<String>,
) {
    if roster.find(&op.target_did).is_some() {
        errors.push(format!("target is already a roster member: {}", op.target_did));
    }
    if roster.attestations.len() >= sorcha_core::constants::MAX_ROSTER_SIZE {
        errors.push(format!(
            "roster is full (max {})",
            sorcha_core::constants::MAX_ROSTER_SIZE
        ));
    }
    if !matches!(op.target_role, Role::Admin | Role::Auditor) {
        errors.push(format!("target role {:?} is not permitted for Add", op.target_role));
    }
    if let Some(p) = proposer {
        if !matches!(p.role, Role::Owner | Role::Admin) {
            errors.push(format!("proposer role {:?} may not propose Add (Auditor cannot propose)", p.role));
        }
    }
}

fn validate_remove(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    proposer: Option<&sorcha_core::RegisterAttestation>,
    errors: &mut Vec<String>,
) {
    match roster.find(&op.target_did) {
        None => errors.push(format!("target is not a roster member: {}", op.target_did)),
        Some(target) => {
            if target.role == Role::Owner {
                errors.push("owner removal must go through Transfer, not Remove".into());
            }
        }
    }
    if let Some(p) = proposer {
        if !matches!(p.role, Role::Owner | Role::Admin) {
            errors.push(format!("proposer role {:?} may not propose Remove", p.role));
        }
    }
}

fn validate_transfer(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    proposer: Option<&sorcha_core::RegisterAttestation>,
    errors: &mut Vec<String>,
) {
    match proposer {
        Some(p) if p.role == Role::Owner => {}
        Some(_) => errors.push(format!("transfer proposer is not the current owner: {}", op.proposer_did)),
        None => {}
    }
    match roster.find(&op.target_did) {
        None => errors.push(format!("transfer target is not a current member: {}", op.target_did)),
        Some(target) if target.role != Role::Admin => {
            errors.push(format!("transfer target does not hold role Admin: {}", op.target_did));
        }
        Some(_) => {}
    }
    if op.target_role != Role::Owner {
        errors.push(format!("transfer target role must be Owner, got {:?}", op.target_role));
    }
}

/// Same rules as [`validate_proposal`] but surfaced as the first violated
/// precondition, typed per the §7 error taxonomy — used where a caller
/// (e.g. the Validator's admission-time re-check) needs a single
/// structured error rather than a collected report.
pub fn validate_proposal_strict(
    roster: &RegisterControlRecord,
    op: &GovernanceOperation,
    now: i64,
) -> Result<()> {
    if !(op.proposed_at <= now && now <= op.expires_at) {
        return Err(SorchaError::ProposalExpired {
            proposed_at: op.proposed_at,
            expires_at: op.expires_at,
            now,
        });
    }
    if !op.is_within_window() {
        return Err(SorchaError::ProposalWindowTooLong {
            proposed_at: op.proposed_at,
            expires_at: op.expires_at,
        });
    }
    let proposer = roster
        .find(&op.proposer_did)
        .ok_or_else(|| SorchaError::ProposerNotMember(op.proposer_did.to_string()))?;

    match op.operation_type {
        OperationType::Add => {
            if roster.find(&op.target_did).is_some() {
                return Err(SorchaError::TargetAlreadyMember(op.target_did.to_string()));
            }
            if roster.attestations.len() >= sorcha_core::constants::MAX_ROSTER_SIZE {
                return Err(SorchaError::RosterFull {
                    max: sorcha_core::constants::MAX_ROSTER_SIZE,
                });
            }
            if !matches!(op.target_role, Role::Admin | Role::Auditor) {
                return Err(SorchaError::InvalidTargetRole(op.target_role));
            }
            if !matches!(proposer.role, Role::Owner | Role::Admin) {
                return Err(SorchaError::InvalidProposerRole(proposer.role));
            }
        }
        OperationType::Remove => {
            let target = roster
                .find(&op.target_did)
                .ok_or_else(|| SorchaError::TargetNotMember(op.target_did.to_string()))?;
            if target.role == Role::Owner {
                return Err(SorchaError::OwnerRemovalRequiresTransfer);
            }
            if !matches!(proposer.role, Role::Owner | Role::Admin) {
                return Err(SorchaError::InvalidProposerRole(proposer.role));
            }
        }
        OperationType::Transfer => {
            if proposer.role != Role::Owner {
                return Err(SorchaError::TransferProposerNotOwner(op.proposer_did.to_string()));
            }
            let target = roster
                .find(&op.target_did)
                .ok_or_else(|| SorchaError::TransferTargetNotMember(op.target_did.to_string()))?;
            if target.role != Role::Admin {
                return Err(SorchaError::TransferTargetNotAdmin(op.target_did.to_string()));
            }
            if op.target_role != Role::Owner {
                return Err(SorchaError::InvalidTargetRole(op.target_role));
            }
        }
    }
    Ok(())
}
