//! Chain Validator (§4.5): two independent audits — docket-chain integrity
//! and transaction-chain integrity — plus their composite.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use sorcha_core::types::DocketState;
use sorcha_core::{RegisterId, Result, SorchaError};
use sorcha_repository::RegisterRepository;

/// The result of an audit: `is_valid` is false iff at least one error was
/// recorded; warnings and info never affect it.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ChainReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ChainReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.is_valid = false;
    }

    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    fn info(&mut self, message: impl Into<String>) {
        self.info.push(message.into());
    }

    fn merge(&mut self, other: ChainReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
        self.is_valid = self.is_valid && other.is_valid;
    }
}

/// Walks a register's dockets in ascending `id` order and checks the
/// contiguity and hash-chaining invariants from §3.
pub fn validate_docket_chain(
    repository: &Arc<dyn RegisterRepository>,
    register_id: &RegisterId,
) -> Result<ChainReport> {
    let mut report = ChainReport::new();
    let dockets = repository.get_dockets(register_id)?;

    if dockets.is_empty() {
        report.info("no dockets");
        return Ok(report);
    }

    if dockets[0].id != 1 {
        report.error("First docket ID should be 1");
    }
    if !dockets[0].previous_hash.is_empty() {
        report.warn("First docket's previousHash should be empty");
    }

    for (index, docket) in dockets.iter().enumerate() {
        let expected_id = index as u64 + 1;
        if docket.id != expected_id {
            report.error(format!(
                "Docket chain break: expected docket id {expected_id}, found {}",
                docket.id
            ));
        }
        if index > 0 {
            let previous = &dockets[index - 1];
            if docket.previous_hash != previous.hash {
                report.error(format!(
                    "PreviousHash does not match at docket {}",
                    docket.id
                ));
            }
        }
        if docket.state != DocketState::Sealed {
            report.warn(format!("Docket {} is not in state Sealed", docket.id));
        }
    }

    let max_sealed = dockets
        .iter()
        .filter(|d| d.state == DocketState::Sealed)
        .map(|d| d.id)
        .max()
        .unwrap_or(0);

    let register = repository
        .get_register(register_id)?
        .ok_or_else(|| SorchaError::RegisterNotFound(register_id.to_hex()))?;
    if register.height != max_sealed {
        report.error(format!(
            "Register height {} does not match max sealed docket id {}",
            register.height, max_sealed
        ));
    }

    Ok(report)
}

/// Checks that every `prevTxId` reference resolves, that every docket's
/// transaction ids resolve to stored transactions, and reports orphaned
/// (unreferenced) transactions.
pub fn validate_transaction_chain(
    repository: &Arc<dyn RegisterRepository>,
    register_id: &RegisterId,
) -> Result<ChainReport> {
    let mut report = ChainReport::new();
    let transactions = repository.get_transactions(register_id)?;

    if transactions.is_empty() {
        report.info("no transactions");
        return Ok(report);
    }

    let known_ids: HashSet<_> = transactions.iter().map(|tx| tx.tx_id).collect();
    for tx in &transactions {
        if let Some(prev) = &tx.prev_tx_id {
            if !known_ids.contains(prev) {
                report.warn(format!(
                    "transaction {} references non-existent prevTxId {}",
                    tx.tx_id, prev
                ));
            }
        }
    }

    let dockets = repository.get_dockets(register_id)?;
    let mut referenced: HashSet<_> = HashSet::new();
    for docket in dockets.iter().filter(|d| d.state == DocketState::Sealed) {
        for tx_id in &docket.transaction_ids {
            referenced.insert(*tx_id);
            if !known_ids.contains(tx_id) {
                report.error(format!(
                    "docket {} references non-existent transaction {}",
                    docket.id, tx_id
                ));
            }
        }
    }

    let orphaned = transactions
        .iter()
        .filter(|tx| !referenced.contains(&tx.tx_id))
        .count();
    if orphaned > 0 {
        report.info(format!("{orphaned} orphaned transactions"));
    }

    Ok(report)
}

/// Concatenates [`validate_docket_chain`] and [`validate_transaction_chain`].
pub fn validate_complete_chain(
    repository: &Arc<dyn RegisterRepository>,
    register_id: &RegisterId,
) -> Result<ChainReport> {
    let mut report = validate_docket_chain(repository, register_id)?;
    report.merge(validate_transaction_chain(repository, register_id)?);
    Ok(report)
}
