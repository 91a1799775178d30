//! Docket building (§4.5): periodically seal the mempool into a
//! hash-chained, height-advancing docket.

use std::cmp::Ordering;
use std::sync::Arc;

use sorcha_core::register::RegisterStatus;
use sorcha_core::types::{DocketState, TransactionPriority};
use sorcha_core::{Docket, RegisterId, Result, SorchaError, Transaction};
use sorcha_repository::{RegisterLocks, RegisterRepository};
use tracing::{debug, info};

/// Seals a register's currently admitted mempool into a single sealed
/// docket, chained to the previous one. One call = one build cycle for one
/// register; the caller (e.g. a timer task in `sorcha-node`) drives the
/// 10-second-default schedule.
pub struct DocketBuilder {
    repository: Arc<dyn RegisterRepository>,
    locks: Arc<RegisterLocks>,
}

impl DocketBuilder {
    pub fn new(repository: Arc<dyn RegisterRepository>, locks: Arc<RegisterLocks>) -> Self {
        Self { repository, locks }
    }

    /// Runs one build cycle for `register_id` at wall-clock time `now`.
    /// Returns the sealed docket, or `None` if the mempool was empty.
    pub fn build(&self, register_id: RegisterId, now: i64) -> Result<Option<Docket>> {
        self.locks.with_lock(register_id, || self.build_locked(register_id, now))
    }

    fn build_locked(&self, register_id: RegisterId, now: i64) -> Result<Option<Docket>> {
        let mut candidates = self.repository.pop_mempool(&register_id)?;
        if candidates.is_empty() {
            return Ok(None);
        }

        candidates.sort_by(|a, b| {
            priority_rank(b.1).cmp(&priority_rank(a.1)).then(a.2.cmp(&b.2))
        });

        let register = self
            .repository
            .get_register(&register_id)?
            .ok_or_else(|| SorchaError::RegisterNotFound(register_id.to_hex()))?;

        let next_id = register.height + 1;
        let previous_hash = if register.height > 0 {
            self.repository
                .get_latest_docket(&register_id)?
                .map(|d| d.hash)
                .unwrap_or_default()
        } else {
            String::new()
        };

        let transactions: Vec<Transaction> = candidates.into_iter().map(|(tx, _, _)| tx).collect();
        let transaction_ids = transactions.iter().map(|tx| tx.tx_id).collect::<Vec<_>>();

        let hash = Docket::compute_hash(next_id, &previous_hash, &transaction_ids, now);

        let docket = Docket {
            id: next_id,
            register_id,
            previous_hash,
            hash,
            transaction_ids,
            state: DocketState::Sealed,
            timestamp: now,
            // System-wallet docket signing is delegated to the external
            // signer collaborator (§6); left empty here.
            signature: Vec::new(),
        };

        let mut updated_register = register;
        updated_register.height = next_id;
        if updated_register.status == RegisterStatus::Initializing {
            updated_register.status = RegisterStatus::Online;
        }

        self.repository
            .commit_sealed_docket(&docket, &transactions, &updated_register)?;

        info!(
            register_id = %register_id,
            docket_id = docket.id,
            tx_count = docket.transaction_ids.len(),
            "docket sealed"
        );
        debug!(previous_hash = %docket.previous_hash, hash = %docket.hash, "docket chained");
        Ok(Some(docket))
    }
}

fn priority_rank(priority: TransactionPriority) -> u8 {
    match priority {
        TransactionPriority::High => 1,
        TransactionPriority::Normal => 0,
    }
}
