use sorcha_core::types::{RegisterId, TransactionPriority, TxId};
use sorcha_core::{Docket, PendingRegistration, Register, Result, Transaction};

/// The abstract Register repository (§6): everything the core components
/// need from durable storage, independent of the backing engine.
pub trait RegisterRepository: Send + Sync {
    fn create_register(&self, register: &Register) -> Result<()>;
    fn update_register(&self, register: &Register) -> Result<()>;
    fn get_register(&self, id: &RegisterId) -> Result<Option<Register>>;
    /// Every register id known to the repository, in no particular order —
    /// used to drive a per-register polling loop (the docket-builder timer).
    fn list_register_ids(&self) -> Result<Vec<RegisterId>>;

    fn insert_docket(&self, docket: &Docket) -> Result<()>;
    /// Dockets for `register_id`, ordered by ascending `id`.
    fn get_dockets(&self, register_id: &RegisterId) -> Result<Vec<Docket>>;
    fn get_latest_docket(&self, register_id: &RegisterId) -> Result<Option<Docket>>;

    fn insert_transaction(&self, tx: &Transaction) -> Result<()>;
    fn get_transaction(&self, tx_id: &TxId) -> Result<Option<Transaction>>;
    /// Transactions for `register_id` in recorded (insertion) order.
    fn get_transactions(&self, register_id: &RegisterId) -> Result<Vec<Transaction>>;
    fn get_transactions_in_docket(&self, docket: &Docket) -> Result<Vec<Transaction>>;

    /// Atomically persist a sealed docket together with its transactions
    /// and the register's advanced height — the single atomic write of
    /// §4.5 step 5. If the repository cannot offer a true atomic batch,
    /// the register height write must be last so it is the commit-visible
    /// step.
    fn commit_sealed_docket(
        &self,
        docket: &Docket,
        transactions: &[Transaction],
        register: &Register,
    ) -> Result<()>;

    /// Admit `tx` into the durable, repository-backed mempool for its
    /// register (§9 design notes: mempool is durable, unlike the
    /// in-memory pending-registration table).
    fn admit_to_mempool(
        &self,
        tx: &Transaction,
        priority: TransactionPriority,
        admitted_at: i64,
    ) -> Result<()>;

    /// Atomically drain every transaction currently admitted for
    /// `register_id`, returning them with their priority and admission
    /// time. Returns an empty vec if the mempool was empty (no-op).
    fn pop_mempool(
        &self,
        register_id: &RegisterId,
    ) -> Result<Vec<(Transaction, TransactionPriority, i64)>>;

    fn mempool_contains(&self, register_id: &RegisterId, tx_id: &TxId) -> Result<bool>;

    fn put_pending(&self, pending: &PendingRegistration) -> Result<()>;

    /// Atomically remove and return the pending registration for
    /// `(register_id, nonce)` — the compare-and-remove of §4.3/§5. Returns
    /// `Ok(None)` if absent or the nonce does not match.
    fn take_pending(
        &self,
        register_id: &RegisterId,
        nonce: &str,
    ) -> Result<Option<PendingRegistration>>;

    /// Best-effort sweep of expired pending registrations; returns the
    /// number removed.
    fn sweep_expired_pending(&self, now: i64) -> Result<u64>;
}
