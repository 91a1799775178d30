use crate::error::Result;
use crate::transaction::Transaction;

/// The Validator's admission surface (§4.5), as consumed by collaborators
/// upstream of it — the registration orchestrator submits its genesis
/// transaction through exactly this interface, the same one any other
/// transaction source uses.
///
/// `admit` performs the Validator's admission-time checks (duplicate txId,
/// register status, prevTxId resolution, roster-successor legality) and
/// either enqueues the transaction into the mempool or returns the
/// rejection reason. Sealing into a docket happens later, out of band, on
/// the docket-builder's own schedule.
pub trait TransactionAdmitter: Send + Sync {
    fn admit(&self, tx: Transaction) -> Result<()>;
}
