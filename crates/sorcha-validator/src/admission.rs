//! Mempool admission (§4.5): the rules a transaction must clear before it
//! is durably queued for the next docket.

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine;
use parking_lot::RwLock;
use sorcha_core::register::RegisterStatus;
use sorcha_core::types::{Algorithm, TransactionType};
use sorcha_core::{ControlPayload, Result, SorchaError, Transaction, TransactionAdmitter};
use sorcha_governance::{apply_operation, validate_proposal_strict, RosterReconstructor};
use sorcha_repository::{RegisterLocks, RegisterRepository};
use tracing::{debug, warn};

/// A synchronous lookup of a wallet's current verification key, keyed by
/// wallet address — the sync sibling of `sorcha-did`'s `WalletStore`,
/// needed because `TransactionAdmitter::admit` is itself synchronous
/// (admission runs inside the per-register lock, never across an
/// `.await`, per §5's suspension-point design).
pub trait SenderKeyResolver: Send + Sync {
    fn resolve(&self, wallet_address: &str) -> Result<Option<(Vec<u8>, Algorithm)>>;
}

/// A trivial in-memory `SenderKeyResolver`, useful for tests and for
/// bootstrapping a register before any external wallet service is wired
/// in.
#[derive(Default)]
pub struct InMemoryKeyResolver {
    keys: RwLock<HashMap<String, (Vec<u8>, Algorithm)>>,
}

impl InMemoryKeyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, wallet_address: impl Into<String>, public_key: Vec<u8>, algorithm: Algorithm) {
        self.keys.write().insert(wallet_address.into(), (public_key, algorithm));
    }
}

impl SenderKeyResolver for InMemoryKeyResolver {
    fn resolve(&self, wallet_address: &str) -> Result<Option<(Vec<u8>, Algorithm)>> {
        Ok(self.keys.read().get(wallet_address).cloned())
    }
}

/// The Validator: admits transactions into the durable, per-register
/// mempool after checking register status, duplicate ids, signature
/// validity, and (for Control transactions) roster-successor legality.
pub struct Validator {
    repository: Arc<dyn RegisterRepository>,
    locks: Arc<RegisterLocks>,
    key_resolver: Arc<dyn SenderKeyResolver>,
    system_wallet: String,
}

impl Validator {
    pub fn new(
        repository: Arc<dyn RegisterRepository>,
        locks: Arc<RegisterLocks>,
        key_resolver: Arc<dyn SenderKeyResolver>,
        system_wallet: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            locks,
            key_resolver,
            system_wallet: system_wallet.into(),
        }
    }

    fn admit_locked(&self, tx: Transaction, now: i64) -> Result<()> {
        self.check_register_status(&tx)?;
        self.check_not_duplicate(&tx)?;
        self.check_signature(&tx)?;

        match tx.metadata.transaction_type {
            TransactionType::Control => self.check_control_successor(&tx, now)?,
            TransactionType::Action => self.check_prev_tx(&tx)?,
            TransactionType::Genesis => {}
        }

        self.repository
            .admit_to_mempool(&tx, tx.priority(), now)?;
        debug!(tx_id = %tx.tx_id, register_id = %tx.register_id, "transaction admitted");
        Ok(())
    }

    fn check_register_status(&self, tx: &Transaction) -> Result<()> {
        let register = self.repository.get_register(&tx.register_id)?;
        match (tx.metadata.transaction_type, register) {
            (TransactionType::Genesis, None) => Ok(()),
            (TransactionType::Genesis, Some(r)) if r.status == RegisterStatus::Initializing => Ok(()),
            (TransactionType::Genesis, Some(r)) => Err(SorchaError::RegisterNotAcceptingTransactions {
                register_id: tx.register_id.to_hex(),
                kind: "Genesis".into(),
                status: r.status,
            }),
            (_, Some(r)) if r.status == RegisterStatus::Online => Ok(()),
            (_, Some(r)) => Err(SorchaError::RegisterNotAcceptingTransactions {
                register_id: tx.register_id.to_hex(),
                kind: format!("{:?}", tx.metadata.transaction_type),
                status: r.status,
            }),
            (_, None) => Err(SorchaError::RegisterNotFound(tx.register_id.to_hex())),
        }
    }

    fn check_not_duplicate(&self, tx: &Transaction) -> Result<()> {
        if self.repository.get_transaction(&tx.tx_id)?.is_some() {
            return Err(SorchaError::DuplicateTxId(tx.tx_id.to_hex()));
        }
        if self.repository.mempool_contains(&tx.register_id, &tx.tx_id)? {
            return Err(SorchaError::DuplicateTxId(tx.tx_id.to_hex()));
        }
        Ok(())
    }

    fn check_signature(&self, tx: &Transaction) -> Result<()> {
        if tx.sender_wallet == self.system_wallet {
            return Ok(());
        }
        let (public_key, algorithm) = self
            .key_resolver
            .resolve(&tx.sender_wallet)?
            .ok_or_else(|| SorchaError::SignatureInvalid {
                subject: tx.sender_wallet.clone(),
            })?;
        let ok = sorcha_crypto::verify(algorithm, &public_key, &tx.signing_body(), &tx.signature, false)?;
        if ok {
            Ok(())
        } else {
            Err(SorchaError::SignatureInvalid {
                subject: tx.sender_wallet.clone(),
            })
        }
    }

    fn check_prev_tx(&self, tx: &Transaction) -> Result<()> {
        if let Some(prev) = &tx.prev_tx_id {
            if self.repository.get_transaction(prev)?.is_none() {
                return Err(SorchaError::PrevTransactionNotFound(prev.to_hex()));
            }
        }
        Ok(())
    }

    /// Re-checks the §4.4 state-machine rules server-side: the successor
    /// roster embedded in a Control transaction's payload must be exactly
    /// what `ApplyOperation` would produce from the current roster and the
    /// embedded operation.
    fn check_control_successor(&self, tx: &Transaction, now: i64) -> Result<()> {
        let payload = tx
            .payloads
            .first()
            .ok_or_else(|| SorchaError::InvalidRequest("Control transaction carries no payload".into()))?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&payload.data)
            .map_err(|e| SorchaError::InvalidRequest(format!("malformed control payload: {e}")))?;
        let control_payload = ControlPayload::decode(&decoded)?;

        let op = control_payload
            .operation
            .as_ref()
            .ok_or_else(|| SorchaError::IllegalRosterSuccessor("Control transaction carries no operation".into()))?;

        let reconstructor = RosterReconstructor::new(Arc::clone(&self.repository));
        let current = reconstructor
            .get_current_roster(&tx.register_id)?
            .ok_or_else(|| SorchaError::IllegalRosterSuccessor("no current roster to evolve".into()))?;

        validate_proposal_strict(&current.control_record, op, now)?;

        let attestation = control_payload.roster.find(&op.target_did).cloned();
        let expected = apply_operation(&current.control_record, op, attestation.as_ref())?;

        if expected.attestations.len() != control_payload.roster.attestations.len()
            || !expected
                .attestations
                .iter()
                .zip(control_payload.roster.attestations.iter())
                .all(|(a, b)| a.subject == b.subject && a.role == b.role)
        {
            return Err(SorchaError::IllegalRosterSuccessor(
                "embedded roster is not the expected successor of the current roster".into(),
            ));
        }
        Ok(())
    }
}

impl TransactionAdmitter for Validator {
    fn admit(&self, tx: Transaction) -> Result<()> {
        let register_id = tx.register_id;
        let now = tx.created_at;
        self.locks.with_lock(register_id, || {
            self.admit_locked(tx, now).map_err(|e| {
                warn!(register_id = %register_id, error = %e, "transaction admission rejected");
                e
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorcha_core::transaction::{Payload, TransactionMetadata};
    use sorcha_core::types::{RegisterId, TxId};
    use sorcha_core::{Register, Transaction};
    use sorcha_repository::SledRepository;

    fn setup() -> (Arc<dyn RegisterRepository>, Arc<RegisterLocks>, Arc<InMemoryKeyResolver>) {
        let dir = tempfile::tempdir().unwrap();
        (
            Arc::new(SledRepository::open(dir.path()).unwrap()),
            Arc::new(RegisterLocks::new()),
            Arc::new(InMemoryKeyResolver::new()),
        )
    }

    fn genesis_tx(register_id: RegisterId) -> Transaction {
        let metadata = TransactionMetadata {
            blueprint_id: "genesis".into(),
            action_id: "register-creation".into(),
            transaction_type: TransactionType::Genesis,
        };
        let payloads = vec![Payload::new(b"ignored".to_vec())];
        let tx_id = Transaction::derive_tx_id(&register_id, "w:system", &[], &None, &payloads, &metadata, 0);
        Transaction {
            tx_id,
            register_id,
            sender_wallet: "w:system".into(),
            recipients: vec![],
            prev_tx_id: None,
            payloads,
            metadata,
            signature: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn genesis_admitted_when_no_register_exists_yet() {
        let (repository, locks, keys) = setup();
        let validator = Validator::new(repository, locks, keys, "w:system");
        let register_id = RegisterId::generate();
        validator.admit(genesis_tx(register_id)).unwrap();
    }

    #[test]
    fn genesis_rejected_when_register_already_online() {
        let (repository, locks, keys) = setup();
        let register_id = RegisterId::generate();
        repository
            .create_register(&Register {
                id: register_id,
                name: "acme".into(),
                tenant_id: "tenant-1".into(),
                height: 0,
                status: RegisterStatus::Online,
                created_at: 0,
                advertise: false,
            })
            .unwrap();
        let validator = Validator::new(repository, locks, keys, "w:system");
        let err = validator.admit(genesis_tx(register_id)).unwrap_err();
        assert!(matches!(err, SorchaError::RegisterNotAcceptingTransactions { .. }));
    }

    #[test]
    fn duplicate_tx_id_rejected() {
        let (repository, locks, keys) = setup();
        let register_id = RegisterId::generate();
        let validator = Validator::new(Arc::clone(&repository), locks, keys, "w:system");
        let tx = genesis_tx(register_id);
        validator.admit(tx.clone()).unwrap();

        // Simulate the docket builder having sealed it already.
        repository.insert_transaction(&tx).unwrap();
        let err = validator.admit(tx).unwrap_err();
        assert!(matches!(err, SorchaError::DuplicateTxId(_)));
    }

    #[test]
    fn action_with_unresolvable_prev_tx_rejected() {
        let (repository, locks, keys) = setup();
        let register_id = RegisterId::generate();
        repository
            .create_register(&Register {
                id: register_id,
                name: "acme".into(),
                tenant_id: "tenant-1".into(),
                height: 0,
                status: RegisterStatus::Online,
                created_at: 0,
                advertise: false,
            })
            .unwrap();
        let validator = Validator::new(repository, locks, keys, "w:system");

        let metadata = TransactionMetadata {
            blueprint_id: "bp".into(),
            action_id: "do-thing".into(),
            transaction_type: TransactionType::Action,
        };
        let payloads = vec![Payload::new(b"x".to_vec())];
        let prev = TxId::from_bytes([9u8; 32]);
        let tx_id = Transaction::derive_tx_id(&register_id, "w:system", &[], &Some(prev), &payloads, &metadata, 1);
        let tx = Transaction {
            tx_id,
            register_id,
            sender_wallet: "w:system".into(),
            recipients: vec![],
            prev_tx_id: Some(prev),
            payloads,
            metadata,
            signature: vec![],
            created_at: 1,
        };
        let err = validator.admit(tx).unwrap_err();
        assert!(matches!(err, SorchaError::PrevTransactionNotFound(_)));
    }

    #[test]
    fn unresolvable_sender_signature_rejected() {
        let (repository, locks, keys) = setup();
        let register_id = RegisterId::generate();
        let validator = Validator::new(repository, locks, keys, "w:system");
        let mut tx = genesis_tx(register_id);
        tx.sender_wallet = "w:someone-else".into();
        let err = validator.admit(tx).unwrap_err();
        assert!(matches!(err, SorchaError::SignatureInvalid { .. }));
    }
}
