//! `GetCurrentRoster` (§4.4): reconstruct the authoritative roster snapshot
//! from a register's control-transaction chain.

use std::sync::Arc;

use base64::Engine;
use sorcha_core::types::{RegisterId, TransactionType};
use sorcha_core::{AdminRoster, ControlPayload, Result, SorchaError};
use sorcha_repository::RegisterRepository;

/// Reconstructs [`AdminRoster`] snapshots from the durable transaction log.
pub struct RosterReconstructor {
    repository: Arc<dyn RegisterRepository>,
}

impl RosterReconstructor {
    pub fn new(repository: Arc<dyn RegisterRepository>) -> Self {
        Self { repository }
    }

    /// Fetch all transactions for `register_id` in recorded order, keep
    /// those that carry a roster snapshot — `Control` transactions, plus the
    /// `Genesis` transaction that establishes the very first snapshot before
    /// any `Control` transaction exists — and decode the latest one as
    /// authoritative. Absent any such transaction, returns `None`.
    pub fn get_current_roster(&self, register_id: &RegisterId) -> Result<Option<AdminRoster>> {
        let transactions = self.repository.get_transactions(register_id)?;

        let mut control_count: u64 = 0;
        let mut latest: Option<(sorcha_core::types::TxId, ControlPayload)> = None;

        for tx in &transactions {
            if !matches!(
                tx.metadata.transaction_type,
                TransactionType::Control | TransactionType::Genesis
            ) {
                continue;
            }
            control_count += 1;

            let payload = tx
                .payloads
                .first()
                .ok_or_else(|| SorchaError::InvalidRequest(format!(
                    "control transaction {} carries no payload",
                    tx.tx_id
                )))?;
            let decoded = base64::engine::general_purpose::STANDARD
                .decode(&payload.data)
                .map_err(|e| SorchaError::InvalidRequest(format!("malformed control payload: {e}")))?;
            let control_payload = ControlPayload::decode(&decoded)?;

            latest = Some((tx.tx_id, control_payload));
        }

        Ok(latest.map(|(tx_id, payload)| AdminRoster {
            register_id: *register_id,
            control_record: payload.roster,
            control_transaction_count: control_count,
            last_control_tx_id: tx_id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sorcha_core::transaction::{Payload, TransactionMetadata};
    use sorcha_core::types::{Algorithm, Did, Role, TxId};
    use sorcha_core::{RegisterAttestation, RegisterControlRecord, Transaction};
    use sorcha_repository::SledRepository;

    fn repo() -> Arc<dyn RegisterRepository> {
        let dir = tempfile::tempdir().unwrap();
        Arc::new(SledRepository::open(dir.path()).unwrap())
    }

    fn control_roster(register_id: RegisterId, owner: Did) -> RegisterControlRecord {
        RegisterControlRecord {
            register_id,
            name: "acme".into(),
            tenant_id: "tenant-1".into(),
            created_at: 0,
            attestations: vec![RegisterAttestation {
                role: Role::Owner,
                subject: owner,
                public_key: vec![1u8; 32],
                algorithm: Algorithm::Ed25519,
                signature: vec![],
                granted_at: 0,
            }],
            metadata: Default::default(),
        }
    }

    fn control_tx(
        register_id: RegisterId,
        tx_id: TxId,
        transaction_type: TransactionType,
        roster: RegisterControlRecord,
    ) -> Transaction {
        let bytes = ControlPayload::genesis(roster).to_canonical_bytes().unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Transaction {
            tx_id,
            register_id,
            sender_wallet: "w:system".into(),
            recipients: vec![],
            prev_tx_id: None,
            payloads: vec![Payload::new(encoded.into_bytes())],
            metadata: TransactionMetadata {
                blueprint_id: "genesis".into(),
                action_id: "register-creation".into(),
                transaction_type,
            },
            signature: vec![],
            created_at: 0,
        }
    }

    #[test]
    fn absent_without_any_control_transaction() {
        let repository = repo();
        let reconstructor = RosterReconstructor::new(repository);
        let result = reconstructor.get_current_roster(&RegisterId::generate()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn genesis_transaction_establishes_first_snapshot() {
        let register_id = RegisterId::generate();
        let owner = Did::wallet("owner");
        let repository = repo();
        let tx = control_tx(
            register_id,
            TxId::from_bytes([1u8; 32]),
            TransactionType::Genesis,
            control_roster(register_id, owner.clone()),
        );
        repository.insert_transaction(&tx).unwrap();

        let reconstructor = RosterReconstructor::new(repository);
        let roster = reconstructor.get_current_roster(&register_id).unwrap().unwrap();
        assert_eq!(roster.control_transaction_count, 1);
        assert_eq!(roster.control_record.owner().unwrap().subject, owner);
    }

    #[test]
    fn latest_control_snapshot_is_authoritative() {
        let register_id = RegisterId::generate();
        let owner = Did::wallet("owner");
        let admin = Did::wallet("admin");
        let repository = repo();

        let genesis_tx = control_tx(
            register_id,
            TxId::from_bytes([1u8; 32]),
            TransactionType::Genesis,
            control_roster(register_id, owner.clone()),
        );
        repository.insert_transaction(&genesis_tx).unwrap();

        let mut second_snapshot = control_roster(register_id, owner.clone());
        second_snapshot.attestations.push(RegisterAttestation {
            role: Role::Admin,
            subject: admin.clone(),
            public_key: vec![2u8; 32],
            algorithm: Algorithm::Ed25519,
            signature: vec![],
            granted_at: 1,
        });
        let control_tx2 = control_tx(
            register_id,
            TxId::from_bytes([2u8; 32]),
            TransactionType::Control,
            second_snapshot,
        );
        repository.insert_transaction(&control_tx2).unwrap();

        let reconstructor = RosterReconstructor::new(repository);
        let roster = reconstructor.get_current_roster(&register_id).unwrap().unwrap();
        assert_eq!(roster.control_transaction_count, 2);
        assert_eq!(roster.control_record.attestations.len(), 2);
        assert!(roster.control_record.find(&admin).is_some());
        assert_eq!(roster.last_control_tx_id, TxId::from_bytes([2u8; 32]));
    }
}
