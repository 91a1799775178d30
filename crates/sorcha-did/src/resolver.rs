use std::sync::Arc;

use base64::Engine;
use serde::Serialize;
use sorcha_core::types::{Algorithm, Did, DidForm, RegisterId, TransactionType, TxId};
use sorcha_core::{ControlPayload, Result, SorchaError};
use sorcha_repository::RegisterRepository;
use tracing::debug;

use crate::wallet::WalletStore;

/// The key material a resolved DID names.
#[derive(Clone, Debug, Serialize)]
pub struct ResolvedKey {
    pub public_key: Vec<u8>,
    pub algorithm: Algorithm,
}

pub struct DidResolver {
    repository: Arc<dyn RegisterRepository>,
    wallets: Arc<dyn WalletStore>,
}

impl DidResolver {
    pub fn new(repository: Arc<dyn RegisterRepository>, wallets: Arc<dyn WalletStore>) -> Self {
        Self { repository, wallets }
    }

    /// Resolve `did` to the verification key it names (§4.2).
    pub async fn resolve(&self, did: &Did) -> Result<ResolvedKey> {
        match did.parse() {
            Some(DidForm::Wallet { address }) => self.resolve_wallet(&address).await,
            Some(DidForm::Register {
                register_id,
                tx_id,
            }) => self.resolve_register(did, &register_id, &tx_id),
            None => Err(SorchaError::InvalidRequest(format!(
                "DID does not match either grammar: {did}"
            ))),
        }
    }

    async fn resolve_wallet(&self, address: &str) -> Result<ResolvedKey> {
        let record = self
            .wallets
            .get(address)
            .await?
            .ok_or_else(|| SorchaError::DidNotFound(format!("w:{address}")))?;
        Ok(ResolvedKey {
            public_key: record.public_key,
            algorithm: record.algorithm,
        })
    }

    fn resolve_register(
        &self,
        full_did: &Did,
        register_id_hex: &str,
        tx_id_hex: &str,
    ) -> Result<ResolvedKey> {
        let register_id = RegisterId::from_hex(register_id_hex)?;
        let tx_id = TxId::from_hex(tx_id_hex)?;

        let tx = self
            .repository
            .get_transaction(&tx_id)?
            .ok_or_else(|| SorchaError::DidNotFound(full_did.to_string()))?;

        if tx.register_id != register_id {
            return Err(SorchaError::DidNotFound(full_did.to_string()));
        }

        // The genesis transaction carries the same control-record payload
        // shape as a later Control transaction, so it resolves the same way.
        if !matches!(
            tx.metadata.transaction_type,
            TransactionType::Control | TransactionType::Genesis
        ) {
            return Err(SorchaError::DidNotFound(full_did.to_string()));
        }

        let payload = tx
            .payloads
            .first()
            .ok_or_else(|| SorchaError::DidNotFound(full_did.to_string()))?;

        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&payload.data)
            .map_err(|e| SorchaError::InvalidRequest(format!("malformed control payload: {e}")))?;

        let record = ControlPayload::decode(&decoded)?;

        let attestation = record
            .roster
            .attestations
            .iter()
            .find(|a| &a.subject == full_did)
            .ok_or_else(|| SorchaError::DidNotFound(full_did.to_string()))?;

        debug!(did = %full_did, "resolved register DID");

        Ok(ResolvedKey {
            public_key: attestation.public_key.clone(),
            algorithm: attestation.algorithm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{WalletRecord, WalletStatus};
    use sorcha_core::transaction::{Payload, TransactionMetadata};
    use async_trait::async_trait;
    use sorcha_repository::SledRepository;

    struct FakeWallets {
        record: Option<WalletRecord>,
    }

    #[async_trait]
    impl WalletStore for FakeWallets {
        async fn get(&self, _address: &str) -> Result<Option<WalletRecord>> {
            Ok(self.record.clone())
        }
    }

    fn repo() -> Arc<dyn RegisterRepository> {
        let dir = tempfile::tempdir().unwrap();
        Arc::new(SledRepository::open(dir.path()).unwrap())
    }

    #[tokio::test]
    async fn resolves_wallet_did() {
        let wallets = Arc::new(FakeWallets {
            record: Some(WalletRecord {
                address: "abc".into(),
                public_key: vec![1, 2, 3],
                algorithm: Algorithm::Ed25519,
                status: WalletStatus::Active,
            }),
        });
        let resolver = DidResolver::new(repo(), wallets);
        let resolved = resolver.resolve(&Did::wallet("abc")).await.unwrap();
        assert_eq!(resolved.public_key, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn missing_wallet_is_not_found() {
        let wallets = Arc::new(FakeWallets { record: None });
        let resolver = DidResolver::new(repo(), wallets);
        let err = resolver.resolve(&Did::wallet("nobody")).await.unwrap_err();
        assert!(matches!(err, SorchaError::DidNotFound(_)));
    }

    #[tokio::test]
    async fn resolves_register_did_from_control_payload() {
        let register_id = RegisterId::generate();
        let tx_id = TxId::from_bytes([9u8; 32]);
        let subject = Did::wallet("owner");

        let roster = sorcha_core::RegisterControlRecord {
            register_id,
            name: "acme".into(),
            tenant_id: "tenant-1".into(),
            created_at: 0,
            attestations: vec![sorcha_core::RegisterAttestation {
                role: sorcha_core::types::Role::Owner,
                subject: subject.clone(),
                public_key: vec![7u8; 32],
                algorithm: Algorithm::Ed25519,
                signature: vec![],
                granted_at: 0,
            }],
            metadata: Default::default(),
        };
        let bytes = ControlPayload::genesis(roster).to_canonical_bytes().unwrap();
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);

        let repository = repo();
        repository
            .insert_transaction(&sorcha_core::Transaction {
                tx_id,
                register_id,
                sender_wallet: "w:system".into(),
                recipients: vec![],
                prev_tx_id: None,
                payloads: vec![Payload::new(encoded.into_bytes())],
                metadata: TransactionMetadata {
                    blueprint_id: "genesis".into(),
                    action_id: "register-creation".into(),
                    transaction_type: TransactionType::Genesis,
                },
                signature: vec![],
                created_at: 0,
            })
            .unwrap();

        let did = Did::new(format!("r:{}:t:{}", register_id.to_hex(), tx_id.to_hex()));
        let wallets = Arc::new(FakeWallets { record: None });
        let resolver = DidResolver::new(repository, wallets);
        let resolved = resolver.resolve(&did).await.unwrap();
        assert_eq!(resolved.public_key, vec![7u8; 32]);
        let _ = subject;
    }
}
