//! A JSON-file-backed wallet directory: the minimal concrete
//! implementation of both `sorcha-did`'s async `WalletStore` and
//! `sorcha-validator`'s sync `SenderKeyResolver`, loaded once at startup.
//!
//! The wallet service itself is an external collaborator per §6 — this is
//! a local stand-in for development and single-node deployments, mirroring
//! `chronx-node`'s `load_or_generate_genesis_params` pattern of falling
//! back to ephemeral keys when no file is given.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Deserialize;
use sorcha_core::types::Algorithm;
use sorcha_core::Result;
use sorcha_did::{WalletRecord, WalletStatus, WalletStore};
use sorcha_validator::SenderKeyResolver;

#[derive(Debug, Deserialize)]
struct WalletFileEntry {
    address: String,
    public_key_hex: String,
    algorithm: Algorithm,
    #[serde(default)]
    suspended: bool,
}

pub struct WalletDirectory {
    records: RwLock<HashMap<String, WalletRecord>>,
}

impl WalletDirectory {
    pub fn empty() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let entries: Vec<WalletFileEntry> = serde_json::from_str(&json)?;
        let mut records = HashMap::with_capacity(entries.len());
        for entry in entries {
            records.insert(
                entry.address.clone(),
                WalletRecord {
                    address: entry.address,
                    public_key: hex::decode(&entry.public_key_hex)?,
                    algorithm: entry.algorithm,
                    status: if entry.suspended {
                        WalletStatus::Suspended
                    } else {
                        WalletStatus::Active
                    },
                },
            );
        }
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    pub fn insert(&self, record: WalletRecord) {
        self.records.write().insert(record.address.clone(), record);
    }
}

#[async_trait]
impl WalletStore for WalletDirectory {
    async fn get(&self, address: &str) -> Result<Option<WalletRecord>> {
        Ok(self.records.read().get(address).cloned())
    }
}

impl SenderKeyResolver for WalletDirectory {
    fn resolve(&self, wallet_address: &str) -> Result<Option<(Vec<u8>, Algorithm)>> {
        Ok(self
            .records
            .read()
            .get(wallet_address)
            .filter(|r| r.status == WalletStatus::Active)
            .map(|r| (r.public_key.clone(), r.algorithm)))
    }
}
