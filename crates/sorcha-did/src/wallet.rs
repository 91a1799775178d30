use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sorcha_core::types::Algorithm;
use sorcha_core::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletStatus {
    Active,
    Suspended,
}

/// A wallet's registered verification key, as known to the surrounding
/// identity/auth service. Out of this crate's scope to create or mutate —
/// only consulted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletRecord {
    pub address: String,
    pub public_key: Vec<u8>,
    pub algorithm: Algorithm,
    pub status: WalletStatus,
}

/// Thin collaborator interface onto the wallet directory (§6, "out of
/// scope... wallet HD key derivation"). Transport failures are distinct
/// from an absent record: the former is transient, the latter is not.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get(&self, address: &str) -> Result<Option<WalletRecord>>;
}
