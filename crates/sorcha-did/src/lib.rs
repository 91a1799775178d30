//! sorcha-did
//!
//! Resolves a DID token to the verification key it names (§4.2), by
//! consulting either the wallet store or another register's control
//! transaction chain.

pub mod resolver;
pub mod wallet;

pub use resolver::DidResolver;
pub use wallet::{WalletRecord, WalletStatus, WalletStore};
