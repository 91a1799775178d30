//! sorcha-crypto
//!
//! Signature verification and keyed hashing over the three algorithm
//! families the protocol supports: ED25519, NIST P-256, RSA-4096.

pub mod ed25519;
pub mod hash;
pub mod nist_p256;
pub mod rsa4096;
pub mod verify;

pub use hash::hash;
pub use verify::verify;
