//! sorcha-core
//!
//! Shared types, errors, constants and canonical serialization used by
//! every other crate in the workspace. Nothing in this crate performs I/O.

pub mod admission;
pub mod attestation;
pub mod canonical;
pub mod constants;
pub mod control_payload;
pub mod docket;
pub mod error;
pub mod governance;
pub mod pending;
pub mod register;
pub mod transaction;
pub mod types;

pub use admission::*;
pub use attestation::*;
pub use control_payload::*;
pub use docket::*;
pub use error::*;
pub use governance::*;
pub use pending::*;
pub use register::*;
pub use transaction::*;
pub use types::*;
