//! sorcha-governance
//!
//! The roster state machine (§4.4): proposal validation, quorum
//! arithmetic, pure `ApplyOperation`, and roster reconstruction from the
//! control-transaction chain. Validation and apply are pure in-memory
//! computations — only roster reconstruction touches the repository.

pub mod apply;
pub mod quorum;
pub mod roster;
pub mod validation;

pub use apply::apply_operation;
pub use quorum::{validate_quorum, QuorumResult};
pub use roster::RosterReconstructor;
pub use validation::{validate_proposal, validate_proposal_strict, ValidationOutcome};
