//! sorcha-orchestrator
//!
//! The two-phase register creation protocol (§4.3): `initiate` stages a
//! pending registration and hands back canonical hashes for each proposed
//! owner to sign; `finalize` verifies those signatures, assembles the
//! genesis control record, and submits the genesis transaction to the
//! Validator.

pub mod dto;
pub mod orchestrator;
pub mod tenant;
pub mod template;

pub use dto::{
    FinalizeRequest, FinalizeResponse, InitiateRequest, InitiateResponse, OwnerProposal,
    SignedAttestation, StagedAttestation,
};
pub use orchestrator::RegistrationOrchestrator;
pub use tenant::{AllowAllTenants, TenantPolicy};
