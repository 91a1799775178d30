//! sorcha-rpc
//!
//! JSON-RPC 2.0 server fronting the registration orchestrator, roster
//! state machine, and validator/docket-builder/chain-validator pipeline.
//!
//! Namespace: "sorcha"
//! Methods:
//!   sorcha_registerInitiate  — stage a pending registration
//!   sorcha_registerFinalize  — verify attestations, submit genesis
//!   sorcha_getRegister       — register control-plane record
//!   sorcha_getRoster         — current roster snapshot
//!   sorcha_validateProposal  — §4.4 precondition check
//!   sorcha_validateQuorum    — §4.4 quorum arithmetic
//!   sorcha_submitTransaction — admit a signed transaction to the mempool
//!   sorcha_buildDocket       — trigger an out-of-schedule docket build
//!   sorcha_validateChain     — composite docket/transaction chain audit
//!   sorcha_resolveDid        — resolve a DID to its verification key

pub mod api;
pub mod server;
pub mod types;

pub use server::RpcServer;
pub use server::RpcServerState;
