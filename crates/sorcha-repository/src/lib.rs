//! sorcha-repository
//!
//! The abstract Register repository contract (§6) plus a sled-backed
//! implementation, following this corpus's one-tree-per-collection
//! pattern. Also hosts the process-wide per-register lock table used by
//! the validator, docket builder, and registration orchestrator (§5).

pub mod locks;
pub mod repository;
pub mod sled_store;

pub use locks::RegisterLocks;
pub use repository::RegisterRepository;
pub use sled_store::SledRepository;
