//! Page and draft persistence.
//!
//! # Responsibility
//! - Define the remote page storage contract the autosave engine talks to.
//! - Provide the SQLite implementation used by local hosts and the CLI.
//! - Keep per-page local drafts for unsynced work.
//!
//! # Invariants
//! - Storage APIs report `NotFound` separately from transport failures.
//! - Network-class failures are distinguishable (`StorageError::is_network`)
//!   so callers can switch to offline mode.

pub mod draft_repo;
pub mod page_repo;
