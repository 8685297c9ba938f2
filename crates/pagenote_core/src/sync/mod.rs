//! Persistence synchronization.
//!
//! # Responsibility
//! - Debounce document changes into remote commits.
//! - Mirror unsynced work into a local draft slot.
//! - Track connectivity and retry on reconnect or manual save.
//!
//! # Invariants
//! - At most one commit is in flight per page.
//! - Commits are issued in revision order; the newest payload always wins.

pub mod autosave;
pub mod clock;

pub use autosave::{
    AutosaveSynchronizer, CommitRequest, SaveError, SaveFailure, SavePayload, SaveStatus,
    TeardownOutcome,
};
pub use clock::{Clock, ManualClock, SystemClock};
