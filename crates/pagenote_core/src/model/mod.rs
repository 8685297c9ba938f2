//! Editor domain model: blocks, the document tree and the caret.
//!
//! # Responsibility
//! - Define canonical data structures the command layer mutates.
//! - Keep the tree pure: no rendering state, fully reconstructable from a
//!   structured snapshot.
//!
//! # Invariants
//! - Every block is identified by a stable `BlockId`.
//! - A document always holds at least one block.

pub mod block;
pub mod document;
pub mod kinds;
pub mod selection;
pub mod table;
