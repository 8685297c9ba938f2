//! Document serialization.
//!
//! # Responsibility
//! - Structured snapshot codec (the persisted source of truth).
//! - Derived projections: plain text, Markdown and page previews.
//! - Markdown import for pages stored without a snapshot.
//!
//! # Invariants
//! - Only the structured snapshot round-trips exactly; every other format is
//!   a lossy projection.

pub mod markdown;
pub mod plain_text;
pub mod preview;
pub mod snapshot;

pub use markdown::{from_markdown, to_markdown};
pub use plain_text::to_plain_text;
pub use preview::{derive_preview, PagePreview};
pub use snapshot::{from_snapshot, to_snapshot, SnapshotError, StructuredSnapshot};
