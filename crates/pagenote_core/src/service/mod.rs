//! Use-case services.
//!
//! # Responsibility
//! - Wire the editor, serialization and autosave layers into page sessions.
//! - Keep hosts decoupled from storage and timing details.

pub mod page_session;

pub use page_session::{DocumentSource, PageSession, SessionError};
