//! Core of the Pagenote block editor.
//!
//! The document model, command layer, serialization and autosave engine
//! live here; hosts (desktop shell, CLI) only render and feed commands.

pub mod config;
pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod repo;
pub mod serialize;
pub mod service;
pub mod sync;

pub use config::{AutosaveConfig, ConfigError, EditorConfig, PagenoteConfig};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use editor::{Command, CommandOutcome, EditorContext, NoOpReason, SlashCommand, TableCommand};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::block::{Block, BlockContent, BlockId, BlockKind, ListStyle};
pub use model::document::{Document, DocumentError};
pub use model::selection::{CaretGeometry, Point, Rect, Selection, SelectionState};
pub use model::table::{TableData, TableError};
pub use repo::draft_repo::{DraftError, DraftSnapshot, DraftStore, MemoryDraftStore, SqliteDraftStore};
pub use repo::page_repo::{
    NewPage, PageId, PageListQuery, PageRecord, PageStorage, PageUpdate, SqlitePageStorage,
    StorageError,
};
pub use serialize::{
    derive_preview, from_markdown, from_snapshot, to_markdown, to_plain_text, to_snapshot,
    PagePreview, SnapshotError, StructuredSnapshot,
};
pub use service::{DocumentSource, PageSession, SessionError};
pub use sync::{
    AutosaveSynchronizer, Clock, CommitRequest, ManualClock, SaveError, SaveFailure, SavePayload,
    SaveStatus, SystemClock, TeardownOutcome,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
