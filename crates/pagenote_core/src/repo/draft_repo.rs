//! Local draft persistence.
//!
//! # Responsibility
//! - Keep the latest unsynced state of a page on the device so a crash or a
//!   network outage never loses typed work.
//! - Expire drafts older than the configured TTL.
//!
//! # Invariants
//! - Drafts are keyed `draft:{page_id}`; one slot per page.
//! - Each slot is owned by exactly one autosave synchronizer.
//! - Draft values are JSON objects
//!   `{structuredSnapshot, derivedText, timestamp, documentId, title}`.
//! - A draft is only honored for the page named by its `documentId`.

use crate::db::DbError;
use crate::repo::page_repo::PageId;
use crate::serialize::snapshot::StructuredSnapshot;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSnapshot {
    pub structured_snapshot: StructuredSnapshot,
    /// Plain-text projection of the document.
    pub derived_text: String,
    /// Epoch milliseconds of the write.
    pub timestamp: i64,
    pub document_id: PageId,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug)]
pub enum DraftError {
    Db(DbError),
    /// Stored value is not a valid draft document.
    Encoding(serde_json::Error),
}

impl Display for DraftError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "invalid draft value: {err}"),
        }
    }
}

impl Error for DraftError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encoding(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DraftError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for DraftError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

pub fn draft_key(page_id: PageId) -> String {
    format!("draft:{page_id}")
}

pub trait DraftStore {
    fn save_draft(&self, page_id: PageId, draft: &DraftSnapshot) -> Result<(), DraftError>;
    fn load_draft(&self, page_id: PageId) -> Result<Option<DraftSnapshot>, DraftError>;
    fn clear_draft(&self, page_id: PageId) -> Result<(), DraftError>;
}

impl<T: DraftStore + ?Sized> DraftStore for &T {
    fn save_draft(&self, page_id: PageId, draft: &DraftSnapshot) -> Result<(), DraftError> {
        (**self).save_draft(page_id, draft)
    }

    fn load_draft(&self, page_id: PageId) -> Result<Option<DraftSnapshot>, DraftError> {
        (**self).load_draft(page_id)
    }

    fn clear_draft(&self, page_id: PageId) -> Result<(), DraftError> {
        (**self).clear_draft(page_id)
    }
}

/// Draft slots in the `drafts` table.
pub struct SqliteDraftStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDraftStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl DraftStore for SqliteDraftStore<'_> {
    fn save_draft(&self, page_id: PageId, draft: &DraftSnapshot) -> Result<(), DraftError> {
        let value = serde_json::to_string(draft)?;
        self.conn.execute(
            "INSERT INTO drafts (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                            updated_at = excluded.updated_at;",
            params![draft_key(page_id), value, draft.timestamp],
        )?;
        Ok(())
    }

    fn load_draft(&self, page_id: PageId) -> Result<Option<DraftSnapshot>, DraftError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM drafts WHERE key = ?1;",
                [draft_key(page_id)],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|value| serde_json::from_str(&value))
            .transpose()
            .map_err(DraftError::from)
    }

    fn clear_draft(&self, page_id: PageId) -> Result<(), DraftError> {
        self.conn
            .execute("DELETE FROM drafts WHERE key = ?1;", [draft_key(page_id)])?;
        Ok(())
    }
}

/// In-process draft slots, for hosts without a local database and tests.
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, page_id: PageId) -> bool {
        self.entries.borrow().contains_key(&draft_key(page_id))
    }

    /// Writes a raw value into a slot, bypassing encoding.
    pub fn insert_raw(&self, page_id: PageId, value: impl Into<String>) {
        self.entries
            .borrow_mut()
            .insert(draft_key(page_id), value.into());
    }
}

impl DraftStore for MemoryDraftStore {
    fn save_draft(&self, page_id: PageId, draft: &DraftSnapshot) -> Result<(), DraftError> {
        let value = serde_json::to_string(draft)?;
        self.entries.borrow_mut().insert(draft_key(page_id), value);
        Ok(())
    }

    fn load_draft(&self, page_id: PageId) -> Result<Option<DraftSnapshot>, DraftError> {
        let entries = self.entries.borrow();
        entries
            .get(&draft_key(page_id))
            .map(|value| serde_json::from_str(value))
            .transpose()
            .map_err(DraftError::from)
    }

    fn clear_draft(&self, page_id: PageId) -> Result<(), DraftError> {
        self.entries.borrow_mut().remove(&draft_key(page_id));
        Ok(())
    }
}

/// Loads a draft that is younger than `ttl_ms`.
///
/// Expired, undecodable and foreign drafts are cleared and reported as
/// absent.
pub fn load_fresh_draft(
    store: &dyn DraftStore,
    page_id: PageId,
    now_ms: i64,
    ttl_ms: u64,
) -> Result<Option<DraftSnapshot>, DraftError> {
    let draft = match store.load_draft(page_id) {
        Ok(draft) => draft,
        Err(DraftError::Encoding(err)) => {
            warn!(
                "event=draft_load module=repo status=discarded page_id={} reason=decode error={}",
                page_id, err
            );
            store.clear_draft(page_id)?;
            return Ok(None);
        }
        Err(err) => return Err(err),
    };
    let Some(draft) = draft else {
        return Ok(None);
    };

    if draft.document_id != page_id {
        warn!(
            "event=draft_load module=repo status=discarded page_id={} reason=foreign document_id={}",
            page_id, draft.document_id
        );
        store.clear_draft(page_id)?;
        return Ok(None);
    }

    let age_ms = now_ms.saturating_sub(draft.timestamp);
    if age_ms > i64::try_from(ttl_ms).unwrap_or(i64::MAX) {
        debug!(
            "event=draft_load module=repo status=expired page_id={} age_ms={}",
            page_id, age_ms
        );
        store.clear_draft(page_id)?;
        return Ok(None);
    }
    Ok(Some(draft))
}
