//! Page storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the remote page API the autosave engine commits to.
//! - Persist pages, their structured snapshots and tags in SQLite.
//!
//! # Invariants
//! - `update_page` replaces content, snapshot, preview and the whole tag set
//!   in one transaction.
//! - Tag names are normalized to lowercase and deduplicated.
//! - Errors classify as transport (`Network`) or everything else; only the
//!   former flips the autosave engine offline.
//!
//! # See also
//! - `sync::autosave` for the commit protocol.

use crate::db::DbError;
use crate::serialize::snapshot::StructuredSnapshot;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type PageId = Uuid;
pub type StorageResult<T> = Result<T, StorageError>;

const PAGES_DEFAULT_LIMIT: u32 = 10;
const PAGES_LIMIT_MAX: u32 = 50;

const PAGE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    snapshot,
    preview_text,
    preview_image,
    attachments,
    created_at,
    updated_at
FROM pages";

#[derive(Debug)]
pub enum StorageError {
    /// Backend unreachable; the write may be retried once connectivity
    /// returns.
    Network(String),
    /// Backend reachable but rejected the request.
    Server(String),
    Db(DbError),
    NotFound(PageId),
    InvalidData(String),
}

impl StorageError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network(message) => write!(f, "storage unreachable: {message}"),
            Self::Server(message) => write!(f, "storage rejected request: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "page not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted page data: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Create request for a brand-new page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewPage {
    pub title: String,
    /// Markdown projection of the document.
    pub content: String,
    pub snapshot: Option<StructuredSnapshot>,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

/// Full-replacement update of an existing page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageUpdate {
    pub id: PageId,
    pub title: String,
    pub content: String,
    pub snapshot: StructuredSnapshot,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
    /// Replaces the whole tag set.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    pub id: PageId,
    pub title: String,
    pub content: String,
    /// Absent for pages written before structured snapshots existed.
    pub snapshot: Option<StructuredSnapshot>,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
    pub attachments: Vec<String>,
    pub tags: Vec<String>,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageListQuery {
    /// Optional single-tag exact match filter.
    pub tag: Option<String>,
    /// Defaults to 10 and clamps to 50.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Remote page API used by the autosave engine and page sessions.
pub trait PageStorage {
    fn create_page(&self, page: &NewPage) -> StorageResult<PageId>;
    fn get_page(&self, id: PageId) -> StorageResult<PageRecord>;
    fn update_page(&self, update: &PageUpdate) -> StorageResult<()>;
    fn delete_page(&self, id: PageId) -> StorageResult<()>;
    /// Cheap reachability check used before retrying while offline.
    fn probe(&self) -> StorageResult<()>;
}

impl<T: PageStorage + ?Sized> PageStorage for &T {
    fn create_page(&self, page: &NewPage) -> StorageResult<PageId> {
        (**self).create_page(page)
    }

    fn get_page(&self, id: PageId) -> StorageResult<PageRecord> {
        (**self).get_page(id)
    }

    fn update_page(&self, update: &PageUpdate) -> StorageResult<()> {
        (**self).update_page(update)
    }

    fn delete_page(&self, id: PageId) -> StorageResult<()> {
        (**self).delete_page(id)
    }

    fn probe(&self) -> StorageResult<()> {
        (**self).probe()
    }
}

/// SQLite-backed page storage over a migrated connection.
pub struct SqlitePageStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePageStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Lists pages sorted by `updated_at DESC, uuid ASC`.
    pub fn list_pages(&self, query: &PageListQuery) -> StorageResult<Vec<PageRecord>> {
        let mut sql = format!("{PAGE_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(tag) = query.tag.as_deref().and_then(normalize_tag) {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1
                    FROM page_tags pt
                    INNER JOIN tags t ON t.id = pt.tag_id
                    WHERE pt.page_uuid = pages.uuid
                      AND t.name = ?
                )",
            );
            bind_values.push(Value::Text(tag));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_page_limit(query.limit))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(self.page_from_row(row)?);
        }
        Ok(pages)
    }

    fn page_from_row(&self, row: &Row<'_>) -> StorageResult<PageRecord> {
        let uuid_text: String = row.get("uuid")?;
        let snapshot = row
            .get::<_, Option<String>>("snapshot")?
            .map(|raw| {
                StructuredSnapshot::from_json_str(&raw).map_err(|err| {
                    StorageError::InvalidData(format!("snapshot of page {uuid_text}: {err}"))
                })
            })
            .transpose()?;
        let attachments_raw: String = row.get("attachments")?;
        let attachments: Vec<String> = serde_json::from_str(&attachments_raw).map_err(|err| {
            StorageError::InvalidData(format!("attachments of page {uuid_text}: {err}"))
        })?;

        Ok(PageRecord {
            id: parse_uuid(&uuid_text)?,
            title: row.get("title")?,
            content: row.get("content")?,
            snapshot,
            preview_text: row.get("preview_text")?,
            preview_image: row.get("preview_image")?,
            attachments,
            tags: load_tags_for_page(self.conn, &uuid_text)?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

impl PageStorage for SqlitePageStorage<'_> {
    fn create_page(&self, page: &NewPage) -> StorageResult<PageId> {
        let id = Uuid::new_v4();
        let snapshot = encode_snapshot(page.snapshot.as_ref())?;
        self.conn.execute(
            "INSERT INTO pages (
                uuid,
                title,
                content,
                snapshot,
                preview_text,
                preview_image,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                (strftime('%s', 'now') * 1000),
                (strftime('%s', 'now') * 1000)
            );",
            params![
                id.to_string(),
                page.title,
                page.content,
                snapshot,
                page.preview_text,
                page.preview_image,
            ],
        )?;
        debug!("event=page_create module=repo status=ok page_id={id}");
        Ok(id)
    }

    fn get_page(&self, id: PageId) -> StorageResult<PageRecord> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAGE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => self.page_from_row(row),
            None => Err(StorageError::NotFound(id)),
        }
    }

    fn update_page(&self, update: &PageUpdate) -> StorageResult<()> {
        let id_text = update.id.to_string();
        let snapshot = encode_snapshot(Some(&update.snapshot))?;
        let tx = self.conn.unchecked_transaction()?;

        let changed = tx.execute(
            "UPDATE pages
             SET
                title = ?2,
                content = ?3,
                snapshot = ?4,
                preview_text = ?5,
                preview_image = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id_text,
                update.title,
                update.content,
                snapshot,
                update.preview_text,
                update.preview_image,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(update.id));
        }

        tx.execute("DELETE FROM page_tags WHERE page_uuid = ?1;", [&id_text])?;
        for tag in normalize_tags(&update.tags) {
            tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [&tag])?;
            tx.execute(
                "INSERT INTO page_tags (page_uuid, tag_id)
                 SELECT ?1, id FROM tags WHERE name = ?2;",
                params![id_text, tag],
            )?;
        }
        tx.commit()?;
        debug!("event=page_update module=repo status=ok page_id={}", update.id);
        Ok(())
    }

    fn delete_page(&self, id: PageId) -> StorageResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM pages WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StorageError::NotFound(id));
        }
        debug!("event=page_delete module=repo status=ok page_id={id}");
        Ok(())
    }

    fn probe(&self) -> StorageResult<()> {
        self.conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

/// Normalizes list limit: 0 or absent → 10, above 50 → 50.
pub fn normalize_page_limit(limit: Option<u32>) -> u32 {
    match limit {
        None | Some(0) => PAGES_DEFAULT_LIMIT,
        Some(value) => value.min(PAGES_LIMIT_MAX),
    }
}

pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

/// Normalizes, deduplicates and sorts tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .filter_map(|tag| normalize_tag(tag))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn encode_snapshot(snapshot: Option<&StructuredSnapshot>) -> StorageResult<Option<String>> {
    snapshot
        .map(|snapshot| {
            snapshot
                .to_json_string()
                .map_err(|err| StorageError::InvalidData(format!("snapshot encode: {err}")))
        })
        .transpose()
}

fn parse_uuid(value: &str) -> StorageResult<PageId> {
    Uuid::parse_str(value)
        .map_err(|_| StorageError::InvalidData(format!("invalid uuid value `{value}` in pages.uuid")))
}

fn load_tags_for_page(conn: &Connection, page_uuid: &str) -> StorageResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM page_tags pt
         INNER JOIN tags t ON t.id = pt.tag_id
         WHERE pt.page_uuid = ?1
         ORDER BY t.name ASC;",
    )?;
    let mut rows = stmt.query([page_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}
