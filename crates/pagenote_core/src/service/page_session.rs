//! Page editing session: one editor bound to one autosave engine.
//!
//! # Responsibility
//! - Create or open a page, choosing between local draft, structured
//!   snapshot and Markdown content.
//! - Forward every document-changing command to the synchronizer.
//! - Decide disposal of empty pages on close.
//!
//! # Invariants
//! - A fresh local draft always wins over the stored page and is treated as
//!   unsynced work.
//! - Every command that moves the document version produces exactly one
//!   recorded change.

use crate::config::PagenoteConfig;
use crate::editor::{Command, CommandOutcome, EditorContext};
use crate::model::document::Document;
use crate::model::selection::{CaretGeometry, Rect, Selection};
use crate::repo::draft_repo::{load_fresh_draft, DraftStore};
use crate::repo::page_repo::{NewPage, PageId, PageStorage, StorageError};
use crate::serialize::markdown::from_markdown;
use crate::serialize::snapshot::{from_snapshot, SnapshotError};
use crate::sync::autosave::{
    AutosaveSynchronizer, SaveError, SavePayload, SaveStatus, TeardownOutcome,
};
use crate::sync::clock::Clock;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionError {
    Storage(StorageError),
    Snapshot(SnapshotError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Snapshot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Snapshot(err) => Some(err),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<SnapshotError> for SessionError {
    fn from(value: SnapshotError) -> Self {
        Self::Snapshot(value)
    }
}

/// Where the opened document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentSource {
    New,
    Draft,
    Snapshot,
    Markdown,
}

pub struct PageSession<S, D, C> {
    editor: EditorContext,
    sync: AutosaveSynchronizer<S, D, C>,
    source: DocumentSource,
    synced_version: u64,
}

impl<S, D, C> PageSession<S, D, C>
where
    S: PageStorage,
    D: DraftStore,
    C: Clock,
{
    /// Creates a new, empty page in storage and opens it.
    pub fn create(
        storage: S,
        drafts: D,
        clock: C,
        config: &PagenoteConfig,
    ) -> Result<Self, SessionError> {
        let document = Document::new();
        let payload = SavePayload::from_document(&document);
        let page_id = storage.create_page(&NewPage {
            title: payload.title,
            content: payload.content,
            snapshot: Some(payload.snapshot),
            preview_text: payload.preview_text,
            preview_image: payload.preview_image,
        })?;
        info!("event=session_open module=service status=ok page_id={page_id} source=new");

        let sync = AutosaveSynchronizer::new(
            page_id,
            storage,
            drafts,
            clock,
            config.autosave.clone(),
            Vec::new(),
        );
        Ok(Self::assemble(document, sync, DocumentSource::New, config))
    }

    /// Opens an existing page.
    pub fn open(
        page_id: PageId,
        storage: S,
        drafts: D,
        clock: C,
        config: &PagenoteConfig,
    ) -> Result<Self, SessionError> {
        let record = storage.get_page(page_id)?;
        let draft = match load_fresh_draft(
            &drafts,
            page_id,
            clock.now_ms(),
            config.autosave.draft_ttl_ms,
        ) {
            Ok(draft) => draft,
            Err(err) => {
                warn!(
                    "event=draft_load module=service status=error page_id={} error={}",
                    page_id, err
                );
                None
            }
        };

        let (document, source) = match (&draft, &record.snapshot) {
            (Some(draft), _) => (from_snapshot(&draft.structured_snapshot)?, DocumentSource::Draft),
            (None, Some(snapshot)) if !snapshot.is_empty() => {
                (from_snapshot(snapshot)?, DocumentSource::Snapshot)
            }
            (None, _) => (from_markdown(&record.content), DocumentSource::Markdown),
        };
        info!(
            "event=session_open module=service status=ok page_id={} source={:?} blocks={}",
            page_id,
            source,
            document.len()
        );

        let mut sync = AutosaveSynchronizer::new(
            page_id,
            storage,
            drafts,
            clock,
            config.autosave.clone(),
            record.tags,
        );
        if source == DocumentSource::Draft {
            sync.record_restored(SavePayload::from_document(&document));
        }
        Ok(Self::assemble(document, sync, source, config))
    }

    fn assemble(
        document: Document,
        sync: AutosaveSynchronizer<S, D, C>,
        source: DocumentSource,
        config: &PagenoteConfig,
    ) -> Self {
        let synced_version = document.version();
        Self {
            editor: EditorContext::new(document, config.editor.clone()),
            sync,
            source,
            synced_version,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.sync.page_id()
    }

    pub fn source(&self) -> DocumentSource {
        self.source
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn editor(&self) -> &EditorContext {
        &self.editor
    }

    pub fn synchronizer(&self) -> &AutosaveSynchronizer<S, D, C> {
        &self.sync
    }

    pub fn status(&self) -> &SaveStatus {
        self.sync.status()
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
    }

    pub fn open_slash_menu(&mut self, geometry: &dyn CaretGeometry, viewport: Rect) -> CommandOutcome {
        let outcome = self.editor.open_slash_menu(geometry, viewport);
        self.record_if_changed();
        outcome
    }

    /// Applies one command and records the change when the document moved.
    pub fn apply(&mut self, command: Command) -> CommandOutcome {
        let outcome = self.editor.dispatch(command);
        self.record_if_changed();
        outcome
    }

    /// Drives the autosave timers; commits inline when due.
    pub fn tick(&mut self) -> Result<bool, SaveError> {
        self.sync.run_due()
    }

    pub fn save_now(&mut self) -> Result<(), SaveError> {
        self.sync.save_now()
    }

    pub fn set_online(&mut self, online: bool) -> Result<(), SaveError> {
        self.sync.set_online(online)
    }

    /// Closes the session, deleting the page if it was left empty.
    pub fn close(mut self) -> Result<TeardownOutcome, SaveError> {
        let empty = self.editor.document().is_structurally_empty();
        self.sync.teardown(empty)
    }

    fn record_if_changed(&mut self) {
        let version = self.editor.document().version();
        if version != self.synced_version {
            self.synced_version = version;
            self.sync
                .record_change(SavePayload::from_document(self.editor.document()));
        }
    }
}
