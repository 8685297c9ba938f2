//! Debounced autosave state machine.
//!
//! # Responsibility
//! - Turn a stream of document changes into ordered remote commits.
//! - Write every change to the local draft slot synchronously.
//! - Handle offline periods, manual retries and editor teardown.
//!
//! # Invariants
//! - Status moves `Idle → Dirty → Saving → Saved → Idle`, or to `Error` on a
//!   failed commit. `offline` and `pending_save` are tracked beside it.
//! - At most one commit is in flight. Changes made meanwhile become the
//!   payload of the next commit.
//! - A successful commit of an older revision never clears dirty state.
//! - No timer fires while offline; reconnecting with pending work commits
//!   exactly once.
//!
//! The engine is sans-IO for timing: the host calls `tick` from its event
//! loop and either runs the returned `CommitRequest` itself and reports back
//! via `complete_commit`, or calls `run_due` to do both inline.

use crate::config::AutosaveConfig;
use crate::model::document::Document;
use crate::repo::draft_repo::{DraftSnapshot, DraftStore};
use crate::repo::page_repo::{PageId, PageStorage, PageUpdate, StorageError};
use crate::serialize::markdown::to_markdown;
use crate::serialize::plain_text::to_plain_text;
use crate::serialize::preview::derive_preview;
use crate::serialize::snapshot::{to_snapshot, StructuredSnapshot};
use crate::sync::clock::Clock;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Why the last commit attempt failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFailure {
    /// Storage unreachable; work is queued until connectivity returns.
    Offline,
    /// Storage rejected the write.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Dirty,
    Saving,
    Saved,
    Error(SaveFailure),
}

/// Everything a commit writes for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePayload {
    pub title: String,
    pub content: String,
    pub snapshot: StructuredSnapshot,
    /// Plain-text projection; mirrored into the local draft.
    pub plain_text: String,
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
}

impl SavePayload {
    pub fn from_document(doc: &Document) -> Self {
        let preview = derive_preview(doc);
        Self {
            title: preview.title,
            content: to_markdown(doc),
            snapshot: to_snapshot(doc),
            plain_text: to_plain_text(doc),
            preview_text: preview.preview_text,
            preview_image: preview.preview_image,
        }
    }
}

/// A commit the host should send to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitRequest {
    pub revision: u64,
    pub payload: SavePayload,
}

#[derive(Debug)]
pub enum SaveError {
    /// Manual save while offline and the reachability probe failed.
    StillUnavailable,
    /// Another commit has not completed yet.
    CommitInFlight,
    /// Completion reported for a revision that is not in flight.
    UnexpectedCompletion(u64),
    Storage(StorageError),
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StillUnavailable => write!(f, "storage is still unreachable"),
            Self::CommitInFlight => write!(f, "a commit is already in flight"),
            Self::UnexpectedCompletion(revision) => {
                write!(f, "no commit in flight for revision {revision}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SaveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for SaveError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// What `teardown` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownOutcome {
    /// Page was empty and never edited: deleted remotely, draft cleared.
    Deleted,
    /// Unsynced work was committed.
    Saved,
    /// Offline with unsynced work; the draft keeps it for next time.
    DraftKept,
    Nothing,
}

pub struct AutosaveSynchronizer<S, D, C> {
    page_id: PageId,
    storage: S,
    drafts: D,
    clock: C,
    config: AutosaveConfig,
    tags: Vec<String>,
    status: SaveStatus,
    /// Revision of the newest recorded change.
    revision: u64,
    /// Newest revision known to be stored remotely.
    committed_revision: u64,
    latest: Option<SavePayload>,
    in_flight: Option<u64>,
    debounce_deadline: Option<i64>,
    saved_until: Option<i64>,
    offline: bool,
    pending_save: bool,
    torn_down: bool,
}

impl<S, D, C> AutosaveSynchronizer<S, D, C>
where
    S: PageStorage,
    D: DraftStore,
    C: Clock,
{
    /// Creates a clean synchronizer for an already stored page.
    ///
    /// `tags` are passed through unchanged on every update.
    pub fn new(
        page_id: PageId,
        storage: S,
        drafts: D,
        clock: C,
        config: AutosaveConfig,
        tags: Vec<String>,
    ) -> Self {
        Self {
            page_id,
            storage,
            drafts,
            clock,
            config: config.normalized(),
            tags,
            status: SaveStatus::Idle,
            revision: 0,
            committed_revision: 0,
            latest: None,
            in_flight: None,
            debounce_deadline: None,
            saved_until: None,
            offline: false,
            pending_save: false,
            torn_down: false,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.revision > self.committed_revision
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn has_pending_save(&self) -> bool {
        self.pending_save
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Deadline of the armed debounce timer, if any.
    pub fn debounce_deadline(&self) -> Option<i64> {
        self.debounce_deadline
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn drafts(&self) -> &D {
        &self.drafts
    }

    /// Records a document change: writes the draft and (re)arms the timer.
    pub fn record_change(&mut self, payload: SavePayload) {
        self.mark_changed(payload, true);
    }

    /// Marks a restored draft as unsynced work without rewriting it.
    pub fn record_restored(&mut self, payload: SavePayload) {
        self.mark_changed(payload, false);
    }

    fn mark_changed(&mut self, payload: SavePayload, write_draft: bool) {
        if self.torn_down {
            warn!(
                "event=autosave_change module=sync status=ignored page_id={} reason=torn_down",
                self.page_id
            );
            return;
        }
        let now = self.clock.now_ms();
        self.revision += 1;
        if write_draft {
            self.write_draft(&payload, now);
        }
        self.latest = Some(payload);
        self.saved_until = None;

        if self.offline {
            self.debounce_deadline = None;
            self.pending_save = true;
            if self.in_flight.is_none() {
                self.status = SaveStatus::Error(SaveFailure::Offline);
            }
        } else {
            self.debounce_deadline = Some(now.saturating_add(self.debounce_ms()));
            if self.in_flight.is_none() {
                self.status = SaveStatus::Dirty;
            }
        }
        debug!(
            "event=autosave_change module=sync status=ok page_id={} revision={} offline={}",
            self.page_id, self.revision, self.offline
        );
    }

    /// Advances timers. Returns a commit to run when the debounce is due.
    pub fn tick(&mut self) -> Option<CommitRequest> {
        let now = self.clock.now_ms();
        if self.status == SaveStatus::Saved && self.saved_until.is_some_and(|until| now >= until) {
            self.status = SaveStatus::Idle;
            self.saved_until = None;
        }

        let due = self.debounce_deadline.is_some_and(|deadline| now >= deadline);
        if due && !self.offline && self.in_flight.is_none() && self.is_dirty() {
            return self.begin_commit();
        }
        None
    }

    /// Reports the result of a commit handed out by `tick`.
    pub fn complete_commit(
        &mut self,
        revision: u64,
        result: Result<(), StorageError>,
    ) -> Result<(), SaveError> {
        if self.in_flight != Some(revision) {
            warn!(
                "event=autosave_commit module=sync status=unexpected page_id={} revision={}",
                self.page_id, revision
            );
            return Err(SaveError::UnexpectedCompletion(revision));
        }
        self.in_flight = None;
        let now = self.clock.now_ms();

        match result {
            Ok(()) => {
                self.committed_revision = self.committed_revision.max(revision);
                if revision == self.revision {
                    self.pending_save = false;
                    self.status = SaveStatus::Saved;
                    self.saved_until = Some(now.saturating_add(self.saved_display_ms()));
                    if let Err(err) = self.drafts.clear_draft(self.page_id) {
                        warn!(
                            "event=draft_clear module=sync status=error page_id={} error={}",
                            self.page_id, err
                        );
                    }
                } else if self.offline {
                    self.pending_save = true;
                    self.status = SaveStatus::Error(SaveFailure::Offline);
                } else {
                    self.status = SaveStatus::Dirty;
                    self.debounce_deadline = Some(now.saturating_add(self.debounce_ms()));
                }
                info!(
                    "event=autosave_commit module=sync status=ok page_id={} revision={} latest={}",
                    self.page_id, revision, self.revision
                );
                Ok(())
            }
            Err(err) => {
                self.debounce_deadline = None;
                if err.is_network() {
                    self.offline = true;
                    self.pending_save = true;
                    self.status = SaveStatus::Error(SaveFailure::Offline);
                } else {
                    self.status = SaveStatus::Error(SaveFailure::Rejected(err.to_string()));
                }
                error!(
                    "event=autosave_commit module=sync status=error page_id={} revision={} offline={} error={}",
                    self.page_id, revision, self.offline, err
                );
                Err(SaveError::Storage(err))
            }
        }
    }

    /// Runs a due commit inline. Returns whether a commit was attempted.
    pub fn run_due(&mut self) -> Result<bool, SaveError> {
        match self.tick() {
            Some(request) => {
                self.commit_inline(request)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Manual save or retry.
    ///
    /// While offline the storage is probed first; if it is still unreachable
    /// nothing is committed.
    pub fn save_now(&mut self) -> Result<(), SaveError> {
        if self.in_flight.is_some() {
            return Err(SaveError::CommitInFlight);
        }
        if self.offline {
            if let Err(err) = self.storage.probe() {
                warn!(
                    "event=autosave_retry module=sync status=unavailable page_id={} error={}",
                    self.page_id, err
                );
                return Err(SaveError::StillUnavailable);
            }
            self.offline = false;
        }
        if !self.is_dirty() {
            self.pending_save = false;
            if matches!(self.status, SaveStatus::Error(_)) {
                self.status = SaveStatus::Idle;
            }
            return Ok(());
        }
        match self.begin_commit() {
            Some(request) => self.commit_inline(request),
            None => Ok(()),
        }
    }

    /// Connectivity signal from the host.
    pub fn set_online(&mut self, online: bool) -> Result<(), SaveError> {
        if !online {
            if !self.offline {
                info!(
                    "event=autosave_connectivity module=sync status=offline page_id={}",
                    self.page_id
                );
            }
            self.offline = true;
            self.debounce_deadline = None;
            if self.is_dirty() {
                self.pending_save = true;
                if self.in_flight.is_none() {
                    self.status = SaveStatus::Error(SaveFailure::Offline);
                }
            }
            return Ok(());
        }

        if !self.offline {
            return Ok(());
        }
        self.offline = false;
        info!(
            "event=autosave_connectivity module=sync status=online page_id={} pending_save={}",
            self.page_id, self.pending_save
        );
        if self.pending_save && self.is_dirty() && self.in_flight.is_none() {
            if let Some(request) = self.begin_commit() {
                return self.commit_inline(request);
            }
        }
        self.pending_save = false;
        if self.status == SaveStatus::Error(SaveFailure::Offline) {
            self.status = if self.is_dirty() {
                SaveStatus::Dirty
            } else {
                SaveStatus::Idle
            };
        }
        Ok(())
    }

    /// Final step when the editor closes.
    ///
    /// An empty page that was never edited is deleted; unsynced work gets a
    /// last synchronous commit; otherwise nothing happens.
    pub fn teardown(&mut self, document_empty: bool) -> Result<TeardownOutcome, SaveError> {
        self.debounce_deadline = None;
        self.torn_down = true;

        let outcome = if document_empty && !self.is_dirty() {
            self.storage.delete_page(self.page_id)?;
            if let Err(err) = self.drafts.clear_draft(self.page_id) {
                warn!(
                    "event=draft_clear module=sync status=error page_id={} error={}",
                    self.page_id, err
                );
            }
            TeardownOutcome::Deleted
        } else if self.is_dirty() {
            if self.offline {
                TeardownOutcome::DraftKept
            } else if self.in_flight == Some(self.revision) {
                // The host's commit already carries the latest revision.
                TeardownOutcome::Saved
            } else {
                // The host will not report back after teardown; supersede an
                // older commit it still holds.
                self.in_flight = None;
                match self.begin_commit() {
                    Some(request) => {
                        self.commit_inline(request)?;
                        TeardownOutcome::Saved
                    }
                    None => TeardownOutcome::Nothing,
                }
            }
        } else {
            TeardownOutcome::Nothing
        };

        info!(
            "event=autosave_teardown module=sync status=ok page_id={} outcome={:?}",
            self.page_id, outcome
        );
        Ok(outcome)
    }

    fn begin_commit(&mut self) -> Option<CommitRequest> {
        let payload = self.latest.clone()?;
        self.debounce_deadline = None;
        self.in_flight = Some(self.revision);
        self.status = SaveStatus::Saving;
        debug!(
            "event=autosave_commit module=sync status=start page_id={} revision={}",
            self.page_id, self.revision
        );
        Some(CommitRequest {
            revision: self.revision,
            payload,
        })
    }

    fn commit_inline(&mut self, request: CommitRequest) -> Result<(), SaveError> {
        let update = self.page_update(request.payload);
        let result = self.storage.update_page(&update);
        self.complete_commit(request.revision, result)
    }

    fn page_update(&self, payload: SavePayload) -> PageUpdate {
        PageUpdate {
            id: self.page_id,
            title: payload.title,
            content: payload.content,
            snapshot: payload.snapshot,
            preview_text: payload.preview_text,
            preview_image: payload.preview_image,
            tags: self.tags.clone(),
        }
    }

    fn write_draft(&self, payload: &SavePayload, now: i64) {
        let draft = DraftSnapshot {
            structured_snapshot: payload.snapshot.clone(),
            derived_text: payload.plain_text.clone(),
            timestamp: now,
            document_id: self.page_id,
            title: payload.title.clone(),
        };
        if let Err(err) = self.drafts.save_draft(self.page_id, &draft) {
            warn!(
                "event=draft_save module=sync status=error page_id={} error={}",
                self.page_id, err
            );
        }
    }

    fn debounce_ms(&self) -> i64 {
        i64::try_from(self.config.debounce_ms).unwrap_or(i64::MAX)
    }

    fn saved_display_ms(&self) -> i64 {
        i64::try_from(self.config.saved_display_ms).unwrap_or(i64::MAX)
    }
}
