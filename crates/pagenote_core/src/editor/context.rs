//! Explicit editor context passed through every command.
//!
//! # Responsibility
//! - Own the live document, the caret state and the slash menu.
//! - Route commands to their handlers and report the outcome.
//! - Run post-command passes (selection normalization, title policy) and
//!   notify change listeners.
//!
//! # Invariants
//! - Handlers validate before mutating; a `NoOp` outcome leaves the document
//!   untouched.
//! - Listeners fire once per command, and only when the version moved.

use crate::config::EditorConfig;
use crate::editor::command::{Command, CommandOutcome, NoOpReason, SlashCommand};
use crate::editor::slash_menu::SlashMenu;
use crate::editor::{checklist, media, slash_menu, structure, table, text, title};
use crate::model::block::BlockId;
use crate::model::document::Document;
use crate::model::selection::{CaretGeometry, Point, Rect, Selection, SelectionState};
use log::{debug, warn};

type ChangeListener = Box<dyn FnMut(&Document)>;

pub struct EditorContext {
    document: Document,
    selection: SelectionState,
    slash_menu: Option<SlashMenu>,
    config: EditorConfig,
    listeners: Vec<ChangeListener>,
}

impl EditorContext {
    /// Wraps `document` with the caret at the start of its first block.
    pub fn new(document: Document, config: EditorConfig) -> Self {
        let mut selection = SelectionState::new();
        selection.set(Selection::caret(document.first().id, 0), &document);
        Self {
            document,
            selection,
            slash_menu: None,
            config: config.normalized(),
            listeners: Vec::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection.get()
    }

    pub fn selection_state(&self) -> &SelectionState {
        &self.selection
    }

    /// Records a host-reported selection.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection.set(selection, &self.document);
    }

    pub fn slash_menu(&self) -> Option<&SlashMenu> {
        self.slash_menu.as_ref()
    }

    /// Registers a callback invoked after every document-changing command.
    pub fn subscribe(&mut self, listener: impl FnMut(&Document) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Opens the slash menu using host geometry for the caret rectangle.
    pub fn open_slash_menu(
        &mut self,
        geometry: &dyn CaretGeometry,
        viewport: Rect,
    ) -> CommandOutcome {
        let caret = self.selection.bounding_rect(geometry);
        self.dispatch(Command::Slash(SlashCommand::Open { caret, viewport }))
    }

    /// Applies one command.
    ///
    /// Stale selections and out-of-range targets are reported as `NoOp`
    /// and logged; they never surface as errors.
    pub fn dispatch(&mut self, command: Command) -> CommandOutcome {
        let name = command.name();
        let version_before = self.document.version();
        let first_before = first_block_fingerprint(&self.document);

        let result = match command {
            Command::InsertText(value) => text::insert_text(self, &value),
            Command::DeleteBackward => text::delete_backward(self),
            Command::SplitBlock => text::split_block(self),
            Command::SetText { block, text: value } => text::set_text(self, block, value),
            Command::ConvertKind(kind) => structure::convert_caret_block(self, kind),
            Command::InsertBlockAfter(kind) => structure::insert_after_caret(self, kind),
            Command::RemoveBlock => structure::remove_caret_block(self),
            Command::ToggleChecked => checklist::toggle_checked(self),
            Command::SetCodeLanguage(language) => media::set_code_language(self, language),
            Command::SetImage { src, alt } => media::set_image(self, src, alt),
            Command::SetEmbedUrl(url) => media::set_embed_url(self, url),
            Command::Table(command) => table::apply(self, command),
            Command::Slash(command) => slash_menu::apply(self, command),
        };

        match result {
            Ok(()) => {
                self.selection.normalize(&self.document);
                if self.config.enforce_title
                    && first_block_fingerprint(&self.document) != first_before
                {
                    title::enforce(&mut self.document);
                }
                let changed = self.document.version() != version_before;
                if changed {
                    for listener in &mut self.listeners {
                        listener(&self.document);
                    }
                }
                debug!(
                    "event=command_apply module=editor status=ok command={} changed={} version={}",
                    name,
                    changed,
                    self.document.version()
                );
                CommandOutcome::Applied {
                    document_changed: changed,
                }
            }
            Err(reason) => {
                if reason == NoOpReason::InvalidTarget {
                    warn!(
                        "event=command_apply module=editor status=noop command={} reason={}",
                        name,
                        reason.as_str()
                    );
                } else {
                    debug!(
                        "event=command_apply module=editor status=noop command={} reason={}",
                        name,
                        reason.as_str()
                    );
                }
                CommandOutcome::NoOp(reason)
            }
        }
    }

    pub(crate) fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub(crate) fn slash_menu_mut(&mut self) -> &mut Option<SlashMenu> {
        &mut self.slash_menu
    }

    /// Caret position, or `InvalidTarget` when the selection is missing or
    /// points at a removed block. For ranges the focus is the caret.
    pub(crate) fn caret(&self) -> Result<Point, NoOpReason> {
        let selection = self.selection.get().ok_or(NoOpReason::InvalidTarget)?;
        if !self.document.contains(selection.focus.block) {
            return Err(NoOpReason::InvalidTarget);
        }
        Ok(selection.focus)
    }

    /// Ordered range endpoints when the selection is not collapsed.
    pub(crate) fn range(&self) -> Result<Option<(Point, Point)>, NoOpReason> {
        let selection = self.selection.get().ok_or(NoOpReason::InvalidTarget)?;
        if selection.is_collapsed() {
            return Ok(None);
        }
        selection
            .ordered(&self.document)
            .map(Some)
            .ok_or(NoOpReason::InvalidTarget)
    }

    pub(crate) fn move_caret(&mut self, block: BlockId, offset: usize) {
        self.selection
            .set(Selection::caret(block, offset), &self.document);
    }
}

fn first_block_fingerprint(doc: &Document) -> (BlockId, Option<String>) {
    let first = doc.first();
    (first.id, first.text().map(str::to_owned))
}
