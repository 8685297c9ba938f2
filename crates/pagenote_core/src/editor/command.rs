//! Command vocabulary accepted by `EditorContext::dispatch`.

use crate::model::block::{BlockId, BlockKind};
use crate::model::document::DocumentError;
use crate::model::selection::Rect;

/// One discrete user intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Typed characters at the caret; replaces a range selection.
    InsertText(String),
    /// Backspace.
    DeleteBackward,
    /// Enter.
    SplitBlock,
    /// Host surface reports the full text of one block.
    SetText { block: BlockId, text: String },
    /// Rewrites the kind of the caret block.
    ConvertKind(BlockKind),
    /// Inserts an empty block of `kind` after the caret block.
    InsertBlockAfter(BlockKind),
    /// Removes the caret block.
    RemoveBlock,
    ToggleChecked,
    SetCodeLanguage(String),
    SetImage { src: String, alt: Option<String> },
    SetEmbedUrl(String),
    Table(TableCommand),
    Slash(SlashCommand),
}

impl Command {
    /// Short stable name used in log events.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InsertText(_) => "insert_text",
            Self::DeleteBackward => "delete_backward",
            Self::SplitBlock => "split_block",
            Self::SetText { .. } => "set_text",
            Self::ConvertKind(_) => "convert_kind",
            Self::InsertBlockAfter(_) => "insert_block_after",
            Self::RemoveBlock => "remove_block",
            Self::ToggleChecked => "toggle_checked",
            Self::SetCodeLanguage(_) => "set_code_language",
            Self::SetImage { .. } => "set_image",
            Self::SetEmbedUrl(_) => "set_embed_url",
            Self::Table(command) => command.name(),
            Self::Slash(command) => command.name(),
        }
    }
}

/// Table edits against the caret block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCommand {
    AddRow,
    AddColumn,
    /// `None` removes the last row.
    RemoveRow(Option<usize>),
    /// `None` removes the last column.
    RemoveColumn(Option<usize>),
    SetCell { row: usize, col: usize, text: String },
}

impl TableCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddRow => "table_add_row",
            Self::AddColumn => "table_add_column",
            Self::RemoveRow(_) => "table_remove_row",
            Self::RemoveColumn(_) => "table_remove_column",
            Self::SetCell { .. } => "table_set_cell",
        }
    }
}

/// Slash menu interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum SlashCommand {
    /// Opens the menu at the caret. `caret` is the selection bounding
    /// rectangle (see `SelectionState::bounding_rect`).
    Open { caret: Option<Rect>, viewport: Rect },
    Filter(String),
    MoveUp,
    MoveDown,
    /// Commits the highlighted item (Enter).
    Commit,
    /// Commits the item at an index of the filtered list (click).
    Pick(usize),
    Close,
}

impl SlashCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "slash_open",
            Self::Filter(_) => "slash_filter",
            Self::MoveUp => "slash_move_up",
            Self::MoveDown => "slash_move_down",
            Self::Commit => "slash_commit",
            Self::Pick(_) => "slash_pick",
            Self::Close => "slash_close",
        }
    }
}

/// Why a command left the document untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    /// Selection or addressed block/cell does not exist.
    InvalidTarget,
    /// Would shrink a table below 1x1 or delete the last empty block.
    StructuralFloor,
    /// Command does not apply to the caret block's kind.
    KindMismatch,
    /// Nothing to do at this position.
    Unchanged,
}

impl NoOpReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidTarget => "invalid_target",
            Self::StructuralFloor => "structural_floor",
            Self::KindMismatch => "kind_mismatch",
            Self::Unchanged => "unchanged",
        }
    }
}

impl From<DocumentError> for NoOpReason {
    fn from(value: DocumentError) -> Self {
        match value {
            DocumentError::NotTextual(_) => Self::KindMismatch,
            DocumentError::NotFound(_)
            | DocumentError::DuplicateId(_)
            | DocumentError::IndexOutOfRange { .. } => Self::InvalidTarget,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied { document_changed: bool },
    NoOp(NoOpReason),
}

impl CommandOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    pub fn document_changed(&self) -> bool {
        matches!(
            self,
            Self::Applied {
                document_changed: true
            }
        )
    }
}
