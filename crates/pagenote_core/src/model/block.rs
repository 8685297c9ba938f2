//! Block domain model.
//!
//! # Responsibility
//! - Define the closed set of block kinds and their payloads.
//! - Provide kind conversion with best-effort text preservation.
//!
//! # Invariants
//! - `id` is stable for the block lifetime and is never reused after removal.
//! - Heading level stays within `1..=3`.
//! - Table payloads are always rectangular (see `TableData`).
//!
//! # See also
//! - `model::kinds` for the per-kind dispatch table.

use crate::model::table::TableData;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable block identity key, unique within one document.
pub type BlockId = Uuid;

pub const MIN_HEADING_LEVEL: u8 = 1;
pub const MAX_HEADING_LEVEL: u8 = 3;

/// Numbering style of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStyle {
    Ordered,
    Unordered,
}

/// Kind discriminant without payload, used by conversion and insert commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    Quote,
    ListItem(ListStyle),
    Checklist,
    Code,
    Divider,
    Table,
    Image,
    Embed,
}

impl BlockKind {
    /// Wire name written to the `kind` field of the structured snapshot.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading(_) => "heading",
            Self::Quote => "quote",
            Self::ListItem(_) => "list-item",
            Self::Checklist => "checklist",
            Self::Code => "code",
            Self::Divider => "divider",
            Self::Table => "table",
            Self::Image => "image",
            Self::Embed => "embed",
        }
    }

    /// Kinds that carry an inline text payload.
    pub fn is_textual(self) -> bool {
        !matches!(
            self,
            Self::Divider | Self::Table | Self::Image | Self::Embed
        )
    }

    /// Void kinds have no editable content of their own.
    pub fn is_void(self) -> bool {
        matches!(self, Self::Divider | Self::Image | Self::Embed)
    }

    pub fn is_heading(self) -> bool {
        matches!(self, Self::Heading(_))
    }

    /// Builds the empty payload for this kind.
    pub fn empty_content(self) -> BlockContent {
        BlockContent::Paragraph {
            text: String::new(),
        }
        .converted(self)
    }
}

/// Kind-specific payload. Serialized with an inline `kind` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum BlockContent {
    Paragraph {
        #[serde(default)]
        text: String,
    },
    Heading {
        level: u8,
        #[serde(default)]
        text: String,
    },
    Quote {
        #[serde(default)]
        text: String,
    },
    ListItem {
        style: ListStyle,
        #[serde(default)]
        text: String,
    },
    Checklist {
        #[serde(default)]
        text: String,
        #[serde(default)]
        checked: bool,
    },
    Code {
        #[serde(default)]
        language: String,
        #[serde(default)]
        text: String,
    },
    Divider,
    Table(TableData),
    Image {
        #[serde(default)]
        src: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
    Embed {
        #[serde(default)]
        url: String,
    },
}

impl BlockContent {
    pub fn kind(&self) -> BlockKind {
        match self {
            Self::Paragraph { .. } => BlockKind::Paragraph,
            Self::Heading { level, .. } => BlockKind::Heading(*level),
            Self::Quote { .. } => BlockKind::Quote,
            Self::ListItem { style, .. } => BlockKind::ListItem(*style),
            Self::Checklist { .. } => BlockKind::Checklist,
            Self::Code { .. } => BlockKind::Code,
            Self::Divider => BlockKind::Divider,
            Self::Table(_) => BlockKind::Table,
            Self::Image { .. } => BlockKind::Image,
            Self::Embed { .. } => BlockKind::Embed,
        }
    }

    /// Inline text of textual kinds.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Paragraph { text }
            | Self::Heading { text, .. }
            | Self::Quote { text }
            | Self::ListItem { text, .. }
            | Self::Checklist { text, .. }
            | Self::Code { text, .. } => Some(text.as_str()),
            Self::Divider | Self::Table(_) | Self::Image { .. } | Self::Embed { .. } => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::Paragraph { text }
            | Self::Heading { text, .. }
            | Self::Quote { text }
            | Self::ListItem { text, .. }
            | Self::Checklist { text, .. }
            | Self::Code { text, .. } => Some(text),
            Self::Divider | Self::Table(_) | Self::Image { .. } | Self::Embed { .. } => None,
        }
    }

    /// Text length in chars; zero for non-textual kinds.
    pub fn text_len(&self) -> usize {
        self.text().map_or(0, |text| text.chars().count())
    }

    pub fn table(&self) -> Option<&TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut TableData> {
        match self {
            Self::Table(table) => Some(table),
            _ => None,
        }
    }

    /// Best-effort text used when converting away from this kind.
    fn carried_text(&self) -> String {
        match self {
            Self::Table(table) => table
                .cells()
                .iter()
                .flatten()
                .filter(|cell| !cell.trim().is_empty())
                .cloned()
                .collect::<Vec<_>>()
                .join(" "),
            Self::Image { alt, .. } => alt.clone().unwrap_or_default(),
            other => other.text().unwrap_or_default().to_string(),
        }
    }

    /// Returns this payload rewritten to `kind`.
    ///
    /// Textual targets keep the source text; divider, table, image and embed
    /// targets discard it. Converting to the current kind returns a clone.
    pub fn converted(&self, kind: BlockKind) -> BlockContent {
        if self.kind() == kind {
            return self.clone();
        }
        let text = self.carried_text();
        match kind {
            BlockKind::Paragraph => Self::Paragraph { text },
            BlockKind::Heading(level) => Self::Heading {
                level: clamp_heading_level(level),
                text,
            },
            BlockKind::Quote => Self::Quote { text },
            BlockKind::ListItem(style) => Self::ListItem { style, text },
            BlockKind::Checklist => Self::Checklist {
                text,
                checked: false,
            },
            BlockKind::Code => Self::Code {
                language: String::new(),
                text,
            },
            BlockKind::Divider => Self::Divider,
            BlockKind::Table => Self::Table(TableData::default()),
            BlockKind::Image => Self::Image {
                src: String::new(),
                alt: None,
            },
            BlockKind::Embed => Self::Embed { url: String::new() },
        }
    }

    /// True when the payload holds nothing a user would miss.
    ///
    /// Checklist, table, image, embed and divider payloads always count as
    /// content.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Paragraph { text }
            | Self::Heading { text, .. }
            | Self::Quote { text }
            | Self::ListItem { text, .. }
            | Self::Code { text, .. } => text.trim().is_empty(),
            Self::Checklist { .. }
            | Self::Divider
            | Self::Table(_)
            | Self::Image { .. }
            | Self::Embed { .. } => false,
        }
    }
}

/// One top-level node of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    #[serde(flatten)]
    pub content: BlockContent,
}

impl Block {
    /// Creates a block with a freshly generated id.
    pub fn new(content: BlockContent) -> Self {
        Self::with_id(Uuid::new_v4(), content)
    }

    /// Creates a block with a caller-provided id (reload/import paths).
    pub fn with_id(id: BlockId, content: BlockContent) -> Self {
        Self { id, content }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockContent::Paragraph { text: text.into() })
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockContent::Heading {
            level: clamp_heading_level(level),
            text: text.into(),
        })
    }

    pub fn checklist(text: impl Into<String>, checked: bool) -> Self {
        Self::new(BlockContent::Checklist {
            text: text.into(),
            checked,
        })
    }

    pub fn empty(kind: BlockKind) -> Self {
        Self::new(kind.empty_content())
    }

    pub fn kind(&self) -> BlockKind {
        self.content.kind()
    }

    pub fn text(&self) -> Option<&str> {
        self.content.text()
    }
}

pub fn clamp_heading_level(level: u8) -> u8 {
    level.clamp(MIN_HEADING_LEVEL, MAX_HEADING_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::{Block, BlockContent, BlockKind, ListStyle};

    #[test]
    fn paragraph_to_heading_keeps_text() {
        let block = Block::paragraph("hello");
        let converted = block.content.converted(BlockKind::Heading(2));
        assert_eq!(
            converted,
            BlockContent::Heading {
                level: 2,
                text: "hello".to_string()
            }
        );
    }

    #[test]
    fn paragraph_to_table_discards_text() {
        let block = Block::paragraph("hello");
        let converted = block.content.converted(BlockKind::Table);
        let table = converted.table().expect("table payload");
        assert!(!table.has_text());
    }

    #[test]
    fn heading_level_is_clamped() {
        let converted = BlockKind::Heading(9).empty_content();
        assert_eq!(converted.kind(), BlockKind::Heading(3));
        let block = Block::heading(0, "x");
        assert_eq!(block.kind(), BlockKind::Heading(1));
    }

    #[test]
    fn checklist_is_never_blank() {
        assert!(!BlockContent::Checklist {
            text: String::new(),
            checked: false
        }
        .is_blank());
        assert!(BlockContent::ListItem {
            style: ListStyle::Ordered,
            text: "  ".to_string()
        }
        .is_blank());
    }
}
