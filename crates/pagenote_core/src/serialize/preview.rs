//! Page preview projection stored next to each page.

use crate::model::block::BlockContent;
use crate::model::document::Document;
use crate::serialize::plain_text::to_plain_text;
use once_cell::sync::Lazy;
use regex::Regex;

pub const PREVIEW_TEXT_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePreview {
    /// Trimmed text of the first block; empty when it has none.
    pub title: String,
    /// Whitespace-normalized plain text, truncated.
    pub preview_text: Option<String>,
    /// Source of the first image block.
    pub preview_image: Option<String>,
}

pub fn derive_preview(doc: &Document) -> PagePreview {
    let title = doc.first().text().unwrap_or_default().trim().to_string();

    let plain = to_plain_text(doc);
    let normalized = WHITESPACE_RE.replace_all(&plain, " ");
    let trimmed = normalized.trim();
    let preview_text = if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(PREVIEW_TEXT_MAX_CHARS).collect())
    };

    let preview_image = doc.blocks().iter().find_map(|block| match &block.content {
        BlockContent::Image { src, .. } if !src.trim().is_empty() => Some(src.trim().to_string()),
        _ => None,
    });

    PagePreview {
        title,
        preview_text,
        preview_image,
    }
}

#[cfg(test)]
mod tests {
    use super::{derive_preview, PREVIEW_TEXT_MAX_CHARS};
    use crate::model::block::{Block, BlockContent};
    use crate::model::document::Document;

    #[test]
    fn preview_picks_first_non_empty_image() {
        let doc = Document::from_blocks(vec![
            Block::heading(1, "  Trip  "),
            Block::new(BlockContent::Image {
                src: String::new(),
                alt: None,
            }),
            Block::new(BlockContent::Image {
                src: "one.png".into(),
                alt: None,
            }),
        ]);
        let preview = derive_preview(&doc);
        assert_eq!(preview.title, "Trip");
        assert_eq!(preview.preview_image.as_deref(), Some("one.png"));
    }

    #[test]
    fn preview_text_is_normalized_and_truncated() {
        let long = "word ".repeat(60);
        let doc = Document::from_blocks(vec![Block::paragraph("a\n\n  b"), Block::paragraph(long)]);
        let text = derive_preview(&doc).preview_text.unwrap();
        assert!(text.starts_with("a b word"));
        assert_eq!(text.chars().count(), PREVIEW_TEXT_MAX_CHARS);
    }

    #[test]
    fn blank_document_has_no_preview_text() {
        let preview = derive_preview(&Document::new());
        assert_eq!(preview.title, "");
        assert!(preview.preview_text.is_none());
    }
}
