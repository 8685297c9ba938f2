//! First-block title policy.

use crate::model::block::BlockKind;
use crate::model::document::Document;
use log::debug;

/// Coerces a non-empty, non-heading first block into a level 1 heading.
///
/// Blocks without inline text (tables, dividers, media) are left alone.
pub(crate) fn enforce(doc: &mut Document) {
    let first = doc.first();
    let kind = first.kind();
    if kind.is_heading() || !kind.is_textual() {
        return;
    }
    if first.text().map_or(true, |text| text.trim().is_empty()) {
        return;
    }
    let id = first.id;
    if doc.convert_kind(id, BlockKind::Heading(1)).is_ok() {
        debug!("event=title_enforce module=editor status=ok block_id={id}");
    }
}

#[cfg(test)]
mod tests {
    use super::enforce;
    use crate::model::block::{Block, BlockKind};
    use crate::model::document::Document;

    #[test]
    fn non_empty_paragraph_becomes_heading() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("Trip notes")]);
        enforce(&mut doc);
        assert_eq!(doc.first().kind(), BlockKind::Heading(1));
        assert_eq!(doc.first().text(), Some("Trip notes"));
    }

    #[test]
    fn blank_first_block_is_left_alone() {
        let mut doc = Document::from_blocks(vec![Block::paragraph("   ")]);
        enforce(&mut doc);
        assert_eq!(doc.first().kind(), BlockKind::Paragraph);
        assert_eq!(doc.version(), 0);
    }
}
