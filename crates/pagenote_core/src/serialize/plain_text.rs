//! Plain-text projection used for search indexing and previews.

use crate::model::block::BlockContent;
use crate::model::document::Document;

/// Renders one line group per block, joined by `\n`.
///
/// Table rows contribute their cells joined by spaces, one line per row.
/// Dividers, images and embeds contribute an empty line.
pub fn to_plain_text(doc: &Document) -> String {
    doc.blocks()
        .iter()
        .map(|block| match &block.content {
            BlockContent::Table(table) => table.row_lines().join("\n"),
            content => content.text().unwrap_or_default().to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::to_plain_text;
    use crate::model::block::{Block, BlockContent};
    use crate::model::document::Document;
    use crate::model::table::TableData;

    #[test]
    fn tables_render_one_line_per_row() {
        let table = TableData::from_rows(vec![
            vec!["a".into(), "b".into()],
            vec!["c".into(), "d".into()],
        ]);
        let doc = Document::from_blocks(vec![
            Block::heading(1, "Title"),
            Block::new(BlockContent::Divider),
            Block::new(BlockContent::Table(table)),
        ]);
        assert_eq!(to_plain_text(&doc), "Title\n\na b\nc d");
    }
}
