use pagenote_core::model::kinds::{entry_for, find_by_key, Placement, KIND_TABLE};
use pagenote_core::{Block, BlockContent, BlockKind, Document, DocumentError, ListStyle, TableData};

#[test]
fn new_document_has_one_empty_paragraph() {
    let doc = Document::new();
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.first().kind(), BlockKind::Paragraph);
    assert!(doc.is_structurally_empty());
}

#[test]
fn removing_the_last_block_keeps_a_paragraph() {
    let mut doc = Document::from_blocks(vec![Block::heading(1, "Only")]);
    let id = doc.first().id;

    let removed = doc.remove(id).unwrap();

    assert_eq!(removed.text(), Some("Only"));
    assert_eq!(doc.len(), 1);
    assert_ne!(doc.first().id, id);
    assert!(doc.is_retired(id));
}

#[test]
fn retired_ids_are_never_reused() {
    let mut doc = Document::from_blocks(vec![Block::paragraph("a"), Block::paragraph("b")]);
    let removed = doc.remove(doc.blocks()[1].id).unwrap();
    let anchor = doc.first().id;

    let err = doc.insert_after(anchor, removed.clone()).unwrap_err();

    assert_eq!(err, DocumentError::DuplicateId(removed.id));
}

#[test]
fn divider_only_document_is_not_empty() {
    let doc = Document::from_blocks(vec![Block::empty(BlockKind::Divider)]);
    assert!(!doc.is_structurally_empty());
}

#[test]
fn whitespace_text_counts_as_empty() {
    let doc = Document::from_blocks(vec![
        Block::heading(1, "   "),
        Block::paragraph("\n"),
        Block::empty(BlockKind::ListItem(ListStyle::Unordered)),
    ]);
    assert!(doc.is_structurally_empty());
}

#[test]
fn set_text_on_void_block_is_rejected() {
    let divider = Block::empty(BlockKind::Divider);
    let id = divider.id;
    let mut doc = Document::from_blocks(vec![divider]);

    assert_eq!(doc.set_text(id, "x"), Err(DocumentError::NotTextual(id)));
    assert_eq!(doc.version(), 0);
}

#[test]
fn conversion_between_text_kinds_keeps_text() {
    let block = Block::checklist("milk", true);
    let id = block.id;
    let mut doc = Document::from_blocks(vec![block]);

    doc.convert_kind(id, BlockKind::Quote).unwrap();
    doc.convert_kind(id, BlockKind::Code).unwrap();

    assert_eq!(
        doc.first().content,
        BlockContent::Code {
            language: String::new(),
            text: "milk".into()
        }
    );
    assert_eq!(doc.first().id, id);
}

#[test]
fn table_to_text_conversion_carries_cell_text() {
    let table = TableData::from_rows(vec![
        vec!["a".into(), String::new()],
        vec!["b".into(), "c".into()],
    ]);
    let content = BlockContent::Table(table).converted(BlockKind::Paragraph);
    assert_eq!(content.text(), Some("a b c"));
}

#[test]
fn ragged_rows_are_padded_to_a_rectangle() {
    let table = TableData::from_rows(vec![vec!["a".into()], vec!["b".into(), "c".into()]]);
    assert!(table.is_rectangular());
    assert_eq!((table.rows(), table.columns()), (2, 2));
    assert_eq!(table.cell(0, 1), Some(""));
}

#[test]
fn every_kind_has_exactly_one_table_entry() {
    for entry in KIND_TABLE {
        let matching = KIND_TABLE.iter().filter(|other| other.kind == entry.kind).count();
        assert_eq!(matching, 1, "duplicate entry for {}", entry.key);
        assert_eq!(entry_for(entry.kind).map(|found| found.key), Some(entry.key));
    }
    assert_eq!(find_by_key("TABLE").unwrap().placement, Placement::InsertAfter);
    assert_eq!(find_by_key("quote").unwrap().placement, Placement::ConvertCurrent);
}
