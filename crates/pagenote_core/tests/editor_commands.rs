use pagenote_core::{
    Block, BlockContent, BlockKind, Command, CommandOutcome, Document, EditorConfig,
    EditorContext, NoOpReason, Rect, Selection, SlashCommand, TableCommand,
};
use std::cell::Cell;
use std::rc::Rc;
use uuid::Uuid;

fn editor_with(blocks: Vec<Block>) -> EditorContext {
    EditorContext::new(Document::from_blocks(blocks), EditorConfig::default())
}

fn slash(command: SlashCommand) -> Command {
    Command::Slash(command)
}

fn open_menu() -> Command {
    slash(SlashCommand::Open {
        caret: None,
        viewport: Rect::new(0.0, 0.0, 800.0, 600.0),
    })
}

fn text_of(editor: &EditorContext, index: usize) -> Option<&str> {
    editor.document().blocks()[index].text()
}

#[test]
fn slash_commit_converts_block_and_removes_trigger() {
    let title = Block::heading(1, "Title");
    let body = Block::paragraph("todo/");
    let body_id = body.id;
    let mut editor = editor_with(vec![title, body]);
    editor.set_selection(Selection::caret(body_id, 5));

    assert_eq!(
        editor.dispatch(open_menu()),
        CommandOutcome::Applied {
            document_changed: false
        }
    );
    editor.dispatch(slash(SlashCommand::Filter("check".into())));
    assert_eq!(editor.slash_menu().unwrap().items().len(), 1);

    let outcome = editor.dispatch(slash(SlashCommand::Commit));

    assert!(outcome.document_changed());
    assert!(editor.slash_menu().is_none());
    let block = editor.document().get(body_id).unwrap();
    assert_eq!(block.kind(), BlockKind::Checklist);
    assert_eq!(block.text(), Some("todo"));
    assert_eq!(editor.selection(), Some(Selection::caret(body_id, 4)));
}

#[test]
fn slash_commit_of_void_kind_inserts_after_caret_block() {
    let body = Block::paragraph("abc/");
    let body_id = body.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), body]);
    editor.set_selection(Selection::caret(body_id, 4));

    editor.dispatch(open_menu());
    editor.dispatch(slash(SlashCommand::Filter("divider".into())));
    assert!(editor.dispatch(slash(SlashCommand::Commit)).is_applied());

    let blocks = editor.document().blocks();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[1].text(), Some("abc"));
    assert_eq!(blocks[2].kind(), BlockKind::Divider);
    assert_eq!(editor.selection().unwrap().focus.block, blocks[2].id);
}

#[test]
fn slash_commit_to_current_kind_still_removes_trigger() {
    let body = Block::paragraph("x/");
    let body_id = body.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), body]);
    editor.set_selection(Selection::caret(body_id, 2));

    editor.dispatch(open_menu());
    editor.dispatch(slash(SlashCommand::Filter("text".into())));
    let outcome = editor.dispatch(slash(SlashCommand::Commit));

    assert!(outcome.document_changed());
    assert_eq!(text_of(&editor, 1), Some("x"));
    assert_eq!(editor.document().blocks()[1].kind(), BlockKind::Paragraph);
}

#[test]
fn slash_pick_out_of_range_is_invalid_target_and_closes_menu() {
    let body = Block::paragraph("/");
    let body_id = body.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), body]);
    editor.set_selection(Selection::caret(body_id, 1));
    editor.dispatch(open_menu());
    let version = editor.document().version();

    let outcome = editor.dispatch(slash(SlashCommand::Pick(99)));

    assert_eq!(outcome, CommandOutcome::NoOp(NoOpReason::InvalidTarget));
    assert!(editor.slash_menu().is_none());
    assert_eq!(editor.document().version(), version);
}

#[test]
fn slash_navigation_without_open_menu_is_unchanged() {
    let mut editor = editor_with(vec![Block::heading(1, "Title")]);
    assert_eq!(
        editor.dispatch(slash(SlashCommand::MoveDown)),
        CommandOutcome::NoOp(NoOpReason::Unchanged)
    );
    assert_eq!(
        editor.dispatch(slash(SlashCommand::Close)),
        CommandOutcome::NoOp(NoOpReason::Unchanged)
    );
}

#[test]
fn checklist_split_then_backspace_restores_text_with_one_space() {
    let item = Block::checklist("buy milk", false);
    let item_id = item.id;
    let mut editor = editor_with(vec![Block::heading(1, "Groceries"), item]);
    editor.set_selection(Selection::caret(item_id, 4));

    assert!(editor.dispatch(Command::SplitBlock).document_changed());
    assert_eq!(text_of(&editor, 1), Some("buy "));
    assert_eq!(text_of(&editor, 2), Some("milk"));
    assert_eq!(editor.document().blocks()[2].kind(), BlockKind::Checklist);
    let new_id = editor.document().blocks()[2].id;
    assert_eq!(editor.selection(), Some(Selection::caret(new_id, 0)));

    assert!(editor.dispatch(Command::DeleteBackward).document_changed());
    assert_eq!(editor.document().len(), 2);
    assert_eq!(text_of(&editor, 1), Some("buy  milk"));
    assert_eq!(editor.selection(), Some(Selection::caret(item_id, 5)));
}

#[test]
fn enter_on_empty_checklist_leaves_the_list() {
    let item = Block::checklist("", false);
    let item_id = item.id;
    let mut editor = editor_with(vec![Block::heading(1, "List"), item]);
    editor.set_selection(Selection::caret(item_id, 0));

    editor.dispatch(Command::SplitBlock);

    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.document().blocks()[1].kind(), BlockKind::Paragraph);
}

#[test]
fn toggle_checked_only_applies_to_checklists() {
    let item = Block::checklist("ship", false);
    let item_id = item.id;
    let mut editor = editor_with(vec![Block::heading(1, "Plan"), item]);

    editor.set_selection(Selection::caret(item_id, 0));
    assert!(editor.dispatch(Command::ToggleChecked).document_changed());
    assert!(matches!(
        editor.document().blocks()[1].content,
        BlockContent::Checklist { checked: true, .. }
    ));

    let heading_id = editor.document().first().id;
    editor.set_selection(Selection::caret(heading_id, 0));
    assert_eq!(
        editor.dispatch(Command::ToggleChecked),
        CommandOutcome::NoOp(NoOpReason::KindMismatch)
    );
}

#[test]
fn typing_into_first_block_makes_it_a_title() {
    let mut editor = EditorContext::new(Document::new(), EditorConfig::default());

    editor.dispatch(Command::InsertText("Hello".into()));

    assert_eq!(editor.document().first().kind(), BlockKind::Heading(1));
    assert_eq!(editor.document().first().text(), Some("Hello"));
}

#[test]
fn explicit_convert_of_title_is_respected_until_text_changes() {
    let mut editor = EditorContext::new(Document::new(), EditorConfig::default());
    editor.dispatch(Command::InsertText("Hello".into()));

    editor.dispatch(Command::ConvertKind(BlockKind::Paragraph));
    assert_eq!(editor.document().first().kind(), BlockKind::Paragraph);

    editor.dispatch(Command::InsertText("!".into()));
    assert_eq!(editor.document().first().kind(), BlockKind::Heading(1));
    assert_eq!(editor.document().first().text(), Some("Hello!"));
}

#[test]
fn title_policy_can_be_disabled() {
    let config = EditorConfig {
        enforce_title: false,
        ..EditorConfig::default()
    };
    let mut editor = EditorContext::new(Document::new(), config);
    editor.dispatch(Command::InsertText("Hello".into()));
    assert_eq!(editor.document().first().kind(), BlockKind::Paragraph);
}

#[test]
fn table_commands_respect_the_one_by_one_floor() {
    let body = Block::paragraph("");
    let body_id = body.id;
    let mut editor = editor_with(vec![Block::heading(1, "Data"), body]);
    editor.set_selection(Selection::caret(body_id, 0));

    assert!(editor
        .dispatch(Command::InsertBlockAfter(BlockKind::Table))
        .document_changed());
    let table_block = &editor.document().blocks()[2];
    let table = table_block.content.table().unwrap();
    assert_eq!((table.rows(), table.columns()), (3, 3));
    assert_eq!(editor.selection().unwrap().focus.block, table_block.id);

    let set_cell = Command::Table(TableCommand::SetCell {
        row: 0,
        col: 0,
        text: "a".into(),
    });
    assert!(editor.dispatch(set_cell).document_changed());

    editor.dispatch(Command::Table(TableCommand::RemoveRow(None)));
    editor.dispatch(Command::Table(TableCommand::RemoveRow(None)));
    assert_eq!(
        editor.dispatch(Command::Table(TableCommand::RemoveRow(None))),
        CommandOutcome::NoOp(NoOpReason::StructuralFloor)
    );

    let out_of_range = Command::Table(TableCommand::SetCell {
        row: 5,
        col: 0,
        text: "x".into(),
    });
    assert_eq!(
        editor.dispatch(out_of_range),
        CommandOutcome::NoOp(NoOpReason::InvalidTarget)
    );

    let table = editor.document().blocks()[2].content.table().unwrap();
    assert_eq!((table.rows(), table.columns()), (1, 3));
    assert_eq!(table.cell(0, 0), Some("a"));
    assert!(table.is_rectangular());
}

#[test]
fn table_command_on_text_block_is_kind_mismatch() {
    let mut editor = editor_with(vec![Block::heading(1, "Title")]);
    assert_eq!(
        editor.dispatch(Command::Table(TableCommand::AddRow)),
        CommandOutcome::NoOp(NoOpReason::KindMismatch)
    );
}

#[test]
fn converting_to_table_discards_text() {
    let body = Block::paragraph("abc");
    let body_id = body.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), body]);
    editor.set_selection(Selection::caret(body_id, 3));

    editor.dispatch(Command::ConvertKind(BlockKind::Table));

    let block = editor.document().get(body_id).unwrap();
    let table = block.content.table().unwrap();
    assert!(!table.has_text());
    assert_eq!(table.rows(), 3);
}

#[test]
fn stale_selection_is_reported_not_applied() {
    let mut editor = editor_with(vec![Block::heading(1, "Title")]);
    editor.set_selection(Selection::caret(Uuid::new_v4(), 0));

    let outcome = editor.dispatch(Command::InsertText("x".into()));

    assert_eq!(outcome, CommandOutcome::NoOp(NoOpReason::InvalidTarget));
    assert_eq!(editor.document().version(), 0);
}

#[test]
fn removing_the_last_blank_block_hits_the_floor() {
    let mut editor = EditorContext::new(Document::new(), EditorConfig::default());
    assert_eq!(
        editor.dispatch(Command::RemoveBlock),
        CommandOutcome::NoOp(NoOpReason::StructuralFloor)
    );
    assert_eq!(editor.document().len(), 1);
}

#[test]
fn backspace_after_divider_removes_the_divider() {
    let body = Block::paragraph("p");
    let body_id = body.id;
    let mut editor = editor_with(vec![
        Block::heading(1, "Title"),
        Block::empty(BlockKind::Divider),
        body,
    ]);
    editor.set_selection(Selection::caret(body_id, 0));

    editor.dispatch(Command::DeleteBackward);

    assert_eq!(editor.document().len(), 2);
    assert_eq!(editor.document().blocks()[1].id, body_id);
}

#[test]
fn backspace_merges_paragraph_into_previous_text() {
    let first = Block::paragraph("ab");
    let first_id = first.id;
    let second = Block::paragraph("cd");
    let second_id = second.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), first, second]);
    editor.set_selection(Selection::caret(second_id, 0));

    editor.dispatch(Command::DeleteBackward);

    assert_eq!(text_of(&editor, 1), Some("abcd"));
    assert!(editor.document().is_retired(second_id));
    assert_eq!(editor.selection(), Some(Selection::caret(first_id, 2)));
}

#[test]
fn enter_in_list_item_continues_the_list() {
    let item = Block::empty(BlockKind::ListItem(pagenote_core::ListStyle::Ordered));
    let item_id = item.id;
    let mut editor = editor_with(vec![Block::heading(1, "Steps"), item]);
    editor.set_selection(Selection::caret(item_id, 0));
    editor.dispatch(Command::InsertText("one".into()));

    editor.dispatch(Command::SplitBlock);

    assert_eq!(editor.document().len(), 3);
    assert_eq!(
        editor.document().blocks()[2].kind(),
        BlockKind::ListItem(pagenote_core::ListStyle::Ordered)
    );
}

#[test]
fn listeners_fire_only_when_the_document_changes() {
    let calls = Rc::new(Cell::new(0));
    let seen = Rc::clone(&calls);
    let mut editor = editor_with(vec![Block::heading(1, "Title")]);
    editor.subscribe(move |_| seen.set(seen.get() + 1));

    editor.dispatch(Command::InsertText(" one".into()));
    editor.dispatch(Command::Slash(SlashCommand::Close));

    assert_eq!(calls.get(), 1);
}

#[test]
fn range_selection_deletes_across_blocks() {
    let first = Block::paragraph("hello");
    let first_id = first.id;
    let second = Block::paragraph("world");
    let second_id = second.id;
    let mut editor = editor_with(vec![Block::heading(1, "Title"), first, second]);
    editor.set_selection(Selection {
        anchor: pagenote_core::Point::new(first_id, 2),
        focus: pagenote_core::Point::new(second_id, 3),
    });

    editor.dispatch(Command::DeleteBackward);

    assert_eq!(editor.document().len(), 2);
    assert_eq!(text_of(&editor, 1), Some("held"));
    assert_eq!(editor.selection(), Some(Selection::caret(first_id, 2)));
}

#[test]
fn media_attributes_apply_to_matching_kinds_only() {
    let code = Block::empty(BlockKind::Code);
    let code_id = code.id;
    let image = Block::empty(BlockKind::Image);
    let image_id = image.id;
    let embed = Block::empty(BlockKind::Embed);
    let embed_id = embed.id;
    let mut editor = editor_with(vec![Block::heading(1, "Media"), code, image, embed]);

    editor.set_selection(Selection::caret(code_id, 0));
    editor.dispatch(Command::SetCodeLanguage(" rust ".into()));
    assert_eq!(
        editor.dispatch(Command::SetEmbedUrl("https://x".into())),
        CommandOutcome::NoOp(NoOpReason::KindMismatch)
    );

    editor.set_selection(Selection::caret(image_id, 0));
    editor.dispatch(Command::SetImage {
        src: "https://img.example/a.png".into(),
        alt: Some(String::new()),
    });

    editor.set_selection(Selection::caret(embed_id, 0));
    editor.dispatch(Command::SetEmbedUrl(" https://video.example/v ".into()));

    let doc = editor.document();
    assert!(matches!(
        &doc.get(code_id).unwrap().content,
        BlockContent::Code { language, .. } if language == "rust"
    ));
    assert_eq!(
        doc.get(image_id).unwrap().content,
        BlockContent::Image {
            src: "https://img.example/a.png".into(),
            alt: None
        }
    );
    assert_eq!(
        doc.get(embed_id).unwrap().content,
        BlockContent::Embed {
            url: "https://video.example/v".into()
        }
    );
}
