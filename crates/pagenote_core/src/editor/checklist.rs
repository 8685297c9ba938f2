//! Checklist-specific Enter, Backspace and toggle behavior.

use crate::editor::command::NoOpReason;
use crate::editor::context::EditorContext;
use crate::editor::text::{char_len, split_text};
use crate::model::block::{Block, BlockContent, BlockId, BlockKind};
use crate::model::selection::Point;

/// Enter inside a checklist item.
///
/// An empty item leaves the list by turning into a paragraph; otherwise the
/// text after the caret moves into a new unchecked item.
pub(crate) fn enter(ctx: &mut EditorContext, caret: Point) -> Result<(), NoOpReason> {
    let block = ctx
        .document()
        .get(caret.block)
        .ok_or(NoOpReason::InvalidTarget)?;
    let text = block.text().ok_or(NoOpReason::KindMismatch)?.to_string();

    if text.is_empty() {
        ctx.document_mut()
            .convert_kind(caret.block, BlockKind::Paragraph)?;
        return Ok(());
    }

    let (head, tail) = split_text(&text, caret.offset);
    let next = Block::checklist(tail, false);
    let next_id = next.id;
    ctx.document_mut().set_text(caret.block, head)?;
    ctx.document_mut().insert_after(caret.block, next)?;
    ctx.move_caret(next_id, 0);
    Ok(())
}

/// Backspace at offset 0 of a checklist item.
pub(crate) fn backspace_at_start(ctx: &mut EditorContext, id: BlockId) -> Result<(), NoOpReason> {
    let previous = ctx
        .document()
        .previous(id)
        .filter(|block| block.kind() == BlockKind::Checklist)
        .map(|block| (block.id, block.text().unwrap_or_default().to_string()));

    let Some((previous_id, previous_text)) = previous else {
        ctx.document_mut().convert_kind(id, BlockKind::Paragraph)?;
        return Ok(());
    };

    let current = ctx
        .document()
        .get(id)
        .and_then(Block::text)
        .unwrap_or_default()
        .to_string();
    let join_at = char_len(&previous_text) + 1;
    ctx.document_mut()
        .set_text(previous_id, format!("{previous_text} {current}"))?;
    ctx.document_mut().remove(id)?;
    ctx.move_caret(previous_id, join_at);
    Ok(())
}

pub(crate) fn toggle_checked(ctx: &mut EditorContext) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    ctx.document_mut().update(caret.block, |content| match content {
        BlockContent::Checklist { checked, .. } => {
            *checked = !*checked;
            Ok(())
        }
        _ => Err(NoOpReason::KindMismatch),
    })?
}
