//! Whole-block commands: convert, insert after and remove.

use crate::editor::command::NoOpReason;
use crate::editor::context::EditorContext;
use crate::editor::text::neighbour_caret;
use crate::model::block::{Block, BlockContent, BlockKind};
use crate::model::selection::Point;
use crate::model::table::TableData;

/// Empty block of `kind`, with tables sized by the editor config.
pub(crate) fn new_block(ctx: &EditorContext, kind: BlockKind) -> Block {
    match kind {
        BlockKind::Table => {
            let config = ctx.config();
            Block::new(BlockContent::Table(TableData::new(
                config.table_rows,
                config.table_columns,
            )))
        }
        other => Block::empty(other),
    }
}

pub(crate) fn convert_caret_block(ctx: &mut EditorContext, kind: BlockKind) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    let current = ctx
        .document()
        .get(caret.block)
        .ok_or(NoOpReason::InvalidTarget)?;
    if current.kind() == kind {
        return Err(NoOpReason::Unchanged);
    }
    if kind == BlockKind::Table {
        let table = new_block(ctx, kind);
        ctx.document_mut().replace(caret.block, table)?;
    } else {
        ctx.document_mut().convert_kind(caret.block, kind)?;
    }
    Ok(())
}

/// Inserts an empty block after the caret block and moves the caret into it.
pub(crate) fn insert_after_caret(ctx: &mut EditorContext, kind: BlockKind) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    let block = new_block(ctx, kind);
    let id = block.id;
    ctx.document_mut().insert_after(caret.block, block)?;
    ctx.move_caret(id, 0);
    Ok(())
}

/// Removes the caret block. The last remaining blank paragraph is kept.
pub(crate) fn remove_caret_block(ctx: &mut EditorContext) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    let doc = ctx.document();
    let block = doc.get(caret.block).ok_or(NoOpReason::InvalidTarget)?;
    if doc.len() == 1 && block.kind() == BlockKind::Paragraph && block.content.is_blank() {
        return Err(NoOpReason::StructuralFloor);
    }

    let target = neighbour_caret(ctx, caret.block);
    ctx.document_mut().remove(caret.block)?;
    let target = target.unwrap_or_else(|| Point::new(ctx.document().first().id, 0));
    ctx.move_caret(target.block, target.offset);
    Ok(())
}
