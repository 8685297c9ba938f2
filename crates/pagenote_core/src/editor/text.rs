//! Caret-driven text editing: typing, backspace, enter and range deletion.
//!
//! Offsets are char offsets; every string slice goes through `byte_index`.

use crate::editor::checklist;
use crate::editor::command::NoOpReason;
use crate::editor::context::EditorContext;
use crate::model::block::{Block, BlockContent, BlockId, BlockKind};
use crate::model::selection::Point;

type CommandResult = Result<(), NoOpReason>;

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(index, _)| index)
}

/// Splits at a char offset (clamped to the text length).
pub(crate) fn split_text(text: &str, offset: usize) -> (String, String) {
    let at = byte_index(text, offset);
    (text[..at].to_string(), text[at..].to_string())
}

pub(crate) fn insert_text(ctx: &mut EditorContext, value: &str) -> CommandResult {
    if value.is_empty() {
        return Err(NoOpReason::Unchanged);
    }
    if let Some((start, end)) = ctx.range()? {
        delete_range(ctx, start, end)?;
    }
    let caret = ctx.caret()?;
    let current = caret_text(ctx, caret.block)?;
    let offset = caret.offset.min(char_len(&current));

    let mut updated = current;
    updated.insert_str(byte_index(&updated, offset), value);
    ctx.document_mut().set_text(caret.block, updated)?;
    ctx.move_caret(caret.block, offset + char_len(value));
    Ok(())
}

pub(crate) fn set_text(ctx: &mut EditorContext, block: BlockId, value: String) -> CommandResult {
    ctx.document_mut().set_text(block, value)?;
    Ok(())
}

pub(crate) fn delete_backward(ctx: &mut EditorContext) -> CommandResult {
    if let Some((start, end)) = ctx.range()? {
        return delete_range(ctx, start, end);
    }
    let caret = ctx.caret()?;
    let block = ctx
        .document()
        .get(caret.block)
        .ok_or(NoOpReason::InvalidTarget)?
        .clone();

    let Some(current) = block.text() else {
        // Caret sits on a block without inline text.
        if block.kind().is_void() {
            return remove_and_step_back(ctx, block.id);
        }
        return Err(NoOpReason::Unchanged);
    };

    if caret.offset > 0 {
        let offset = caret.offset.min(char_len(current));
        let start = byte_index(current, offset - 1);
        let end = byte_index(current, offset);
        let mut updated = current.to_string();
        updated.replace_range(start..end, "");
        ctx.document_mut().set_text(block.id, updated)?;
        ctx.move_caret(block.id, offset - 1);
        return Ok(());
    }

    backspace_at_start(ctx, &block)
}

fn backspace_at_start(ctx: &mut EditorContext, block: &Block) -> CommandResult {
    let is_first = ctx.document().first().id == block.id;
    match block.kind() {
        BlockKind::Checklist => checklist::backspace_at_start(ctx, block.id),
        BlockKind::ListItem(_) | BlockKind::Quote => {
            ctx.document_mut()
                .convert_kind(block.id, BlockKind::Paragraph)?;
            Ok(())
        }
        BlockKind::Heading(_) if !is_first => {
            ctx.document_mut()
                .convert_kind(block.id, BlockKind::Paragraph)?;
            Ok(())
        }
        _ => merge_into_previous(ctx, block),
    }
}

/// Joins `block` onto the end of its previous textual sibling.
fn merge_into_previous(ctx: &mut EditorContext, block: &Block) -> CommandResult {
    let previous = ctx
        .document()
        .previous(block.id)
        .ok_or(NoOpReason::Unchanged)?
        .clone();
    let current_text = block.text().unwrap_or_default();

    match previous.text() {
        Some(previous_text) => {
            let join_at = char_len(previous_text);
            let joined = format!("{previous_text}{current_text}");
            ctx.document_mut().set_text(previous.id, joined)?;
            ctx.document_mut().remove(block.id)?;
            ctx.move_caret(previous.id, join_at);
            Ok(())
        }
        None if previous.kind().is_void() => {
            ctx.document_mut().remove(previous.id)?;
            ctx.move_caret(block.id, 0);
            Ok(())
        }
        None => Err(NoOpReason::Unchanged),
    }
}

fn remove_and_step_back(ctx: &mut EditorContext, id: BlockId) -> CommandResult {
    let target = neighbour_caret(ctx, id);
    ctx.document_mut().remove(id)?;
    match target {
        Some(point) => ctx.move_caret(point.block, point.offset),
        None => {
            let first = ctx.document().first().id;
            ctx.move_caret(first, 0);
        }
    }
    Ok(())
}

/// Caret target after removing `id`: end of the previous block, else start
/// of the next one.
pub(crate) fn neighbour_caret(ctx: &EditorContext, id: BlockId) -> Option<Point> {
    let doc = ctx.document();
    if let Some(previous) = doc.previous(id) {
        return Some(Point::new(previous.id, previous.content.text_len()));
    }
    doc.next(id).map(|next| Point::new(next.id, 0))
}

pub(crate) fn split_block(ctx: &mut EditorContext) -> CommandResult {
    if let Some((start, end)) = ctx.range()? {
        delete_range(ctx, start, end)?;
    }
    let caret = ctx.caret()?;
    let block = ctx
        .document()
        .get(caret.block)
        .ok_or(NoOpReason::InvalidTarget)?
        .clone();

    match &block.content {
        BlockContent::Checklist { .. } => checklist::enter(ctx, caret),
        BlockContent::Code { .. } => insert_text(ctx, "\n"),
        BlockContent::ListItem { text, .. } if text.is_empty() => {
            ctx.document_mut()
                .convert_kind(block.id, BlockKind::Paragraph)?;
            Ok(())
        }
        content => match content.text() {
            Some(current) => {
                let (head, tail) = split_text(current, caret.offset);
                let next_kind = match content.kind() {
                    BlockKind::ListItem(style) => BlockKind::ListItem(style),
                    _ => BlockKind::Paragraph,
                };
                let mut next = Block::empty(next_kind);
                if let Some(slot) = next.content.text_mut() {
                    *slot = tail;
                }
                let next_id = next.id;
                ctx.document_mut().set_text(block.id, head)?;
                ctx.document_mut().insert_after(block.id, next)?;
                ctx.move_caret(next_id, 0);
                Ok(())
            }
            None => {
                let paragraph = Block::paragraph("");
                let paragraph_id = paragraph.id;
                ctx.document_mut().insert_after(block.id, paragraph)?;
                ctx.move_caret(paragraph_id, 0);
                Ok(())
            }
        },
    }
}

/// Deletes the content between two ordered points.
///
/// Blocks strictly between the endpoints are removed. Textual endpoints
/// keep their outer halves, which are joined into the start block; a
/// non-textual endpoint is covered by the range and removed.
pub(crate) fn delete_range(ctx: &mut EditorContext, start: Point, end: Point) -> CommandResult {
    let doc = ctx.document();
    let start_ix = doc.position(start.block).ok_or(NoOpReason::InvalidTarget)?;
    let end_ix = doc.position(end.block).ok_or(NoOpReason::InvalidTarget)?;
    let start_block = doc.blocks()[start_ix].clone();
    let end_block = doc.blocks()[end_ix].clone();

    if start_ix == end_ix {
        let Some(current) = start_block.text() else {
            return Err(NoOpReason::Unchanged);
        };
        let from = byte_index(current, start.offset);
        let to = byte_index(current, end.offset.max(start.offset));
        if from == to {
            return Err(NoOpReason::Unchanged);
        }
        let mut updated = current.to_string();
        updated.replace_range(from..to, "");
        ctx.document_mut().set_text(start_block.id, updated)?;
        ctx.move_caret(start_block.id, start.offset);
        return Ok(());
    }

    let between: Vec<BlockId> = doc.blocks()[start_ix + 1..end_ix]
        .iter()
        .map(|block| block.id)
        .collect();
    for id in between {
        ctx.document_mut().remove(id)?;
    }

    match (start_block.text(), end_block.text()) {
        (Some(head_source), Some(tail_source)) => {
            let (head, _) = split_text(head_source, start.offset);
            let (_, tail) = split_text(tail_source, end.offset);
            ctx.document_mut()
                .set_text(start_block.id, format!("{head}{tail}"))?;
            ctx.document_mut().remove(end_block.id)?;
            ctx.move_caret(start_block.id, start.offset);
        }
        (Some(head_source), None) => {
            let (head, _) = split_text(head_source, start.offset);
            ctx.document_mut().set_text(start_block.id, head)?;
            ctx.document_mut().remove(end_block.id)?;
            ctx.move_caret(start_block.id, start.offset);
        }
        (None, Some(tail_source)) => {
            let (_, tail) = split_text(tail_source, end.offset);
            ctx.document_mut().set_text(end_block.id, tail)?;
            ctx.document_mut().remove(start_block.id)?;
            ctx.move_caret(end_block.id, 0);
        }
        (None, None) => {
            ctx.document_mut()
                .replace(end_block.id, Block::paragraph(""))?;
            ctx.document_mut().remove(start_block.id)?;
            ctx.move_caret(end_block.id, 0);
        }
    }
    Ok(())
}

fn caret_text(ctx: &EditorContext, id: BlockId) -> Result<String, NoOpReason> {
    let block = ctx.document().get(id).ok_or(NoOpReason::InvalidTarget)?;
    block
        .text()
        .map(str::to_owned)
        .ok_or(NoOpReason::KindMismatch)
}

#[cfg(test)]
mod tests {
    use super::{byte_index, split_text};

    #[test]
    fn byte_index_handles_multibyte_chars() {
        let text = "héllo";
        assert_eq!(byte_index(text, 2), 3);
        assert_eq!(byte_index(text, 99), text.len());
    }

    #[test]
    fn split_text_clamps_offset() {
        assert_eq!(
            split_text("ab", 5),
            ("ab".to_string(), String::new())
        );
        assert_eq!(
            split_text("añb", 2),
            ("añ".to_string(), "b".to_string())
        );
    }
}
