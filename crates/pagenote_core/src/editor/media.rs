//! Attribute edits for code, image and embed blocks.

use crate::editor::command::NoOpReason;
use crate::editor::context::EditorContext;
use crate::model::block::BlockContent;

pub(crate) fn set_code_language(ctx: &mut EditorContext, value: String) -> Result<(), NoOpReason> {
    edit_caret_block(ctx, |content| match content {
        BlockContent::Code { language, .. } => {
            *language = value.trim().to_string();
            Ok(())
        }
        _ => Err(NoOpReason::KindMismatch),
    })
}

pub(crate) fn set_image(
    ctx: &mut EditorContext,
    value: String,
    caption: Option<String>,
) -> Result<(), NoOpReason> {
    edit_caret_block(ctx, |content| match content {
        BlockContent::Image { src, alt } => {
            *src = value;
            *alt = caption.filter(|text| !text.is_empty());
            Ok(())
        }
        _ => Err(NoOpReason::KindMismatch),
    })
}

pub(crate) fn set_embed_url(ctx: &mut EditorContext, value: String) -> Result<(), NoOpReason> {
    edit_caret_block(ctx, |content| match content {
        BlockContent::Embed { url } => {
            *url = value.trim().to_string();
            Ok(())
        }
        _ => Err(NoOpReason::KindMismatch),
    })
}

fn edit_caret_block(
    ctx: &mut EditorContext,
    edit: impl FnOnce(&mut BlockContent) -> Result<(), NoOpReason>,
) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    ctx.document_mut().update(caret.block, edit)?
}
