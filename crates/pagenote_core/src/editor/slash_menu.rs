//! Slash command menu state and placement.
//!
//! # Responsibility
//! - Filter the kind table by the typed query and track the highlighted row.
//! - Place the floating menu relative to the caret rectangle.
//! - Apply a picked entry to the caret block.
//!
//! # Invariants
//! - The menu is bound to the block that was under the caret when it opened;
//!   committing from any other block is rejected as a stale target.
//! - `highlighted` always indexes the filtered list (or is 0 when it is empty).
//! - The placed rectangle lies inside the viewport whenever the viewport is
//!   large enough to hold it.

use crate::config::EditorConfig;
use crate::editor::command::{NoOpReason, SlashCommand};
use crate::editor::context::EditorContext;
use crate::editor::structure;
use crate::model::block::BlockId;
use crate::model::kinds::{matches_query, KindEntry, Placement, KIND_TABLE};
use crate::model::selection::Rect;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SlashMenu {
    anchor_block: BlockId,
    query: String,
    highlighted: usize,
    position: Rect,
}

impl SlashMenu {
    pub fn anchor_block(&self) -> BlockId {
        self.anchor_block
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Menu rectangle in host surface coordinates.
    pub fn position(&self) -> Rect {
        self.position
    }

    /// Entries matching the current query, in table order.
    pub fn items(&self) -> Vec<&'static KindEntry> {
        KIND_TABLE
            .iter()
            .filter(|entry| matches_query(entry, &self.query))
            .collect()
    }

    pub fn highlighted_item(&self) -> Option<&'static KindEntry> {
        self.items().get(self.highlighted).copied()
    }

    fn step(&mut self, forward: bool) {
        let len = self.items().len();
        if len == 0 {
            self.highlighted = 0;
            return;
        }
        self.highlighted = if forward {
            (self.highlighted + 1) % len
        } else {
            (self.highlighted + len - 1) % len
        };
    }
}

/// Places the menu below the caret, flipping above it when the menu would
/// overflow the viewport bottom, then clamps it into the viewport.
pub fn place_menu(caret: Option<Rect>, viewport: Rect, config: &EditorConfig) -> Rect {
    let width = config.slash_menu_width;
    let height = config.slash_menu_height;
    let gap = config.slash_menu_gap;
    let anchor = caret.unwrap_or(Rect::new(viewport.x, viewport.y, 0.0, 0.0));

    let mut y = anchor.bottom() + gap;
    if y + height > viewport.bottom() {
        y = anchor.y - gap - height;
    }
    let x = clamp_axis(anchor.x, width, viewport.x, viewport.right());
    let y = clamp_axis(y, height, viewport.y, viewport.bottom());
    Rect::new(x, y, width, height)
}

fn clamp_axis(start: f32, extent: f32, min: f32, max: f32) -> f32 {
    start.min(max - extent).max(min)
}

pub(crate) fn apply(ctx: &mut EditorContext, command: SlashCommand) -> Result<(), NoOpReason> {
    match command {
        SlashCommand::Open { caret, viewport } => {
            let point = ctx.caret()?;
            let position = place_menu(caret, viewport, ctx.config());
            *ctx.slash_menu_mut() = Some(SlashMenu {
                anchor_block: point.block,
                query: String::new(),
                highlighted: 0,
                position,
            });
            Ok(())
        }
        SlashCommand::Filter(query) => {
            let menu = open_menu(ctx)?;
            menu.query = query;
            menu.highlighted = 0;
            Ok(())
        }
        SlashCommand::MoveUp => {
            open_menu(ctx)?.step(false);
            Ok(())
        }
        SlashCommand::MoveDown => {
            open_menu(ctx)?.step(true);
            Ok(())
        }
        SlashCommand::Commit => {
            let index = open_menu(ctx)?.highlighted;
            commit(ctx, index)
        }
        SlashCommand::Pick(index) => commit(ctx, index),
        SlashCommand::Close => {
            ctx.slash_menu_mut()
                .take()
                .map(|_| ())
                .ok_or(NoOpReason::Unchanged)
        }
    }
}

fn open_menu(ctx: &mut EditorContext) -> Result<&mut SlashMenu, NoOpReason> {
    ctx.slash_menu_mut().as_mut().ok_or(NoOpReason::Unchanged)
}

/// Applies the filtered entry at `index` and closes the menu.
fn commit(ctx: &mut EditorContext, index: usize) -> Result<(), NoOpReason> {
    let menu = ctx.slash_menu_mut().take().ok_or(NoOpReason::Unchanged)?;
    let items = menu.items();
    if items.is_empty() {
        return Err(NoOpReason::Unchanged);
    }
    let entry = *items.get(index).ok_or(NoOpReason::InvalidTarget)?;

    let caret = ctx.caret()?;
    if caret.block != menu.anchor_block {
        return Err(NoOpReason::InvalidTarget);
    }

    strip_trigger(ctx)?;

    let current_textual = ctx
        .document()
        .get(caret.block)
        .is_some_and(|block| block.kind().is_textual());
    debug!(
        "event=slash_commit module=editor status=ok key={} placement={:?}",
        entry.key, entry.placement
    );
    match entry.placement {
        Placement::ConvertCurrent if current_textual => {
            match structure::convert_caret_block(ctx, entry.kind) {
                Err(NoOpReason::Unchanged) => Ok(()),
                other => other,
            }
        }
        Placement::ConvertCurrent | Placement::InsertAfter => {
            structure::insert_after_caret(ctx, entry.kind)
        }
    }
}

/// Removes a `/` immediately before the caret.
fn strip_trigger(ctx: &mut EditorContext) -> Result<(), NoOpReason> {
    let caret = ctx.caret()?;
    if caret.offset == 0 {
        return Ok(());
    }
    let Some(text) = ctx.document().get(caret.block).and_then(|block| block.text()) else {
        return Ok(());
    };
    let mut chars: Vec<char> = text.chars().collect();
    if chars.get(caret.offset - 1) != Some(&'/') {
        return Ok(());
    }
    chars.remove(caret.offset - 1);
    let stripped: String = chars.into_iter().collect();
    ctx.document_mut().set_text(caret.block, stripped)?;
    ctx.move_caret(caret.block, caret.offset - 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{place_menu, SlashMenu};
    use crate::config::EditorConfig;
    use crate::model::block::Block;
    use crate::model::selection::Rect;

    fn menu(query: &str) -> SlashMenu {
        SlashMenu {
            anchor_block: Block::paragraph("").id,
            query: query.to_string(),
            highlighted: 0,
            position: Rect::default(),
        }
    }

    #[test]
    fn menu_opens_below_caret_when_room() {
        let config = EditorConfig::default();
        let caret = Rect::new(10.0, 20.0, 1.0, 16.0);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let placed = place_menu(Some(caret), viewport, &config);
        assert_eq!(placed.x, 10.0);
        assert_eq!(placed.y, 40.0);
    }

    #[test]
    fn menu_flips_above_near_viewport_bottom() {
        let config = EditorConfig::default();
        let caret = Rect::new(10.0, 500.0, 1.0, 16.0);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let placed = place_menu(Some(caret), viewport, &config);
        assert_eq!(placed.y, 500.0 - 4.0 - 320.0);
        assert!(placed.bottom() <= viewport.bottom());
    }

    #[test]
    fn menu_is_clamped_to_right_edge() {
        let config = EditorConfig::default();
        let caret = Rect::new(790.0, 20.0, 1.0, 16.0);
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let placed = place_menu(Some(caret), viewport, &config);
        assert_eq!(placed.right(), 800.0);
    }

    #[test]
    fn highlight_wraps_in_both_directions() {
        let mut menu = menu("heading");
        assert_eq!(menu.items().len(), 3);
        menu.step(false);
        assert_eq!(menu.highlighted(), 2);
        menu.step(true);
        assert_eq!(menu.highlighted(), 0);
    }

    #[test]
    fn empty_filter_result_has_no_highlighted_item() {
        let menu = menu("zzz-no-such-kind");
        assert!(menu.items().is_empty());
        assert!(menu.highlighted_item().is_none());
    }
}
