//! Selection and caret state.
//!
//! # Responsibility
//! - Hold the last-known selection reported by the host text surface.
//! - Normalize it against the current document.
//! - Expose the caret bounding rectangle for floating UI placement.
//!
//! # Invariants
//! - A normalized selection only references blocks present in the document.
//! - Offsets count Unicode scalar values and never exceed the block's text
//!   length (non-textual blocks only admit offset 0).
//! - This module never mutates the document.

use crate::model::block::BlockId;
use crate::model::document::Document;

/// One caret position: block identity plus char offset inside its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub block: BlockId,
    pub offset: usize,
}

impl Point {
    pub fn new(block: BlockId, offset: usize) -> Self {
        Self { block, offset }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point,
            focus: point,
        }
    }

    pub fn caret(block: BlockId, offset: usize) -> Self {
        Self::collapsed(Point::new(block, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Returns `(start, end)` in document order.
    pub fn ordered(&self, doc: &Document) -> Option<(Point, Point)> {
        let anchor_ix = doc.position(self.anchor.block)?;
        let focus_ix = doc.position(self.focus.block)?;
        let anchor_first = (anchor_ix, self.anchor.offset) <= (focus_ix, self.focus.offset);
        if anchor_first {
            Some((self.anchor, self.focus))
        } else {
            Some((self.focus, self.anchor))
        }
    }
}

/// Axis-aligned rectangle in host surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

/// Host-provided caret geometry. Layout lives outside the core, so the
/// rendering surface answers where a point currently sits on screen.
pub trait CaretGeometry {
    fn caret_rect(&self, point: Point) -> Option<Rect>;
}

/// Last-known selection, normalized against the document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    current: Option<Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Selection> {
        self.current
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Records a host-reported selection and normalizes it.
    pub fn set(&mut self, selection: Selection, doc: &Document) {
        self.current = Some(selection);
        self.normalize(doc);
    }

    /// Drops a selection whose anchor vanished, collapses a dangling focus
    /// onto the anchor and clamps offsets to text lengths.
    pub fn normalize(&mut self, doc: &Document) {
        let Some(mut selection) = self.current else {
            return;
        };
        if !doc.contains(selection.anchor.block) {
            self.current = None;
            return;
        }
        if !doc.contains(selection.focus.block) {
            selection.focus = selection.anchor;
        }
        selection.anchor = clamp_point(selection.anchor, doc);
        selection.focus = clamp_point(selection.focus, doc);
        self.current = Some(selection);
    }

    /// Union of the anchor and focus caret rectangles.
    pub fn bounding_rect(&self, geometry: &dyn CaretGeometry) -> Option<Rect> {
        let selection = self.current?;
        let anchor = geometry.caret_rect(selection.anchor);
        let focus = geometry.caret_rect(selection.focus);
        match (anchor, focus) {
            (Some(a), Some(f)) => Some(a.union(&f)),
            (Some(rect), None) | (None, Some(rect)) => Some(rect),
            (None, None) => None,
        }
    }
}

fn clamp_point(point: Point, doc: &Document) -> Point {
    let max = doc
        .get(point.block)
        .map_or(0, |block| block.content.text_len());
    Point::new(point.block, point.offset.min(max))
}

#[cfg(test)]
mod tests {
    use super::{CaretGeometry, Point, Rect, Selection, SelectionState};
    use crate::model::block::Block;
    use crate::model::document::Document;

    struct FixedGeometry;

    impl CaretGeometry for FixedGeometry {
        fn caret_rect(&self, point: Point) -> Option<Rect> {
            Some(Rect::new(point.offset as f32 * 10.0, 20.0, 1.0, 16.0))
        }
    }

    #[test]
    fn normalize_clamps_offsets_and_drops_stale_anchor() {
        let mut doc = Document::new();
        let id = doc.first().id;
        doc.set_text(id, "abc").unwrap();

        let mut state = SelectionState::new();
        state.set(Selection::caret(id, 99), &doc);
        assert_eq!(state.get(), Some(Selection::caret(id, 3)));

        state.set(Selection::caret(Block::paragraph("").id, 0), &doc);
        assert_eq!(state.get(), None);
    }

    #[test]
    fn bounding_rect_unions_anchor_and_focus() {
        let mut doc = Document::new();
        let id = doc.first().id;
        doc.set_text(id, "abcdef").unwrap();
        let mut state = SelectionState::new();
        state.set(
            Selection {
                anchor: Point::new(id, 1),
                focus: Point::new(id, 4),
            },
            &doc,
        );
        let rect = state.bounding_rect(&FixedGeometry).unwrap();
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.right(), 41.0);
        assert_eq!(rect.height, 16.0);
    }
}
