//! Per-kind dispatch table.
//!
//! Every insertable block kind has exactly one entry here. The slash menu,
//! insert commands and Markdown import resolve kinds through this table, so a
//! new kind is one entry plus its `BlockContent` variant.

use crate::model::block::{BlockKind, ListStyle};

/// How a slash-menu pick applies to the block under the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Rewrites the current block's kind, keeping its text.
    ConvertCurrent,
    /// Inserts a new block after the current one and moves the caret there.
    InsertAfter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindEntry {
    /// Stable lookup key, also matched by slash-menu filtering.
    pub key: &'static str,
    /// Human-readable menu title.
    pub title: &'static str,
    pub kind: BlockKind,
    pub placement: Placement,
}

pub const KIND_TABLE: &[KindEntry] = &[
    KindEntry {
        key: "paragraph",
        title: "Text",
        kind: BlockKind::Paragraph,
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "heading1",
        title: "Heading 1",
        kind: BlockKind::Heading(1),
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "heading2",
        title: "Heading 2",
        kind: BlockKind::Heading(2),
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "heading3",
        title: "Heading 3",
        kind: BlockKind::Heading(3),
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "bulleted-list",
        title: "Bulleted list",
        kind: BlockKind::ListItem(ListStyle::Unordered),
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "numbered-list",
        title: "Numbered list",
        kind: BlockKind::ListItem(ListStyle::Ordered),
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "checklist",
        title: "Checklist",
        kind: BlockKind::Checklist,
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "quote",
        title: "Quote",
        kind: BlockKind::Quote,
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "code",
        title: "Code block",
        kind: BlockKind::Code,
        placement: Placement::ConvertCurrent,
    },
    KindEntry {
        key: "divider",
        title: "Divider",
        kind: BlockKind::Divider,
        placement: Placement::InsertAfter,
    },
    KindEntry {
        key: "table",
        title: "Table",
        kind: BlockKind::Table,
        placement: Placement::InsertAfter,
    },
    KindEntry {
        key: "image",
        title: "Image",
        kind: BlockKind::Image,
        placement: Placement::InsertAfter,
    },
    KindEntry {
        key: "embed",
        title: "Embed",
        kind: BlockKind::Embed,
        placement: Placement::InsertAfter,
    },
];

/// Finds a table entry by its key (exact, case-insensitive).
pub fn find_by_key(key: &str) -> Option<&'static KindEntry> {
    let key = key.trim();
    KIND_TABLE
        .iter()
        .find(|entry| entry.key.eq_ignore_ascii_case(key))
}

/// Finds the table entry describing `kind`.
pub fn entry_for(kind: BlockKind) -> Option<&'static KindEntry> {
    KIND_TABLE.iter().find(|entry| entry.kind == kind)
}

/// Case-insensitive substring match against title or key.
pub fn matches_query(entry: &KindEntry, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    entry.title.to_lowercase().contains(&query) || entry.key.to_lowercase().contains(&query)
}

#[cfg(test)]
mod tests {
    use super::{entry_for, find_by_key, matches_query, Placement, KIND_TABLE};
    use crate::model::block::BlockKind;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<_> = KIND_TABLE.iter().map(|entry| entry.key).collect();
        assert_eq!(keys.len(), KIND_TABLE.len());
    }

    #[test]
    fn structural_kinds_insert_after() {
        for kind in [
            BlockKind::Divider,
            BlockKind::Table,
            BlockKind::Image,
            BlockKind::Embed,
        ] {
            let entry = entry_for(kind).expect("kind should be registered");
            assert_eq!(entry.placement, Placement::InsertAfter);
        }
    }

    #[test]
    fn query_matches_title_or_key_ignoring_case() {
        let entry = find_by_key("HEADING2").expect("heading2 entry");
        assert!(matches_query(entry, "head"));
        assert!(matches_query(entry, "ING 2"));
        assert!(matches_query(entry, "heading2"));
        assert!(!matches_query(entry, "table"));
    }
}
