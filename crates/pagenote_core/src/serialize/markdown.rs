//! GitHub-flavored Markdown export and line-oriented import.
//!
//! Export is used for the `content` column and CLI output. Import covers the
//! same constructs and is used for pages that were stored before structured
//! snapshots existed.

use crate::model::block::{Block, BlockContent, ListStyle};
use crate::model::document::Document;
use crate::model::table::TableData;
use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("valid heading regex"));
static CHECKLIST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+]\s+\[([ xX])\]\s?(.*)$").expect("valid checklist regex"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-*+]\s+(.*)$").expect("valid bullet regex"));
static ORDERED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]\s+(.*)$").expect("valid ordered regex"));
static IMAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^!\[([^\]]*)\]\(([^)\s]+)\)$").expect("valid image regex"));
static EMBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<(https?://[^>\s]+)>$").expect("valid embed regex"));
static DIVIDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("valid divider regex"));
static TABLE_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").expect("valid table separator regex")
});

pub fn to_markdown(doc: &Document) -> String {
    let mut out = String::new();
    let mut ordered_index = 0usize;
    let mut previous_was_list = false;

    for (index, block) in doc.blocks().iter().enumerate() {
        let is_list = matches!(
            block.content,
            BlockContent::ListItem { .. } | BlockContent::Checklist { .. }
        );
        if index > 0 {
            out.push_str(if is_list && previous_was_list { "\n" } else { "\n\n" });
        }
        match &block.content {
            BlockContent::ListItem {
                style: ListStyle::Ordered,
                ..
            } => ordered_index += 1,
            _ => ordered_index = 0,
        }
        out.push_str(&render_block(&block.content, ordered_index));
        previous_was_list = is_list;
    }
    out
}

fn render_block(content: &BlockContent, ordered_index: usize) -> String {
    match content {
        BlockContent::Paragraph { text } => text.clone(),
        BlockContent::Heading { level, text } => {
            format!("{} {text}", "#".repeat(usize::from(*level)))
        }
        BlockContent::Quote { text } => text
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        BlockContent::ListItem {
            style: ListStyle::Unordered,
            text,
        } => format!("- {text}"),
        BlockContent::ListItem {
            style: ListStyle::Ordered,
            text,
        } => format!("{ordered_index}. {text}"),
        BlockContent::Checklist { text, checked } => {
            format!("- [{}] {text}", if *checked { "x" } else { " " })
        }
        BlockContent::Code { language, text } => format!("```{language}\n{text}\n```"),
        BlockContent::Divider => "---".to_string(),
        BlockContent::Table(table) => render_table(table),
        BlockContent::Image { src, alt } => {
            format!("![{}]({src})", alt.as_deref().unwrap_or_default())
        }
        BlockContent::Embed { url } => format!("<{url}>"),
    }
}

fn render_table(table: &TableData) -> String {
    let row = |cells: &[String]| {
        let escaped: Vec<String> = cells.iter().map(|cell| cell.replace('|', "\\|")).collect();
        format!("| {} |", escaped.join(" | "))
    };
    let mut lines = Vec::with_capacity(table.rows() + 1);
    let mut rows = table.cells().iter();
    if let Some(header) = rows.next() {
        lines.push(row(header.as_slice()));
        lines.push(format!("|{}", " --- |".repeat(table.columns())));
    }
    lines.extend(rows.map(|cells| row(cells.as_slice())));
    lines.join("\n")
}

/// Imports Markdown line by line. Unrecognized lines become paragraphs;
/// consecutive plain lines join into one paragraph.
pub fn from_markdown(input: &str) -> Document {
    let lines: Vec<&str> = input.lines().collect();
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();

        let is_plain = !trimmed.is_empty()
            && !trimmed.starts_with("```")
            && !trimmed.starts_with('>')
            && !trimmed.starts_with('|')
            && !is_single_line_block(trimmed);
        if is_plain {
            paragraph.push(trimmed);
            index += 1;
            continue;
        }
        flush_paragraph(&mut paragraph, &mut blocks);

        if trimmed.is_empty() {
            index += 1;
        } else if let Some(language) = trimmed.strip_prefix("```") {
            let mut body = Vec::new();
            index += 1;
            while index < lines.len() && !lines[index].trim_start().starts_with("```") {
                body.push(lines[index]);
                index += 1;
            }
            // Skip the closing fence when present.
            index += 1;
            blocks.push(Block::new(BlockContent::Code {
                language: language.trim().to_string(),
                text: body.join("\n"),
            }));
        } else if trimmed.starts_with('>') {
            let mut quoted = Vec::new();
            while index < lines.len() {
                let Some(rest) = lines[index].trim().strip_prefix('>') else {
                    break;
                };
                quoted.push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
                index += 1;
            }
            blocks.push(Block::new(BlockContent::Quote {
                text: quoted.join("\n"),
            }));
        } else if trimmed.starts_with('|')
            && lines
                .get(index + 1)
                .is_some_and(|next| TABLE_SEPARATOR_RE.is_match(next.trim()))
        {
            let mut rows = vec![split_table_row(trimmed)];
            index += 2;
            while index < lines.len() && lines[index].trim().starts_with('|') {
                rows.push(split_table_row(lines[index].trim()));
                index += 1;
            }
            blocks.push(Block::new(BlockContent::Table(TableData::from_rows(rows))));
        } else if let Some(block) = parse_single_line(trimmed) {
            blocks.push(block);
            index += 1;
        } else {
            // A pipe line without a separator row is ordinary text.
            paragraph.push(trimmed);
            index += 1;
        }
    }
    flush_paragraph(&mut paragraph, &mut blocks);

    Document::from_blocks(blocks)
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if !lines.is_empty() {
        blocks.push(Block::paragraph(lines.join("\n")));
        lines.clear();
    }
}

fn is_single_line_block(line: &str) -> bool {
    DIVIDER_RE.is_match(line)
        || HEADING_RE.is_match(line)
        || CHECKLIST_RE.is_match(line)
        || BULLET_RE.is_match(line)
        || ORDERED_RE.is_match(line)
        || IMAGE_RE.is_match(line)
        || EMBED_RE.is_match(line)
}

fn parse_single_line(line: &str) -> Option<Block> {
    // Divider must win over the bullet pattern for `***`-style rules.
    if DIVIDER_RE.is_match(line) {
        return Some(Block::new(BlockContent::Divider));
    }
    if let Some(caps) = HEADING_RE.captures(line) {
        let level = caps[1].len().min(usize::from(u8::MAX)) as u8;
        return Some(Block::heading(level, caps[2].trim()));
    }
    if let Some(caps) = CHECKLIST_RE.captures(line) {
        let checked = caps[1].eq_ignore_ascii_case("x");
        return Some(Block::checklist(caps[2].trim(), checked));
    }
    if let Some(caps) = BULLET_RE.captures(line) {
        return Some(Block::new(BlockContent::ListItem {
            style: ListStyle::Unordered,
            text: caps[1].trim().to_string(),
        }));
    }
    if let Some(caps) = ORDERED_RE.captures(line) {
        return Some(Block::new(BlockContent::ListItem {
            style: ListStyle::Ordered,
            text: caps[1].trim().to_string(),
        }));
    }
    if let Some(caps) = IMAGE_RE.captures(line) {
        let alt = caps[1].trim();
        return Some(Block::new(BlockContent::Image {
            src: caps[2].to_string(),
            alt: (!alt.is_empty()).then(|| alt.to_string()),
        }));
    }
    EMBED_RE.captures(line).map(|caps| {
        Block::new(BlockContent::Embed {
            url: caps[1].to_string(),
        })
    })
}

/// Splits `| a | b\|c |` into cells, honoring `\|` escapes.
fn split_table_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut current).trim().to_string()),
            other => current.push(other),
        }
    }
    cells.push(current.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::{split_table_row, to_markdown};
    use crate::model::block::{Block, BlockContent, ListStyle};
    use crate::model::document::Document;

    #[test]
    fn split_table_row_honors_escaped_pipes() {
        assert_eq!(split_table_row(r"| a | b\|c |"), vec!["a", "b|c"]);
    }

    #[test]
    fn ordered_numbering_restarts_after_interruption() {
        let ordered = |text: &str| {
            Block::new(BlockContent::ListItem {
                style: ListStyle::Ordered,
                text: text.into(),
            })
        };
        let doc = Document::from_blocks(vec![
            ordered("a"),
            ordered("b"),
            Block::paragraph("break"),
            ordered("c"),
        ]);
        assert_eq!(to_markdown(&doc), "1. a\n2. b\n\nbreak\n\n1. c");
    }
}
