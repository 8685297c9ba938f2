//! Structured snapshot codec.
//!
//! # Responsibility
//! - Encode a document as an ordered JSON array of `{id, kind, ...}` objects.
//! - Decode snapshots written by older or newer builds without failing.
//!
//! # Invariants
//! - Decoding a freshly encoded document yields an equal document.
//! - Decoding never produces duplicate ids, out-of-range heading levels or
//!   ragged tables.

use crate::model::block::{clamp_heading_level, Block, BlockContent, BlockId};
use crate::model::document::Document;
use crate::model::table::{TableData, MAX_DECLARED_DIMENSION};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

#[derive(Debug)]
pub enum SnapshotError {
    /// Input is not valid JSON.
    Json(serde_json::Error),
    /// Top-level JSON value is not an array.
    NotAnArray,
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid snapshot json: {err}"),
            Self::NotAnArray => write!(f, "snapshot must be a json array"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Ordered block entries as raw JSON objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredSnapshot(Vec<Value>);

impl StructuredSnapshot {
    pub fn new(entries: Vec<Value>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json_string(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, SnapshotError> {
        match serde_json::from_str::<Value>(raw)? {
            Value::Array(entries) => Ok(Self(entries)),
            _ => Err(SnapshotError::NotAnArray),
        }
    }
}

pub fn to_snapshot(doc: &Document) -> StructuredSnapshot {
    let entries = doc
        .blocks()
        .iter()
        .filter_map(|block| match serde_json::to_value(block) {
            Ok(value) => Some(value),
            // Payloads are string-keyed; this arm is unreachable in practice.
            Err(err) => {
                warn!(
                    "event=snapshot_encode module=serialize status=error block_id={} error={}",
                    block.id, err
                );
                None
            }
        })
        .collect();
    StructuredSnapshot(entries)
}

/// Rebuilds a document from a snapshot.
///
/// - Unknown fields are ignored.
/// - An entry of unknown kind that carries a `text` string becomes a
///   paragraph; other undecodable entries are dropped and logged.
/// - Missing, malformed or duplicate ids are regenerated.
pub fn from_snapshot(snapshot: &StructuredSnapshot) -> Result<Document, SnapshotError> {
    let mut seen: HashSet<BlockId> = HashSet::new();
    let mut blocks = Vec::with_capacity(snapshot.0.len());

    for (index, entry) in snapshot.0.iter().enumerate() {
        let Value::Object(fields) = entry else {
            warn!(
                "event=snapshot_decode module=serialize status=dropped index={} reason=not_object",
                index
            );
            continue;
        };
        let Some(content) = decode_content(fields) else {
            warn!(
                "event=snapshot_decode module=serialize status=dropped index={} kind={}",
                index,
                fields.get("kind").and_then(Value::as_str).unwrap_or("<missing>")
            );
            continue;
        };
        let id = fields
            .get("id")
            .and_then(Value::as_str)
            .and_then(|raw| Uuid::parse_str(raw).ok())
            .filter(|id| !seen.contains(id))
            .unwrap_or_else(Uuid::new_v4);
        seen.insert(id);
        blocks.push(Block::with_id(id, content));
    }

    Ok(Document::from_blocks(blocks))
}

fn decode_content(fields: &Map<String, Value>) -> Option<BlockContent> {
    let kind = fields.get("kind").and_then(Value::as_str).unwrap_or_default();
    let decoded = match kind {
        "table" => Some(BlockContent::Table(decode_table(fields))),
        "heading" => {
            let mut fields = fields.clone();
            let level = fields
                .get("level")
                .and_then(Value::as_u64)
                .map_or(1, |level| level.min(u64::from(u8::MAX)) as u8);
            fields.insert("level".into(), Value::from(clamp_heading_level(level)));
            serde_json::from_value(Value::Object(fields)).ok()
        }
        _ => serde_json::from_value(Value::Object(fields.clone())).ok(),
    };

    decoded.or_else(|| {
        fields
            .get("text")
            .and_then(Value::as_str)
            .map(|text| BlockContent::Paragraph {
                text: text.to_string(),
            })
    })
}

fn decode_table(fields: &Map<String, Value>) -> TableData {
    let cells: Vec<Vec<String>> = fields
        .get("cells")
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .map(|row| {
                    row.as_array()
                        .map(|cells| {
                            cells
                                .iter()
                                .map(|cell| cell.as_str().unwrap_or_default().to_string())
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    // Out-of-range sizes fall back to the extent of `cells`.
    let dimension = |name: &str, fallback: usize| {
        fields
            .get(name)
            .and_then(Value::as_u64)
            .and_then(|value| usize::try_from(value).ok())
            .filter(|value| *value <= fallback.max(MAX_DECLARED_DIMENSION))
            .unwrap_or(fallback)
    };
    let rows = dimension("rows", cells.len());
    let columns = dimension("columns", cells.iter().map(Vec::len).max().unwrap_or(0));
    TableData::from_cells(rows, columns, cells)
}

#[cfg(test)]
mod tests {
    use super::{decode_table, StructuredSnapshot};
    use serde_json::json;

    #[test]
    fn non_array_json_is_rejected() {
        assert!(StructuredSnapshot::from_json_str(r#"{"kind":"paragraph"}"#).is_err());
    }

    #[test]
    fn table_dimensions_fall_back_to_cells() {
        let fields = json!({"kind": "table", "cells": [["a", "b"], ["c"]]});
        let table = decode_table(fields.as_object().unwrap());
        assert_eq!((table.rows(), table.columns()), (2, 2));
        assert_eq!(table.cell(1, 1), Some(""));
    }

    #[test]
    fn oversized_dimensions_fall_back_to_cells() {
        let fields = json!({"kind": "table", "rows": 1_000_000_000_000u64, "columns": 3, "cells": [["a", "b"]]});
        let table = decode_table(fields.as_object().unwrap());
        assert_eq!((table.rows(), table.columns()), (1, 3));
        assert_eq!(table.cell(0, 0), Some("a"));
    }
}
