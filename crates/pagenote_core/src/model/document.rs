//! Document tree: an ordered sequence of top-level blocks.
//!
//! # Responsibility
//! - Provide identity-addressed structural mutations over blocks.
//! - Track a version counter so listeners can detect change cheaply.
//!
//! # Invariants
//! - The block sequence is never empty; removing the only block puts a fresh
//!   empty paragraph in its place.
//! - Block ids are unique and never reused: removed ids are retired and
//!   rejected on re-insertion.
//! - `version` increases on every successful mutation and only then.

use crate::model::block::{Block, BlockContent, BlockId, BlockKind};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DocResult<T> = Result<T, DocumentError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// Target block id is not part of the document.
    NotFound(BlockId),
    /// Inserted block id is already live or was used by a removed block.
    DuplicateId(BlockId),
    /// Text operation targeted a block without inline text.
    NotTextual(BlockId),
    /// Positional insert beyond the end of the sequence.
    IndexOutOfRange { index: usize, len: usize },
}

impl Display for DocumentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "block not found: {id}"),
            Self::DuplicateId(id) => write!(f, "block id already used: {id}"),
            Self::NotTextual(id) => write!(f, "block has no inline text: {id}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "insert index {index} out of range for {len} blocks")
            }
        }
    }
}

impl Error for DocumentError {}

#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,
    retired: HashSet<BlockId>,
    version: u64,
}

impl Document {
    /// Creates the document of a freshly opened page: one empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph("")],
            retired: HashSet::new(),
            version: 0,
        }
    }

    /// Builds a document from existing blocks.
    ///
    /// Duplicate ids are reassigned and an empty input yields the default
    /// document, so the result always satisfies the tree invariants.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            return Self::new();
        }
        let mut seen = HashSet::with_capacity(blocks.len());
        let blocks = blocks
            .into_iter()
            .map(|block| {
                if seen.insert(block.id) {
                    block
                } else {
                    let fresh = Block::new(block.content);
                    seen.insert(fresh.id);
                    fresh
                }
            })
            .collect();
        Self {
            blocks,
            retired: HashSet::new(),
            version: 0,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn first(&self) -> &Block {
        // Non-empty by invariant.
        &self.blocks[0]
    }

    pub fn get(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn previous(&self, id: BlockId) -> Option<&Block> {
        let index = self.position(id)?;
        index.checked_sub(1).and_then(|prev| self.blocks.get(prev))
    }

    pub fn next(&self, id: BlockId) -> Option<&Block> {
        let index = self.position(id)?;
        self.blocks.get(index + 1)
    }

    /// Whether `id` was used by a block that has since been removed.
    pub fn is_retired(&self, id: BlockId) -> bool {
        self.retired.contains(&id)
    }

    /// Inserts `block` immediately after `target`.
    pub fn insert_after(&mut self, target: BlockId, block: Block) -> DocResult<()> {
        let index = self.position(target).ok_or(DocumentError::NotFound(target))?;
        self.check_fresh_id(block.id)?;
        self.blocks.insert(index + 1, block);
        self.bump();
        Ok(())
    }

    /// Inserts `block` at `index` (`index == len` appends).
    pub fn insert_at(&mut self, index: usize, block: Block) -> DocResult<()> {
        if index > self.blocks.len() {
            return Err(DocumentError::IndexOutOfRange {
                index,
                len: self.blocks.len(),
            });
        }
        self.check_fresh_id(block.id)?;
        self.blocks.insert(index, block);
        self.bump();
        Ok(())
    }

    /// Substitutes the block at `key` in place. The replacement adopts `key`
    /// as its identity.
    pub fn replace(&mut self, key: BlockId, block: Block) -> DocResult<()> {
        let index = self.position(key).ok_or(DocumentError::NotFound(key))?;
        if block.id != key && self.contains(block.id) {
            return Err(DocumentError::DuplicateId(block.id));
        }
        let replacement = Block::with_id(key, block.content);
        if self.blocks[index] == replacement {
            return Ok(());
        }
        self.blocks[index] = replacement;
        self.bump();
        Ok(())
    }

    /// Removes the block at `key` and retires its id.
    ///
    /// Returns the removed block. If it was the only block, a fresh empty
    /// paragraph takes its place.
    pub fn remove(&mut self, key: BlockId) -> DocResult<Block> {
        let index = self.position(key).ok_or(DocumentError::NotFound(key))?;
        let removed = self.blocks.remove(index);
        self.retired.insert(removed.id);
        if self.blocks.is_empty() {
            self.blocks.push(Block::paragraph(""));
        }
        self.bump();
        Ok(removed)
    }

    /// Rewrites the kind of `key`, preserving text where the target allows.
    pub fn convert_kind(&mut self, key: BlockId, kind: BlockKind) -> DocResult<()> {
        let index = self.position(key).ok_or(DocumentError::NotFound(key))?;
        let current = &self.blocks[index].content;
        if current.kind() == kind {
            return Ok(());
        }
        let converted = current.converted(kind);
        self.blocks[index].content = converted;
        self.bump();
        Ok(())
    }

    /// Replaces the inline text of a textual block.
    pub fn set_text(&mut self, key: BlockId, text: impl Into<String>) -> DocResult<()> {
        let text = text.into();
        let index = self.position(key).ok_or(DocumentError::NotFound(key))?;
        let slot = self.blocks[index]
            .content
            .text_mut()
            .ok_or(DocumentError::NotTextual(key))?;
        if *slot == text {
            return Ok(());
        }
        *slot = text;
        self.bump();
        Ok(())
    }

    /// Applies `edit` to the payload of `key`.
    ///
    /// The version only advances when the payload actually changed, so
    /// failed or idempotent edits stay invisible to listeners.
    pub fn update<T, E>(
        &mut self,
        key: BlockId,
        edit: impl FnOnce(&mut BlockContent) -> Result<T, E>,
    ) -> DocResult<Result<T, E>> {
        let index = self.position(key).ok_or(DocumentError::NotFound(key))?;
        let before = self.blocks[index].content.clone();
        let result = edit(&mut self.blocks[index].content);
        if result.is_err() {
            self.blocks[index].content = before;
        } else if self.blocks[index].content != before {
            self.bump();
        }
        Ok(result)
    }

    /// True when every block is a text kind holding only whitespace.
    ///
    /// Checklist, table, image, embed and divider blocks count as content.
    pub fn is_structurally_empty(&self) -> bool {
        self.blocks.iter().all(|block| block.content.is_blank())
    }

    fn check_fresh_id(&self, id: BlockId) -> DocResult<()> {
        if self.contains(id) || self.retired.contains(&id) {
            return Err(DocumentError::DuplicateId(id));
        }
        Ok(())
    }

    fn bump(&mut self) {
        self.version += 1;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: ids, kinds, payloads and order. The version counter
/// and retired ids are bookkeeping and do not participate.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks
    }
}

impl Eq for Document {}
