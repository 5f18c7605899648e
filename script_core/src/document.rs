//! Block document model
//!
//! Owns the ordered block sequence, the scene counter and the active
//! toolbar type for one editing session. Blocks are only ever appended,
//! inserted or mutated in place; nothing removes or reorders them.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::block::{Block, BlockId, BlockType, SourceMarkup};
use crate::markup::{self, MarkupError, ParsedSurface};
use crate::snapshot::DocumentState;

/// Seeded content of a new character block
pub const CHARACTER_PLACEHOLDER: &str = "CHARACTER NAME";

/// Prefix of a seeded scene heading, followed by the scene number
pub const SCENE_HEADING_PREFIX: &str = "INT./EXT. SCENE ";

/// Structured screenplay document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDocument {
    blocks: Vec<Block>,
    /// Host text before the first block element
    leading: String,
    scene_counter: u32,
    last_known_type: BlockType,
    next_id: u64,
}

impl BlockDocument {
    /// Fresh document with a single empty action block
    pub fn create() -> Self {
        let mut doc = Self::empty();
        let id = doc.allocate_id();
        doc.blocks = vec![Block::new(id, BlockType::Action, String::new())];
        doc
    }

    /// Rebuild a document from a persisted surface.
    ///
    /// Absent, empty or unparseable input yields [`BlockDocument::create`].
    /// The scene counter restarts at 1 and the toolbar type at Action; only
    /// the surface is persisted.
    pub fn load_snapshot(raw: Option<&str>) -> Self {
        raw.and_then(|raw| Self::try_load_snapshot(raw).ok())
            .unwrap_or_else(Self::create)
    }

    /// Like [`BlockDocument::load_snapshot`], but reports why a surface
    /// could not be used.
    ///
    /// Text with no block element at all (a root whose blocks were deleted
    /// and typed over) loads as a single untyped block holding that text.
    pub fn try_load_snapshot(raw: &str) -> Result<Self, MarkupError> {
        match markup::parse_surface(raw) {
            Ok(parsed) => Ok(Self::from_parsed(parsed)),
            Err(MarkupError::NoBlocks) => Ok(Self::from_bare_text(raw)),
            Err(err) => Err(err),
        }
    }

    fn empty() -> Self {
        Self {
            blocks: Vec::new(),
            leading: String::new(),
            scene_counter: 1,
            last_known_type: BlockType::Action,
            next_id: 0,
        }
    }

    fn from_bare_text(raw: &str) -> Self {
        let mut doc = Self::empty();
        let id = doc.allocate_id();
        doc.blocks.push(Block::parsed(
            id,
            None,
            String::from(raw),
            Some(SourceMarkup::Bare),
            String::new(),
        ));
        doc
    }

    fn from_parsed(parsed: ParsedSurface) -> Self {
        let mut doc = Self::empty();
        doc.blocks.reserve(parsed.elements.len());
        doc.leading = parsed.leading;

        for element in parsed.elements {
            let id = doc.allocate_id();
            let source = markup::source_markup(&element);
            let block_type = element.block_type();
            let content = String::from(element.content());
            doc.blocks.push(Block::parsed(
                id,
                block_type,
                content,
                source,
                element.trailing,
            ));
        }

        doc
    }

    /// Append a seeded block of `block_type` at the end
    pub fn append_block(&mut self, block_type: BlockType) -> BlockId {
        let block = self.new_block(block_type);
        let id = block.id();
        self.blocks.push(block);
        id
    }

    /// Insert a seeded block right after `after`.
    ///
    /// If `after` is the last block, or does not resolve, the new block is
    /// appended at the end.
    pub fn insert_block_after(&mut self, after: BlockId, block_type: BlockType) -> BlockId {
        let block = self.new_block(block_type);
        let id = block.id();
        match self.position(after) {
            Some(index) => self.blocks.insert(index + 1, block),
            None => self.blocks.push(block),
        }
        id
    }

    /// Retype a block in place.
    ///
    /// Scene headings and character cues are re-seeded; action and dialogue
    /// keep their content. Returns false (and changes nothing) if `id` does
    /// not resolve.
    pub fn set_block_type(&mut self, id: BlockId, block_type: BlockType) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let seeded = self.seed(block_type);
        let block = &mut self.blocks[index];
        block.retype(block_type);
        if let Some(content) = seeded {
            block.replace_content(content);
        }
        true
    }

    /// Replace a block's content. Returns false if `id` does not resolve.
    pub fn set_content(&mut self, id: BlockId, content: impl Into<String>) -> bool {
        match self.blocks.iter_mut().find(|b| b.id() == id) {
            Some(block) => {
                block.replace_content(content.into());
                true
            }
            None => false,
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id() == id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.position(id).is_some()
    }

    /// Index of the block in display order
    pub fn position(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| b.id() == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false once constructed
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Number the next scene heading will carry
    pub fn scene_counter(&self) -> u32 {
        self.scene_counter
    }

    /// Type currently selected in the toolbar
    pub fn last_known_type(&self) -> BlockType {
        self.last_known_type
    }

    pub fn set_last_known_type(&mut self, block_type: BlockType) {
        self.last_known_type = block_type;
    }

    /// Canonical rendered surface of the document
    pub fn render_surface(&self) -> String {
        let mut out = self.leading.clone();
        for block in &self.blocks {
            markup::render_block(block, &mut out);
        }
        out
    }

    /// Deterministic state snapshot (for parity testing)
    pub fn state(&self) -> DocumentState {
        DocumentState {
            blocks: self
                .blocks
                .iter()
                .map(|b| (b.block_type(), String::from(b.content())))
                .collect(),
            scene_counter: self.scene_counter,
            last_known_type: self.last_known_type,
        }
    }

    fn allocate_id(&mut self) -> BlockId {
        let id = BlockId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn new_block(&mut self, block_type: BlockType) -> Block {
        let content = self.seed(block_type).unwrap_or_default();
        let id = self.allocate_id();
        Block::new(id, block_type, content)
    }

    /// Seeded content for `block_type`, consuming a scene number for
    /// headings. `None` means existing content is kept.
    fn seed(&mut self, block_type: BlockType) -> Option<String> {
        match block_type {
            BlockType::SceneHeading => {
                let title = format!("{}{}", SCENE_HEADING_PREFIX, self.scene_counter);
                self.scene_counter = self.scene_counter.saturating_add(1);
                Some(title)
            }
            BlockType::Character => Some(String::from(CHARACTER_PLACEHOLDER)),
            BlockType::Action | BlockType::Dialogue => None,
        }
    }
}

impl Default for BlockDocument {
    fn default() -> Self {
        Self::create()
    }
}
