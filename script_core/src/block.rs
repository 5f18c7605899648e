//! Block types and block records

use alloc::string::String;
use core::fmt;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Screenplay block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum BlockType {
    /// Scene heading (INT./EXT. line)
    SceneHeading,
    /// Action / description
    Action,
    /// Character cue above dialogue
    Character,
    /// Spoken dialogue
    Dialogue,
}

impl BlockType {
    /// All block types in toolbar order
    pub const ALL: [BlockType; 4] = [
        BlockType::SceneHeading,
        BlockType::Action,
        BlockType::Character,
        BlockType::Dialogue,
    ];

    /// Type tag used in host markup (`data-type` attribute and class name)
    pub fn tag(&self) -> &'static str {
        match self {
            BlockType::SceneHeading => "scene-heading",
            BlockType::Action => "action",
            BlockType::Character => "character",
            BlockType::Dialogue => "dialogue",
        }
    }

    /// Parse a markup type tag. Unknown tags are unrecognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "scene-heading" => Some(BlockType::SceneHeading),
            "action" => Some(BlockType::Action),
            "character" => Some(BlockType::Character),
            "dialogue" => Some(BlockType::Dialogue),
            _ => None,
        }
    }

    /// Human-readable toolbar label
    pub fn label(&self) -> &'static str {
        match self {
            BlockType::SceneHeading => "Scene Heading",
            BlockType::Action => "Action",
            BlockType::Character => "Character",
            BlockType::Dialogue => "Dialogue",
        }
    }

    /// Digit of the Alt+N shortcut that selects this type
    pub fn shortcut_digit(&self) -> u8 {
        match self {
            BlockType::SceneHeading => 1,
            BlockType::Action => 2,
            BlockType::Character => 3,
            BlockType::Dialogue => 4,
        }
    }

    /// Inverse of [`BlockType::shortcut_digit`]
    pub fn from_shortcut_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.shortcut_digit() == digit)
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Block identifier
///
/// Allocated by the owning document from a monotonic counter, so an id is
/// never handed out twice within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct BlockId(u64);

impl BlockId {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw numeric value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

/// Verbatim markup of a block that was parsed from a snapshot in a
/// non-canonical shape.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub(crate) enum SourceMarkup {
    /// A `div` element whose opening tag or inner markup is not canonical
    Element { open_tag: String, inner: String },
    /// Loose text with no enclosing element; the content is the markup
    Bare,
}

/// A single typed unit of the script
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Block {
    id: BlockId,
    block_type: Option<BlockType>,
    content: String,
    pub(crate) source: Option<SourceMarkup>,
    /// Host text between this block's element and the next one
    pub(crate) trailing: String,
}

impl Block {
    pub(crate) fn new(id: BlockId, block_type: BlockType, content: String) -> Self {
        Self {
            id,
            block_type: Some(block_type),
            content,
            source: None,
            trailing: String::new(),
        }
    }

    pub(crate) fn parsed(
        id: BlockId,
        block_type: Option<BlockType>,
        content: String,
        source: Option<SourceMarkup>,
        trailing: String,
    ) -> Self {
        Self {
            id,
            block_type,
            content,
            source,
            trailing,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// Block type, or `None` if the type tag was missing or foreign
    pub fn block_type(&self) -> Option<BlockType> {
        self.block_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns true if the block carries no recognized type tag
    pub fn is_foreign(&self) -> bool {
        self.block_type.is_none()
    }

    pub(crate) fn retype(&mut self, block_type: BlockType) {
        self.block_type = Some(block_type);
        self.source = None;
    }

    pub(crate) fn replace_content(&mut self, content: String) {
        self.content = content;
        self.source = None;
    }
}
