//! Auto-advance rule for paragraph breaks

use crate::block::BlockType;

/// Type of the block created after `current` on a paragraph break.
///
/// `current` is `None` when the caret sits in a block whose type tag is
/// missing or foreign; the caller's active toolbar type is used then.
pub fn next_type(current: Option<BlockType>, fallback: BlockType) -> BlockType {
    match current {
        Some(BlockType::SceneHeading) => BlockType::Action,
        Some(BlockType::Action) => BlockType::Character,
        Some(BlockType::Character) => BlockType::Dialogue,
        Some(BlockType::Dialogue) => BlockType::Action,
        None => fallback,
    }
}
