//! Document state snapshot for deterministic parity testing

use crate::BlockType;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Structural state of a document, without ids or host markup
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct DocumentState {
    /// (type, content) per block in display order; `None` for foreign blocks
    pub blocks: Vec<(Option<BlockType>, String)>,
    pub scene_counter: u32,
    pub last_known_type: BlockType,
}

impl DocumentState {
    /// Compute a deterministic hash of the snapshot state
    /// This is used for fast comparison in parity tests
    #[cfg(test)]
    pub fn hash(&self) -> u64 {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();

        for (block_type, content) in &self.blocks {
            let tag = block_type.map(|t| t.tag()).unwrap_or("?");
            hasher.update(tag.as_bytes());
            hasher.update(b":");
            hasher.update(content.as_bytes());
            hasher.update(b"\n");
        }

        hasher.update(self.scene_counter.to_le_bytes());
        hasher.update(self.last_known_type.tag().as_bytes());

        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[..8]);
        u64::from_le_bytes(bytes)
    }
}
