#![no_std]

//! # Script Core
//!
//! Structured screenplay document model shared by every editing host.
//!
//! ## Philosophy
//!
//! - **No_std compatible**: Uses alloc but not std
//! - **Deterministic**: Same edit sequence => same document state
//! - **Typed blocks**: Block types are enum values, never re-read from markup
//! - **Mechanism over policy**: Core dictates structural edits, hosts render them
//!
//! ## Design
//!
//! The core provides:
//! - BlockDocument: ordered typed blocks plus the scene counter
//! - next_type: the auto-advance rule applied on paragraph breaks
//! - Surface markup: the rendered form a host displays and persists
//! - DocumentState: deterministic state for parity testing

extern crate alloc;

pub mod block;
pub mod document;
pub mod markup;
pub mod snapshot;
pub mod transition;

pub use block::{Block, BlockId, BlockType};
pub use document::{BlockDocument, CHARACTER_PLACEHOLDER, SCENE_HEADING_PREFIX};
pub use markup::{parse_surface, MarkupError, ParsedElement, ParsedSurface, EMPTY_PLACEHOLDER};
pub use snapshot::DocumentState;
pub use transition::next_type;
