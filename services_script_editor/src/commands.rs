//! Key shortcuts and toolbar commands

use input_types::{KeyCode, KeyEvent};
use script_core::BlockType;
use thiserror::Error;

/// Command parsing error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown block type: {0}")]
    UnknownBlockType(String),
}

/// Structural command triggered from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// Enter: insert the next block after the current one
    ParagraphBreak,
    /// Alt+1..4: retype the current block
    SetType(BlockType),
}

impl EditorCommand {
    /// Map a key event to an editor command.
    ///
    /// Only pressed events are considered. Enter with Ctrl, Alt or Meta held
    /// is left to the host.
    pub fn from_key_event(event: &KeyEvent) -> Option<Self> {
        if !event.is_pressed() {
            return None;
        }

        match event.code {
            KeyCode::Enter if !event.modifiers.has_command_modifier() => {
                Some(EditorCommand::ParagraphBreak)
            }
            code if event.modifiers.is_alt() => code
                .digit()
                .and_then(BlockType::from_shortcut_digit)
                .map(EditorCommand::SetType),
            _ => None,
        }
    }
}

/// Command issued from the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarCommand {
    /// Block type picked in the type selector
    SelectType(BlockType),
    /// "+ Add Block" button
    AddBlock,
}

impl ToolbarCommand {
    /// Parse the type selector's value (a block type tag)
    pub fn select(value: &str) -> Result<Self, CommandError> {
        BlockType::from_tag(value.trim())
            .map(ToolbarCommand::SelectType)
            .ok_or_else(|| CommandError::UnknownBlockType(value.to_string()))
    }
}

/// One-line shortcut reference shown under the editor
pub fn shortcut_help() -> String {
    BlockType::ALL
        .iter()
        .map(|t| {
            let name = match t {
                BlockType::SceneHeading => "Scene",
                other => other.label(),
            };
            format!("Alt+{} {}", t.shortcut_digit(), name)
        })
        .collect::<Vec<_>>()
        .join(" | ")
}
