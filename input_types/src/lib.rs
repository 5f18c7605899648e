#![no_std]

//! # Input Types
//!
//! Input event types delivered by an editing host to the script editor.
//!
//! ## Philosophy
//!
//! - **Events, not bytes**: Input is structured key events, not raw scan codes
//! - **Host-neutral**: Browser, terminal and test hosts all translate into these
//! - **Testable**: Events are serializable and can be recorded and replayed
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - Raw hardware scan codes
//! - Pointer, touch or IME composition events
//! - Global keyboard state

extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Input event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Keyboard event
    Key(KeyEvent),
}

impl InputEvent {
    /// Creates a key event
    pub fn key(event: KeyEvent) -> Self {
        Self::Key(event)
    }

    /// Returns the key event if this is a key event
    pub fn as_key(&self) -> Option<&KeyEvent> {
        match self {
            Self::Key(event) => Some(event),
        }
    }
}

/// Keyboard event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key that was pressed/released
    pub code: KeyCode,
    /// Modifier keys that were active
    pub modifiers: Modifiers,
    /// Event state (pressed, released, repeat)
    pub state: KeyState,
}

impl KeyEvent {
    pub fn new(code: KeyCode, modifiers: Modifiers, state: KeyState) -> Self {
        Self {
            code,
            modifiers,
            state,
        }
    }

    /// Creates a key pressed event
    pub fn pressed(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Pressed)
    }

    /// Creates a key released event
    pub fn released(code: KeyCode, modifiers: Modifiers) -> Self {
        Self::new(code, modifiers, KeyState::Released)
    }

    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }

    pub fn is_released(&self) -> bool {
        self.state == KeyState::Released
    }

    pub fn is_repeat(&self) -> bool {
        self.state == KeyState::Repeat
    }
}

/// Key state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pressed => write!(f, "pressed"),
            Self::Released => write!(f, "released"),
            Self::Repeat => write!(f, "repeat"),
        }
    }
}

/// Logical key code
///
/// Only the keys a text-editing host reports distinctly; every other key
/// arrives as `Char` or `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// Printable character
    Char(char),

    // Digit row
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,

    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,

    Up,
    Down,
    Left,
    Right,
    Home,
    End,

    Unknown,
}

impl KeyCode {
    /// Digit value for the digit row keys
    pub fn digit(&self) -> Option<u8> {
        match self {
            KeyCode::Num0 => Some(0),
            KeyCode::Num1 => Some(1),
            KeyCode::Num2 => Some(2),
            KeyCode::Num3 => Some(3),
            KeyCode::Num4 => Some(4),
            KeyCode::Num5 => Some(5),
            KeyCode::Num6 => Some(6),
            KeyCode::Num7 => Some(7),
            KeyCode::Num8 => Some(8),
            KeyCode::Num9 => Some(9),
            _ => None,
        }
    }

    /// Map a host key name (DOM `KeyboardEvent.key` style) to a key code
    pub fn from_key_name(name: &str) -> Self {
        match name {
            "Enter" => KeyCode::Enter,
            "Tab" => KeyCode::Tab,
            "Escape" => KeyCode::Escape,
            "Backspace" => KeyCode::Backspace,
            "Delete" => KeyCode::Delete,
            " " => KeyCode::Space,
            "ArrowUp" => KeyCode::Up,
            "ArrowDown" => KeyCode::Down,
            "ArrowLeft" => KeyCode::Left,
            "ArrowRight" => KeyCode::Right,
            "Home" => KeyCode::Home,
            "End" => KeyCode::End,
            "0" => KeyCode::Num0,
            "1" => KeyCode::Num1,
            "2" => KeyCode::Num2,
            "3" => KeyCode::Num3,
            "4" => KeyCode::Num4,
            "5" => KeyCode::Num5,
            "6" => KeyCode::Num6,
            "7" => KeyCode::Num7,
            "8" => KeyCode::Num8,
            "9" => KeyCode::Num9,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(ch), None) => KeyCode::Char(ch),
                    _ => KeyCode::Unknown,
                }
            }
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyCode::Char(ch) => write!(f, "{}", ch),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Modifier keys
///
/// Bitflags representing modifier key states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    bits: u8,
}

impl Modifiers {
    pub const NONE: Self = Self { bits: 0 };
    pub const CTRL: Self = Self { bits: 1 << 0 };
    pub const ALT: Self = Self { bits: 1 << 1 };
    pub const SHIFT: Self = Self { bits: 1 << 2 };
    /// Meta/Super/Command key
    pub const META: Self = Self { bits: 1 << 3 };

    pub fn none() -> Self {
        Self::NONE
    }

    /// Adds a modifier
    pub fn with(mut self, other: Modifiers) -> Self {
        self.bits |= other.bits;
        self
    }

    /// Checks if a modifier is present
    pub fn contains(&self, other: Modifiers) -> bool {
        (self.bits & other.bits) == other.bits
    }

    pub fn is_ctrl(&self) -> bool {
        self.contains(Self::CTRL)
    }

    pub fn is_alt(&self) -> bool {
        self.contains(Self::ALT)
    }

    pub fn is_shift(&self) -> bool {
        self.contains(Self::SHIFT)
    }

    pub fn is_meta(&self) -> bool {
        self.contains(Self::META)
    }

    /// Returns true if no modifiers are pressed
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns true if a command modifier (Ctrl, Alt or Meta) is held.
    /// Shift alone does not count.
    pub fn has_command_modifier(&self) -> bool {
        self.is_ctrl() || self.is_alt() || self.is_meta()
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let mut parts = Vec::new();
        if self.is_ctrl() {
            parts.push("Ctrl");
        }
        if self.is_alt() {
            parts.push("Alt");
        }
        if self.is_shift() {
            parts.push("Shift");
        }
        if self.is_meta() {
            parts.push("Meta");
        }
        write!(f, "{}", parts.join("+"))
    }
}
