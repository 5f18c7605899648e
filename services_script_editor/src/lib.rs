//! # Screenplay Editor Service
//!
//! This crate mounts a screenplay editing session on top of an editing host.
//!
//! ## Philosophy
//!
//! - **Typed structure**: Enter and shortcuts edit typed blocks, not raw markup
//! - **Host as capability**: Caret and rendering go through injected host traits
//! - **Surface is the save format**: Autosave writes what the host shows
//! - **Testable**: Fully testable with a simulated host, store and clock
//!
//! ## Non-Goals
//!
//! This is NOT:
//! - A rich-text editor (no bold, italics, undo or collaboration)
//! - A screenplay exporter (no PDF or page layout)
//! - A markup sanitizer
//!
//! ## Design
//!
//! - `ScriptEditor` owns one document per session; nothing is global
//! - Input arrives as structured KeyEvent messages or toolbar commands
//! - Autosave fires from a restartable periodic task polled by the session
//! - Stores and clocks are injected so sessions can run headless

pub mod autosave;
pub mod commands;
pub mod config;
pub mod cursor;
pub mod editor;
pub mod sim_host;
pub mod store;
pub mod timer;

pub use autosave::AutosavePersister;
pub use commands::{shortcut_help, CommandError, EditorCommand, ToolbarCommand};
pub use config::{ConfigError, EditorConfig, DEFAULT_AUTOSAVE_PERIOD_MS, DEFAULT_STORAGE_KEY};
pub use cursor::{CaretHost, CursorController, EditorHost, NodeRef, SelectionAnchor, SurfaceHost};
pub use editor::{EditorAction, ScriptEditor, SessionId};
pub use sim_host::SimSurface;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, StoreResult};
pub use timer::{Clock, MonotonicClock, PeriodicTask, SimClock};
