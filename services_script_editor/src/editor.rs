//! Script editor session
//!
//! One [`ScriptEditor`] per mounted editor. It owns the document, the
//! injected host, store and clock, and routes keyboard and toolbar input to
//! the cursor controller. Nothing here is global: two sessions never share
//! state.

use core::fmt;

use input_types::{InputEvent, KeyCode, KeyEvent, Modifiers};
use script_core::{BlockDocument, BlockId};
use tracing::{debug, info};
use uuid::Uuid;

use crate::autosave::AutosavePersister;
use crate::commands::{EditorCommand, ToolbarCommand};
use crate::config::EditorConfig;
use crate::cursor::{CursorController, EditorHost};
use crate::store::KeyValueStore;
use crate::timer::Clock;

/// Unique identifier of an editor session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// What the host should do with an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Not an editor command; let the host handle it natively
    Ignored,
    /// Consumed by the editor
    Handled {
        /// Suppress the host's default behaviour for the event
        prevent_default: bool,
    },
}

/// A mounted screenplay editor
pub struct ScriptEditor<H, S, C> {
    id: SessionId,
    document: BlockDocument,
    controller: CursorController,
    persister: AutosavePersister,
    host: H,
    store: S,
    clock: C,
}

impl<H, S, C> ScriptEditor<H, S, C>
where
    H: EditorHost,
    S: KeyValueStore,
    C: Clock,
{
    /// Mount a session: restore the last snapshot from `store`, render it
    /// into `host` and start autosave.
    pub fn mount(config: &EditorConfig, mut host: H, store: S, clock: C) -> Self {
        let id = SessionId::new();
        let mut persister = AutosavePersister::from_config(config);

        let document = persister.mount(&store);
        host.render(&document);
        let controller = CursorController::new(host.content_root());
        persister.start(clock.now_ms());

        info!(
            session = %id,
            key = persister.key(),
            blocks = document.len(),
            period_ms = persister.period_ms(),
            "script editor mounted"
        );

        Self {
            id,
            document,
            controller,
            persister,
            host,
            store,
            clock,
        }
    }

    /// Handle a keyboard event
    pub fn process_input(&mut self, event: InputEvent) -> EditorAction {
        let command = match event.as_key().and_then(EditorCommand::from_key_event) {
            Some(command) => command,
            None => return EditorAction::Ignored,
        };
        self.execute(command);
        EditorAction::Handled {
            prevent_default: true,
        }
    }

    /// Handle a key reported by name (`"Enter"`, `"3"`, ...), the way a
    /// browser host reports `KeyboardEvent.key`
    pub fn process_host_key(&mut self, key: &str, modifiers: Modifiers) -> EditorAction {
        let event = KeyEvent::pressed(KeyCode::from_key_name(key), modifiers);
        self.process_input(InputEvent::key(event))
    }

    /// Record content the host reports for `block`, e.g. from an input
    /// event. Returns false if the block is not part of the document.
    pub fn sync_block_content(&mut self, block: BlockId, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.document.block(block).map(|b| b.content()) == Some(content.as_str()) {
            return true;
        }
        let updated = self.document.set_content(block, content);
        if !updated {
            debug!(session = %self.id, block = %block, "content sync for unknown block ignored");
        }
        updated
    }

    /// Pull all block text the host holds into the document. Returns the
    /// number of blocks that changed.
    pub fn sync_from_host(&mut self) -> usize {
        self.controller.sync_from_host(&mut self.document, &self.host)
    }

    /// Run a keyboard command against the current selection.
    ///
    /// Returns the block that was inserted or retyped, if any.
    pub fn execute(&mut self, command: EditorCommand) -> Option<BlockId> {
        let anchor = self.host.selection();
        debug!(session = %self.id, ?command, "editor command");

        match command {
            EditorCommand::ParagraphBreak => self.controller.handle_paragraph_break(
                &mut self.document,
                &mut self.host,
                anchor.as_ref(),
            ),
            EditorCommand::SetType(block_type) => self.controller.handle_explicit_type(
                block_type,
                &mut self.document,
                &mut self.host,
                anchor.as_ref(),
            ),
        }
    }

    /// Handle a toolbar interaction.
    ///
    /// Returns the block that was added or retyped, if any.
    pub fn apply_toolbar(&mut self, command: ToolbarCommand) -> Option<BlockId> {
        debug!(session = %self.id, ?command, "toolbar command");

        match command {
            ToolbarCommand::SelectType(block_type) => {
                let anchor = self.host.selection();
                self.controller.handle_explicit_type(
                    block_type,
                    &mut self.document,
                    &mut self.host,
                    anchor.as_ref(),
                )
            }
            ToolbarCommand::AddBlock => Some(
                self.controller
                    .handle_add_block(&mut self.document, &mut self.host),
            ),
        }
    }

    /// Drive autosave from the session clock. Returns true if a snapshot
    /// was written.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.persister.poll(now, &self.host, &mut self.store)
    }

    /// Restart the autosave schedule from now, replacing the running one
    pub fn restart_autosave(&mut self) {
        self.persister.start(self.clock.now_ms());
    }

    /// Stop autosave and hand back the host and store.
    ///
    /// No final snapshot is written: edits since the last tick are lost.
    pub fn teardown(mut self) -> (H, S) {
        self.persister.stop();
        info!(session = %self.id, ticks = self.persister.ticks(), "script editor torn down");
        (self.host, self.store)
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn document(&self) -> &BlockDocument {
        &self.document
    }

    pub fn controller(&self) -> &CursorController {
        &self.controller
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable host access, for simulating user activity in the host
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn autosave_running(&self) -> bool {
        self.persister.is_running()
    }
}
