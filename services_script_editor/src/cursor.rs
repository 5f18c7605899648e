//! Caret resolution and caret placement around structural edits
//!
//! The host owns the real selection. The controller only sees it through
//! the [`CaretHost`] capability: `locate` turns a host anchor into a block
//! id, `place` puts a collapsed caret into a block. Anything the host cannot
//! locate inside the editable root (title fields, toolbar, etc.) resolves to
//! no block, and the structural operations become no-ops.
//!
//! Text the user types lives in the host until a structural edit. Every
//! operation first pulls block text back into the document, so the
//! re-render that follows never shows stale content.

use script_core::{next_type, BlockDocument, BlockId, BlockType};
use tracing::debug;

/// Opaque reference to a node in the host's content tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeRef(u64);

impl NodeRef {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// Host-reported caret/selection location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionAnchor {
    /// Node the selection is anchored in
    pub node: NodeRef,
    /// Offset within that node
    pub offset: usize,
    /// Whether the selection is a bare caret (no range)
    pub collapsed: bool,
}

impl SelectionAnchor {
    /// Collapsed caret at `offset` in `node`
    pub fn caret(node: NodeRef, offset: usize) -> Self {
        Self {
            node,
            offset,
            collapsed: true,
        }
    }
}

/// Caret capability implemented by a host adapter
pub trait CaretHost {
    /// The editable content root
    fn content_root(&self) -> NodeRef;

    /// Current selection, if the host has one
    fn selection(&self) -> Option<SelectionAnchor>;

    /// Block owning `anchor`, or `None` if the anchor is not inside `root`.
    /// Anchors in text nodes resolve to their owning block element.
    fn locate(&self, anchor: &SelectionAnchor, root: NodeRef) -> Option<BlockId>;

    /// Put a collapsed caret at `offset` in the content of `block`
    fn place(&mut self, block: BlockId, offset: usize);
}

/// Rendering capability implemented by a host adapter
pub trait SurfaceHost {
    /// Reflect the document into the editable root
    fn render(&mut self, document: &BlockDocument);

    /// Literal markup of the editable root, including edits the document
    /// never saw (pastes, typing between renders)
    fn read_surface(&self) -> String;

    /// Content of `block` as the host currently shows it, `None` if the
    /// host has no element for it
    fn block_text(&self, block: BlockId) -> Option<String>;
}

/// A host that provides both capabilities
pub trait EditorHost: CaretHost + SurfaceHost {}

impl<T: CaretHost + SurfaceHost> EditorHost for T {}

/// Bridges host caret state and document structural edits
#[derive(Debug, Clone)]
pub struct CursorController {
    root: NodeRef,
}

impl CursorController {
    /// Controller for the editable root `root`
    pub fn new(root: NodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> NodeRef {
        self.root
    }

    /// Copy block text the host holds into `document`.
    ///
    /// Returns the number of blocks whose content changed. Blocks the host
    /// reports unchanged keep their source markup.
    pub fn sync_from_host<H: SurfaceHost + ?Sized>(
        &self,
        document: &mut BlockDocument,
        host: &H,
    ) -> usize {
        let changed: Vec<(BlockId, String)> = document
            .blocks()
            .iter()
            .filter_map(|block| {
                host.block_text(block.id())
                    .filter(|text| text != block.content())
                    .map(|text| (block.id(), text))
            })
            .collect();

        for (id, text) in &changed {
            document.set_content(*id, text.as_str());
        }
        if !changed.is_empty() {
            debug!(blocks = changed.len(), "pulled typed text from host");
        }
        changed.len()
    }

    /// Block the anchor sits in, if any.
    ///
    /// A located id that does not belong to `document` also counts as none.
    pub fn resolve_current_block<H: CaretHost + ?Sized>(
        &self,
        host: &H,
        anchor: Option<&SelectionAnchor>,
        document: &BlockDocument,
    ) -> Option<BlockId> {
        let anchor = anchor?;
        let id = host.locate(anchor, self.root)?;
        document.contains(id).then_some(id)
    }

    /// Paragraph break (Enter).
    ///
    /// Inserts the next block after the current one and moves a collapsed
    /// caret to its start. Returns `None` without touching the document when
    /// the caret is outside the editable root; the caller still suppresses
    /// the native line break.
    pub fn handle_paragraph_break<H: EditorHost + ?Sized>(
        &self,
        document: &mut BlockDocument,
        host: &mut H,
        anchor: Option<&SelectionAnchor>,
    ) -> Option<BlockId> {
        self.sync_from_host(document, host);
        let Some(current) = self.resolve_current_block(host, anchor, document) else {
            debug!("paragraph break outside editable root");
            return None;
        };

        let current_type = document.block(current).and_then(|b| b.block_type());
        let block_type = next_type(current_type, document.last_known_type());
        let id = document.insert_block_after(current, block_type);
        document.set_last_known_type(block_type);

        host.render(document);
        host.place(id, 0);

        debug!(
            after = %current,
            block = %id,
            block_type = %block_type,
            "inserted block on paragraph break"
        );
        Some(id)
    }

    /// Explicit retype from a shortcut or the toolbar.
    ///
    /// The toolbar type always follows `block_type`; the current block, if
    /// any, is retyped in place. The caret is not moved.
    pub fn handle_explicit_type<H: EditorHost + ?Sized>(
        &self,
        block_type: BlockType,
        document: &mut BlockDocument,
        host: &mut H,
        anchor: Option<&SelectionAnchor>,
    ) -> Option<BlockId> {
        self.sync_from_host(document, host);
        document.set_last_known_type(block_type);

        let Some(current) = self.resolve_current_block(host, anchor, document) else {
            debug!(block_type = %block_type, "retype outside editable root, toolbar only");
            return None;
        };

        document.set_block_type(current, block_type);
        host.render(document);

        debug!(block = %current, block_type = %block_type, "retyped block");
        Some(current)
    }

    /// "Add block": append a block of the toolbar type and move a collapsed
    /// caret to its start. Never looks at the caret.
    pub fn handle_add_block<H: EditorHost + ?Sized>(
        &self,
        document: &mut BlockDocument,
        host: &mut H,
    ) -> BlockId {
        self.sync_from_host(document, host);
        let block_type = document.last_known_type();
        let id = document.append_block(block_type);

        host.render(document);
        host.place(id, 0);

        debug!(block = %id, block_type = %block_type, "appended block");
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim_host::SimSurface;

    fn setup() -> (CursorController, SimSurface, BlockDocument) {
        let mut host = SimSurface::new();
        let doc = BlockDocument::create();
        host.render(&doc);
        (CursorController::new(host.content_root()), host, doc)
    }

    fn caret_in(host: &SimSurface, block: BlockId) -> SelectionAnchor {
        SelectionAnchor::caret(host.text_node(block).unwrap(), 0)
    }

    #[test]
    fn test_resolve_without_anchor() {
        let (controller, host, doc) = setup();
        assert_eq!(controller.resolve_current_block(&host, None, &doc), None);
    }

    #[test]
    fn test_resolve_ignores_ids_from_other_documents() {
        let (controller, mut host, doc) = setup();
        let first = doc.blocks()[0].id();
        let anchor = caret_in(&host, first);
        assert_eq!(
            controller.resolve_current_block(&host, Some(&anchor), &doc),
            Some(first)
        );

        let mut newer = doc.clone();
        let extra = newer.append_block(BlockType::Action);
        host.render(&newer);
        let anchor = caret_in(&host, extra);
        assert_eq!(controller.resolve_current_block(&host, Some(&anchor), &doc), None);
        assert_eq!(
            controller.resolve_current_block(&host, Some(&anchor), &newer),
            Some(extra)
        );
    }

    #[test]
    fn test_paragraph_break_chain() {
        let (controller, mut host, mut doc) = setup();
        let mut current = doc.blocks()[0].id();
        host.select_text(current, 0);
        let expected = [
            BlockType::Character,
            BlockType::Dialogue,
            BlockType::Action,
            BlockType::Character,
        ];

        for block_type in expected {
            let anchor = host.selection();
            let id = controller
                .handle_paragraph_break(&mut doc, &mut host, anchor.as_ref())
                .unwrap();
            assert_eq!(doc.block(id).unwrap().block_type(), Some(block_type));
            assert_eq!(host.selection(), Some(caret_in(&host, id)));
            current = id;
        }
        assert_eq!(doc.blocks().last().map(|b| b.id()), Some(current));
        assert_eq!(doc.last_known_type(), BlockType::Character);
    }

    #[test]
    fn test_paragraph_break_inserts_after_current() {
        let (controller, mut host, mut doc) = setup();
        let first = doc.blocks()[0].id();
        doc.append_block(BlockType::Dialogue);
        host.render(&doc);

        let anchor = caret_in(&host, first);
        let id = controller
            .handle_paragraph_break(&mut doc, &mut host, Some(&anchor))
            .unwrap();
        assert_eq!(doc.position(id), Some(1));
        assert_eq!(doc.len(), 3);
    }

    #[test]
    fn test_paragraph_break_outside_root() {
        let (controller, mut host, mut doc) = setup();
        let before = doc.clone();
        let renders = host.render_count();

        let anchor = SelectionAnchor::caret(host.byline_node(), 2);
        assert_eq!(
            controller.handle_paragraph_break(&mut doc, &mut host, Some(&anchor)),
            None
        );
        assert_eq!(doc, before);
        assert_eq!(host.render_count(), renders);
    }

    #[test]
    fn test_explicit_type_without_block_updates_toolbar_only() {
        let (controller, mut host, mut doc) = setup();
        let first_type = doc.blocks()[0].block_type();

        assert_eq!(
            controller.handle_explicit_type(BlockType::Dialogue, &mut doc, &mut host, None),
            None
        );
        assert_eq!(doc.last_known_type(), BlockType::Dialogue);
        assert_eq!(doc.blocks()[0].block_type(), first_type);
    }

    #[test]
    fn test_explicit_type_keeps_caret() {
        let (controller, mut host, mut doc) = setup();
        let first = doc.blocks()[0].id();
        host.select_text(first, 4);
        let anchor = host.selection();

        let id = controller.handle_explicit_type(
            BlockType::SceneHeading,
            &mut doc,
            &mut host,
            anchor.as_ref(),
        );
        assert_eq!(id, Some(first));
        assert_eq!(host.selection(), anchor);
        assert_eq!(doc.blocks()[0].content(), "INT./EXT. SCENE 1");
        assert_eq!(doc.scene_counter(), 2);
    }

    #[test]
    fn test_typed_text_survives_paragraph_break() {
        let (controller, mut host, mut doc) = setup();
        let first = doc.blocks()[0].id();
        host.type_text(first, "He runs.");

        let anchor = host.selection();
        controller.handle_paragraph_break(&mut doc, &mut host, anchor.as_ref());
        assert_eq!(doc.block(first).unwrap().content(), "He runs.");
        assert!(host.read_surface().contains(">He runs.</div>"));
    }

    #[test]
    fn test_retype_to_dialogue_keeps_typed_text() {
        let (controller, mut host, mut doc) = setup();
        let first = doc.blocks()[0].id();
        host.type_text(first, "Not now.");

        let anchor = host.selection();
        controller.handle_explicit_type(BlockType::Dialogue, &mut doc, &mut host, anchor.as_ref());
        let block = doc.block(first).unwrap();
        assert_eq!(block.block_type(), Some(BlockType::Dialogue));
        assert_eq!(block.content(), "Not now.");
        assert_eq!(host.block_text(first).as_deref(), Some("Not now."));
    }

    #[test]
    fn test_sync_leaves_untouched_blocks_alone() {
        let raw = "<div data-type=\"action\" id=\"kept\">walks</div>";
        let mut doc = BlockDocument::load_snapshot(Some(raw));
        let mut host = SimSurface::new();
        host.render(&doc);
        let controller = CursorController::new(host.content_root());

        assert_eq!(controller.sync_from_host(&mut doc, &host), 0);
        assert_eq!(doc.render_surface(), raw);
    }

    #[test]
    fn test_add_block_ignores_caret() {
        let (controller, mut host, mut doc) = setup();
        let first = doc.blocks()[0].id();
        doc.append_block(BlockType::Action);
        host.render(&doc);
        host.select_text(first, 0);
        doc.set_last_known_type(BlockType::Character);

        let id = controller.handle_add_block(&mut doc, &mut host);
        assert_eq!(doc.position(id), Some(2));
        assert_eq!(doc.block(id).unwrap().content(), "CHARACTER NAME");
        assert_eq!(host.selection(), Some(caret_in(&host, id)));
    }
}
