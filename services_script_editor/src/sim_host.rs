//! Simulated editing host
//!
//! An in-memory stand-in for a browser page: a small node tree with a
//! header (title and byline) next to the editable root, one element and one
//! text node per block, a selection, and the content of the root.
//! Used by tests and headless sessions.
//!
//! Like a real contentEditable root, `render` replaces everything shown:
//! text typed since the last render is gone unless the document picked it
//! up first.

use std::collections::BTreeMap;

use script_core::{BlockDocument, BlockId};
use tracing::debug;

use crate::cursor::{CaretHost, NodeRef, SelectionAnchor, SurfaceHost};

/// Title text shown above the editable root
pub const TITLE_PLACEHOLDER: &str = "SCRIPT TITLE";

/// Byline text shown above the editable root
pub const BYLINE_PLACEHOLDER: &str = "Written by AUTHOR NAME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Page,
    Header,
    Root,
    Element(BlockId),
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<NodeRef>,
    kind: NodeKind,
}

/// Block element and its text node
#[derive(Debug, Clone, Copy)]
struct BlockNodes {
    element: NodeRef,
    text: NodeRef,
}

/// In-memory host adapter
#[derive(Debug, Clone)]
pub struct SimSurface {
    nodes: BTreeMap<NodeRef, Node>,
    next_node: u64,
    root: NodeRef,
    title: NodeRef,
    byline: NodeRef,
    title_text: String,
    byline_text: String,
    blocks: BTreeMap<BlockId, BlockNodes>,
    /// Last rendered document
    shown: Option<BlockDocument>,
    /// Text typed into blocks since the last render
    typed: BTreeMap<BlockId, String>,
    /// Markup the host inserted behind the document's back
    out_of_band: String,
    selection: Option<SelectionAnchor>,
    render_count: usize,
}

impl SimSurface {
    pub fn new() -> Self {
        let mut surface = Self {
            nodes: BTreeMap::new(),
            next_node: 0,
            root: NodeRef::new(0),
            title: NodeRef::new(0),
            byline: NodeRef::new(0),
            title_text: TITLE_PLACEHOLDER.to_string(),
            byline_text: BYLINE_PLACEHOLDER.to_string(),
            blocks: BTreeMap::new(),
            shown: None,
            typed: BTreeMap::new(),
            out_of_band: String::new(),
            selection: None,
            render_count: 0,
        };

        let page = surface.add_node(None, NodeKind::Page);
        let header = surface.add_node(Some(page), NodeKind::Header);
        surface.title = surface.add_node(Some(header), NodeKind::Text);
        surface.byline = surface.add_node(Some(header), NodeKind::Text);
        surface.root = surface.add_node(Some(page), NodeKind::Root);
        surface
    }

    /// The editable content root
    pub fn root(&self) -> NodeRef {
        self.root
    }

    /// Text node of the script title (outside the editable root)
    pub fn title_node(&self) -> NodeRef {
        self.title
    }

    /// Text node of the byline (outside the editable root)
    pub fn byline_node(&self) -> NodeRef {
        self.byline
    }

    pub fn title_text(&self) -> &str {
        &self.title_text
    }

    pub fn byline_text(&self) -> &str {
        &self.byline_text
    }

    /// Edit the header title. The header is not part of the editable root
    /// and never reaches the rendered surface.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title_text = title.into();
    }

    pub fn element_node(&self, block: BlockId) -> Option<NodeRef> {
        self.blocks.get(&block).map(|n| n.element)
    }

    pub fn text_node(&self, block: BlockId) -> Option<NodeRef> {
        self.blocks.get(&block).map(|n| n.text)
    }

    /// Put a collapsed caret at `offset` in the text of `block`
    pub fn select_text(&mut self, block: BlockId, offset: usize) {
        if let Some(text) = self.text_node(block) {
            self.selection = Some(SelectionAnchor::caret(text, offset));
        }
    }

    /// Anchor the selection on an arbitrary node
    pub fn select_node(&mut self, node: NodeRef, offset: usize, collapsed: bool) {
        self.selection = Some(SelectionAnchor {
            node,
            offset,
            collapsed,
        });
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Replace the text of `block` the way a user typing into it would, and
    /// leave the caret at the end of it. Ignored for unrendered blocks.
    pub fn type_text(&mut self, block: BlockId, text: impl Into<String>) {
        let Some(node) = self.text_node(block) else {
            debug!(block = %block, "typing into unrendered block ignored");
            return;
        };
        let text = text.into();
        self.selection = Some(SelectionAnchor::caret(node, text.len()));
        self.typed.insert(block, text);
    }

    /// Insert markup at the end of the editable root without going through
    /// the document, the way a paste or a browser extension would.
    pub fn paste_markup(&mut self, markup: &str) {
        self.out_of_band.push_str(markup);
    }

    /// Number of times the document was rendered
    pub fn render_count(&self) -> usize {
        self.render_count
    }

    fn add_node(&mut self, parent: Option<NodeRef>, kind: NodeKind) -> NodeRef {
        let node = NodeRef::new(self.next_node);
        self.next_node += 1;
        self.nodes.insert(node, Node { parent, kind });
        node
    }

    fn parent(&self, node: NodeRef) -> Option<NodeRef> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    fn is_inside(&self, node: NodeRef, ancestor: NodeRef) -> bool {
        let mut current = self.parent(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }
}

impl Default for SimSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CaretHost for SimSurface {
    fn content_root(&self) -> NodeRef {
        self.root
    }

    fn selection(&self) -> Option<SelectionAnchor> {
        self.selection
    }

    fn locate(&self, anchor: &SelectionAnchor, root: NodeRef) -> Option<BlockId> {
        if !self.is_inside(anchor.node, root) {
            return None;
        }

        let mut current = Some(anchor.node);
        while let Some(node) = current {
            match self.nodes.get(&node)?.kind {
                NodeKind::Element(block) => return Some(block),
                NodeKind::Root => return None,
                _ => current = self.parent(node),
            }
        }
        None
    }

    fn place(&mut self, block: BlockId, offset: usize) {
        match self.text_node(block) {
            Some(text) => self.selection = Some(SelectionAnchor::caret(text, offset)),
            None => debug!(block = %block, "caret placement on unrendered block ignored"),
        }
    }
}

impl SurfaceHost for SimSurface {
    fn render(&mut self, document: &BlockDocument) {
        for block in document.blocks() {
            if self.blocks.contains_key(&block.id()) {
                continue;
            }
            let element = self.add_node(Some(self.root), NodeKind::Element(block.id()));
            let text = self.add_node(Some(element), NodeKind::Text);
            self.blocks.insert(block.id(), BlockNodes { element, text });
        }
        self.shown = Some(document.clone());
        self.typed.clear();
        self.render_count += 1;
    }

    fn read_surface(&self) -> String {
        let mut surface = match &self.shown {
            Some(shown) if self.typed.is_empty() => shown.render_surface(),
            Some(shown) => {
                let mut live = shown.clone();
                for (block, text) in &self.typed {
                    live.set_content(*block, text.as_str());
                }
                live.render_surface()
            }
            None => String::new(),
        };
        surface.push_str(&self.out_of_band);
        surface
    }

    fn block_text(&self, block: BlockId) -> Option<String> {
        if let Some(text) = self.typed.get(&block) {
            return Some(text.clone());
        }
        self.shown
            .as_ref()
            .and_then(|shown| shown.block(block))
            .map(|b| b.content().to_string())
    }
}
