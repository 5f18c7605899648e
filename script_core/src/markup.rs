//! Rendered surface markup
//!
//! The rendered surface is the literal markup of the editable root: one
//! `<div class="block {tag}" data-type="{tag}">` element per block, in order.
//! Host text between elements is kept as-is so that parsing a surface and
//! rendering it again reproduces the input byte for byte.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::block::{Block, BlockType, SourceMarkup};

/// Inner markup a host shows for a block with empty content
pub const EMPTY_PLACEHOLDER: &str = "<br>";

const DIV_OPEN: &str = "<div";
const DIV_CLOSE: &str = "</div";
const DIV_CLOSE_TAG: &str = "</div>";
const TYPE_ATTR: &str = "data-type";

/// Surface parse error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Input is empty or whitespace only
    Empty,
    /// Input contains no block elements
    NoBlocks,
    /// A tag starting at `offset` is never closed with `>`
    UnterminatedTag { offset: usize },
    /// A `div` at `offset` has no matching open/close counterpart
    UnbalancedDiv { offset: usize },
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupError::Empty => write!(f, "Surface is empty"),
            MarkupError::NoBlocks => write!(f, "Surface contains no block elements"),
            MarkupError::UnterminatedTag { offset } => {
                write!(f, "Unterminated tag at offset {}", offset)
            }
            MarkupError::UnbalancedDiv { offset } => {
                write!(f, "Unbalanced div at offset {}", offset)
            }
        }
    }
}

/// One top-level element of a parsed surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedElement {
    pub open_tag: String,
    pub inner: String,
    /// Text between this element and the next one (or the end)
    pub trailing: String,
}

impl ParsedElement {
    /// Value of the element's `data-type` attribute, if any
    pub fn type_tag(&self) -> Option<&str> {
        attribute_value(&self.open_tag, TYPE_ATTR)
    }

    /// Recognized block type, `None` for a missing or foreign tag
    pub fn block_type(&self) -> Option<BlockType> {
        self.type_tag().and_then(BlockType::from_tag)
    }

    /// Logical block content: the inner markup, with the empty placeholder
    /// mapped back to empty content
    pub fn content(&self) -> &str {
        if self.inner == EMPTY_PLACEHOLDER {
            ""
        } else {
            &self.inner
        }
    }
}

/// A surface split into block elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSurface {
    /// Text before the first element
    pub leading: String,
    pub elements: Vec<ParsedElement>,
}

/// Canonical opening tag for a block of the given type
pub fn open_tag(block_type: Option<BlockType>) -> String {
    match block_type {
        Some(t) => alloc::format!(
            "<div class=\"block {tag}\" data-type=\"{tag}\">",
            tag = t.tag()
        ),
        None => String::from("<div class=\"block\">"),
    }
}

/// Inner markup for the given content
pub fn render_inner(content: &str) -> &str {
    if content.is_empty() {
        EMPTY_PLACEHOLDER
    } else {
        content
    }
}

pub(crate) fn render_block(block: &Block, out: &mut String) {
    match &block.source {
        Some(SourceMarkup::Element { open_tag, inner }) => {
            out.push_str(open_tag);
            out.push_str(inner);
            out.push_str(DIV_CLOSE_TAG);
        }
        Some(SourceMarkup::Bare) => out.push_str(block.content()),
        None => {
            out.push_str(&open_tag(block.block_type()));
            out.push_str(render_inner(block.content()));
            out.push_str(DIV_CLOSE_TAG);
        }
    }
    out.push_str(&block.trailing);
}

/// Verbatim markup to keep for a parsed element, or `None` when the
/// canonical rendering already reproduces it.
pub(crate) fn source_markup(element: &ParsedElement) -> Option<SourceMarkup> {
    let canonical_open = open_tag(element.block_type());
    if canonical_open == element.open_tag && render_inner(element.content()) == element.inner {
        None
    } else {
        Some(SourceMarkup::Element {
            open_tag: element.open_tag.clone(),
            inner: element.inner.clone(),
        })
    }
}

/// Split a rendered surface into its top-level block elements.
pub fn parse_surface(raw: &str) -> Result<ParsedSurface, MarkupError> {
    if raw.trim().is_empty() {
        return Err(MarkupError::Empty);
    }

    let mut leading = String::new();
    let mut elements: Vec<ParsedElement> = Vec::new();
    let mut pos = 0;

    loop {
        let next = find_div_open(raw, pos);
        let gap_end = next.unwrap_or(raw.len());
        let gap = &raw[pos..gap_end];
        if let Some(stray) = find_tag(gap, DIV_CLOSE, 0) {
            return Err(MarkupError::UnbalancedDiv { offset: pos + stray });
        }
        match elements.last_mut() {
            Some(last) => last.trailing.push_str(gap),
            None => leading.push_str(gap),
        }

        let Some(start) = next else { break };
        let open_end = tag_end(raw, start)?;
        let (close_start, close_end) = matching_close(raw, start, open_end)?;
        elements.push(ParsedElement {
            open_tag: raw[start..open_end].into(),
            inner: raw[open_end..close_start].into(),
            trailing: String::new(),
        });
        pos = close_end;
    }

    if elements.is_empty() {
        return Err(MarkupError::NoBlocks);
    }

    Ok(ParsedSurface { leading, elements })
}

/// Position of the next `<div` tag at or after `from`
fn find_div_open(raw: &str, from: usize) -> Option<usize> {
    find_tag(raw, DIV_OPEN, from)
}

/// Position of the next `marker` at or after `from` that is followed by a
/// tag boundary
fn find_tag(raw: &str, marker: &str, from: usize) -> Option<usize> {
    let mut search = from;
    while let Some(found) = raw[search..].find(marker) {
        let start = search + found;
        let after = start + marker.len();
        match raw.as_bytes().get(after) {
            Some(b'>') | Some(b'/') => return Some(start),
            Some(b) if b.is_ascii_whitespace() => return Some(start),
            // `<divider>` and friends are not divs
            _ => search = after,
        }
    }
    None
}

/// Index just past the `>` closing the tag that starts at `start`.
/// Quoted attribute values may contain `>`.
fn tag_end(raw: &str, start: usize) -> Result<usize, MarkupError> {
    let mut quote: Option<u8> = None;
    for (i, &b) in raw.as_bytes()[start..].iter().enumerate() {
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'>' => return Ok(start + i + 1),
                _ => {}
            },
        }
    }
    Err(MarkupError::UnterminatedTag { offset: start })
}

/// Returns (start of `</div`, end of `</div>`) for the element opened at `start`
fn matching_close(raw: &str, start: usize, open_end: usize) -> Result<(usize, usize), MarkupError> {
    let mut depth = 1usize;
    let mut pos = open_end;
    loop {
        let close = find_tag(raw, DIV_CLOSE, pos)
            .ok_or(MarkupError::UnbalancedDiv { offset: start })?;
        match find_div_open(raw, pos) {
            Some(nested) if nested < close => {
                depth += 1;
                pos = tag_end(raw, nested)?;
            }
            _ => {
                let close_end = tag_end(raw, close)?;
                depth -= 1;
                if depth == 0 {
                    return Ok((close, close_end));
                }
                pos = close_end;
            }
        }
    }
}

/// Value of attribute `name` in an opening tag
fn attribute_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let bytes = tag.as_bytes();
    let mut search = 0;
    while let Some(found) = tag[search..].find(name) {
        let start = search + found;
        search = start + name.len();

        let preceded_by_space = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !preceded_by_space {
            continue;
        }

        let rest = tag[search..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            continue;
        };
        let rest = rest.trim_start();
        return match rest.as_bytes().first() {
            Some(&q) if q == b'"' || q == b'\'' => {
                let body = &rest[1..];
                body.find(q as char).map(|end| &body[..end])
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                    .unwrap_or(rest.len());
                Some(&rest[..end])
            }
        };
    }
    None
}
