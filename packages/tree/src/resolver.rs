//! # Insertion Chain Resolver
//!
//! Recomputes `selector`/`position` for the `html` children of a parent so
//! the generator can place them in authoring order:
//!
//! ```text
//! parent "main"
//!  ├── a (html)  → #main   beforeend
//!  ├── s (css)      (ignored)
//!  ├── b (html)  → #<id attr of a>  afterend
//!  └── c (html)  → #<id attr of b>  afterend
//! ```
//!
//! Only `html` siblings count toward chain position. The anchor of a sibling
//! is the `id="..."` attribute found in its code; when the markup carries no
//! id the node id is used instead and a warning is logged, since nothing
//! guarantees an element with that id exists in the rendered DOM.

use crate::node::{Node, Position};

/// A computed insertion anchor for one html node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub node_id: String,
    pub selector: String,
    pub position: Position,
}

/// Re-resolve the insertion chain of a parent's direct children
pub fn resolve_children(parent: &mut Node) {
    let Node { id, children, .. } = parent;
    resolve_siblings(id.as_str(), children);
}

/// Re-resolve a sibling list whose first html member anchors to `#parent_anchor`
pub fn resolve_siblings(parent_anchor: &str, siblings: &mut [Node]) {
    let mut previous: Option<String> = None;

    for node in siblings.iter_mut().filter(|n| n.is_html()) {
        let (selector, position) = match &previous {
            None => (format!("#{}", parent_anchor), Position::BeforeEnd),
            Some(anchor) => (format!("#{}", anchor), Position::AfterEnd),
        };
        node.selector = Some(selector);
        node.position = Some(position);
        previous = Some(anchor_of(node, true));
    }
}

/// Re-resolve every parent in the subtree
pub fn resolve_all(node: &mut Node) {
    resolve_children(node);
    for child in &mut node.children {
        resolve_all(child);
    }
}

/// The anchors a correctly resolved parent would carry, in sibling order
pub fn expected_anchors(parent: &Node) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let mut previous: Option<String> = None;

    for node in parent.children.iter().filter(|n| n.is_html()) {
        let (selector, position) = match &previous {
            None => (format!("#{}", parent.id), Position::BeforeEnd),
            Some(anchor) => (format!("#{}", anchor), Position::AfterEnd),
        };
        anchors.push(Anchor {
            node_id: node.id.clone(),
            selector,
            position,
        });
        previous = Some(anchor_of(node, false));
    }

    anchors
}

fn anchor_of(node: &Node, warn: bool) -> String {
    match extract_id_attribute(&node.code) {
        Some(id) => id.to_string(),
        None => {
            if warn {
                tracing::warn!(
                    node_id = %node.id,
                    "html node has no id attribute; anchoring next sibling to node id"
                );
            }
            node.id.clone()
        }
    }
}

/// Find the first `id="..."` (or `id='...'`) attribute in a markup fragment
///
/// Attribute names merely ending in `id` (`data-id`, `grid`) are skipped.
pub fn extract_id_attribute(code: &str) -> Option<&str> {
    let bytes = code.as_bytes();
    let mut search = 0;

    while let Some(offset) = code[search..].find("id") {
        let start = search + offset;
        search = start + 2;

        let preceded_ok = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !preceded_ok {
            continue;
        }

        let mut cursor = start + 2;
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= bytes.len() || bytes[cursor] != b'=' {
            continue;
        }
        cursor += 1;
        while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
            cursor += 1;
        }
        if cursor >= bytes.len() {
            return None;
        }

        let quote = bytes[cursor];
        if quote != b'"' && quote != b'\'' {
            continue;
        }
        let value_start = cursor + 1;
        let value_end = code[value_start..].find(quote as char)? + value_start;
        let value = &code[value_start..value_end];
        if !value.is_empty() {
            return Some(value);
        }
    }

    None
}
