//! # Nodes
//!
//! A node is one typed contribution to the generated page. The JSON shape is
//! the wire format shared with the generation backend and the persisted
//! `project.json`:
//!
//! ```json
//! { "id": "hero", "type": "html", "description": "Landing banner",
//!   "code": "<section id=\"hero\"></section>", "children": [],
//!   "selector": "#whole-page", "position": "beforeend" }
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Closed set of node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Grouping node; its content is its children
    Container,
    /// `<meta>`/`<title>`/`<link>` markup for the document head
    Head,
    /// Markup fragment placed through the insertion chain
    Html,
    /// Stylesheet text
    Css,
    /// Global-scope script text
    Javascript,
    /// A single top-level function declaration
    JsFunction,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Container => "container",
            NodeKind::Head => "head",
            NodeKind::Html => "html",
            NodeKind::Css => "css",
            NodeKind::Javascript => "javascript",
            NodeKind::JsFunction => "js-function",
        }
    }

    /// Kinds that may receive children through structural edits
    pub fn accepts_children(&self) -> bool {
        matches!(self, NodeKind::Container | NodeKind::Html)
    }

    /// Kinds that contribute to the aggregated script buffer
    pub fn is_script(&self) -> bool {
        matches!(self, NodeKind::Javascript | NodeKind::JsFunction)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// DOM insertion position relative to the selector target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Insert as last child of the target
    #[serde(rename = "beforeend")]
    BeforeEnd,
    /// Insert as next sibling of the target
    #[serde(rename = "afterend")]
    AfterEnd,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::BeforeEnd => "beforeend",
            Position::AfterEnd => "afterend",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the component tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique identifier; empty only for not-yet-validated input
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Natural-language summary used to drive regeneration
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Node>,

    /// Insertion anchor (html nodes only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

/// Generation backends emit `null` where an empty value is meant
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            description: String::new(),
            code: String::new(),
            children: Vec::new(),
            selector: None,
            position: None,
        }
    }

    pub fn container(id: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Container)
    }

    pub fn html(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Html).with_code(code)
    }

    pub fn css(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self::new(id, NodeKind::Css).with_code(code)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is_html(&self) -> bool {
        self.kind == NodeKind::Html
    }

    /// Depth-first search of this node and its descendants
    pub fn find(&self, id: &str) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Pre-order walk over this node and all descendants
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Pre-order walk that also yields each node's depth (self = 0)
    pub fn walk_with_depth<'a>(&'a self, depth: usize, f: &mut impl FnMut(&'a Node, usize)) {
        f(self, depth);
        for child in &self.children {
            child.walk_with_depth(depth + 1, f);
        }
    }

    /// Number of nodes in this subtree, self included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Index of a direct child by id
    pub fn child_index(&self, id: &str) -> Option<usize> {
        self.children.iter().position(|c| c.id == id)
    }
}
