//! # Site Tree
//!
//! Owns the root node and provides id lookups, ancestry queries, canonical
//! serialization and structural validation.
//!
//! Serialization is deterministic: struct field order is fixed and children
//! keep insertion order, so identical trees always produce identical text.
//! The undo stack relies on this to skip zero-change snapshots.

use crate::error::{TreeError, TreeResult};
use crate::node::{Node, NodeKind, Position};
use crate::resolver::{expected_anchors, resolve_all, resolve_children};
use std::collections::HashSet;
use std::fmt;

/// Conventional id of the root container
pub const ROOT_ID: &str = "whole-page";

/// Conventional id of the head node
pub const HEAD_ID: &str = "head-content";

/// Id of the preview element the page is mounted into
///
/// Trees produced by the deterministic decomposer anchor the root's first
/// html child here instead of at the root id.
pub const PREVIEW_MOUNT_ID: &str = "website-preview";

/// The component tree
#[derive(Debug, Clone, PartialEq)]
pub struct SiteTree {
    root: Node,
}

/// A node together with its immediate parent (`None` for the root)
#[derive(Debug, Clone, Copy)]
pub struct NodeWithParent<'a> {
    pub node: &'a Node,
    pub parent: Option<&'a Node>,
}

/// A broken structural invariant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    NonContainerRoot(NodeKind),
    EmptyId { parent_id: String },
    DuplicateId(String),
    MultipleHeads(usize),
    BrokenChain {
        parent_id: String,
        node_id: String,
        expected_selector: String,
        expected_position: Position,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NonContainerRoot(kind) => {
                write!(f, "root node must be a container, found {}", kind)
            }
            Violation::EmptyId { parent_id } => {
                write!(f, "node without id under '{}'", parent_id)
            }
            Violation::DuplicateId(id) => write!(f, "duplicate node id '{}'", id),
            Violation::MultipleHeads(count) => write!(f, "{} head nodes (at most one allowed)", count),
            Violation::BrokenChain {
                parent_id,
                node_id,
                expected_selector,
                expected_position,
            } => write!(
                f,
                "'{}' under '{}' should be anchored {} {}",
                node_id, parent_id, expected_position, expected_selector
            ),
        }
    }
}

impl SiteTree {
    /// Wrap a root node; the root must be a container
    pub fn new(root: Node) -> TreeResult<Self> {
        if root.kind != NodeKind::Container {
            return Err(TreeError::InvalidRoot(root.kind));
        }
        Ok(Self { root })
    }

    /// A tree holding only the `whole-page` container
    pub fn empty() -> Self {
        Self {
            root: Node::container(ROOT_ID).with_description("The whole generated page"),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.root.find(id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.root.find_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Locate a node and its immediate parent
    pub fn find_with_parent(&self, id: &str) -> Option<NodeWithParent<'_>> {
        if self.root.id == id {
            return Some(NodeWithParent {
                node: &self.root,
                parent: None,
            });
        }
        find_with_parent_in(&self.root, id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&Node> {
        self.find_with_parent(id).and_then(|found| found.parent)
    }

    /// Nodes from the root down to (and including) `id`
    pub fn path_to(&self, id: &str) -> Option<Vec<&Node>> {
        let mut path = Vec::new();
        if path_to_in(&self.root, id, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    /// Ancestor ids of `id`, nearest first
    pub fn ancestor_ids(&self, id: &str) -> Vec<&str> {
        let mut path = self.path_to(id).unwrap_or_default();
        path.pop();
        path.iter().rev().map(|n| n.id.as_str()).collect()
    }

    /// Whether `id` lies strictly below `ancestor_id`
    pub fn is_descendant(&self, ancestor_id: &str, id: &str) -> bool {
        self.ancestor_ids(id).contains(&ancestor_id)
    }

    /// All ids in pre-order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.root.walk(&mut |n| ids.push(n.id.as_str()));
        ids
    }

    pub fn count(&self) -> usize {
        self.root.subtree_len()
    }

    /// The first head node, if any
    pub fn head(&self) -> Option<&Node> {
        let mut head = None;
        self.root.walk(&mut |n| {
            if head.is_none() && n.kind == NodeKind::Head {
                head = Some(n);
            }
        });
        head
    }

    /// Re-resolve the insertion chain under one parent
    pub fn resolve(&mut self, parent_id: &str) -> TreeResult<()> {
        let parent = self
            .find_mut(parent_id)
            .ok_or_else(|| TreeError::NodeNotFound(parent_id.to_string()))?;
        resolve_children(parent);
        Ok(())
    }

    /// Re-resolve every insertion chain in the tree
    pub fn resolve_all(&mut self) {
        resolve_all(&mut self.root);
    }

    /// Canonical compact text form
    pub fn serialize(&self) -> TreeResult<String> {
        Ok(serde_json::to_string(&self.root)?)
    }

    /// Indented text form used for `project.json`
    pub fn serialize_pretty(&self) -> TreeResult<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn deserialize(text: &str) -> TreeResult<Self> {
        let root: Node = serde_json::from_str(text)?;
        Self::new(root)
    }

    /// Check every structural invariant, returning all violations found
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.root.kind != NodeKind::Container {
            violations.push(Violation::NonContainerRoot(self.root.kind));
        }

        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut heads = 0;
        let mount_selector = format!("#{}", PREVIEW_MOUNT_ID);
        self.root.walk(&mut |node| {
            if node.kind == NodeKind::Head {
                heads += 1;
            }
            if !node.id.is_empty() && !seen.insert(node.id.as_str()) && reported.insert(node.id.as_str()) {
                violations.push(Violation::DuplicateId(node.id.clone()));
            }
            for child in &node.children {
                if child.id.is_empty() {
                    violations.push(Violation::EmptyId {
                        parent_id: node.id.clone(),
                    });
                }
            }
            let is_root = std::ptr::eq(node, &self.root);
            for anchor in expected_anchors(node) {
                let Some(child) = node.children.iter().find(|c| c.id == anchor.node_id) else {
                    continue;
                };
                let selector = child.selector.as_deref();
                let mounted = is_root
                    && anchor.position == Position::BeforeEnd
                    && child.position == Some(Position::BeforeEnd)
                    && selector == Some(mount_selector.as_str());
                if !mounted
                    && (selector != Some(anchor.selector.as_str())
                        || child.position != Some(anchor.position))
                {
                    violations.push(Violation::BrokenChain {
                        parent_id: node.id.clone(),
                        node_id: anchor.node_id,
                        expected_selector: anchor.selector,
                        expected_position: anchor.position,
                    });
                }
            }
        });

        if heads > 1 {
            violations.push(Violation::MultipleHeads(heads));
        }

        violations
    }
}

impl Default for SiteTree {
    fn default() -> Self {
        Self::empty()
    }
}

fn find_with_parent_in<'a>(parent: &'a Node, id: &str) -> Option<NodeWithParent<'a>> {
    for child in &parent.children {
        if child.id == id {
            return Some(NodeWithParent {
                node: child,
                parent: Some(parent),
            });
        }
        if let Some(found) = find_with_parent_in(child, id) {
            return Some(found);
        }
    }
    None
}

fn path_to_in<'a>(node: &'a Node, id: &str, path: &mut Vec<&'a Node>) -> bool {
    path.push(node);
    if node.id == id {
        return true;
    }
    for child in &node.children {
        if path_to_in(child, id, path) {
            return true;
        }
    }
    path.pop();
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SiteTree {
        let mut root = Node::container(ROOT_ID)
            .with_child(Node::new(HEAD_ID, NodeKind::Head).with_code("<title>T</title>"))
            .with_child(
                Node::html("hero", r#"<section id="hero"></section>"#)
                    .with_child(Node::html("title", r#"<h1 id="title">Hi</h1>"#)),
            )
            .with_child(Node::html("about", r#"<section id="about"></section>"#))
            .with_child(Node::css("styles", "h1{color:red}"));
        resolve_all(&mut root);
        SiteTree::new(root).unwrap()
    }

    #[test]
    fn test_root_must_be_container() {
        let result = SiteTree::new(Node::html("x", "<p></p>"));
        assert!(matches!(result, Err(TreeError::InvalidRoot(NodeKind::Html))));
    }

    #[test]
    fn test_find_with_parent() {
        let tree = sample();

        let root = tree.find_with_parent(ROOT_ID).unwrap();
        assert!(root.parent.is_none());

        let title = tree.find_with_parent("title").unwrap();
        assert_eq!(title.node.id, "title");
        assert_eq!(title.parent.map(|p| p.id.as_str()), Some("hero"));

        assert!(tree.find_with_parent("nope").is_none());
    }

    #[test]
    fn test_ancestry() {
        let tree = sample();
        assert_eq!(tree.ancestor_ids("title"), vec!["hero", ROOT_ID]);
        assert!(tree.is_descendant("hero", "title"));
        assert!(!tree.is_descendant("title", "hero"));
        assert!(!tree.is_descendant("hero", "hero"));
    }

    #[test]
    fn test_clone_is_independent() {
        let tree = sample();
        let mut copy = tree.clone();
        copy.find_mut("title").unwrap().code = "<h1 id=\"title\">Changed</h1>".into();

        assert_eq!(tree.find("title").unwrap().code, r#"<h1 id="title">Hi</h1>"#);
        assert_ne!(tree, copy);
    }

    #[test]
    fn test_serialize_is_deterministic_and_round_trips() {
        let tree = sample();
        let first = tree.serialize().unwrap();
        let second = tree.clone().serialize().unwrap();
        assert_eq!(first, second);

        let restored = SiteTree::deserialize(&first).unwrap();
        assert_eq!(restored, tree);
        assert_eq!(restored.serialize().unwrap(), first);
    }

    #[test]
    fn test_validate_clean_tree() {
        assert!(sample().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_violations() {
        let root = Node::container(ROOT_ID)
            .with_child(Node::new("h1", NodeKind::Head))
            .with_child(Node::new("h2", NodeKind::Head))
            .with_child(Node::html("dup", "<p id=\"dup\"></p>"))
            .with_child(Node::css("dup", ""));
        let tree = SiteTree::new(root).unwrap();

        let violations = tree.validate();
        assert!(violations.contains(&Violation::DuplicateId("dup".into())));
        assert!(violations.contains(&Violation::MultipleHeads(2)));
        assert!(violations
            .iter()
            .any(|v| matches!(v, Violation::BrokenChain { node_id, .. } if node_id == "dup")));
    }

    #[test]
    fn test_validate_accepts_preview_mount_on_root() {
        let mut first = Node::html("a", "<p id=\"a\"></p>");
        first.selector = Some(format!("#{}", PREVIEW_MOUNT_ID));
        first.position = Some(Position::BeforeEnd);
        let mut second = Node::html("b", "<p id=\"b\"></p>");
        second.selector = Some("#a".into());
        second.position = Some(Position::AfterEnd);

        let tree = SiteTree::new(Node::container(ROOT_ID).with_child(first).with_child(second)).unwrap();
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn test_head_and_ids() {
        let tree = sample();
        assert_eq!(tree.head().map(|h| h.id.as_str()), Some(HEAD_ID));
        assert_eq!(tree.ids(), vec![ROOT_ID, HEAD_ID, "hero", "title", "about", "styles"]);
        assert_eq!(tree.count(), 6);
    }
}
