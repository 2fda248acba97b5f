//! # Tree Mutations
//!
//! Structural edits on the component tree.
//!
//! ## Mutation Semantics
//!
//! ### UpdateNode
//! - Replaces description and/or code of a non-container node
//! - Containers change only through `ReplaceChildren`
//!
//! ### CreateNode
//! - Parent must be a container or html node
//! - Every id in the new subtree must be non-empty and unused tree-wide
//!
//! ### MoveNode
//! - Fails if the target lies inside the source (cycle)
//! - Source and destination parents are both re-resolved; one pass when
//!   they are the same node
//!
//! ### DeleteNode
//! - Removes the node and all descendants; the root cannot be deleted
//!
//! ### ReplaceChildren
//! - Destructive regeneration of a container's children, no merging
//!
//! Every mutation validates fully before touching the tree.

use serde::{Deserialize, Serialize};
use sitegen_tree::{resolve_all, resolve_children, Node, NodeKind, SiteTree};
use std::collections::HashSet;
use thiserror::Error;

/// Where a created node goes among its parent's children
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    #[default]
    Append,
    Before(String),
    After(String),
}

/// Where a moved node goes relative to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePosition {
    Before,
    After,
    Inside,
}

/// A single logical edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Mutation {
    UpdateNode {
        node_id: String,
        description: Option<String>,
        code: Option<String>,
    },

    CreateNode {
        parent_id: String,
        node: Node,
        #[serde(default)]
        position: InsertPosition,
    },

    DeleteNode {
        node_id: String,
    },

    MoveNode {
        source_id: String,
        target_id: String,
        position: MovePosition,
    },

    /// Replace a container's children wholesale
    ReplaceChildren {
        parent_id: String,
        children: Vec<Node>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Parent not found: {0}")]
    ParentNotFound(String),

    #[error("Sibling '{sibling_id}' is not a child of '{parent_id}'")]
    SiblingNotFound { parent_id: String, sibling_id: String },

    #[error("New node has no id")]
    MissingId,

    #[error("Id already exists in the tree: {0}")]
    DuplicateId(String),

    #[error("'{parent_id}' is a {kind} node and cannot take children")]
    InvalidParent { parent_id: String, kind: NodeKind },

    #[error("Moving '{source_id}' relative to '{target_id}' would create a cycle")]
    CycleDetected { source_id: String, target_id: String },

    #[error("The root node cannot be deleted")]
    CannotDeleteRoot,

    #[error("The root node cannot be moved")]
    CannotMoveRoot,

    #[error("Container '{0}' is changed by regenerating its children, not by update")]
    ContainerUpdate(String),

    #[error("'{0}' is not a container")]
    NotContainer(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}

impl Mutation {
    /// Short human-readable label used for history entries
    pub fn label(&self) -> String {
        match self {
            Mutation::UpdateNode { node_id, .. } => format!("Update {}", node_id),
            Mutation::CreateNode { node, .. } => format!("Create {}", node.id),
            Mutation::DeleteNode { node_id } => format!("Delete {}", node_id),
            Mutation::MoveNode { source_id, .. } => format!("Move {}", source_id),
            Mutation::ReplaceChildren { parent_id, .. } => format!("Regenerate {}", parent_id),
        }
    }

    /// Apply mutation to the tree with validation
    pub fn apply(&self, tree: &mut SiteTree) -> Result<(), MutationError> {
        self.validate(tree)?;

        match self {
            Mutation::UpdateNode {
                node_id,
                description,
                code,
            } => Self::apply_update(tree, node_id, description.as_deref(), code.as_deref()),

            Mutation::CreateNode {
                parent_id,
                node,
                position,
            } => Self::apply_create(tree, parent_id, node, position),

            Mutation::DeleteNode { node_id } => {
                let (_, parent_id) = Self::detach(tree, node_id)?;
                Self::resolve(tree, &parent_id)
            }

            Mutation::MoveNode {
                source_id,
                target_id,
                position,
            } => Self::apply_move(tree, source_id, target_id, *position),

            Mutation::ReplaceChildren { parent_id, children } => {
                let parent = tree
                    .find_mut(parent_id)
                    .ok_or_else(|| MutationError::NodeNotFound(parent_id.clone()))?;
                parent.children = children.clone();
                resolve_all(parent);
                Ok(())
            }
        }
    }

    fn apply_update(
        tree: &mut SiteTree,
        node_id: &str,
        description: Option<&str>,
        code: Option<&str>,
    ) -> Result<(), MutationError> {
        let node = tree
            .find_mut(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        if let Some(description) = description {
            node.description = description.to_string();
        }
        if let Some(code) = code {
            node.code = code.to_string();
        }
        Ok(())
    }

    fn apply_create(
        tree: &mut SiteTree,
        parent_id: &str,
        node: &Node,
        position: &InsertPosition,
    ) -> Result<(), MutationError> {
        let mut node = node.clone();
        resolve_all(&mut node);

        let parent = tree
            .find_mut(parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.to_string()))?;
        let index = Self::insert_index(parent, position)?;
        parent.children.insert(index, node);
        resolve_children(parent);
        Ok(())
    }

    fn apply_move(
        tree: &mut SiteTree,
        source_id: &str,
        target_id: &str,
        position: MovePosition,
    ) -> Result<(), MutationError> {
        let (node, old_parent_id) = Self::detach(tree, source_id)?;

        let new_parent_id = match position {
            MovePosition::Inside => target_id.to_string(),
            MovePosition::Before | MovePosition::After => tree
                .parent_of(target_id)
                .map(|p| p.id.clone())
                .ok_or_else(|| MutationError::ParentNotFound(target_id.to_string()))?,
        };

        let parent = tree
            .find_mut(&new_parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(new_parent_id.clone()))?;
        let index = match position {
            MovePosition::Inside => parent.children.len(),
            MovePosition::Before => Self::sibling_index(parent, target_id)?,
            MovePosition::After => Self::sibling_index(parent, target_id)? + 1,
        };
        parent.children.insert(index, node);
        resolve_children(parent);

        if old_parent_id != new_parent_id {
            Self::resolve(tree, &old_parent_id)?;
        }
        Ok(())
    }

    /// Remove a node from its parent without re-resolving
    fn detach(tree: &mut SiteTree, node_id: &str) -> Result<(Node, String), MutationError> {
        let parent_id = tree
            .parent_of(node_id)
            .map(|p| p.id.clone())
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;
        let parent = tree
            .find_mut(&parent_id)
            .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
        let index = parent
            .child_index(node_id)
            .ok_or_else(|| MutationError::NodeNotFound(node_id.to_string()))?;

        Ok((parent.children.remove(index), parent_id))
    }

    fn resolve(tree: &mut SiteTree, parent_id: &str) -> Result<(), MutationError> {
        tree.resolve(parent_id)
            .map_err(|_| MutationError::ParentNotFound(parent_id.to_string()))
    }

    fn insert_index(parent: &Node, position: &InsertPosition) -> Result<usize, MutationError> {
        match position {
            InsertPosition::Append => Ok(parent.children.len()),
            InsertPosition::Before(sibling) => Self::sibling_index(parent, sibling),
            InsertPosition::After(sibling) => Ok(Self::sibling_index(parent, sibling)? + 1),
        }
    }

    fn sibling_index(parent: &Node, sibling_id: &str) -> Result<usize, MutationError> {
        parent
            .child_index(sibling_id)
            .ok_or_else(|| MutationError::SiblingNotFound {
                parent_id: parent.id.clone(),
                sibling_id: sibling_id.to_string(),
            })
    }

    /// Validate without applying
    pub fn validate(&self, tree: &SiteTree) -> Result<(), MutationError> {
        match self {
            Mutation::UpdateNode { node_id, .. } => {
                let node = tree
                    .find(node_id)
                    .ok_or_else(|| MutationError::NodeNotFound(node_id.clone()))?;
                if node.kind == NodeKind::Container {
                    return Err(MutationError::ContainerUpdate(node_id.clone()));
                }
                Ok(())
            }

            Mutation::CreateNode {
                parent_id,
                node,
                position,
            } => {
                let parent = tree
                    .find(parent_id)
                    .ok_or_else(|| MutationError::ParentNotFound(parent_id.clone()))?;
                if !parent.kind.accepts_children() {
                    return Err(MutationError::InvalidParent {
                        parent_id: parent_id.clone(),
                        kind: parent.kind,
                    });
                }
                check_new_ids(std::iter::once(node), |id| tree.contains(id))?;
                Self::insert_index(parent, position)?;
                Ok(())
            }

            Mutation::DeleteNode { node_id } => {
                if *node_id == tree.root().id {
                    return Err(MutationError::CannotDeleteRoot);
                }
                if !tree.contains(node_id) {
                    return Err(MutationError::NodeNotFound(node_id.clone()));
                }
                Ok(())
            }

            Mutation::MoveNode {
                source_id,
                target_id,
                position,
            } => {
                if !tree.contains(source_id) {
                    return Err(MutationError::NodeNotFound(source_id.clone()));
                }
                let target = tree
                    .find(target_id)
                    .ok_or_else(|| MutationError::NodeNotFound(target_id.clone()))?;
                if *source_id == tree.root().id {
                    return Err(MutationError::CannotMoveRoot);
                }

                // Walk the target's ancestor chain looking for the source
                if source_id == target_id || tree.is_descendant(source_id, target_id) {
                    return Err(MutationError::CycleDetected {
                        source_id: source_id.clone(),
                        target_id: target_id.clone(),
                    });
                }

                match position {
                    MovePosition::Inside if !target.kind.accepts_children() => {
                        Err(MutationError::InvalidParent {
                            parent_id: target_id.clone(),
                            kind: target.kind,
                        })
                    }
                    MovePosition::Inside => Ok(()),
                    MovePosition::Before | MovePosition::After => tree
                        .parent_of(target_id)
                        .map(|_| ())
                        .ok_or_else(|| MutationError::ParentNotFound(target_id.clone())),
                }
            }

            Mutation::ReplaceChildren { parent_id, children } => {
                let parent = tree
                    .find(parent_id)
                    .ok_or_else(|| MutationError::NodeNotFound(parent_id.clone()))?;
                if parent.kind != NodeKind::Container {
                    return Err(MutationError::NotContainer(parent_id.clone()));
                }

                let mut replaced = HashSet::new();
                for child in &parent.children {
                    child.walk(&mut |n| {
                        replaced.insert(n.id.as_str());
                    });
                }
                check_new_ids(children, |id| tree.contains(id) && !replaced.contains(id))
            }
        }
    }
}

/// Every id in the new subtrees must be non-empty, unused and distinct
fn check_new_ids<'a>(
    nodes: impl IntoIterator<Item = &'a Node>,
    taken: impl Fn(&str) -> bool,
) -> Result<(), MutationError> {
    let mut seen = HashSet::new();
    let mut result = Ok(());

    for node in nodes {
        node.walk(&mut |n| {
            if result.is_err() {
                return;
            }
            if n.id.trim().is_empty() {
                result = Err(MutationError::MissingId);
            } else if taken(&n.id) || !seen.insert(n.id.as_str()) {
                result = Err(MutationError::DuplicateId(n.id.clone()));
            }
        });
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_tree::{Position, ROOT_ID};

    fn sample() -> SiteTree {
        let root = Node::container(ROOT_ID)
            .with_child(Node::html("a", r#"<div id="a"></div>"#))
            .with_child(
                Node::html("b", r#"<section id="b"></section>"#)
                    .with_child(Node::html("b1", r#"<p id="b1">one</p>"#)),
            )
            .with_child(Node::css("styles", "p{}"));
        let mut tree = SiteTree::new(root).unwrap();
        tree.resolve_all();
        tree
    }

    fn anchor(tree: &SiteTree, id: &str) -> (Option<String>, Option<Position>) {
        let node = tree.find(id).unwrap();
        (node.selector.clone(), node.position)
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::CreateNode {
            parent_id: ROOT_ID.to_string(),
            node: Node::css("extra", "a{}"),
            position: InsertPosition::After("a".to_string()),
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_update_node() {
        let mut tree = sample();
        Mutation::UpdateNode {
            node_id: "b1".into(),
            description: Some("First paragraph".into()),
            code: None,
        }
        .apply(&mut tree)
        .unwrap();

        let node = tree.find("b1").unwrap();
        assert_eq!(node.description, "First paragraph");
        assert_eq!(node.code, r#"<p id="b1">one</p>"#);
    }

    #[test]
    fn test_update_rejects_container_and_missing() {
        let mut tree = sample();
        let container = Mutation::UpdateNode {
            node_id: ROOT_ID.into(),
            description: Some("x".into()),
            code: None,
        };
        assert_eq!(
            container.apply(&mut tree),
            Err(MutationError::ContainerUpdate(ROOT_ID.into()))
        );

        let missing = Mutation::UpdateNode {
            node_id: "ghost".into(),
            description: None,
            code: Some("x".into()),
        };
        assert_eq!(
            missing.apply(&mut tree),
            Err(MutationError::NodeNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_create_before_sibling_re_resolves() {
        let mut tree = sample();
        Mutation::CreateNode {
            parent_id: ROOT_ID.into(),
            node: Node::html("new", r#"<nav id="new"></nav>"#),
            position: InsertPosition::Before("a".into()),
        }
        .apply(&mut tree)
        .unwrap();

        assert_eq!(tree.root().children[0].id, "new");
        assert_eq!(
            anchor(&tree, "new"),
            (Some(format!("#{}", ROOT_ID)), Some(Position::BeforeEnd))
        );
        assert_eq!(anchor(&tree, "a"), (Some("#new".into()), Some(Position::AfterEnd)));
    }

    #[test]
    fn test_create_validation() {
        let tree = sample();

        let under_css = Mutation::CreateNode {
            parent_id: "styles".into(),
            node: Node::html("x", "<p></p>"),
            position: InsertPosition::Append,
        };
        assert!(matches!(
            under_css.validate(&tree),
            Err(MutationError::InvalidParent { kind: NodeKind::Css, .. })
        ));

        let duplicate_deep = Mutation::CreateNode {
            parent_id: ROOT_ID.into(),
            node: Node::html("fresh", "<div></div>").with_child(Node::html("b1", "<p></p>")),
            position: InsertPosition::Append,
        };
        assert_eq!(
            duplicate_deep.validate(&tree),
            Err(MutationError::DuplicateId("b1".into()))
        );

        let no_id = Mutation::CreateNode {
            parent_id: ROOT_ID.into(),
            node: Node::html("", "<p></p>"),
            position: InsertPosition::Append,
        };
        assert_eq!(no_id.validate(&tree), Err(MutationError::MissingId));

        let bad_sibling = Mutation::CreateNode {
            parent_id: "b".into(),
            node: Node::html("fresh", "<p></p>"),
            position: InsertPosition::After("a".into()),
        };
        assert!(matches!(
            bad_sibling.validate(&tree),
            Err(MutationError::SiblingNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_repairs_chain() {
        let mut tree = sample();
        Mutation::DeleteNode {
            node_id: "a".into(),
        }
        .apply(&mut tree)
        .unwrap();

        assert!(!tree.contains("a"));
        assert_eq!(
            anchor(&tree, "b"),
            (Some(format!("#{}", ROOT_ID)), Some(Position::BeforeEnd))
        );
    }

    #[test]
    fn test_delete_root_rejected() {
        let mut tree = sample();
        let result = Mutation::DeleteNode {
            node_id: ROOT_ID.into(),
        }
        .apply(&mut tree);
        assert_eq!(result, Err(MutationError::CannotDeleteRoot));
    }

    #[test]
    fn test_move_inside_across_parents() {
        let mut tree = sample();
        Mutation::MoveNode {
            source_id: "a".into(),
            target_id: "b".into(),
            position: MovePosition::Inside,
        }
        .apply(&mut tree)
        .unwrap();

        assert_eq!(tree.parent_of("a").map(|p| p.id.as_str()), Some("b"));
        assert_eq!(anchor(&tree, "a"), (Some("#b1".into()), Some(Position::AfterEnd)));
        assert_eq!(
            anchor(&tree, "b"),
            (Some(format!("#{}", ROOT_ID)), Some(Position::BeforeEnd))
        );
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn test_move_after_within_parent() {
        let mut tree = sample();
        Mutation::MoveNode {
            source_id: "a".into(),
            target_id: "b".into(),
            position: MovePosition::After,
        }
        .apply(&mut tree)
        .unwrap();

        let order: Vec<&str> = tree.root().children.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "styles"]);
        assert_eq!(anchor(&tree, "a"), (Some("#b".into()), Some(Position::AfterEnd)));
    }

    #[test]
    fn test_move_into_descendant_is_cycle() {
        let mut tree = sample();
        let before = tree.clone();

        let result = Mutation::MoveNode {
            source_id: "b".into(),
            target_id: "b1".into(),
            position: MovePosition::Inside,
        }
        .apply(&mut tree);

        assert!(matches!(result, Err(MutationError::CycleDetected { .. })));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_move_beside_root_rejected() {
        let tree = sample();
        let result = Mutation::MoveNode {
            source_id: "a".into(),
            target_id: ROOT_ID.into(),
            position: MovePosition::Before,
        }
        .validate(&tree);
        assert_eq!(result, Err(MutationError::ParentNotFound(ROOT_ID.into())));
    }

    #[test]
    fn test_replace_children_allows_reusing_replaced_ids() {
        let mut tree = sample();
        tree.root_mut().children.push(
            Node::container("features").with_child(Node::html("card", r#"<div id="card"></div>"#)),
        );

        Mutation::ReplaceChildren {
            parent_id: "features".into(),
            children: vec![
                Node::html("card", r#"<div id="card">v2</div>"#),
                Node::html("card-2", r#"<div id="card-2"></div>"#),
            ],
        }
        .apply(&mut tree)
        .unwrap();

        assert_eq!(anchor(&tree, "card-2"), (Some("#card".into()), Some(Position::AfterEnd)));

        let clash = Mutation::ReplaceChildren {
            parent_id: "features".into(),
            children: vec![Node::html("a", "<p></p>")],
        };
        assert_eq!(clash.validate(&tree), Err(MutationError::DuplicateId("a".into())));

        let not_container = Mutation::ReplaceChildren {
            parent_id: "b".into(),
            children: vec![],
        };
        assert_eq!(
            not_container.validate(&tree),
            Err(MutationError::NotContainer("b".into()))
        );
    }
}
