//! # Post-Effect System
//!
//! Secondary work that keeps the tree consistent after a mutation has been
//! applied. Effects run in registration order on the same draft tree the
//! mutation was applied to.

use crate::mutations::Mutation;
use sitegen_tree::{NodeKind, SiteTree};

/// Post-effect that runs after a successful mutation
pub trait PostEffect: std::fmt::Debug + Send + Sync {
    fn apply(&self, mutation: &Mutation, tree: &mut SiteTree);
}

/// Re-resolve a parent when an html node's code changes
///
/// The next sibling is anchored to this node's `id` attribute, so editing
/// the markup can silently break the chain.
#[derive(Debug)]
pub struct ReanchorEditedMarkup;

impl PostEffect for ReanchorEditedMarkup {
    fn apply(&self, mutation: &Mutation, tree: &mut SiteTree) {
        let Mutation::UpdateNode {
            node_id,
            code: Some(_),
            ..
        } = mutation
        else {
            return;
        };

        let parent_id = match tree.find_with_parent(node_id) {
            Some(found) if found.node.kind == NodeKind::Html => found.parent.map(|p| p.id.clone()),
            _ => None,
        };
        if let Some(parent_id) = parent_id {
            if let Err(error) = tree.resolve(&parent_id) {
                tracing::warn!(%error, "could not re-anchor after code edit");
            }
        }
    }
}

/// Log structural violations left behind by a mutation
#[derive(Debug)]
pub struct AuditStructure;

impl PostEffect for AuditStructure {
    fn apply(&self, mutation: &Mutation, tree: &mut SiteTree) {
        for violation in tree.validate() {
            tracing::warn!(mutation = %mutation.label(), %violation, "tree invariant broken");
        }
    }
}

/// Post-effect engine that applies all registered effects
#[derive(Debug)]
pub struct PostEffectEngine {
    effects: Vec<Box<dyn PostEffect>>,
}

impl PostEffectEngine {
    /// Create engine with default effects
    pub fn new() -> Self {
        Self {
            effects: vec![Box::new(ReanchorEditedMarkup), Box::new(AuditStructure)],
        }
    }

    pub fn empty() -> Self {
        Self { effects: Vec::new() }
    }

    pub fn with_effect(mut self, effect: impl PostEffect + 'static) -> Self {
        self.effects.push(Box::new(effect));
        self
    }

    /// Apply a mutation followed by every effect
    pub fn apply_with_effects(
        &self,
        mutation: &Mutation,
        tree: &mut SiteTree,
    ) -> Result<(), crate::MutationError> {
        mutation.apply(tree)?;
        for effect in &self.effects {
            effect.apply(mutation, tree);
        }
        Ok(())
    }
}

impl Default for PostEffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitegen_tree::{Node, ROOT_ID};

    fn two_siblings() -> SiteTree {
        let root = Node::container(ROOT_ID)
            .with_child(Node::html("a", r#"<div id="a"></div>"#))
            .with_child(Node::html("b", r#"<div id="b"></div>"#));
        let mut tree = SiteTree::new(root).unwrap();
        tree.resolve_all();
        tree
    }

    #[test]
    fn test_post_effect_engine_creation() {
        let engine = PostEffectEngine::new();
        assert_eq!(engine.effects.len(), 2);
    }

    #[test]
    fn test_code_edit_re_anchors_next_sibling() {
        let mut tree = two_siblings();
        let mutation = Mutation::UpdateNode {
            node_id: "a".into(),
            description: None,
            code: Some(r#"<div id="intro"></div>"#.into()),
        };

        PostEffectEngine::new()
            .apply_with_effects(&mutation, &mut tree)
            .unwrap();

        assert_eq!(tree.find("b").unwrap().selector.as_deref(), Some("#intro"));
        assert!(tree.validate().is_empty());
    }

    #[test]
    fn test_without_effects_chain_goes_stale() {
        let mut tree = two_siblings();
        let mutation = Mutation::UpdateNode {
            node_id: "a".into(),
            description: None,
            code: Some(r#"<div id="intro"></div>"#.into()),
        };

        PostEffectEngine::empty()
            .apply_with_effects(&mutation, &mut tree)
            .unwrap();

        assert_eq!(tree.find("b").unwrap().selector.as_deref(), Some("#a"));
        assert!(!tree.validate().is_empty());
    }
}
