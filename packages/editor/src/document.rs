//! # Document Handle
//!
//! The owned tree of one project plus a version counter.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Edit → Render → Persist
//!   ↓      ↓       ↓        ↓
//! project.json  Mutations  Bundle  Store
//! ```
//!
//! Mutations are applied to a draft copy and swapped in only on success, so
//! a failed mutation never leaves the tree half-edited. The version
//! increments on every successful change and doubles as the generation
//! counter async flows compare against.

use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationError};
use crate::post_effects::PostEffectEngine;
use sitegen_common::ProjectStore;
use sitegen_compiler_html::PROJECT_FILE;
use sitegen_tree::SiteTree;

/// Editable project document
#[derive(Debug, Clone)]
pub struct Document {
    pub project_id: String,

    /// Current version number (increments on each change)
    pub version: u64,

    tree: SiteTree,
}

impl Document {
    pub fn new(project_id: impl Into<String>, tree: SiteTree) -> Self {
        Self {
            project_id: project_id.into(),
            version: 0,
            tree,
        }
    }

    /// Load `project.json` from the store
    pub fn load(store: &dyn ProjectStore, project_id: &str) -> Result<Self, EditorError> {
        let text = store.read_text(project_id, PROJECT_FILE)?;
        Ok(Self::new(project_id, SiteTree::deserialize(&text)?))
    }

    pub fn tree(&self) -> &SiteTree {
        &self.tree
    }

    /// Mutable access for history restores; bumps the version
    pub(crate) fn tree_mut(&mut self) -> &mut SiteTree {
        self.version += 1;
        &mut self.tree
    }

    /// Apply a mutation and its post-effects
    pub fn apply(&mut self, mutation: &Mutation, effects: &PostEffectEngine) -> Result<u64, MutationError> {
        let mut draft = self.tree.clone();
        effects.apply_with_effects(mutation, &mut draft)?;

        self.tree = draft;
        self.version += 1;
        Ok(self.version)
    }

    /// Swap in a whole new tree
    pub fn replace_tree(&mut self, tree: SiteTree) -> u64 {
        self.tree = tree;
        self.version += 1;
        self.version
    }
}
