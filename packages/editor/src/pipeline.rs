//! # Rendering Pipeline
//!
//! Tree → Bundle → changed files
//!
//! The Pipeline manages:
//! - Rendering the bundle after each change
//! - Diffing against the previous bundle
//! - Writing only changed files to the store

use crate::errors::EditorError;
use sitegen_common::{ProjectStore, StoreError};
use sitegen_compiler_html::{build_bundle, Bundle, CompileOptions, INDEX_FILE};
use sitegen_tree::SiteTree;

/// Manages the tree → output render step
#[derive(Debug, Default)]
pub struct Pipeline {
    options: CompileOptions,
    last_bundle: Option<Bundle>,
    /// Baseline the last render diffed against
    previous_bundle: Option<Bundle>,
}

impl Pipeline {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            last_bundle: None,
            previous_bundle: None,
        }
    }

    /// Render the tree and report what changed since the last render
    pub fn render(&mut self, tree: &SiteTree, version: u64) -> Result<PipelineResult, EditorError> {
        let bundle = build_bundle(tree, &self.options)?;

        let (changed, removed) = match &self.last_bundle {
            Some(previous) => diff_bundles(previous, &bundle),
            None => (bundle.paths().iter().map(|p| p.to_string()).collect(), Vec::new()),
        };

        self.previous_bundle = self.last_bundle.replace(bundle.clone());
        Ok(PipelineResult {
            version,
            bundle,
            changed,
            removed,
        })
    }

    /// Last rendered bundle (if any)
    pub fn last_bundle(&self) -> Option<&Bundle> {
        self.last_bundle.as_ref()
    }

    /// Forget the previous bundle so the next render reports every file
    pub fn clear_cache(&mut self) {
        self.last_bundle = None;
        self.previous_bundle = None;
    }

    /// Drop the last render as a baseline when its files never reached the store
    ///
    /// The next render diffs against the bundle before it, so the changes
    /// of the discarded render are reported again.
    pub fn rewind(&mut self) {
        self.last_bundle = self.previous_bundle.take();
    }
}

/// Result of one render
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Document version that was rendered
    pub version: u64,

    pub bundle: Bundle,

    /// Paths that are new or whose content changed
    pub changed: Vec<String>,

    /// Paths present in the previous render but not this one
    pub removed: Vec<String>,
}

impl PipelineResult {
    /// The composite document
    pub fn html(&self) -> &str {
        self.bundle.get(INDEX_FILE).unwrap_or_default()
    }

    /// Write changed files and delete removed ones
    pub fn persist(&self, store: &dyn ProjectStore, project_id: &str) -> Result<(), EditorError> {
        for path in &self.changed {
            if let Some(content) = self.bundle.get(path) {
                store.save_text(project_id, path, content)?;
            }
        }
        for path in &self.removed {
            match store.delete_file(project_id, path) {
                Ok(()) | Err(StoreError::NotFound { .. }) => {}
                Err(error) => return Err(error.into()),
            }
        }
        tracing::debug!(
            project_id,
            written = self.changed.len(),
            deleted = self.removed.len(),
            "persisted bundle"
        );
        Ok(())
    }
}

fn diff_bundles(previous: &Bundle, next: &Bundle) -> (Vec<String>, Vec<String>) {
    let changed = next
        .files
        .iter()
        .filter(|file| previous.get(&file.path) != Some(file.content.as_str()))
        .map(|file| file.path.clone())
        .collect();
    let removed = previous
        .files
        .iter()
        .filter(|file| next.get(&file.path).is_none())
        .map(|file| file.path.clone())
        .collect();
    (changed, removed)
}
