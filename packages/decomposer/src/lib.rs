//! # Sitegen Decomposer
//!
//! Turns an HTML document back into a component tree. The assisted path asks
//! the generation backend for a hierarchical tree; whenever that fails for
//! any reason the deterministic html5ever path produces a flat tree instead.
//!
//! The asymmetry is deliberate: only the assisted path can recover nested
//! `html` structure.

pub mod assisted;
pub mod error;
pub mod fallback;
pub mod json;
pub mod prompts;
pub mod script;

pub use assisted::{decompose_assisted, tree_from_response};
pub use error::{AssistError, DecomposeError};
pub use fallback::{decompose_fallback, DecomposeOptions};
pub use json::{extract_json, extract_json_array};
pub use script::{split_script, unwrap_iife, FunctionDecl, ScriptParts};

use sitegen_common::GenerationBackend;
use sitegen_tree::SiteTree;

/// Which path produced a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Assisted,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct Decomposition {
    pub tree: SiteTree,
    pub strategy: Strategy,
}

/// Decompose a document, preferring the assisted path
///
/// Assisted failures are logged and never returned; only a failure of the
/// deterministic path is an error.
pub async fn decompose<G: GenerationBackend>(
    html: &str,
    backend: &G,
    options: &DecomposeOptions,
) -> Result<Decomposition, DecomposeError> {
    match decompose_assisted(html, backend).await {
        Ok(tree) => {
            tracing::info!(nodes = tree.count(), "assisted decomposition accepted");
            Ok(Decomposition {
                tree,
                strategy: Strategy::Assisted,
            })
        }
        Err(error) => {
            tracing::warn!(%error, "assisted decomposition rejected, using fallback parser");
            Ok(Decomposition {
                tree: decompose_fallback(html, options)?,
                strategy: Strategy::Fallback,
            })
        }
    }
}
