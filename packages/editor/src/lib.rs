//! # Sitegen Editor
//!
//! Editing engine for component trees.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ tree: nodes, ids, insertion chains          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document lifecycle + mutations      │
//! │  - Apply mutations with validation          │
//! │  - Snapshot history (undo/redo)             │
//! │  - Generation flows: subtree, agent, import │
//! │  - Render → persist pipeline                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: Tree → index.html + assets   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Tree is source of truth**: the bundle is always derived
//! 2. **Validate before touching**: a rejected mutation changes nothing
//! 3. **Full snapshots**: history stores whole serialized trees
//! 4. **One generation flow at a time**: late responses are discarded
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sitegen_common::{MemoryStore, OfflineGenerator};
//! use sitegen_editor::{EditorConfig, EditorService, Mutation};
//!
//! let service = EditorService::new(OfflineGenerator, MemoryStore::new(), EditorConfig::default())?;
//! service.load_project("landing").await?;
//! service.apply(Mutation::DeleteNode { node_id: "hero".into() }).await?;
//! service.undo().await?;
//! ```

mod agent_plan;
mod document;
mod errors;
mod mutations;
mod pipeline;
mod post_effects;
pub mod prompts;
mod service;
mod session;
mod undo_stack;

pub use agent_plan::{AgentAction, AgentPlan, PlanReport};
pub use document::Document;
pub use errors::EditorError;
pub use mutations::{InsertPosition, MovePosition, Mutation, MutationError};
pub use pipeline::{Pipeline, PipelineResult};
pub use post_effects::{AuditStructure, PostEffect, PostEffectEngine, ReanchorEditedMarkup};
pub use service::{AgentOutcome, EditorService, ImportOutcome};
pub use session::{EditSession, EditorConfig};
pub use undo_stack::{HistoryEntry, UndoStack};
