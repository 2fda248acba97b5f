//! # Edit Session
//!
//! Synchronous controller that owns one project's document, history and
//! render pipeline. Every successful change follows the same path:
//!
//! ```text
//! validate → apply on draft → post-effects → swap in → record history → render
//! ```
//!
//! Invalid mutations are rejected before anything is recorded or rendered.

use crate::agent_plan::{AgentAction, AgentPlan, PlanReport};
use crate::document::Document;
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::pipeline::{Pipeline, PipelineResult};
use crate::post_effects::PostEffectEngine;
use crate::undo_stack::UndoStack;
use sitegen_compiler_html::CompileOptions;
use sitegen_tree::{SiteTree, TreeResult};

/// Settings for one editing session
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub project_id: String,

    /// Maximum undo levels (0 = unlimited)
    pub history_limit: usize,

    pub compile: CompileOptions,

    /// Upper bound for project file context added to prompts
    pub context_bytes: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            project_id: "default".to_string(),
            history_limit: 100,
            compile: CompileOptions::default(),
            context_bytes: 16 * 1024,
        }
    }
}

/// Single-user edit session
#[derive(Debug)]
pub struct EditSession {
    document: Document,
    history: UndoStack,
    pipeline: Pipeline,
    effects: PostEffectEngine,
}

impl EditSession {
    pub fn new(config: &EditorConfig, tree: SiteTree) -> Result<Self, EditorError> {
        let history = UndoStack::with_max_levels(&tree, config.history_limit)?;
        Ok(Self {
            document: Document::new(config.project_id.clone(), tree),
            history,
            pipeline: Pipeline::new(config.compile.clone()),
            effects: PostEffectEngine::new(),
        })
    }

    pub fn tree(&self) -> &SiteTree {
        self.document.tree()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Generation counter for async flows
    pub fn version(&self) -> u64 {
        self.document.version
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Apply one mutation, record it and re-render
    pub fn apply(&mut self, mutation: Mutation) -> Result<PipelineResult, EditorError> {
        if let Err(error) = self.document.apply(&mutation, &self.effects) {
            tracing::warn!(mutation = %mutation.label(), %error, "mutation rejected");
            return Err(error.into());
        }
        self.history.record(&mutation.label(), self.document.tree())?;
        self.render()
    }

    /// Apply every valid action of a plan as one history entry
    ///
    /// Unknown or invalid actions are logged and skipped.
    pub fn apply_plan(&mut self, plan: &AgentPlan) -> Result<(PlanReport, PipelineResult), EditorError> {
        let mut report = PlanReport::default();

        for (index, value) in plan.actions.iter().enumerate() {
            let applied = AgentAction::from_value(value)
                .map(AgentAction::into_mutation)
                .and_then(|mutation| self.document.apply(&mutation, &self.effects));
            match applied {
                Ok(_) => report.applied += 1,
                Err(error) => {
                    tracing::warn!(index, %error, "skipping agent action");
                    report.skipped.push((index, error));
                }
            }
        }

        let label = if plan.plan.trim().is_empty() {
            "Agent edit".to_string()
        } else {
            format!("Agent: {}", plan.plan.trim())
        };
        self.history.record(&label, self.document.tree())?;
        tracing::info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "agent plan applied"
        );
        Ok((report, self.render()?))
    }

    /// Replace the whole tree as one undoable edit
    pub fn replace_tree(&mut self, tree: SiteTree, label: &str) -> Result<PipelineResult, EditorError> {
        self.document.replace_tree(tree);
        self.history.record(label, self.document.tree())?;
        self.render()
    }

    /// Switch to another project's tree; history does not carry over
    pub fn load_project(&mut self, project_id: &str, tree: SiteTree) -> Result<PipelineResult, EditorError> {
        self.document.project_id = project_id.to_string();
        self.document.replace_tree(tree);
        self.history.reset(self.document.tree())?;
        self.pipeline.clear_cache();
        self.render()
    }

    /// Returns `None` when there is nothing to undo
    pub fn undo(&mut self) -> Result<Option<PipelineResult>, EditorError> {
        if !self.history.can_undo() {
            return Ok(None);
        }
        self.restore_with(UndoStack::undo).map(Some)
    }

    /// Returns `None` when there is nothing to redo
    pub fn redo(&mut self) -> Result<Option<PipelineResult>, EditorError> {
        if !self.history.can_redo() {
            return Ok(None);
        }
        self.restore_with(UndoStack::redo).map(Some)
    }

    /// Recording stays suppressed across the snapshot swap and the re-render
    fn restore_with(
        &mut self,
        step: fn(&mut UndoStack, &mut SiteTree) -> TreeResult<bool>,
    ) -> Result<PipelineResult, EditorError> {
        self.history.begin_restore();
        let result = step(&mut self.history, self.document.tree_mut())
            .map_err(EditorError::from)
            .and_then(|_| self.render());
        self.history.end_restore();
        result
    }

    /// Forget the last render as a diff baseline after its files failed to persist
    pub fn discard_unpersisted_render(&mut self) {
        self.pipeline.rewind();
    }

    /// Render the current tree
    pub fn render(&mut self) -> Result<PipelineResult, EditorError> {
        self.pipeline.render(self.document.tree(), self.document.version)
    }
}
