//! # Editor Service
//!
//! Async front door over an [`EditSession`]. Flows that call the generation
//! backend are serialized through a single-slot busy lock: a second flow
//! started while one is in flight fails fast with [`EditorError::Busy`].
//!
//! Each generation flow captures the document version before suspending and
//! refuses to apply its response if the version moved in the meantime
//! ([`EditorError::Stale`]). Direct user edits never wait on the busy lock,
//! so they win over an in-flight generation.
//!
//! After every successful change the rendered bundle is persisted to the
//! store. A store failure is returned to the caller but the in-memory tree
//! keeps the change, and the next successful persist writes it out.

use crate::agent_plan::{AgentPlan, PlanReport};
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::pipeline::PipelineResult;
use crate::prompts;
use crate::session::{EditSession, EditorConfig};
use sitegen_common::{build_file_context, GenerationBackend, GenerationRequest, ProjectStore};
use sitegen_compiler_html::{INDEX_FILE, PROJECT_FILE};
use sitegen_decomposer::{decompose, extract_json_array, DecomposeOptions, Strategy};
use sitegen_tree::{Node, NodeKind, SiteTree};
use std::collections::HashSet;
use tokio::sync::{Mutex, MutexGuard};

/// Outcome of an HTML import
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub strategy: Strategy,
    pub result: PipelineResult,
}

/// Outcome of an agent run
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub plan: String,
    pub report: PlanReport,
    pub result: PipelineResult,
}

pub struct EditorService<G, S> {
    backend: G,
    store: S,
    config: EditorConfig,
    decompose: DecomposeOptions,
    session: Mutex<EditSession>,
    busy: Mutex<()>,
}

impl<G: GenerationBackend, S: ProjectStore> EditorService<G, S> {
    /// Start a service on an empty tree
    pub fn new(backend: G, store: S, config: EditorConfig) -> Result<Self, EditorError> {
        let session = EditSession::new(&config, SiteTree::empty())?;
        Ok(Self {
            backend,
            store,
            config,
            decompose: DecomposeOptions::default(),
            session: Mutex::new(session),
            busy: Mutex::new(()),
        })
    }

    pub fn with_decompose_options(mut self, options: DecomposeOptions) -> Self {
        self.decompose = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn backend(&self) -> &G {
        &self.backend
    }

    /// Lock the session for inspection
    pub async fn session(&self) -> MutexGuard<'_, EditSession> {
        self.session.lock().await
    }

    /// Snapshot of the current tree
    pub async fn tree(&self) -> SiteTree {
        self.session.lock().await.tree().clone()
    }

    pub async fn version(&self) -> u64 {
        self.session.lock().await.version()
    }

    /// Open a project from the store; history starts empty
    pub async fn load_project(&self, project_id: &str) -> Result<PipelineResult, EditorError> {
        let text = self.store.read_text(project_id, PROJECT_FILE)?;
        let tree = SiteTree::deserialize(&text)?;

        let mut session = self.session.lock().await;
        let result = session.load_project(project_id, tree)?;
        tracing::info!(project_id, nodes = session.tree().count(), "project loaded");
        self.persist(&mut session, &result)?;
        Ok(result)
    }

    /// Apply a user mutation
    pub async fn apply(&self, mutation: Mutation) -> Result<PipelineResult, EditorError> {
        let mut session = self.session.lock().await;
        let result = session.apply(mutation)?;
        self.persist(&mut session, &result)?;
        Ok(result)
    }

    pub async fn undo(&self) -> Result<Option<PipelineResult>, EditorError> {
        let mut session = self.session.lock().await;
        let result = session.undo()?;
        if let Some(result) = &result {
            self.persist(&mut session, result)?;
        }
        Ok(result)
    }

    pub async fn redo(&self) -> Result<Option<PipelineResult>, EditorError> {
        let mut session = self.session.lock().await;
        let result = session.redo()?;
        if let Some(result) = &result {
            self.persist(&mut session, result)?;
        }
        Ok(result)
    }

    /// Replace a container's children with freshly generated ones
    pub async fn regenerate_subtree(&self, node_id: &str) -> Result<PipelineResult, EditorError> {
        let _busy = self.acquire()?;

        let (started, request) = {
            let session = self.session.lock().await;
            let tree = session.tree();
            let container = tree
                .find(node_id)
                .ok_or_else(|| crate::MutationError::NodeNotFound(node_id.to_string()))?;
            if container.kind != NodeKind::Container {
                return Err(crate::MutationError::NotContainer(node_id.to_string()).into());
            }

            let replaced: HashSet<&str> = {
                let mut ids = HashSet::new();
                for child in &container.children {
                    child.walk(&mut |node| {
                        ids.insert(node.id.as_str());
                    });
                }
                ids
            };
            let taken: Vec<&str> = tree
                .ids()
                .into_iter()
                .filter(|id| !replaced.contains(id))
                .collect();

            let context = self.file_context(&session.document().project_id)?;
            let prompt = prompts::subtree_prompt(container, &taken, &context);
            (
                session.version(),
                GenerationRequest::structured(prompts::SUBTREE_INSTRUCTIONS, prompt),
            )
        };

        let response = self.backend.generate(request).await?;
        let children = parse_children(&response)?;

        let mut session = self.session.lock().await;
        check_fresh(started, session.version())?;
        let result = session.apply(Mutation::ReplaceChildren {
            parent_id: node_id.to_string(),
            children,
        })?;
        self.persist(&mut session, &result)?;
        Ok(result)
    }

    /// Ask the backend for a better description of one node
    pub async fn improve_description(&self, node_id: &str) -> Result<PipelineResult, EditorError> {
        let _busy = self.acquire()?;

        let (started, request) = {
            let session = self.session.lock().await;
            let node = session
                .tree()
                .find(node_id)
                .ok_or_else(|| crate::MutationError::NodeNotFound(node_id.to_string()))?;
            if node.kind == NodeKind::Container {
                return Err(crate::MutationError::ContainerUpdate(node_id.to_string()).into());
            }
            (
                session.version(),
                GenerationRequest::text(
                    prompts::DESCRIPTION_INSTRUCTIONS,
                    prompts::description_prompt(node),
                ),
            )
        };

        let response = self.backend.generate(request).await?;
        let description = response.trim().trim_matches('"').trim();
        if description.is_empty() {
            return Err(EditorError::MalformedResponse("empty description".to_string()));
        }

        let mut session = self.session.lock().await;
        check_fresh(started, session.version())?;
        let result = session.apply(Mutation::UpdateNode {
            node_id: node_id.to_string(),
            description: Some(description.to_string()),
            code: None,
        })?;
        self.persist(&mut session, &result)?;
        Ok(result)
    }

    /// Turn a free-text request into an agent plan and apply it
    pub async fn run_agent(&self, request: &str) -> Result<AgentOutcome, EditorError> {
        let _busy = self.acquire()?;

        let (started, generation) = {
            let session = self.session.lock().await;
            let tree_json = session.tree().serialize_pretty()?;
            let context = self.file_context(&session.document().project_id)?;
            (
                session.version(),
                GenerationRequest::structured(
                    prompts::AGENT_INSTRUCTIONS,
                    prompts::agent_prompt(request, &tree_json, &context),
                ),
            )
        };

        let response = self.backend.generate(generation).await?;
        let plan = AgentPlan::parse(&response)
            .ok_or_else(|| EditorError::MalformedResponse("no agent plan object".to_string()))?;

        let mut session = self.session.lock().await;
        check_fresh(started, session.version())?;
        let (report, result) = session.apply_plan(&plan)?;
        self.persist(&mut session, &result)?;
        Ok(AgentOutcome {
            plan: plan.plan,
            report,
            result,
        })
    }

    /// Replace the tree with a decomposition of `html`
    ///
    /// The import is one undoable history entry.
    pub async fn import_html(&self, html: &str) -> Result<ImportOutcome, EditorError> {
        let _busy = self.acquire()?;
        let started = self.version().await;

        let decomposition = decompose(html, &self.backend, &self.decompose).await?;

        let mut session = self.session.lock().await;
        check_fresh(started, session.version())?;
        let result = session.replace_tree(decomposition.tree, "Import HTML")?;
        self.persist(&mut session, &result)?;
        Ok(ImportOutcome {
            strategy: decomposition.strategy,
            result,
        })
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>, EditorError> {
        self.busy.try_lock().map_err(|_| EditorError::Busy)
    }

    fn file_context(&self, project_id: &str) -> Result<String, EditorError> {
        Ok(build_file_context(
            &self.store,
            project_id,
            &[INDEX_FILE, PROJECT_FILE],
            self.config.context_bytes,
        )?)
    }

    fn persist(&self, session: &mut EditSession, result: &PipelineResult) -> Result<(), EditorError> {
        let project_id = session.document().project_id.clone();
        if let Err(error) = result.persist(&self.store, &project_id) {
            tracing::error!(project_id = %project_id, %error, "failed to persist bundle");
            session.discard_unpersisted_render();
            return Err(error);
        }
        Ok(())
    }
}

fn check_fresh(started: u64, current: u64) -> Result<(), EditorError> {
    if started != current {
        tracing::warn!(started, current, "discarding stale generation response");
        return Err(EditorError::Stale { started, current });
    }
    Ok(())
}

fn parse_children(response: &str) -> Result<Vec<Node>, EditorError> {
    let value = extract_json_array(response)
        .ok_or_else(|| EditorError::MalformedResponse("no JSON array in response".to_string()))?;
    serde_json::from_value(value).map_err(|error| EditorError::MalformedResponse(error.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_children_from_fenced_array() {
        let children = parse_children(
            "Sure:\n```json\n[{\"id\": \"a\", \"type\": \"html\", \"code\": \"<p id=\\\"a\\\"></p>\"}]\n```",
        )
        .unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "a");
    }

    #[test]
    fn test_parse_children_rejects_prose() {
        assert!(matches!(
            parse_children("I could not do that"),
            Err(EditorError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_children(r#"[{"type": 42}]"#),
            Err(EditorError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_check_fresh() {
        assert!(check_fresh(3, 3).is_ok());
        assert!(matches!(
            check_fresh(3, 4),
            Err(EditorError::Stale { started: 3, current: 4 })
        ));
    }
}
