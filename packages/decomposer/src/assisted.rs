use crate::error::AssistError;
use crate::json::extract_json;
use crate::prompts::{decompose_prompt, DECOMPOSE_INSTRUCTIONS};
use serde_json::Value;
use sitegen_common::{GenerationBackend, GenerationRequest};
use sitegen_tree::{Node, NodeKind, SiteTree, Violation};

/// Ask the generation backend for a tree and validate what comes back
pub async fn decompose_assisted<G: GenerationBackend>(
    html: &str,
    backend: &G,
) -> Result<SiteTree, AssistError> {
    let request = GenerationRequest::structured(DECOMPOSE_INSTRUCTIONS, decompose_prompt(html));
    let response = backend.generate(request).await?;
    tree_from_response(&response)
}

/// Turn a generation response into a validated tree with resolved anchors
pub fn tree_from_response(response: &str) -> Result<SiteTree, AssistError> {
    let value = extract_json(response).ok_or(AssistError::NoJson)?;

    let is_container = value.get("type").and_then(Value::as_str) == Some(NodeKind::Container.as_str());
    let has_children = value.get("children").map(Value::is_array).unwrap_or(false);
    if !is_container || !has_children {
        return Err(AssistError::NotContainerRoot);
    }

    let root: Node = serde_json::from_value(value)?;
    let mut tree = SiteTree::new(root).map_err(|_| AssistError::NotContainerRoot)?;

    let bad_ids: Vec<String> = tree
        .validate()
        .into_iter()
        .filter_map(|violation| match violation {
            Violation::DuplicateId(id) => Some(id),
            Violation::EmptyId { parent_id } => Some(format!("<empty under {}>", parent_id)),
            _ => None,
        })
        .collect();
    if !bad_ids.is_empty() {
        return Err(AssistError::InvalidIds(bad_ids));
    }

    tree.resolve_all();
    Ok(tree)
}
