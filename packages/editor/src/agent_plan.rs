//! Agent plans: batches of update/create actions produced by the generation
//! backend
//!
//! ```json
//! { "plan": "Add a pricing section",
//!   "actions": [
//!     { "actionType": "update", "nodeId": "hero", "newCode": "..." },
//!     { "actionType": "create", "parentId": "whole-page", "newNode": { ... } } ] }
//! ```
//!
//! Actions stay raw JSON until applied so one malformed action cannot sink
//! the rest of the batch.

use crate::mutations::{InsertPosition, Mutation, MutationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sitegen_decomposer::extract_json;
use sitegen_tree::Node;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPlan {
    #[serde(default)]
    pub plan: String,

    #[serde(default)]
    pub actions: Vec<Value>,
}

/// A recognised agent action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "actionType", rename_all = "lowercase")]
pub enum AgentAction {
    Update {
        #[serde(rename = "nodeId")]
        node_id: String,
        #[serde(rename = "newDescription", default)]
        new_description: Option<String>,
        #[serde(rename = "newCode", default)]
        new_code: Option<String>,
    },
    Create {
        #[serde(rename = "parentId")]
        parent_id: String,
        #[serde(rename = "newNode")]
        new_node: Node,
    },
}

impl AgentAction {
    /// Interpret one raw action
    pub fn from_value(value: &Value) -> Result<Self, MutationError> {
        serde_json::from_value(value.clone()).map_err(|error| {
            let action_type = value
                .get("actionType")
                .and_then(Value::as_str)
                .unwrap_or("<missing>");
            MutationError::UnknownAction(format!("{} ({})", action_type, error))
        })
    }

    pub fn into_mutation(self) -> Mutation {
        match self {
            AgentAction::Update {
                node_id,
                new_description,
                new_code,
            } => Mutation::UpdateNode {
                node_id,
                description: new_description,
                code: new_code,
            },
            AgentAction::Create { parent_id, new_node } => Mutation::CreateNode {
                parent_id,
                node: new_node,
                position: InsertPosition::Append,
            },
        }
    }
}

impl AgentPlan {
    /// Extract a plan from a generation response
    pub fn parse(response: &str) -> Option<Self> {
        let value = extract_json(response)?;
        serde_json::from_value(value).ok()
    }
}

/// Outcome of applying a plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanReport {
    pub applied: usize,

    /// Index of each skipped action with the reason
    pub skipped: Vec<(usize, MutationError)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fenced_plan() {
        let response = r#"Here is the plan:
```json
{"plan": "Tweak hero", "actions": [
  {"actionType": "update", "nodeId": "hero", "newCode": "<section id=\"hero\"></section>"},
  {"actionType": "create", "parentId": "whole-page", "newNode": {"id": "faq", "type": "html", "code": "<div id=\"faq\"></div>"}}
]}
```"#;
        let plan = AgentPlan::parse(response).unwrap();
        assert_eq!(plan.plan, "Tweak hero");
        assert_eq!(plan.actions.len(), 2);

        let update = AgentAction::from_value(&plan.actions[0]).unwrap();
        assert!(matches!(
            update.into_mutation(),
            Mutation::UpdateNode { node_id, description: None, code: Some(_) } if node_id == "hero"
        ));

        let create = AgentAction::from_value(&plan.actions[1]).unwrap();
        assert!(matches!(
            create.into_mutation(),
            Mutation::CreateNode { node, position: InsertPosition::Append, .. } if node.id == "faq"
        ));
    }

    #[test]
    fn test_unknown_action_reported() {
        let value: Value = serde_json::json!({"actionType": "explode", "nodeId": "x"});
        let error = AgentAction::from_value(&value).unwrap_err();
        assert!(matches!(error, MutationError::UnknownAction(message) if message.starts_with("explode")));
    }

    #[test]
    fn test_non_plan_response() {
        assert!(AgentPlan::parse("I could not do that").is_none());
    }
}
