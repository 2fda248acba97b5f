//! Fixed instructions and prompt builders for editor generation flows

use sitegen_tree::Node;

pub const SUBTREE_INSTRUCTIONS: &str = r#"You generate the children of one section of a website as JSON.

Return ONE JSON array of nodes. Every node has this shape:
{
  "id": string,          // unique, never reuse an id listed as taken
  "type": "html" | "css" | "javascript" | "js-function" | "container",
  "description": string,
  "code": string,
  "children": [Node]     // optional
}

Rules:
- Every html node's root element carries an id attribute equal to the node id.
- A parent html node's code is only its own opening and closing tag.
- Put styles for the section in css nodes and behaviour in js-function nodes.
- Output JSON only."#;

pub const AGENT_INSTRUCTIONS: &str = r#"You edit a website component tree.

Reply with ONE JSON object:
{
  "plan": string,
  "actions": [
    { "actionType": "update", "nodeId": string, "newDescription"?: string, "newCode"?: string },
    { "actionType": "create", "parentId": string, "newNode": Node }
  ]
}

Rules:
- Only update nodes that exist; containers cannot be updated.
- New node ids must not exist anywhere in the tree.
- Parents of created nodes must be container or html nodes.
- Output JSON only."#;

pub const DESCRIPTION_INSTRUCTIONS: &str = "You write concise descriptions of website components. \
Reply with the improved description only, one or two sentences, no quotes or commentary.";

pub fn subtree_prompt(container: &Node, taken_ids: &[&str], file_context: &str) -> String {
    let mut prompt = format!(
        "Section id: {}\nSection description: {}\nTaken ids: {}\n",
        container.id,
        container.description,
        taken_ids.join(", ")
    );
    push_context(&mut prompt, file_context);
    prompt
}

pub fn agent_prompt(request: &str, tree_json: &str, file_context: &str) -> String {
    let mut prompt = format!("Current tree:\n{}\n\nRequest: {}\n", tree_json, request);
    push_context(&mut prompt, file_context);
    prompt
}

pub fn description_prompt(node: &Node) -> String {
    format!(
        "Node id: {}\nType: {}\nCurrent description: {}\nCode:\n{}\n",
        node.id, node.kind, node.description, node.code
    )
}

fn push_context(prompt: &mut String, file_context: &str) {
    if !file_context.is_empty() {
        prompt.push_str("\nProject files:\n");
        prompt.push_str(file_context);
    }
}
