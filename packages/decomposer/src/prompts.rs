/// Instructions for decomposing a full HTML document into the node schema
pub const DECOMPOSE_INSTRUCTIONS: &str = r#"You convert a complete HTML document into a JSON component tree.

Every node has this shape:
{
  "id": string,            // unique across the whole tree
  "type": "container" | "head" | "html" | "css" | "javascript" | "js-function",
  "description": string,   // one or two sentences describing the node's purpose
  "code": string,          // the node's own source text
  "children": [Node]       // optional
}

Rules:
- Return ONE JSON object: the root node, with "id": "whole-page" and "type": "container".
- Put all <meta>, <title> and <link> markup from <head> into a single "head" node with id "head-content".
- Emit hierarchical "html" nodes for logical containers of the page (header, sections, footer, cards).
  A parent html node's code is its own opening and closing tag with attributes; its content comes from its children.
  Every html node's root element must carry an id attribute equal to the node id.
- Emit one "css" node per <style> block.
- Split JavaScript into one "javascript" node holding global-scope code and one "js-function" node per
  top-level function declaration, using the function name as the node id.
- Do not invent content. Output JSON only, no commentary."#;

pub fn decompose_prompt(html: &str) -> String {
    format!("Decompose this HTML document into the component tree JSON:\n\n{}", html)
}
