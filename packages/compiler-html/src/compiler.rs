use crate::wrapper::wrap_markup;
use sitegen_common::{walk_children, Visitor};
use sitegen_tree::{Node, NodeKind, SiteTree, TreeError};
use thiserror::Error;

/// Errors that can occur while assembling output files
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Options for HTML compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Title used in the default head when the tree has no head node
    pub title: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            title: "Generated Page".to_string(),
        }
    }
}

/// Accumulates head, stylesheet and script contributions in traversal order
#[derive(Default)]
struct Context {
    head: Option<String>,
    styles: String,
    scripts: String,
}

impl Visitor for Context {
    fn visit_head(&mut self, head: &Node) {
        if self.head.is_none() {
            self.head = Some(head.code.clone());
        } else {
            tracing::warn!(node_id = %head.id, "ignoring extra head node");
        }
        walk_children(self, head);
    }

    fn visit_css(&mut self, css: &Node) {
        self.styles.push_str(&css.code);
        self.styles.push_str("\n\n");
        walk_children(self, css);
    }

    fn visit_javascript(&mut self, script: &Node) {
        self.scripts.push_str(&script.code);
        self.scripts.push_str("\n\n");
        walk_children(self, script);
    }

    fn visit_js_function(&mut self, function: &Node) {
        self.scripts.push_str(&function.code);
        self.scripts.push_str("\n\n");
        walk_children(self, function);
    }
}

/// Compile a tree to a single HTML document
pub fn compile_to_html(tree: &SiteTree, options: &CompileOptions) -> String {
    let mut ctx = Context::default();
    ctx.visit_tree(tree);

    let head = ctx.head.unwrap_or_else(|| default_head(&options.title));
    let body = render_body(tree);

    let mut out = String::with_capacity(head.len() + body.len() + ctx.styles.len() + ctx.scripts.len() + 256);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str(&head);
    out.push_str("\n<style>\n");
    out.push_str(&ctx.styles);
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(&body);
    out.push_str("\n<script>\n(function() {\n");
    out.push_str(&ctx.scripts);
    out.push_str("})();\n</script>\n</body>\n</html>\n");
    out
}

/// Assemble the body markup from the root's html descendants
pub fn render_body(tree: &SiteTree) -> String {
    assemble_siblings(&tree.root().children)
}

fn default_head(title: &str) -> String {
    format!(
        "<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n<title>{}</title>",
        escape_text(title)
    )
}

/// Html siblings in stored order, joined by newlines
///
/// Stored order is authoring order; anchors are never used to re-sort.
fn assemble_siblings(nodes: &[Node]) -> String {
    let mut parts = Vec::new();
    collect_markup(nodes, &mut parts);
    parts.join("\n")
}

/// Containers have no element of their own: their html descendants are
/// spliced in at the container's position
fn collect_markup(nodes: &[Node], parts: &mut Vec<String>) {
    for node in nodes {
        match node.kind {
            NodeKind::Html => parts.push(assemble_node(node)),
            NodeKind::Container => collect_markup(&node.children, parts),
            _ => {}
        }
    }
}

fn has_markup(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node.kind {
        NodeKind::Html => true,
        NodeKind::Container => has_markup(&node.children),
        _ => false,
    })
}

fn assemble_node(node: &Node) -> String {
    if !has_markup(&node.children) {
        return node.code.clone();
    }

    let inner = assemble_siblings(&node.children);
    match wrap_markup(&node.code, &inner) {
        Some(html) => html,
        None => {
            // Known limitation: children are dropped when the wrapper has no element
            tracing::warn!(node_id = %node.id, "wrapper markup has no root element; dropping children");
            node.code.clone()
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
