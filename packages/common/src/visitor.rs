use sitegen_tree::{Node, NodeKind, SiteTree};

/// Visitor pattern for traversing the component tree immutably
///
/// The default implementations walk the entire tree depth-first in
/// children order and route each node to the method for its kind. Children
/// are walked under every kind, including ones that are leaves in the DOM
/// sense, so stray nodes still reach the visitor.
/// Override specific visit_* methods to act on the nodes you care about.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &SiteTree) {
        self.visit_node(tree.root());
    }

    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_container(&mut self, container: &Node) {
        walk_children(self, container);
    }

    fn visit_head(&mut self, head: &Node) {
        walk_children(self, head);
    }

    fn visit_html(&mut self, html: &Node) {
        walk_children(self, html);
    }

    fn visit_css(&mut self, css: &Node) {
        walk_children(self, css);
    }

    fn visit_javascript(&mut self, script: &Node) {
        walk_children(self, script);
    }

    fn visit_js_function(&mut self, function: &Node) {
        walk_children(self, function);
    }
}

/// Dispatch a node to the visitor method for its kind
pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node.kind {
        NodeKind::Container => visitor.visit_container(node),
        NodeKind::Head => visitor.visit_head(node),
        NodeKind::Html => visitor.visit_html(node),
        NodeKind::Css => visitor.visit_css(node),
        NodeKind::Javascript => visitor.visit_javascript(node),
        NodeKind::JsFunction => visitor.visit_js_function(node),
    }
}

/// Visit every child of a node, in order
pub fn walk_children<V: Visitor>(visitor: &mut V, node: &Node) {
    for child in &node.children {
        visitor.visit_node(child);
    }
}
