//! # Deterministic Decomposition
//!
//! Parses a document with html5ever and maps it onto a flat tree:
//!
//! ```text
//! whole-page (container)
//!  ├── head-content (head)      non-style/script head markup
//!  ├── style-1 (css)            one per non-empty <style> in <head>
//!  ├── header (html)            one per element child of <body>
//!  ├── main-1 (html)            synthesized id, written back onto the element
//!  ├── main-script (javascript) global code of every inline script
//!  └── toggleMenu (js-function) one per top-level declaration
//! ```
//!
//! Nesting inside body children is kept as markup, not as child nodes.

use crate::error::DecomposeError;
use crate::script::split_script;
use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, Attribute, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use sitegen_tree::{
    resolve_siblings, IdAllocator, Node, NodeKind, SiteTree, HEAD_ID, PREVIEW_MOUNT_ID, ROOT_ID,
};

/// Options for decomposition
#[derive(Debug, Clone)]
pub struct DecomposeOptions {
    /// Element id the first body node is anchored to
    pub mount_id: String,
}

impl DecomposeOptions {
    /// Build from a selector such as `#website-preview`
    pub fn with_mount_selector(selector: &str) -> Self {
        Self {
            mount_id: selector.trim().trim_start_matches('#').to_string(),
        }
    }
}

impl Default for DecomposeOptions {
    fn default() -> Self {
        Self {
            mount_id: PREVIEW_MOUNT_ID.to_string(),
        }
    }
}

/// Decompose a document without any external collaborator
pub fn decompose_fallback(html: &str, options: &DecomposeOptions) -> Result<SiteTree, DecomposeError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;

    let document_element = child_elements(&dom.document)
        .into_iter()
        .find(|e| tag_of(e).as_deref() == Some("html"));
    let (head, body) = match &document_element {
        Some(root) => (find_child(root, "head"), find_child(root, "body")),
        None => (None, None),
    };

    let mut ids = IdAllocator::new();
    ids.reserve(ROOT_ID);

    let mut head_node = None;
    let mut styles = Vec::new();
    let mut scripts = Vec::new();

    if let Some(head) = &head {
        let mut markup = Vec::new();
        for element in child_elements(head) {
            match tag_of(&element).as_deref() {
                Some("style") => {
                    let text = text_content(&element);
                    if !text.trim().is_empty() {
                        styles.push(text.trim().to_string());
                    }
                }
                Some("script") => scripts.push(element),
                _ => markup.push(outer_html(&element)?),
            }
        }
        if !markup.is_empty() {
            ids.reserve(HEAD_ID);
            head_node = Some(
                Node::new(HEAD_ID, NodeKind::Head)
                    .with_description("Document metadata, title and linked resources")
                    .with_code(markup.join("\n")),
            );
        }
    }

    let mut html_nodes = Vec::new();
    if let Some(body) = &body {
        for (index, element) in child_elements(body).into_iter().enumerate() {
            let tag = tag_of(&element).unwrap_or_default();
            if tag == "script" {
                scripts.push(element);
                continue;
            }
            html_nodes.push(body_node(&element, &tag, index, &mut ids)?);
        }
    }
    resolve_siblings(&options.mount_id, &mut html_nodes);

    let css_nodes: Vec<Node> = styles
        .into_iter()
        .enumerate()
        .map(|(index, code)| {
            let id = ids.allocate(&format!("style-{}", index + 1));
            Node::css(id, code).with_description(format!("Stylesheet block {}", index + 1))
        })
        .collect();

    let mut globals = Vec::new();
    let mut function_nodes = Vec::new();
    for script in scripts {
        if attribute(&script, "src").is_some() {
            continue;
        }
        let text = text_content(&script);
        if text.trim().is_empty() {
            continue;
        }

        let parts = split_script(&text);
        for function in parts.functions {
            let id = ids.allocate_verbatim(&function.name);
            function_nodes.push(
                Node::new(id, NodeKind::JsFunction)
                    .with_description(format!("The {} function", function.name))
                    .with_code(function.code),
            );
        }
        if !parts.remainder.is_empty() {
            globals.push(parts.remainder);
        }
    }

    let mut root = Node::container(ROOT_ID).with_description("The whole generated page");
    root.children.extend(head_node);
    root.children.extend(css_nodes);
    root.children.extend(html_nodes);
    if !globals.is_empty() {
        let id = ids.allocate("main-script");
        root.children.push(
            Node::new(id, NodeKind::Javascript)
                .with_description("Global script code")
                .with_code(globals.join("\n\n")),
        );
    }
    root.children.extend(function_nodes);

    tracing::debug!(nodes = root.subtree_len(), "fallback decomposition finished");
    Ok(SiteTree::new(root)?)
}

/// One flat html node for a body child, giving the element an id if it lacks one
fn body_node(
    element: &Handle,
    tag: &str,
    index: usize,
    ids: &mut IdAllocator,
) -> Result<Node, DecomposeError> {
    let id = match attribute(element, "id").filter(|id| !id.trim().is_empty()) {
        Some(existing) if ids.reserve(&existing) => existing,
        Some(existing) => {
            let id = ids.allocate(&existing);
            tracing::warn!(%existing, replacement = %id, "duplicate element id in document");
            set_attribute(element, "id", &id);
            id
        }
        None => {
            let id = ids.allocate(&format!("{}-{}", tag, index));
            set_attribute(element, "id", &id);
            id
        }
    };

    Ok(Node::html(id, outer_html(element)?).with_description(format!("Imported <{}> element", tag)))
}

fn tag_of(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string()),
        _ => None,
    }
}

fn child_elements(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|c| matches!(c.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

fn find_child(handle: &Handle, tag: &str) -> Option<Handle> {
    child_elements(handle)
        .into_iter()
        .find(|c| tag_of(c).as_deref() == Some(tag))
}

fn attribute(handle: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    let value = attrs
        .borrow()
        .iter()
        .find(|a| a.name.local.as_ref() == name)
        .map(|a| a.value.to_string());
    value
}

fn set_attribute(handle: &Handle, name: &str, value: &str) {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return;
    };
    let mut attrs = attrs.borrow_mut();
    match attrs.iter_mut().find(|a| a.name.local.as_ref() == name) {
        Some(attr) => attr.value = StrTendril::from_slice(value),
        None => attrs.push(Attribute {
            name: QualName::new(None, ns!(), name.into()),
            value: StrTendril::from_slice(value),
        }),
    }
}

fn text_content(handle: &Handle) -> String {
    let mut text = String::new();
    collect_text(handle, &mut text);
    text
}

fn collect_text(handle: &Handle, out: &mut String) {
    for child in handle.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            NodeData::Element { .. } => collect_text(child, out),
            _ => {}
        }
    }
}

fn outer_html(handle: &Handle) -> Result<String, DecomposeError> {
    let mut bytes = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };
    serialize(&mut bytes, &SerializableHandle::from(handle.clone()), opts)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
