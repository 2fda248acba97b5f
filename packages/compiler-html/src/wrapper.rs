//! Wrapper markup handling for html nodes that own children
//!
//! The wrapper's code is parsed as a fragment; its first element keeps its
//! tag and attributes while its inner content is replaced by the assembled
//! children.

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Replace the inner content of the first element in `wrapper` with `inner`
///
/// Returns `None` when the wrapper markup contains no element.
pub fn wrap_markup(wrapper: &str, inner: &str) -> Option<String> {
    // A template context accepts any element, table parts included
    let context = QualName::new(None, ns!(html), local_name!("template"));
    let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![])
        .from_utf8()
        .read_from(&mut wrapper.as_bytes())
        .ok()?;

    let element = first_element(&dom.document)?;
    let NodeData::Element { name, attrs, .. } = &element.data else {
        return None;
    };

    let tag = name.local.to_string();
    let mut html = String::with_capacity(wrapper.len() + inner.len());
    html.push('<');
    html.push_str(&tag);
    for attr in attrs.borrow().iter() {
        html.push(' ');
        html.push_str(&attr.name.local);
        html.push_str("=\"");
        html.push_str(&escape_attribute(&attr.value));
        html.push('"');
    }
    html.push('>');
    html.push_str(inner);
    html.push_str("</");
    html.push_str(&tag);
    html.push('>');

    Some(html)
}

/// First element below the fragment's synthetic `<html>` root
fn first_element(document: &Handle) -> Option<Handle> {
    for child in document.children.borrow().iter() {
        if let NodeData::Element { name, .. } = &child.data {
            if name.local.as_ref() == "html" {
                return child
                    .children
                    .borrow()
                    .iter()
                    .find(|c| matches!(c.data, NodeData::Element { .. }))
                    .cloned();
            }
            return Some(child.clone());
        }
    }
    None
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
