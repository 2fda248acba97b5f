//! Generate → decompose → generate round trips

use sitegen_common::{GenerationError, ScriptedGenerator};
use sitegen_compiler_html::{compile_to_html, CompileOptions};
use sitegen_decomposer::{decompose, decompose_fallback, DecomposeOptions, Strategy};
use sitegen_tree::{Node, NodeKind, SiteTree, HEAD_ID, ROOT_ID};

fn authored_tree() -> SiteTree {
    let root = Node::container(ROOT_ID)
        .with_child(
            Node::new(HEAD_ID, NodeKind::Head)
                .with_code("<meta charset=\"UTF-8\">\n<title>Bakery</title>"),
        )
        .with_child(
            Node::html("hero", r#"<section id="hero" class="hero"></section>"#)
                .with_child(Node::html("hero-title", r#"<h1 id="hero-title">Fresh bread daily</h1>"#))
                .with_child(Node::html("hero-cta", r##"<a id="hero-cta" href="#menu">See the menu</a>"##)),
        )
        .with_child(Node::html(
            "menu",
            r#"<ul id="menu"><li>Sourdough</li><li>Rye &amp; caraway</li></ul>"#,
        ))
        .with_child(Node::css("base-styles", "body { font-family: serif; }"))
        .with_child(Node::css("hero-styles", ".hero { padding: 4rem; }"))
        .with_child(Node::new("main-js", NodeKind::Javascript).with_code("let opened = false;"))
        .with_child(
            Node::new("toggleMenu", NodeKind::JsFunction)
                .with_code("function toggleMenu() {\n    opened = !opened;\n}"),
        );

    let mut tree = SiteTree::new(root).unwrap();
    tree.resolve_all();
    tree
}

#[test]
fn test_fallback_round_trip_preserves_content() {
    let original = authored_tree();
    let html = compile_to_html(&original, &CompileOptions::default());

    let tree = decompose_fallback(&html, &DecomposeOptions::default()).unwrap();
    assert!(tree.validate().is_empty(), "{:?}", tree.validate());

    let css: String = tree
        .root()
        .children
        .iter()
        .filter(|n| n.kind == NodeKind::Css)
        .map(|n| n.code.as_str())
        .collect();
    assert!(css.contains("body { font-family: serif; }"));
    assert!(css.contains(".hero { padding: 4rem; }"));

    let function = tree.find("toggleMenu").unwrap();
    assert_eq!(function.kind, NodeKind::JsFunction);
    assert_eq!(function.code, "function toggleMenu() {\n    opened = !opened;\n}");

    let globals = tree.find("main-script").unwrap();
    assert_eq!(globals.code, "let opened = false;");

    let regenerated = compile_to_html(&tree, &CompileOptions::default());
    for text in ["Fresh bread daily", "See the menu", "Sourdough", "Rye &amp; caraway", "<title>Bakery</title>"] {
        assert!(regenerated.contains(text), "missing {:?}", text);
    }
}

#[test]
fn test_fallback_flattens_nesting() {
    let html = compile_to_html(&authored_tree(), &CompileOptions::default());
    let tree = decompose_fallback(&html, &DecomposeOptions::default()).unwrap();

    let hero = tree.find("hero").unwrap();
    assert!(hero.children.is_empty());
    assert!(hero.code.contains(r#"<h1 id="hero-title">Fresh bread daily</h1>"#));
    assert!(tree.find("hero-title").is_none());
}

#[test]
fn test_second_round_trip_is_stable() {
    let html = compile_to_html(&authored_tree(), &CompileOptions::default());
    let first = decompose_fallback(&html, &DecomposeOptions::default()).unwrap();

    let again = compile_to_html(&first, &CompileOptions::default());
    let second = decompose_fallback(&again, &DecomposeOptions::default()).unwrap();

    assert_eq!(first.ids(), second.ids());
    assert_eq!(compile_to_html(&second, &CompileOptions::default()), again);
}

#[tokio::test]
async fn test_malformed_assisted_response_falls_back() {
    let html = compile_to_html(&authored_tree(), &CompileOptions::default());
    let backend = ScriptedGenerator::with_responses(["not json"]);

    let result = decompose(&html, &backend, &DecomposeOptions::default())
        .await
        .unwrap();

    assert_eq!(result.strategy, Strategy::Fallback);
    assert!(result.tree.contains("hero"));
    assert_eq!(backend.requests().len(), 1);
    assert!(backend.requests()[0].structured);
}

#[tokio::test]
async fn test_backend_error_falls_back() {
    let backend = ScriptedGenerator::new();
    backend.push_error(GenerationError::Failed("quota".into()));

    let result = decompose("<p id=\"x\">Hi</p>", &backend, &DecomposeOptions::default())
        .await
        .unwrap();

    assert_eq!(result.strategy, Strategy::Fallback);
    assert!(result.tree.contains("x"));
}

#[tokio::test]
async fn test_valid_assisted_response_keeps_nesting() {
    let response = r#"{"id": "whole-page", "type": "container", "children": [
        {"id": "hero", "type": "html", "code": "<section id=\"hero\"></section>", "children": [
            {"id": "hero-title", "type": "html", "code": "<h1 id=\"hero-title\">Hi</h1>"}
        ]}
    ]}"#;
    let backend = ScriptedGenerator::with_responses([response]);

    let result = decompose("<section><h1>Hi</h1></section>", &backend, &DecomposeOptions::default())
        .await
        .unwrap();

    assert_eq!(result.strategy, Strategy::Assisted);
    assert_eq!(result.tree.parent_of("hero-title").map(|p| p.id.as_str()), Some("hero"));
}
