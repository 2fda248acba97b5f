//! Mutation engine and history behaviour through the edit session

use sitegen_editor::{
    AgentPlan, EditSession, EditorConfig, EditorError, InsertPosition, MovePosition, Mutation,
    MutationError,
};
use sitegen_tree::{Node, Position, SiteTree, ROOT_ID};

fn session_with(children: Vec<Node>) -> EditSession {
    let mut tree = SiteTree::new(Node::container(ROOT_ID).with_children(children)).unwrap();
    tree.resolve_all();
    EditSession::new(&EditorConfig::default(), tree).unwrap()
}

fn section(id: &str) -> Node {
    Node::html(id, format!(r#"<section id="{}"></section>"#, id))
}

fn create(parent: &str, node: Node) -> Mutation {
    Mutation::CreateNode {
        parent_id: parent.into(),
        node,
        position: InsertPosition::Append,
    }
}

fn anchor(session: &EditSession, id: &str) -> (String, Position) {
    let node = session.tree().find(id).unwrap();
    (node.selector.clone().unwrap(), node.position.unwrap())
}

#[test]
fn test_ids_stay_unique_across_nesting() {
    let mut session = session_with(vec![Node::container("main").with_child(section("hero"))]);

    let result = session.apply(create(ROOT_ID, section("hero")));
    assert!(matches!(
        result,
        Err(EditorError::Mutation(MutationError::DuplicateId(id))) if id == "hero"
    ));

    let nested = section("card").with_child(section("card"));
    assert!(session.apply(create("main", nested)).is_err());
    assert!(!session.tree().contains("card"));
}

#[test]
fn test_create_keeps_chain_valid() {
    let mut session = session_with(vec![section("hero"), section("footer")]);

    session
        .apply(Mutation::CreateNode {
            parent_id: ROOT_ID.into(),
            node: section("pricing"),
            position: InsertPosition::After("hero".into()),
        })
        .unwrap();

    assert_eq!(anchor(&session, "pricing"), ("#hero".into(), Position::AfterEnd));
    assert_eq!(anchor(&session, "footer"), ("#pricing".into(), Position::AfterEnd));
    assert!(session.tree().validate().is_empty());
}

#[test]
fn test_delete_repairs_chain_after_anchorless_sibling() {
    // "a" has no id attribute, so "b" is anchored to the node id
    let mut session = session_with(vec![
        Node::html("a", "<div>plain</div>"),
        section("b"),
    ]);
    assert_eq!(anchor(&session, "b"), ("#a".into(), Position::AfterEnd));

    session
        .apply(Mutation::DeleteNode {
            node_id: "a".into(),
        })
        .unwrap();

    assert_eq!(
        anchor(&session, "b"),
        (format!("#{}", ROOT_ID), Position::BeforeEnd)
    );
    assert!(session.tree().validate().is_empty());
}

#[test]
fn test_move_into_own_descendant_is_rejected() {
    let mut session = session_with(vec![
        Node::container("outer").with_child(Node::container("inner").with_child(section("leaf"))),
    ]);
    let before = session.tree().clone();

    let result = session.apply(Mutation::MoveNode {
        source_id: "outer".into(),
        target_id: "leaf".into(),
        position: MovePosition::Inside,
    });

    assert!(matches!(
        result,
        Err(EditorError::Mutation(MutationError::CycleDetected { .. }))
    ));
    assert_eq!(session.tree(), &before);
    assert!(!session.history().can_undo());
}

#[test]
fn test_move_between_parents_resolves_both() {
    let mut session = session_with(vec![
        Node::container("left").with_child(section("a")).with_child(section("b")),
        Node::container("right").with_child(section("c")),
    ]);

    session
        .apply(Mutation::MoveNode {
            source_id: "a".into(),
            target_id: "c".into(),
            position: MovePosition::After,
        })
        .unwrap();

    assert_eq!(anchor(&session, "b"), ("#left".into(), Position::BeforeEnd));
    assert_eq!(anchor(&session, "a"), ("#c".into(), Position::AfterEnd));
    assert!(session.tree().validate().is_empty());
}

#[test]
fn test_noop_edit_adds_no_history() {
    let mut session = session_with(vec![section("hero")]);

    session
        .apply(Mutation::UpdateNode {
            node_id: "hero".into(),
            description: None,
            code: Some(r#"<section id="hero"></section>"#.into()),
        })
        .unwrap();

    assert!(!session.history().can_undo());
}

#[test]
fn test_undo_redo_symmetry() {
    let mut session = session_with(vec![section("hero")]);
    let mut states = vec![session.tree().serialize().unwrap()];

    session.apply(create(ROOT_ID, section("faq"))).unwrap();
    states.push(session.tree().serialize().unwrap());
    session
        .apply(Mutation::UpdateNode {
            node_id: "faq".into(),
            description: Some("Questions".into()),
            code: None,
        })
        .unwrap();
    states.push(session.tree().serialize().unwrap());

    session.undo().unwrap();
    assert_eq!(session.tree().serialize().unwrap(), states[1]);
    session.undo().unwrap();
    assert_eq!(session.tree().serialize().unwrap(), states[0]);
    assert!(session.undo().unwrap().is_none());

    session.redo().unwrap();
    session.redo().unwrap();
    assert_eq!(session.tree().serialize().unwrap(), states[2]);
    assert!(session.redo().unwrap().is_none());
}

#[test]
fn test_new_edit_clears_redo() {
    let mut session = session_with(vec![section("hero")]);
    session.apply(create(ROOT_ID, section("faq"))).unwrap();
    session.undo().unwrap();
    assert!(session.history().can_redo());

    session.apply(create(ROOT_ID, section("team"))).unwrap();
    assert!(!session.history().can_redo());
}

#[test]
fn test_history_limit_drops_oldest() {
    let config = EditorConfig {
        history_limit: 2,
        ..EditorConfig::default()
    };
    let mut session = EditSession::new(&config, SiteTree::empty()).unwrap();

    for id in ["a", "b", "c"] {
        session.apply(create(ROOT_ID, section(id))).unwrap();
    }

    assert_eq!(session.history().undo_levels(), 2);
    session.undo().unwrap();
    session.undo().unwrap();
    assert!(session.tree().contains("a"));
    assert!(!session.tree().contains("b"));
}

#[test]
fn test_agent_plan_skips_bad_actions() {
    let mut session = session_with(vec![section("hero")]);
    let plan = AgentPlan::parse(
        r#"{"plan": "Add FAQ", "actions": [
            {"actionType": "update", "nodeId": "ghost", "newCode": "<p></p>"},
            {"actionType": "teleport", "nodeId": "hero"},
            {"actionType": "create", "parentId": "whole-page",
             "newNode": {"id": "faq", "type": "html", "code": "<div id=\"faq\"></div>"}},
            {"actionType": "update", "nodeId": "hero", "newDescription": "Big banner"}
        ]}"#,
    )
    .unwrap();

    let (report, result) = session.apply_plan(&plan).unwrap();

    assert_eq!(report.applied, 2);
    let skipped: Vec<usize> = report.skipped.iter().map(|(index, _)| *index).collect();
    assert_eq!(skipped, vec![0, 1]);
    assert!(result.html().contains(r#"<div id="faq"></div>"#));
    assert_eq!(session.tree().find("hero").unwrap().description, "Big banner");

    // One entry for the whole plan
    assert_eq!(session.history().undo_levels(), 1);
    session.undo().unwrap();
    assert!(!session.tree().contains("faq"));
    assert_eq!(session.tree().find("hero").unwrap().description, "");
}

#[test]
fn test_regenerate_replaces_children_wholesale() {
    let mut session = session_with(vec![
        Node::container("features").with_child(section("old-a")).with_child(section("old-b")),
    ]);

    session
        .apply(Mutation::ReplaceChildren {
            parent_id: "features".into(),
            children: vec![section("old-a"), Node::css("features-css", ".f{}")],
        })
        .unwrap();

    let features = session.tree().find("features").unwrap();
    assert_eq!(features.children.len(), 2);
    assert!(!session.tree().contains("old-b"));
    assert_eq!(anchor(&session, "old-a"), ("#features".into(), Position::BeforeEnd));
}
