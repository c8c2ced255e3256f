use super::*;
use crate::foundation::core::{Bounds, Color};
use serde_json::json;

#[test]
fn tree_payload_yields_design_tree_context() {
    let set = PayloadSet::new(RawPayload::Tree(json!({
        "id": "1:1", "type": "FRAME",
        "absoluteBoundingBox": {"x": 0, "y": 0, "width": 100, "height": 100},
        "children": [{"id": "1:2", "type": "TEXT", "characters": "Hi"}]
    })));
    let t = normalize("page", &set);
    assert_eq!(t.id, "page");
    assert_eq!(t.context_source, ContextSource::DesignTree);
    assert_eq!(t.len(), 2);
    assert!(t.warnings.is_empty());
}

#[test]
fn metadata_payload_yields_fallback_context() {
    let set = PayloadSet::new(RawPayload::Metadata(
        r#"<frame id="1" name="Root" width="10" height="10"/>"#.to_string(),
    ));
    let t = normalize("page", &set);
    assert_eq!(t.context_source, ContextSource::MetadataFallback);
}

#[test]
fn empty_payload_reports_no_traversable_nodes() {
    let set = PayloadSet::new(RawPayload::Tree(json!({"name": "no id"})));
    let t = normalize("page", &set);
    assert!(t.is_empty());
    assert_eq!(t.warnings, vec![NO_TRAVERSABLE_NODES.to_string()]);
}

#[test]
fn expansions_merge_into_existing_records() {
    let primary = RawPayload::Metadata(
        r#"<frame id="1" name="Root" x="0" y="0" width="300" height="200">
             <instance id="2" name="Card" x="10" y="10" width="100" height="50"/>
           </frame>"#
            .to_string(),
    );
    let expansion = RawPayload::Tree(json!({
        "id": "2", "type": "INSTANCE", "name": "Card (expanded)",
        "x": 99, "y": 99, "width": 1, "height": 1,
        "fills": [{"type": "SOLID", "color": "#ffffff"}],
        "children": [{"id": "3", "type": "TEXT", "characters": "Body", "x": 4, "y": 4, "width": 40, "height": 12}]
    }));
    let set = PayloadSet::new(primary).with_expansion("2", expansion);
    let t = normalize("page", &set);

    let card = t.node(t.find("2").unwrap());
    assert_eq!(card.name, "Card (expanded)");
    assert_eq!(card.bounds, Some(Bounds::new(10.0, 10.0, 100.0, 50.0)));
    assert_eq!(card.fills.as_slice(), &[Color::WHITE]);
    assert_eq!(card.parent, t.find("1"));

    let body = t.find("3").unwrap();
    assert_eq!(t.parent(body), t.find("2"));
    assert_eq!(
        t.absolute_bounds(body),
        Some(Bounds::new(14.0, 14.0, 40.0, 12.0))
    );
}

#[test]
fn expansion_of_root_does_not_become_its_own_parent() {
    let primary = RawPayload::Tree(json!({"id": "1", "type": "FRAME"}));
    let expansion = RawPayload::Tree(json!({"id": "1", "type": "FRAME", "name": "Root"}));
    let t = normalize("page", &PayloadSet::new(primary).with_expansion("1", expansion));
    assert_eq!(t.len(), 1);
    assert_eq!(t.parent(t.find("1").unwrap()), None);
}

#[test]
fn expansions_of_hidden_nodes_are_dropped() {
    let primary = RawPayload::Tree(json!({
        "id": "1", "type": "FRAME",
        "children": [{"id": "2", "type": "FRAME", "visible": false}]
    }));
    let expansion = RawPayload::Tree(json!({
        "id": "2", "type": "FRAME",
        "children": [{"id": "3", "type": "TEXT"}]
    }));
    let t = normalize("page", &PayloadSet::new(primary).with_expansion("2", expansion));
    assert_eq!(t.len(), 1);
    assert!(t.find("3").is_none());
}

#[test]
fn expansions_below_a_hidden_ancestor_are_dropped() {
    let primary = RawPayload::Tree(json!({
        "id": "1", "type": "FRAME",
        "children": [{
            "id": "h", "type": "FRAME", "visible": false,
            "children": [{"id": "c", "type": "FRAME"}]
        }]
    }));
    let expansion = RawPayload::Tree(json!({
        "id": "c", "type": "FRAME",
        "children": [{"id": "c-text", "type": "TEXT", "characters": "Hidden"}]
    }));
    let t = normalize("page", &PayloadSet::new(primary).with_expansion("c", expansion));
    assert_eq!(t.len(), 1);
    assert!(t.find("c").is_none());
    assert!(t.find("c-text").is_none());
    assert!(t.warnings.is_empty());
}

#[test]
fn metadata_expansion_cannot_resurrect_a_hidden_subtree() {
    let primary = RawPayload::Tree(json!({
        "id": "1", "type": "FRAME",
        "children": [{
            "id": "h", "type": "FRAME", "visible": false,
            "children": [{"id": "c", "type": "FRAME"}]
        }]
    }));
    let expansion = RawPayload::Metadata(
        r#"<frame id="c" name="C"><text id="c-text" name="Hidden" /></frame>"#.to_string(),
    );
    let t = normalize("page", &PayloadSet::new(primary).with_expansion("1", expansion));
    assert_eq!(t.len(), 1);
    assert!(t.find("c-text").is_none());
}

#[test]
fn code_snippets_and_explicit_hints_fill_missing_paint() {
    let primary = RawPayload::Metadata(
        r#"<frame id="1" name="Root" width="100" height="100">
             <text id="2" name="Label" width="50" height="10"/>
           </frame>"#
            .to_string(),
    );
    let code = RawPayload::CodeSnippet(
        r##"<div data-node-id="1" className="bg-[#fefefe]"><p data-node-id="2" className="text-[#444444]">Label</p></div>"##
            .to_string(),
    );
    let mut hints = StyleHints::default();
    hints.fills.insert("1".into(), vec![Color::BLACK]);
    let set = PayloadSet::new(primary)
        .with_expansion("1", code)
        .with_style_hints(hints);
    let t = normalize("page", &set);

    // Explicit hints take precedence over ones extracted from code.
    assert_eq!(t.node(t.find("1").unwrap()).fills.as_slice(), &[Color::BLACK]);
    assert_eq!(
        t.node(t.find("2").unwrap()).fills.as_slice(),
        &[Color::rgb(0x44, 0x44, 0x44)]
    );
}
