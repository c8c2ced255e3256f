use super::*;
use crate::audit::config::AuditConfig;
use crate::audit::finding::Severity;
use crate::foundation::core::{Bounds, Color};
use crate::resolve::background::{BackgroundResolver, ResolvedBackgrounds};
use crate::scene::model::{ContextSource, Node, Target};

fn page(fill: Option<Color>) -> Node {
    Node {
        id: "page".to_string(),
        node_type: "FRAME".to_string(),
        bounds: Some(Bounds::new(0.0, 0.0, 200.0, 200.0)),
        fills: fill.into_iter().collect(),
        ..Node::default()
    }
}

fn button(fill: Option<Color>, stroke: Option<Color>) -> Node {
    Node {
        id: "cta".to_string(),
        name: "Submit button".to_string(),
        node_type: "FRAME".to_string(),
        parent: Some(NodeIdx(0)),
        bounds: Some(Bounds::new(10.0, 10.0, 120.0, 44.0)),
        fills: fill.into_iter().collect(),
        strokes: stroke.into_iter().collect(),
        is_interactive: true,
        ..Node::default()
    }
}

fn run(nodes: Vec<Node>) -> Vec<Finding> {
    let target = Target::from_nodes("t", nodes, ContextSource::DesignTree, None, vec![]);
    let config = AuditConfig::default();
    let backgrounds = ResolvedBackgrounds::compute(&target, &BackgroundResolver::default());
    let ctx = RuleContext {
        target: &target,
        backgrounds: &backgrounds,
        palette: None,
        sampler: None,
        config: &config,
    };
    NonTextContrast.evaluate(&ctx)
}

#[test]
fn faint_button_fails_with_major_severity() {
    let findings = run(vec![
        page(Some(Color::WHITE)),
        button(Some(Color::rgb(0xee, 0xee, 0xee)), None),
    ]);
    assert_eq!(findings.len(), 1);
    let f = &findings[0];
    assert_eq!(f.rule_id, "non-text-contrast");
    assert_eq!(f.criterion, "1.4.11");
    assert_eq!(f.severity, Severity::Major);
    assert_eq!(f.status, Status::Failed);
    assert_eq!(
        f.evidence.as_ref().unwrap().foreground_source.as_deref(),
        Some("fill")
    );
}

#[test]
fn strong_stroke_rescues_a_faint_fill() {
    let findings = run(vec![
        page(Some(Color::WHITE)),
        button(Some(Color::rgb(0xee, 0xee, 0xee)), Some(Color::rgb(0x44, 0x44, 0x44))),
    ]);
    assert!(findings.is_empty());
}

#[test]
fn shapes_without_paint_are_out_of_scope() {
    assert!(run(vec![page(Some(Color::WHITE)), button(None, None)]).is_empty());
}

#[test]
fn text_and_plain_shapes_are_ignored() {
    let mut text = button(Some(Color::rgb(0xee, 0xee, 0xee)), None);
    text.node_type = "TEXT".to_string();
    let mut plain = button(Some(Color::rgb(0xee, 0xee, 0xee)), None);
    plain.is_interactive = false;
    plain.name = "Card".to_string();
    assert!(run(vec![page(Some(Color::WHITE)), text]).is_empty());
    assert!(run(vec![page(Some(Color::WHITE)), plain]).is_empty());
}

#[test]
fn icons_are_checked_even_when_not_interactive() {
    let mut icon = button(Some(Color::rgb(0xdd, 0xdd, 0xdd)), None);
    icon.node_type = "VECTOR".to_string();
    icon.is_interactive = false;
    assert_eq!(run(vec![page(Some(Color::WHITE)), icon]).len(), 1);
}

#[test]
fn unresolved_background_needs_manual_review() {
    let findings = run(vec![page(None), button(Some(Color::rgb(0x33, 0x33, 0x33)), None)]);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].status, Status::NeedsManualReview);
    assert!(findings[0].message.contains("no ancestor"));
}
