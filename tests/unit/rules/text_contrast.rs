use super::*;
use crate::audit::config::AuditConfig;
use crate::audit::finding::Severity;
use crate::color::tokens::TokenPalette;
use crate::foundation::core::Bounds;
use crate::raster::png::Raster;
use crate::raster::sampler::{Sampler, SamplingSettings};
use crate::resolve::background::{BackgroundResolver, ResolvedBackgrounds};
use crate::scene::model::{ContextSource, Node, Target};

const GRAY: Color = Color::rgb(0x77, 0x77, 0x77);

fn page(fill: Option<Color>) -> Node {
    Node {
        id: "page".to_string(),
        name: "Page".to_string(),
        node_type: "FRAME".to_string(),
        bounds: Some(Bounds::new(0.0, 0.0, 40.0, 40.0)),
        fills: fill.into_iter().collect(),
        ..Node::default()
    }
}

fn label(fill: Option<Color>, size: f64, weight: f64) -> Node {
    Node {
        id: "label".to_string(),
        name: "Label".to_string(),
        node_type: "TEXT".to_string(),
        parent: Some(NodeIdx(0)),
        bounds: Some(Bounds::new(10.0, 15.0, 20.0, 10.0)),
        fills: fill.into_iter().collect(),
        text: Some("Hello".to_string()),
        font_size: Some(size),
        font_weight: Some(weight),
        ..Node::default()
    }
}

fn run(
    target: &Target,
    palette: Option<&TokenPalette>,
    raster: Option<&Raster>,
) -> Vec<Finding> {
    let config = AuditConfig::default();
    let backgrounds = ResolvedBackgrounds::compute(target, &BackgroundResolver::default());
    let settings = SamplingSettings::default();
    let sampler = raster.map(|r| Sampler::new(r, target, &settings));
    let ctx = RuleContext {
        target,
        backgrounds: &backgrounds,
        palette,
        sampler: sampler.as_ref(),
        config: &config,
    };
    TextContrast.evaluate(&ctx)
}

fn target(nodes: Vec<Node>, fallback: Option<Color>) -> Target {
    Target::from_nodes("home", nodes, ContextSource::DesignTree, fallback, vec![])
}

#[test]
fn low_contrast_normal_text_fails() {
    let t = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 16.0, 400.0)], None);
    let findings = run(&t, None, None);
    assert_eq!(findings.len(), 1);
    let f = &findings[0];
    assert_eq!(f.rule_id, "text-contrast");
    assert_eq!(f.criterion, "1.4.3");
    assert_eq!(f.status, Status::Failed);
    assert_eq!(f.severity, Severity::Critical);
    assert!(f.id.starts_with("f-"));
    assert!(f.recommendation.is_none());

    let ev = f.evidence.as_ref().unwrap();
    assert_eq!(ev.background, Some(Color::WHITE));
    assert_eq!(ev.required_ratio, Some(4.5));
    assert!(ev.ratio.unwrap() < 4.5 && ev.ratio.unwrap() > 4.4);
    assert_eq!(f.target.node_id.as_deref(), Some("label"));
}

#[test]
fn passing_text_produces_no_finding() {
    let t = target(vec![page(Some(Color::WHITE)), label(Some(Color::BLACK), 12.0, 400.0)], None);
    assert!(run(&t, None, None).is_empty());
}

#[test]
fn large_text_thresholds() {
    let large = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 24.0, 400.0)], None);
    assert!(run(&large, None, None).is_empty());

    let bold = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 18.5, 700.0)], None);
    assert!(run(&bold, None, None).is_empty());

    let small_bold = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 18.0, 700.0)], None);
    assert_eq!(run(&small_bold, None, None).len(), 1);
}

#[test]
fn palette_attaches_recommendation() {
    let mut p = TokenPalette::new();
    p.insert("ink", Color::rgb(0x11, 0x11, 0x11));
    let t = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 16.0, 400.0)], None);
    let findings = run(&t, Some(&p), None);
    let rec = findings[0].recommendation.as_ref().unwrap();
    assert_eq!(rec.foreground.found().unwrap().token, "ink");
}

#[test]
fn missing_colors_need_manual_review() {
    let t = target(vec![page(Some(Color::WHITE)), label(None, 16.0, 400.0)], None);
    let f = &run(&t, None, None)[0];
    assert_eq!(f.status, Status::NeedsManualReview);
    assert!(f.message.contains("missing foreground color"));

    let t = target(vec![page(None), label(Some(GRAY), 16.0, 400.0)], None);
    let f = &run(&t, None, None)[0];
    assert_eq!(f.status, Status::NeedsManualReview);
    assert!(f.message.contains("no ancestor or underlying layer has a fill"));
}

#[test]
fn fallback_only_background_prefers_screenshot_sample() {
    let navy = [0, 0, 0x80, 255];
    let mut rgba = Vec::new();
    for _ in 0..40 * 40 {
        rgba.extend_from_slice(&navy);
    }
    let raster = Raster::new(40, 40, rgba).unwrap();
    let t = target(vec![page(None), label(Some(GRAY), 16.0, 400.0)], Some(Color::WHITE));

    let sampled = &run(&t, None, Some(&raster))[0];
    let ev = sampled.evidence.as_ref().unwrap();
    assert_eq!(ev.background, Some(Color::rgb(0, 0, 0x80)));
    assert_eq!(ev.background_source.as_deref(), Some("screenshot sample"));

    let fallback = &run(&t, None, None)[0];
    let ev = fallback.evidence.as_ref().unwrap();
    assert_eq!(ev.background, Some(Color::WHITE));
    assert_eq!(ev.background_source.as_deref(), Some("document fallback background"));
    assert_ne!(sampled.id, fallback.id);
}

#[test]
fn translucent_text_is_flattened_before_measuring() {
    let t = target(
        vec![page(Some(Color::WHITE)), label(Some(Color::rgba(0, 0, 0, 0.3)), 16.0, 400.0)],
        None,
    );
    let f = &run(&t, None, None)[0];
    let ratio = f.evidence.as_ref().unwrap().ratio.unwrap();
    assert!(ratio > 1.5 && ratio < 2.5, "{ratio}");
}

#[test]
fn non_finite_font_metrics_need_manual_review() {
    for (size, weight) in [(f64::NAN, 400.0), (16.0, f64::INFINITY)] {
        let t = target(
            vec![page(Some(Color::WHITE)), label(Some(GRAY), size, weight)],
            None,
        );
        let findings = run(&t, None, None);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, Status::NeedsManualReview);
        assert!(findings[0].message.contains("not a finite number"));
        assert_eq!(findings[0].target.node_id.as_deref(), Some("label"));
    }
}

#[test]
fn ids_are_stable_across_runs() {
    let t = target(vec![page(Some(Color::WHITE)), label(Some(GRAY), 16.0, 400.0)], None);
    assert_eq!(run(&t, None, None)[0].id, run(&t, None, None)[0].id);
}
