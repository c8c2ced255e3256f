//! Contrast and target-size rules plus the token recommender.

use crate::audit::config::AuditConfig;
use crate::audit::finding::{Evidence, Finding, Severity, Status, TargetRef, finding_id};
use crate::color::tokens::TokenPalette;
use crate::foundation::core::NodeIdx;
use crate::foundation::error::BackdropResult;
use crate::raster::sampler::Sampler;
use crate::resolve::background::ResolvedBackgrounds;
use crate::rules::recommend::Recommendation;
use crate::scene::model::Target;

/// Interactive and icon-like shape contrast (WCAG 1.4.11).
pub mod non_text_contrast;
/// Token palette search for passing replacements.
pub mod recommend;
/// Minimum interactive target size (WCAG 2.5.8).
pub mod target_size;
/// Text contrast (WCAG 1.4.3).
pub mod text_contrast;

pub use non_text_contrast::NonTextContrast;
pub use target_size::TargetSize;
pub use text_contrast::TextContrast;

/// Read-only inputs shared by every rule evaluating one target.
pub struct RuleContext<'a> {
    /// Normalized target.
    pub target: &'a Target,
    /// Structural backgrounds resolved once per target.
    pub backgrounds: &'a ResolvedBackgrounds,
    /// Optional design tokens for recommendations.
    pub palette: Option<&'a TokenPalette>,
    /// Screenshot sampler, when a screenshot decoded successfully.
    pub sampler: Option<&'a Sampler<'a>>,
    /// Thresholds and severities.
    pub config: &'a AuditConfig,
}

impl RuleContext<'_> {
    pub(crate) fn target_ref(&self, idx: NodeIdx) -> TargetRef {
        let node = self.target.node(idx);
        TargetRef {
            target_id: self.target.id.clone(),
            node_id: Some(node.id.clone()),
            node_name: (!node.name.is_empty()).then(|| node.name.clone()),
        }
    }
}

/// An automated check over the nodes of one target.
pub trait Rule: Send + Sync {
    /// Stable rule id, e.g. `text-contrast`.
    fn id(&self) -> &'static str;

    /// WCAG success criterion the rule checks.
    fn criterion(&self) -> &'static str;

    /// Check one node. `Ok(None)` means the node passes or is out of scope.
    fn check_node(&self, ctx: &RuleContext<'_>, idx: NodeIdx) -> BackdropResult<Option<Finding>>;

    /// Check every node. A node that errors is logged and skipped.
    fn evaluate(&self, ctx: &RuleContext<'_>) -> Vec<Finding> {
        let mut out = Vec::new();
        for idx in ctx.target.indices() {
            match self.check_node(ctx, idx) {
                Ok(Some(f)) => out.push(f),
                Ok(None) => {}
                Err(e) => tracing::warn!(
                    rule = self.id(),
                    target_id = %ctx.target.id,
                    node = %ctx.target.node(idx).id,
                    error = %e,
                    "rule evaluation failed for node"
                ),
            }
        }
        out
    }
}

/// The built-in rule set.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(TextContrast),
        Box::new(NonTextContrast),
        Box::new(TargetSize),
    ]
}

/// Fields a rule fills in before the finding id is derived.
pub(crate) struct Verdict {
    pub(crate) severity: Severity,
    pub(crate) status: Status,
    pub(crate) message: String,
    pub(crate) evidence: Option<Evidence>,
    pub(crate) recommendation: Option<Recommendation>,
    pub(crate) measures: Vec<f64>,
}

pub(crate) fn finding<R: Rule + ?Sized>(
    rule: &R,
    ctx: &RuleContext<'_>,
    idx: NodeIdx,
    v: Verdict,
) -> Finding {
    let target = ctx.target_ref(idx);
    Finding {
        id: finding_id(
            rule.id(),
            &target.target_id,
            target.node_id.as_deref(),
            &v.measures,
        ),
        rule_id: rule.id().to_owned(),
        criterion: rule.criterion().to_owned(),
        severity: v.severity,
        status: v.status,
        message: v.message,
        recommendation: v.recommendation,
        evidence: v.evidence,
        target,
        suppressed: None,
    }
}

/// Contrast requirements compare unrounded ratios.
pub(crate) fn meets(ratio: f64, required: f64) -> bool {
    ratio >= required
}
