use crate::audit::finding::{Evidence, Finding, Status};
use crate::color::contrast::{composite_over, contrast_ratio};
use crate::foundation::core::NodeIdx;
use crate::foundation::error::BackdropResult;
use crate::resolve::background::Background;
use crate::rules::recommend::recommend;
use crate::rules::{Rule, RuleContext, Verdict, finding, meets};

/// Interactive and icon-like shapes must reach 3:1 against their background.
///
/// Fill and stroke are both candidates for the visual boundary; the stronger one is judged. No
/// screenshot fallback applies.
#[derive(Clone, Copy, Debug, Default)]
pub struct NonTextContrast;

impl Rule for NonTextContrast {
    fn id(&self) -> &'static str {
        "non-text-contrast"
    }

    fn criterion(&self) -> &'static str {
        "1.4.11"
    }

    fn check_node(&self, ctx: &RuleContext<'_>, idx: NodeIdx) -> BackdropResult<Option<Finding>> {
        let node = ctx.target.node(idx);
        if node.is_text_like() || !(node.is_interactive || node.is_icon_like()) {
            return Ok(None);
        }
        let paints: Vec<_> = [("fill", node.effective_fill()), ("stroke", node.effective_stroke())]
            .into_iter()
            .filter_map(|(kind, c)| c.map(|c| (kind, c)))
            .collect();
        if paints.is_empty() {
            return Ok(None);
        }

        let required = ctx.config.non_text_contrast;
        let severity = ctx.config.non_text_contrast_severity;

        let bg = match ctx.backgrounds.get(idx) {
            Some(Background::Resolved { color, .. }) => *color,
            other => {
                let why = other
                    .and_then(Background::reason)
                    .map_or("background was not resolved", |r| r.describe());
                return Ok(Some(finding(
                    self,
                    ctx,
                    idx,
                    Verdict {
                        severity,
                        status: Status::NeedsManualReview,
                        message: format!("Non-text contrast needs manual review: {why}"),
                        evidence: Some(Evidence {
                            foreground: Some(paints[0].1),
                            required_ratio: Some(required),
                            ..Evidence::default()
                        }),
                        recommendation: None,
                        measures: Vec::new(),
                    },
                )));
            }
        };
        let source = ctx
            .backgrounds
            .get(idx)
            .map(Background::description)
            .unwrap_or_default();

        let Some((kind, fg, ratio)) = paints
            .iter()
            .map(|&(kind, c)| (kind, c, contrast_ratio(composite_over(c, bg), bg)))
            .max_by(|a, b| a.2.total_cmp(&b.2))
        else {
            return Ok(None);
        };
        tracing::debug!(node = %node.id, kind, ratio, "non-text contrast");
        if meets(ratio, required) {
            return Ok(None);
        }

        let recommendation = ctx.palette.map(|p| recommend(p, fg, bg, required));
        Ok(Some(finding(
            self,
            ctx,
            idx,
            Verdict {
                severity,
                status: Status::Failed,
                message: format!(
                    "Component {kind} contrast {ratio:.2}:1 is below the required {required}:1"
                ),
                evidence: Some(Evidence {
                    foreground: Some(fg),
                    background: Some(bg),
                    ratio: Some(ratio),
                    required_ratio: Some(required),
                    foreground_source: Some(kind.to_owned()),
                    background_source: Some(source),
                    ..Evidence::default()
                }),
                recommendation,
                measures: vec![ratio],
            },
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rules/non_text_contrast.rs"]
mod tests;
