use crate::audit::finding::{Evidence, Finding, Status};
use crate::color::contrast::{composite_over, contrast_ratio, is_large_text};
use crate::foundation::core::{Color, NodeIdx};
use crate::foundation::error::BackdropResult;
use crate::resolve::background::{Background, BackgroundSource};
use crate::rules::recommend::recommend;
use crate::rules::{Rule, RuleContext, Verdict, finding, meets};

const DEFAULT_FONT_SIZE: f64 = 16.0;
const DEFAULT_FONT_WEIGHT: f64 = 400.0;
const SAMPLED: &str = "screenshot sample";
const NON_FINITE_METRICS: &str =
    "Text contrast needs manual review: font size or weight is not a finite number";

/// Text must reach 4.5:1 against its background (3:1 when large).
#[derive(Clone, Copy, Debug, Default)]
pub struct TextContrast;

impl Rule for TextContrast {
    fn id(&self) -> &'static str {
        "text-contrast"
    }

    fn criterion(&self) -> &'static str {
        "1.4.3"
    }

    fn check_node(&self, ctx: &RuleContext<'_>, idx: NodeIdx) -> BackdropResult<Option<Finding>> {
        let node = ctx.target.node(idx);
        if !node.is_text_like() {
            return Ok(None);
        }
        let size = node.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        let weight = node.font_weight.unwrap_or(DEFAULT_FONT_WEIGHT);
        if !size.is_finite() || !weight.is_finite() {
            return Ok(Some(finding(
                self,
                ctx,
                idx,
                Verdict {
                    severity: ctx.config.text_contrast_severity,
                    status: Status::NeedsManualReview,
                    message: NON_FINITE_METRICS.to_owned(),
                    evidence: Some(Evidence {
                        foreground: node.effective_fill(),
                        ..Evidence::default()
                    }),
                    recommendation: None,
                    measures: Vec::new(),
                },
            )));
        }
        let large = is_large_text(size, weight);
        let required = if large {
            ctx.config.text_contrast_large
        } else {
            ctx.config.text_contrast_normal
        };
        let severity = ctx.config.text_contrast_severity;
        let own_fg = node.effective_fill();

        // Structural backgrounds win; a failed or fallback-only resolution tries the screenshot
        // first and keeps the fallback as last resort.
        let structural = ctx.backgrounds.get(idx);
        let mut background: Option<(Color, String)> = match structural {
            Some(Background::Resolved {
                color,
                source: BackgroundSource::Structural,
                description,
            }) => Some((*color, description.clone())),
            _ => None,
        };
        if background.is_none() {
            background = ctx
                .sampler
                .and_then(|s| s.sample_background(ctx.target, idx, own_fg))
                .map(|c| (c, SAMPLED.to_owned()))
                .or_else(|| {
                    structural
                        .filter(|b| b.is_document_fallback())
                        .and_then(|b| b.color().map(|c| (c, b.description())))
                });
        }

        let foreground = own_fg.map(|c| (c, "fill".to_owned())).or_else(|| {
            ctx.sampler
                .and_then(|s| s.sample_foreground(ctx.target, idx, background.as_ref().map(|b| b.0)))
                .map(|c| (c, SAMPLED.to_owned()))
        });

        let (Some((fg, fg_source)), Some((bg, bg_source))) = (foreground.clone(), background.clone())
        else {
            let missing = match (&foreground, &background) {
                (None, None) => "foreground and background colors",
                (None, Some(_)) => "foreground color",
                _ => "background color",
            };
            let why = structural
                .and_then(Background::reason)
                .map(|r| format!(" ({})", r.describe()))
                .unwrap_or_default();
            return Ok(Some(finding(
                self,
                ctx,
                idx,
                Verdict {
                    severity,
                    status: Status::NeedsManualReview,
                    message: format!("Text contrast needs manual review: missing {missing}{why}"),
                    evidence: Some(Evidence {
                        foreground: foreground.map(|f| f.0),
                        background: background.map(|b| b.0),
                        required_ratio: Some(required),
                        ..Evidence::default()
                    }),
                    recommendation: None,
                    measures: Vec::new(),
                },
            )));
        };

        let ratio = contrast_ratio(composite_over(fg, bg), bg);
        tracing::debug!(node = %node.id, ratio, required, "text contrast");
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
                    "{} text contrast {ratio:.2}:1 is below the required {required}:1",
                    if large { "Large" } else { "Normal" }
                ),
                evidence: Some(Evidence {
                    foreground: Some(fg),
                    background: Some(bg),
                    ratio: Some(ratio),
                    required_ratio: Some(required),
                    foreground_source: Some(fg_source),
                    background_source: Some(bg_source),
                    ..Evidence::default()
                }),
                recommendation,
                measures: vec![ratio],
            },
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rules/text_contrast.rs"]
mod tests;
