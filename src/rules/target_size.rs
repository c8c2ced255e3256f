use crate::audit::finding::{Evidence, Finding, Status};
use crate::foundation::core::NodeIdx;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::rules::{Rule, RuleContext, Verdict, finding};

/// Interactive targets must be at least `minTargetSize` on both axes.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetSize;

impl Rule for TargetSize {
    fn id(&self) -> &'static str {
        "target-size"
    }

    fn criterion(&self) -> &'static str {
        "2.5.8"
    }

    fn check_node(&self, ctx: &RuleContext<'_>, idx: NodeIdx) -> BackdropResult<Option<Finding>> {
        let node = ctx.target.node(idx);
        if !node.is_interactive {
            return Ok(None);
        }
        let min = ctx.config.min_target_size;
        let severity = ctx.config.target_size_severity;

        let Some(b) = node.bounds else {
            return Ok(Some(finding(
                self,
                ctx,
                idx,
                Verdict {
                    severity,
                    status: Status::NeedsManualReview,
                    message: "Target size needs manual review: node has no bounds".to_owned(),
                    evidence: Some(Evidence {
                        min_size: Some(min),
                        ..Evidence::default()
                    }),
                    recommendation: None,
                    measures: Vec::new(),
                },
            )));
        };
        if !b.is_well_formed() {
            return Err(BackdropError::evaluation(format!(
                "node '{}' has malformed bounds",
                node.id
            )));
        }
        if b.width >= min && b.height >= min {
            return Ok(None);
        }

        Ok(Some(finding(
            self,
            ctx,
            idx,
            Verdict {
                severity,
                status: Status::Failed,
                message: format!(
                    "Interactive target is {}x{}, smaller than the required {min}x{min}",
                    fmt_len(b.width),
                    fmt_len(b.height)
                ),
                evidence: Some(Evidence {
                    width: Some(b.width),
                    height: Some(b.height),
                    min_size: Some(min),
                    ..Evidence::default()
                }),
                recommendation: None,
                measures: vec![b.width, b.height],
            },
        )))
    }
}

fn fmt_len(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.1}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rules/target_size.rs"]
mod tests;
