use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::core::Color;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::foundation::math::StableHasher;
use crate::rules::recommend::Recommendation;

/// Impact level attached to a finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Prevents use of the interface.
    Blocker,
    /// Severe barrier for some users.
    Critical,
    /// Significant barrier.
    Major,
    /// Inconvenience.
    Minor,
    /// Informational only.
    Info,
}

impl Severity {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = BackdropError;

    fn from_str(s: &str) -> BackdropResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blocker" => Ok(Self::Blocker),
            "critical" => Ok(Self::Critical),
            "major" => Ok(Self::Major),
            "minor" => Ok(Self::Minor),
            "info" => Ok(Self::Info),
            other => Err(BackdropError::validation(format!(
                "unknown severity '{other}' (expected blocker, critical, major, minor, info)"
            ))),
        }
    }
}

/// Outcome of an automated check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// The check ran and the node does not meet the requirement.
    Failed,
    /// Automated evaluation was inconclusive.
    NeedsManualReview,
}

/// Where a finding points.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    /// Audited target id.
    pub target_id: String,
    /// Node id within the target.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Node display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
}

/// Measured values behind a finding.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    /// Foreground color used in the comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<Color>,
    /// Background color used in the comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    /// Measured contrast ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
    /// Ratio the node must reach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_ratio: Option<f64>,
    /// Where the foreground came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_source: Option<String>,
    /// Where the background came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_source: Option<String>,
    /// Measured width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Measured height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Minimum required size on both axes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<f64>,
}

/// Annotation added by the suppression stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suppressed {
    /// Why the finding is accepted.
    pub reason: String,
    /// Expiry as written in the suppression rule.
    pub expires_on: String,
    /// Person or team accountable for the exception.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// One rule verdict about one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Content-derived stable id (`f-<16 hex>`).
    pub id: String,
    /// Rule that produced the finding.
    pub rule_id: String,
    /// WCAG success criterion, e.g. `1.4.3`.
    pub criterion: String,
    /// Configured severity of the rule.
    pub severity: Severity,
    /// Failed or inconclusive.
    pub status: Status,
    /// Human-readable summary.
    pub message: String,
    /// Token replacements that would pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    /// Measurements behind the verdict.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Target and node the finding points at.
    pub target: TargetRef,
    /// Set when a valid suppression rule matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppressed: Option<Suppressed>,
}

impl Finding {
    /// Return `true` for an unsuppressed hard failure.
    pub fn is_active_failure(&self) -> bool {
        self.status == Status::Failed && self.suppressed.is_none()
    }

    /// Sort key: target, rule, node, id.
    pub(crate) fn sort_key(&self) -> (&str, &str, &str, &str) {
        (
            &self.target.target_id,
            &self.rule_id,
            self.target.node_id.as_deref().unwrap_or(""),
            &self.id,
        )
    }
}

/// Stable id from rule, target, node, and the distinguishing measurement.
pub fn finding_id(rule_id: &str, target_id: &str, node_id: Option<&str>, measures: &[f64]) -> String {
    let mut h = StableHasher::new();
    h.write_str(rule_id);
    h.write_str(target_id);
    h.write_opt_str(node_id);
    h.write_u32(measures.len() as u32);
    for &m in measures {
        h.write_f64_rounded(m, 2);
    }
    h.finish_id("f")
}

#[cfg(test)]
#[path = "../../tests/unit/audit/finding.rs"]
mod tests;
