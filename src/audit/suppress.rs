use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::finding::{Finding, Suppressed};

/// An accepted exception for a rule on one target (or all targets with `"*"`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suppression {
    /// Rule the exception applies to.
    pub rule_id: String,
    /// Target or node id; `"*"` matches everything.
    #[serde(default = "wildcard")]
    pub target_id: String,
    /// Justification; must not be empty.
    #[serde(default)]
    pub reason: String,
    /// `YYYY-MM-DD` (valid through the end of that UTC day) or an RFC 3339 timestamp.
    #[serde(default)]
    pub expires_on: String,
    /// Accountable person or team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

fn wildcard() -> String {
    "*".to_owned()
}

impl Suppression {
    /// Instant after which the suppression no longer applies.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let s = self.expires_on.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
            return Some(ts.with_timezone(&Utc));
        }
        let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
        Some(day.succ_opt()?.and_hms_opt(0, 0, 0)?.and_utc())
    }

    /// Why the suppression cannot be used at `now`, if it cannot.
    pub fn invalid_reason(&self, now: DateTime<Utc>) -> Option<String> {
        if self.rule_id.trim().is_empty() {
            return Some("ruleId is empty".to_owned());
        }
        if self.reason.trim().is_empty() {
            return Some("reason is empty".to_owned());
        }
        match self.expires_at() {
            None => Some(format!("expiresOn '{}' is not a valid date", self.expires_on)),
            Some(at) if at <= now => Some(format!("expired on {}", self.expires_on.trim())),
            Some(_) => None,
        }
    }

    fn matches(&self, f: &Finding) -> bool {
        self.rule_id == f.rule_id
            && (self.target_id == "*"
                || self.target_id == f.target.target_id
                || f.target.node_id.as_deref() == Some(self.target_id.as_str()))
    }
}

/// Findings after suppression, plus one warning per unusable suppression.
#[derive(Clone, Debug, Default)]
pub struct SuppressionOutcome {
    /// Input findings, annotated where a valid suppression matched.
    pub findings: Vec<Finding>,
    /// Warnings for ignored suppressions.
    pub warnings: Vec<String>,
}

/// Annotate findings matched by valid suppressions. Invalid suppressions are ignored and reported.
pub fn apply_suppressions(
    mut findings: Vec<Finding>,
    suppressions: &[Suppression],
    now: DateTime<Utc>,
) -> SuppressionOutcome {
    let mut warnings = Vec::new();
    let mut valid = Vec::new();
    for (i, s) in suppressions.iter().enumerate() {
        match s.invalid_reason(now) {
            Some(why) => {
                let msg = format!(
                    "suppression #{} ({} on {}) ignored: {why}",
                    i + 1,
                    s.rule_id,
                    s.target_id
                );
                tracing::warn!("{msg}");
                warnings.push(msg);
            }
            None => valid.push(s),
        }
    }

    for f in &mut findings {
        if let Some(s) = valid.iter().find(|s| s.matches(f)) {
            f.suppressed = Some(Suppressed {
                reason: s.reason.trim().to_owned(),
                expires_on: s.expires_on.trim().to_owned(),
                owner: s.owner.clone(),
            });
        }
    }

    SuppressionOutcome { findings, warnings }
}

#[cfg(test)]
#[path = "../../tests/unit/audit/suppress.rs"]
mod tests;
