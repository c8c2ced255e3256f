use crate::audit::finding::{Finding, Severity};
use crate::foundation::error::BackdropResult;

/// Return `true` when any unsuppressed failed finding has a severity in `severities`.
///
/// Manual-review findings never trip the gate.
pub fn exceeds_severity(findings: &[Finding], severities: &[Severity]) -> bool {
    findings
        .iter()
        .any(|f| f.is_active_failure() && severities.contains(&f.severity))
}

/// Parse a comma-separated severity list such as `blocker,critical`.
pub fn parse_severities(s: &str) -> BackdropResult<Vec<Severity>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::parse)
        .collect()
}
