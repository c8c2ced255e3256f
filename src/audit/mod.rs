//! Audit orchestration: configuration, findings, suppression, and the severity gate.

/// Static manual-review catalog.
pub mod checklist;
/// Thresholds, severities, and sampling settings.
pub mod config;
/// Finding model and stable ids.
pub mod finding;
/// Severity gate predicate.
pub mod gate;
/// Per-target pipeline and parallel orchestration.
pub mod session;
/// Suppression rules with expiry.
pub mod suppress;
