use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audit::finding::Severity;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::raster::sampler::SamplingSettings;
use crate::resolve::background::DEFAULT_COVERAGE_TOLERANCE;

/// Thresholds and severities for an audit run.
///
/// Every field has a default, so an empty JSON object is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditConfig {
    /// Required ratio for normal-size text.
    pub text_contrast_normal: f64,
    /// Required ratio for large text.
    pub text_contrast_large: f64,
    /// Required ratio for interactive and icon-like shapes.
    pub non_text_contrast: f64,
    /// Minimum width and height of interactive targets.
    pub min_target_size: f64,
    /// Severity of undersized targets.
    pub target_size_severity: Severity,
    /// Severity of text contrast findings.
    pub text_contrast_severity: Severity,
    /// Severity of non-text contrast findings.
    pub non_text_contrast_severity: Severity,
    /// Absolute slack when testing whether a layer covers a node.
    pub coverage_tolerance: f64,
    /// Screenshot sampling parameters.
    pub sampling: SamplingSettings,
    /// Rule ids to skip.
    pub disabled_rules: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            text_contrast_normal: 4.5,
            text_contrast_large: 3.0,
            non_text_contrast: 3.0,
            min_target_size: 24.0,
            target_size_severity: Severity::Blocker,
            text_contrast_severity: Severity::Critical,
            non_text_contrast_severity: Severity::Major,
            coverage_tolerance: DEFAULT_COVERAGE_TOLERANCE,
            sampling: SamplingSettings::default(),
            disabled_rules: Vec::new(),
        }
    }
}

impl AuditConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BackdropResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| BackdropError::validation(format!("parse audit config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BackdropError::validation(format!("open audit config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Reject non-finite or non-positive thresholds.
    pub fn validate(&self) -> BackdropResult<()> {
        for (name, v) in [
            ("textContrastNormal", self.text_contrast_normal),
            ("textContrastLarge", self.text_contrast_large),
            ("nonTextContrast", self.non_text_contrast),
        ] {
            if !v.is_finite() || !(1.0..=21.0).contains(&v) {
                return Err(BackdropError::validation(format!(
                    "{name} must be a contrast ratio in [1, 21], got {v}"
                )));
            }
        }
        if !self.min_target_size.is_finite() || self.min_target_size <= 0.0 {
            return Err(BackdropError::validation(format!(
                "minTargetSize must be > 0, got {}",
                self.min_target_size
            )));
        }
        if !self.coverage_tolerance.is_finite() || self.coverage_tolerance < 0.0 {
            return Err(BackdropError::validation(format!(
                "coverageTolerance must be >= 0, got {}",
                self.coverage_tolerance
            )));
        }

        let s = &self.sampling;
        if !s.ring_padding.is_finite() || s.ring_padding < 0.0 {
            return Err(BackdropError::validation("sampling.ringPadding must be >= 0"));
        }
        if !s.foreground_exclusion_distance.is_finite() || s.foreground_exclusion_distance < 0.0 {
            return Err(BackdropError::validation(
                "sampling.foregroundExclusionDistance must be >= 0",
            ));
        }
        if s.bucket_size == 0 {
            return Err(BackdropError::validation("sampling.bucketSize must be >= 1"));
        }
        if !(0.0..=1.0).contains(&s.foreground_closeness) {
            return Err(BackdropError::validation(
                "sampling.foregroundCloseness must be in [0, 1]",
            ));
        }
        Ok(())
    }

    /// Return `true` unless the rule id is listed in `disabledRules`.
    pub fn is_enabled(&self, rule_id: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == rule_id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audit/config.rs"]
mod tests;
