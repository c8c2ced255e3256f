use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;

use crate::audit::checklist::{ChecklistItem, checklist_for};
use crate::audit::config::AuditConfig;
use crate::audit::finding::Finding;
use crate::audit::suppress::{Suppression, apply_suppressions};
use crate::color::tokens::TokenPalette;
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::normalize::pass::normalize;
use crate::raster::png::decode_png;
use crate::raster::sampler::Sampler;
use crate::resolve::background::{BackgroundResolver, ResolvedBackgrounds};
use crate::rules::{Rule, RuleContext, default_rules};
use crate::scene::payload::PayloadSet;

/// One unit of audit input.
#[derive(Clone, Debug)]
pub struct TargetInput {
    /// Target id, unique within a run.
    pub id: String,
    /// Raw design payloads.
    pub payloads: PayloadSet,
    /// Optional PNG screenshot of the target.
    pub screenshot: Option<Vec<u8>>,
}

/// Execution knobs that never affect results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuditOptions {
    /// Worker threads; `None` uses rayon's default pool size.
    pub threads: Option<usize>,
}

/// Output of an audit run. Ordering is deterministic.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    /// Findings sorted by target, rule, node, and id.
    pub findings: Vec<Finding>,
    /// Manual checklist sorted by target and check id.
    pub checklist: Vec<ChecklistItem>,
    /// Normalization, decoding, and suppression warnings.
    pub warnings: Vec<String>,
    /// Number of targets processed.
    pub targets_audited: usize,
}

struct TargetAudit {
    findings: Vec<Finding>,
    warnings: Vec<String>,
}

/// Runs the rule set over targets.
pub struct Auditor {
    config: AuditConfig,
    options: AuditOptions,
    rules: Vec<Box<dyn Rule>>,
}

impl Auditor {
    /// Auditor with the built-in rules. Fails when the configuration is invalid.
    pub fn new(config: AuditConfig) -> BackdropResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            options: AuditOptions::default(),
            rules: default_rules(),
        })
    }

    /// Replace the execution options. Thread counts are validated when the pool is built.
    pub fn with_options(mut self, options: AuditOptions) -> Self {
        self.options = options;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Audit every target, then sort and apply suppressions.
    ///
    /// `now` is only used to judge suppression expiry; the core never reads the clock.
    #[tracing::instrument(skip_all, fields(targets = inputs.len()))]
    pub fn audit(
        &self,
        inputs: &[TargetInput],
        palette: Option<&TokenPalette>,
        suppressions: &[Suppression],
        now: DateTime<Utc>,
    ) -> BackdropResult<AuditReport> {
        let pool = build_thread_pool(self.options.threads)?;
        let per_target: Vec<TargetAudit> = pool.install(|| {
            inputs
                .par_iter()
                .map(|input| self.audit_target(input, palette))
                .collect()
        });

        let mut findings = Vec::new();
        let mut warnings = Vec::new();
        for t in per_target {
            findings.extend(t.findings);
            warnings.extend(t.warnings);
        }
        findings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let mut checklist: Vec<ChecklistItem> =
            inputs.iter().flat_map(|i| checklist_for(&i.id)).collect();
        checklist.sort_by(|a, b| {
            (&a.target.target_id, &a.check_id).cmp(&(&b.target.target_id, &b.check_id))
        });

        let suppressed = apply_suppressions(findings, suppressions, now);
        warnings.extend(suppressed.warnings);

        tracing::debug!(
            findings = suppressed.findings.len(),
            warnings = warnings.len(),
            "audit complete"
        );
        Ok(AuditReport {
            findings: suppressed.findings,
            checklist,
            warnings,
            targets_audited: inputs.len(),
        })
    }

    fn audit_target(&self, input: &TargetInput, palette: Option<&TokenPalette>) -> TargetAudit {
        let target = normalize(&input.id, &input.payloads);
        let mut warnings: Vec<String> = target
            .warnings
            .iter()
            .map(|w| format!("{}: {w}", input.id))
            .collect();

        let resolver = BackgroundResolver::new(self.config.coverage_tolerance);
        let backgrounds = ResolvedBackgrounds::compute(&target, &resolver);

        let raster = input.screenshot.as_deref().and_then(|bytes| match decode_png(bytes) {
            Ok(r) => Some(r),
            Err(e) => {
                tracing::warn!(target_id = %input.id, error = %e, "screenshot unavailable");
                warnings.push(format!("{}: screenshot ignored ({e})", input.id));
                None
            }
        });
        let sampler = raster
            .as_ref()
            .map(|r| Sampler::new(r, &target, &self.config.sampling));

        let ctx = RuleContext {
            target: &target,
            backgrounds: &backgrounds,
            palette,
            sampler: sampler.as_ref(),
            config: &self.config,
        };
        let findings = self
            .rules
            .iter()
            .filter(|r| self.config.is_enabled(r.id()))
            .flat_map(|r| r.evaluate(&ctx))
            .collect();

        TargetAudit { findings, warnings }
    }
}

fn build_thread_pool(threads: Option<usize>) -> BackdropResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BackdropError::validation(
            "audit option 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BackdropError::evaluation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/audit/session.rs"]
mod tests;
