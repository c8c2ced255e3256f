use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use backdrop::audit::gate::parse_severities;
use backdrop::color::parse::color_from_value;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Log debug diagnostics to stderr.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit every target listed in a manifest and write a JSON report.
    Audit(AuditArgs),
    /// Normalize one payload and print the canonical target as JSON.
    Normalize(NormalizeArgs),
}

#[derive(Parser, Debug)]
struct AuditArgs {
    /// Input manifest JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Audit configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output report path (stdout when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Exit with status 2 when an unsuppressed failure has one of these severities.
    #[arg(long)]
    fail_on: Option<String>,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Payload file (tree JSON, tag metadata, or code snippet).
    #[arg(long)]
    payload: PathBuf,

    /// Target id to stamp on the output.
    #[arg(long, default_value = "target")]
    id: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    targets: Vec<ManifestTarget>,
    #[serde(default)]
    tokens: Option<serde_json::Value>,
    #[serde(default)]
    suppressions: Vec<backdrop::Suppression>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ManifestTarget {
    id: String,
    payload: PathBuf,
    #[serde(default)]
    expansions: BTreeMap<String, PathBuf>,
    #[serde(default)]
    style_hints: backdrop::StyleHints,
    #[serde(default)]
    screenshot: Option<PathBuf>,
    #[serde(default)]
    fallback_background: Option<serde_json::Value>,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Audit(args) => cmd_audit(args),
        Command::Normalize(args) => cmd_normalize(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_audit(args: AuditArgs) -> anyhow::Result<ExitCode> {
    let config = match &args.config {
        Some(p) => backdrop::AuditConfig::from_path(p)?,
        None => backdrop::AuditConfig::default(),
    };
    let fail_on = args
        .fail_on
        .as_deref()
        .map(parse_severities)
        .transpose()?
        .unwrap_or_default();

    let raw = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read manifest '{}'", args.in_path.display()))?;
    let manifest: Manifest = serde_json::from_str(&raw)
        .with_context(|| format!("parse manifest '{}'", args.in_path.display()))?;
    let root = args
        .in_path
        .parent()
        .unwrap_or_else(|| Path::new("."));

    let palette = match manifest.tokens {
        None => None,
        Some(serde_json::Value::String(rel)) => {
            let path = root.join(rel);
            let f = std::fs::File::open(&path)
                .with_context(|| format!("open tokens '{}'", path.display()))?;
            Some(backdrop::TokenPalette::from_reader(std::io::BufReader::new(f))?)
        }
        Some(inline) => Some(backdrop::TokenPalette::from_json(&inline)?),
    };

    let inputs = manifest
        .targets
        .into_iter()
        .map(|t| load_target(root, t))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let auditor = backdrop::Auditor::new(config)?.with_options(backdrop::AuditOptions {
        threads: args.threads,
    });
    let report = auditor.audit(
        &inputs,
        palette.as_ref(),
        &manifest.suppressions,
        chrono::Utc::now(),
    )?;
    for w in &report.warnings {
        tracing::warn!("{w}");
    }

    let json = serde_json::to_string_pretty(&report).context("serialize report")?;
    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(out, json + "\n")
                .with_context(|| format!("write report '{}'", out.display()))?;
            eprintln!(
                "wrote {} ({} findings, {} targets)",
                out.display(),
                report.findings.len(),
                report.targets_audited
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write report to stdout")?;
        }
    }

    if backdrop::exceeds_severity(&report.findings, &fail_on) {
        eprintln!("severity gate failed");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn load_target(root: &Path, t: ManifestTarget) -> anyhow::Result<backdrop::TargetInput> {
    let primary = backdrop::RawPayload::from_path(root.join(&t.payload))?;
    let mut payloads = backdrop::PayloadSet::new(primary).with_style_hints(t.style_hints);
    for (node_id, rel) in t.expansions {
        payloads = payloads.with_expansion(node_id, backdrop::RawPayload::from_path(root.join(rel))?);
    }
    if let Some(v) = t.fallback_background {
        let color = color_from_value(&v).with_context(|| {
            format!("target '{}': fallbackBackground is not a color", t.id)
        })?;
        payloads = payloads.with_fallback_background(color);
    }
    let screenshot = t
        .screenshot
        .map(|rel| {
            let path = root.join(rel);
            std::fs::read(&path).with_context(|| format!("read screenshot '{}'", path.display()))
        })
        .transpose()?;
    Ok(backdrop::TargetInput {
        id: t.id,
        payloads,
        screenshot,
    })
}

fn cmd_normalize(args: NormalizeArgs) -> anyhow::Result<ExitCode> {
    let payload = backdrop::RawPayload::from_path(&args.payload)?;
    let target = backdrop::normalize(&args.id, &backdrop::PayloadSet::new(payload));
    let json = serde_json::to_string_pretty(&target).context("serialize target")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("write target to stdout")?;
    Ok(ExitCode::SUCCESS)
}
