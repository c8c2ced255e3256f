//! Backdrop is an accessibility audit engine for design layer trees.
//!
//! It normalizes heterogeneous design payloads into one canonical node graph, resolves the
//! effective background behind each node through transparent layering, falls back to sampling a
//! screenshot when the graph is not enough, and evaluates contrast and target-size rules into
//! stable, deterministic findings:
//!
//! - Build [`TargetInput`]s from [`PayloadSet`]s (and optional PNG screenshots)
//! - Run them through an [`Auditor`] configured by [`AuditConfig`]
//! - Gate on the resulting [`AuditReport`] with [`exceeds_severity`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Audit orchestration, findings, suppression, and gating.
pub mod audit;
/// Color math, parsing, and design tokens.
pub mod color;
/// Raw payloads to canonical targets.
pub mod normalize;
/// Screenshot decoding and pixel sampling.
pub mod raster;
/// Effective background resolution.
pub mod resolve;
/// Rule engine and recommender.
pub mod rules;
/// Boundary payloads and the canonical node model.
pub mod scene;

pub use crate::foundation::core::{Bounds, Color, NodeIdx, Point, Rect, Vec2};
pub use crate::foundation::error::{BackdropError, BackdropResult};

pub use crate::audit::config::AuditConfig;
pub use crate::audit::finding::{Evidence, Finding, Severity, Status, TargetRef};
pub use crate::audit::gate::exceeds_severity;
pub use crate::audit::session::{AuditOptions, AuditReport, Auditor, TargetInput};
pub use crate::audit::suppress::{Suppression, apply_suppressions};
pub use crate::color::tokens::TokenPalette;
pub use crate::normalize::pass::normalize;
pub use crate::raster::png::{Raster, decode_png};
pub use crate::resolve::background::{Background, BackgroundResolver};
pub use crate::scene::model::{ContextSource, Node, Target};
pub use crate::scene::payload::{PayloadSet, RawPayload, StyleHints};
