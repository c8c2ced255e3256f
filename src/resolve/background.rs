use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::color::contrast::composite_over;
use crate::foundation::core::{Color, NodeIdx};
use crate::scene::model::Target;

/// Default absolute tolerance for rectangle coverage.
pub const DEFAULT_COVERAGE_TOLERANCE: f64 = 0.25;

/// Why no structural background could be determined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedReason {
    /// The subject node has no bounds, so coverage cannot be tested.
    MissingBounds,
    /// No ancestor carried a fill at all.
    NoCoveringBackground,
    /// Ancestor fills exist but none fully covers the subject.
    CoverageFailed,
    /// Covering layers were found, but none of them is opaque.
    OnlyTranslucentOverlays,
}

impl UnresolvedReason {
    /// Human-readable explanation.
    pub fn describe(self) -> &'static str {
        match self {
            Self::MissingBounds => "node has no bounds to test background coverage",
            Self::NoCoveringBackground => "no ancestor or underlying layer has a fill",
            Self::CoverageFailed => "no filled layer fully covers the node",
            Self::OnlyTranslucentOverlays => "only translucent layers cover the node",
        }
    }
}

/// Where a resolved background came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundSource {
    /// Composited from covering layers in the node graph.
    Structural,
    /// The target's document-level fallback color.
    DocumentFallback,
}

/// Result of background resolution for one node.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Background {
    /// A flattened, opaque background color.
    Resolved {
        /// Opaque effective background.
        color: Color,
        /// Structural or document fallback.
        source: BackgroundSource,
        /// Diagnostic description of the contributing layers.
        description: String,
    },
    /// Resolution failed.
    Unresolved {
        /// Failure reason.
        reason: UnresolvedReason,
    },
}

impl Background {
    /// Resolved color, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Resolved { color, .. } => Some(*color),
            Self::Unresolved { .. } => None,
        }
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<UnresolvedReason> {
        match self {
            Self::Resolved { .. } => None,
            Self::Unresolved { reason } => Some(*reason),
        }
    }

    /// Return `true` when the color is only the document fallback.
    pub fn is_document_fallback(&self) -> bool {
        matches!(
            self,
            Self::Resolved {
                source: BackgroundSource::DocumentFallback,
                ..
            }
        )
    }

    /// Diagnostic description (source or failure reason).
    pub fn description(&self) -> String {
        match self {
            Self::Resolved { description, .. } => description.clone(),
            Self::Unresolved { reason } => reason.describe().to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Overlay {
    node: NodeIdx,
    color: Color,
}

/// Resolves the effective background behind a node by compositing covering layers.
#[derive(Clone, Copy, Debug)]
pub struct BackgroundResolver {
    tolerance: f64,
}

impl Default for BackgroundResolver {
    fn default() -> Self {
        Self::new(DEFAULT_COVERAGE_TOLERANCE)
    }
}

impl BackgroundResolver {
    /// Resolver with a coverage tolerance in target units.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: if tolerance.is_finite() {
                tolerance.max(0.0)
            } else {
                DEFAULT_COVERAGE_TOLERANCE
            },
        }
    }

    /// Resolve the background behind `subject`.
    ///
    /// Walks the parent chain. At each level, siblings painted before the branch already taken are
    /// searched (topmost first) for a covering filled layer, then the ancestor itself is tested.
    /// Candidates are composited from the nearest opaque one toward the subject.
    pub fn resolve(&self, target: &Target, subject: NodeIdx) -> Background {
        if target.node(subject).bounds.is_none() {
            return fallback_or(target, UnresolvedReason::MissingBounds);
        }

        let mut visited = HashSet::new();
        visited.insert(subject);
        // Nearest first.
        let mut overlays: Vec<Overlay> = Vec::new();
        let mut any_ancestor_fill = false;

        let mut current = subject;
        while let Some(parent) = target.parent(current) {
            if !visited.insert(parent) {
                tracing::debug!(node = %target.node(subject).id, "cyclic parent chain");
                break;
            }

            let siblings = target.children(parent);
            if let Some(pos) = siblings.iter().position(|&s| s == current) {
                for &sib in siblings[..pos].iter().rev() {
                    if let Some(hit) = self.search_behind(target, subject, sib, &mut visited) {
                        overlays.push(hit);
                    }
                }
            }

            let p = target.node(parent);
            if !p.is_text_like()
                && let Some(fill) = p.effective_fill()
            {
                any_ancestor_fill = true;
                if self.covers(target, parent, subject) {
                    overlays.push(Overlay {
                        node: parent,
                        color: fill,
                    });
                }
            }
            current = parent;
        }

        if overlays.is_empty() {
            let reason = if any_ancestor_fill {
                UnresolvedReason::CoverageFailed
            } else {
                UnresolvedReason::NoCoveringBackground
            };
            return fallback_or(target, reason);
        }

        let Some(base) = overlays.iter().position(|o| o.color.is_opaque()) else {
            return Background::Unresolved {
                reason: UnresolvedReason::OnlyTranslucentOverlays,
            };
        };

        let mut color = overlays[base].color;
        for o in overlays[..base].iter().rev() {
            color = composite_over(o.color, color);
        }

        let base_node = target.node(overlays[base].node);
        let mut description = format!("{} '{}' ({})", base_node.node_type, base_node.name, base_node.id);
        match base {
            0 => {}
            1 => description.push_str(" + 1 translucent overlay"),
            n => description.push_str(&format!(" + {n} translucent overlays")),
        }

        Background::Resolved {
            color,
            source: BackgroundSource::Structural,
            description,
        }
    }

    /// Depth-first search of a sibling subtree painted behind the subject. Later children paint on
    /// top, so they are visited first, and a node's children before the node itself.
    fn search_behind(
        &self,
        target: &Target,
        subject: NodeIdx,
        root: NodeIdx,
        visited: &mut HashSet<NodeIdx>,
    ) -> Option<Overlay> {
        let mut stack = vec![(root, false)];
        while let Some((idx, children_done)) = stack.pop() {
            if children_done {
                let n = target.node(idx);
                if n.is_text_like() {
                    continue;
                }
                if let Some(fill) = n.effective_fill()
                    && self.covers(target, idx, subject)
                {
                    return Some(Overlay {
                        node: idx,
                        color: fill,
                    });
                }
                continue;
            }
            if !visited.insert(idx) {
                continue;
            }
            stack.push((idx, true));
            for &c in target.children(idx) {
                stack.push((c, false));
            }
        }
        None
    }

    /// Raw bounds first; accumulated absolute bounds only for parent-relative contexts.
    fn covers(&self, target: &Target, layer: NodeIdx, subject: NodeIdx) -> bool {
        let (Some(outer), Some(inner)) = (target.node(layer).bounds, target.node(subject).bounds)
        else {
            return false;
        };
        if outer.covers(inner, self.tolerance) {
            return true;
        }
        if !target.context_source.is_parent_relative() {
            return false;
        }
        match (target.absolute_bounds(layer), target.absolute_bounds(subject)) {
            (Some(outer), Some(inner)) => outer.covers(inner, self.tolerance),
            _ => false,
        }
    }
}

fn fallback_or(target: &Target, reason: UnresolvedReason) -> Background {
    match target.fallback_background {
        Some(c) => Background::Resolved {
            color: composite_over(c, Color::WHITE),
            source: BackgroundSource::DocumentFallback,
            description: "document fallback background".to_owned(),
        },
        None => Background::Unresolved { reason },
    }
}

/// Backgrounds resolved once per target for every node a rule may inspect.
#[derive(Clone, Debug, Default)]
pub struct ResolvedBackgrounds {
    by_node: BTreeMap<NodeIdx, Background>,
}

impl ResolvedBackgrounds {
    /// Resolve text, interactive, and icon-like nodes.
    pub fn compute(target: &Target, resolver: &BackgroundResolver) -> Self {
        let by_node = target
            .indices()
            .filter(|&i| {
                let n = target.node(i);
                n.is_text_like() || n.is_interactive || n.is_icon_like()
            })
            .map(|i| (i, resolver.resolve(target, i)))
            .collect();
        Self { by_node }
    }

    /// Resolution for `idx`, if it was computed.
    pub fn get(&self, idx: NodeIdx) -> Option<&Background> {
        self.by_node.get(&idx)
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    /// Return `true` when nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/background.rs"]
mod tests;
