use crate::normalize::hints::{apply_hints, hints_from_code};
use crate::normalize::metadata::walk_metadata;
use crate::normalize::record::RecordSet;
use crate::normalize::tree::walk_tree;
use crate::scene::model::{ContextSource, Target};
use crate::scene::payload::{PayloadSet, RawPayload, StyleHints};

/// Warning attached to targets whose payloads yielded no usable nodes.
pub const NO_TRAVERSABLE_NODES: &str = "no traversable nodes";

/// Normalize every payload delivered for one target into an immutable [`Target`].
///
/// The primary payload is walked first, then each expansion in order. Records for the same id are
/// merged; style hints (explicit ones plus any extracted from code-snippet payloads) are applied
/// last and only to nodes whose own paint lists came out empty.
#[tracing::instrument(skip(payloads), fields(expansions = payloads.expansions.len()))]
pub fn normalize(target_id: &str, payloads: &PayloadSet) -> Target {
    let mut set = RecordSet::default();
    let mut hints = payloads.style_hints.clone();
    let mut warnings = Vec::new();

    let primary_is_metadata = matches!(payloads.primary, RawPayload::Metadata(_));
    walk_payload(&payloads.primary, None, &mut set, &mut hints);

    for exp in &payloads.expansions {
        if set.is_pruned(&exp.node_id) {
            tracing::debug!(node = %exp.node_id, "skipping expansion of a hidden node");
            continue;
        }
        if !set.contains(&exp.node_id) && !matches!(exp.payload, RawPayload::CodeSnippet(_)) {
            warnings.push(format!(
                "expansion for unknown node '{}' attached at the root",
                exp.node_id
            ));
        }
        // An expansion rooted at its own key merges into the existing record; otherwise its
        // top-level nodes hang under the key node.
        let root_parent = set.contains(&exp.node_id).then_some(exp.node_id.as_str());
        let before = set.len();
        walk_payload(&exp.payload, root_parent, &mut set, &mut hints);
        if let Some(key) = root_parent
            && let Some(rec) = set.get_mut(key)
            && rec.parent_id.as_deref() == Some(key)
        {
            rec.parent_id = None;
        }
        tracing::debug!(
            node = %exp.node_id,
            added = set.len() - before,
            "applied expansion"
        );
    }

    apply_hints(&mut set, &hints);

    if set.malformed > 0 {
        tracing::debug!(skipped = set.malformed, "skipped nodes without id or type");
    }

    let context_source = if primary_is_metadata
        || (set.saw_relative_bounds && !set.saw_absolute_bounds)
    {
        ContextSource::MetadataFallback
    } else {
        ContextSource::DesignTree
    };

    if set.len() == 0 {
        tracing::warn!(target_id, "{NO_TRAVERSABLE_NODES}");
        warnings.push(NO_TRAVERSABLE_NODES.to_owned());
    }

    Target::from_nodes(
        target_id,
        set.into_nodes(),
        context_source,
        payloads.fallback_background,
        warnings,
    )
}

fn walk_payload(
    payload: &RawPayload,
    root_parent: Option<&str>,
    set: &mut RecordSet,
    hints: &mut StyleHints,
) {
    match payload {
        RawPayload::Tree(v) => walk_tree(v, root_parent, set),
        RawPayload::Metadata(text) => walk_metadata(text, root_parent, set),
        RawPayload::CodeSnippet(code) => hints.absorb(hints_from_code(code)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/pass.rs"]
mod tests;
