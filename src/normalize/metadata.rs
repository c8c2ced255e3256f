use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::color::parse::parse_css_color;
use crate::foundation::core::Bounds;
use crate::normalize::interactive::{InteractivitySignals, canonical_type};
use crate::normalize::record::{NodeRecord, RecordSet};
use crate::scene::model::PaintStack;

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(/?)([A-Za-z][\w:.-]*)((?:"[^"]*"|'[^']*'|[^'">])*?)(/?)>"#)
        .expect("tag pattern is valid")
});

static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w:.-]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+)))?"#)
        .expect("attribute pattern is valid")
});

pub(crate) type Attrs = HashMap<String, String>;

pub(crate) fn parse_attrs(raw: &str) -> Attrs {
    ATTR.captures_iter(raw)
        .map(|c| {
            let key = c[1].to_ascii_lowercase();
            let value = c
                .get(2)
                .or_else(|| c.get(3))
                .or_else(|| c.get(4))
                .map(|m| decode_entities(m.as_str()))
                .unwrap_or_default();
            (key, value)
        })
        .collect()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_owned();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// One lexical tag found in metadata or code text.
pub(crate) struct Tag<'a> {
    pub(crate) closing: bool,
    pub(crate) self_closing: bool,
    pub(crate) name: &'a str,
    pub(crate) attrs: &'a str,
}

pub(crate) fn tags(text: &str) -> impl Iterator<Item = Tag<'_>> {
    TAG.captures_iter(text).map(|c| Tag {
        closing: !c[1].is_empty(),
        self_closing: !c[4].is_empty(),
        name: c.get(2).map_or("", |m| m.as_str()),
        attrs: c.get(3).map_or("", |m| m.as_str()),
    })
}

struct Open {
    tag: String,
    /// Id that children attach to (this node, or the nearest kept ancestor).
    children_parent: Option<String>,
    pruned: bool,
}

fn truthy(v: Option<&String>) -> bool {
    v.is_some_and(|s| matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes" | ""))
}

fn num(attrs: &Attrs, key: &str) -> Option<f64> {
    attrs
        .get(key)
        .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn is_pruned(attrs: &Attrs) -> bool {
    truthy(attrs.get("hidden"))
        || attrs
            .get("visible")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("false"))
        || num(attrs, "opacity").is_some_and(|o| o <= 0.0)
}

/// Walk tag-based metadata text into `set`.
///
/// Every opening tag is a node; nesting gives parent/child. Bounds are parent-relative. Hidden or
/// zero-opacity tags prune their whole subtree; tags without an id are skipped and their children
/// attach to the nearest kept ancestor.
pub(crate) fn walk_metadata(text: &str, root_parent: Option<&str>, set: &mut RecordSet) {
    let mut stack: Vec<Open> = Vec::new();

    for tag in tags(text) {
        if tag.closing {
            if let Some(pos) = stack.iter().rposition(|o| o.tag.eq_ignore_ascii_case(tag.name)) {
                stack.truncate(pos);
            }
            continue;
        }

        let attrs = parse_attrs(tag.attrs);
        let (parent_id, parent_pruned) = match stack.last() {
            Some(o) => (o.children_parent.clone(), o.pruned),
            None => (root_parent.map(str::to_owned), false),
        };
        let id = attrs
            .get("id")
            .or_else(|| attrs.get("data-node-id"))
            .filter(|s| !s.trim().is_empty())
            .cloned();

        let pruned = parent_pruned
            || is_pruned(&attrs)
            || id.as_deref().is_some_and(|id| set.is_pruned(id));
        let children_parent = if pruned {
            if let Some(id) = &id {
                set.mark_pruned(id);
            }
            None
        } else if let Some(id) = id {
            set.upsert(build_record(tag.name, &attrs, id.clone(), parent_id));
            Some(id)
        } else {
            set.malformed += 1;
            parent_id
        };

        if !tag.self_closing {
            stack.push(Open {
                tag: tag.name.to_owned(),
                children_parent,
                pruned,
            });
        }
    }
}

fn build_record(tag: &str, attrs: &Attrs, id: String, parent_id: Option<String>) -> NodeRecord {
    let node_type = attrs
        .get("type")
        .map(|t| canonical_type(t))
        .unwrap_or_else(|| canonical_type(tag));
    let name = attrs.get("name").cloned().unwrap_or_default();
    let opacity = num(attrs, "opacity").unwrap_or(1.0);

    let bounds = match (num(attrs, "width"), num(attrs, "height")) {
        (Some(w), Some(h)) => Some(Bounds::new(
            num(attrs, "x").unwrap_or(0.0),
            num(attrs, "y").unwrap_or(0.0),
            w,
            h,
        )),
        _ => None,
    };

    let paint = |keys: &[&str]| -> PaintStack {
        keys.iter()
            .filter_map(|k| attrs.get(*k))
            .filter_map(|v| parse_css_color(v))
            .map(|c| c.scale_alpha(opacity))
            .take(1)
            .collect()
    };
    let fills = paint(&["fill", "background", "background-color", "color"]);
    let strokes = paint(&["stroke", "border-color"]);

    let mut text = attrs
        .get("text")
        .or_else(|| attrs.get("characters"))
        .cloned();
    if text.is_none() && node_type == "TEXT" && !name.trim().is_empty() {
        text = Some(name.clone());
    }

    let has_marker = ["onclick", "reactions", "interactive", "data-interactive", "href"]
        .iter()
        .any(|k| attrs.get(*k).is_some_and(|v| !v.eq_ignore_ascii_case("false")));
    let is_interactive = InteractivitySignals {
        node_type: &node_type,
        name: &name,
        has_interaction_marker: has_marker,
        role: attrs.get("role").map(String::as_str),
    }
    .is_interactive();

    NodeRecord {
        id,
        name,
        node_type,
        parent_id,
        bounds,
        fills,
        strokes,
        text,
        font_size: num(attrs, "font-size").or_else(|| num(attrs, "fontsize")),
        font_weight: num(attrs, "font-weight").or_else(|| num(attrs, "fontweight")),
        line_height: num(attrs, "line-height").or_else(|| num(attrs, "lineheight")),
        is_interactive,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/metadata.rs"]
mod tests;
