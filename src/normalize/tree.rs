use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::color::parse::{color_from_value, paint_color};
use crate::foundation::core::Bounds;
use crate::normalize::interactive::{InteractivitySignals, canonical_type};
use crate::normalize::record::{NodeRecord, RecordSet};
use crate::scene::model::PaintStack;

/// Every field tolerates a mistyped value by reading it as absent, so one odd field never costs a
/// node its id, type, or visibility.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct NodeDef {
    id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    name: Option<String>,
    #[serde(
        rename = "type",
        alias = "nodeType",
        alias = "kind",
        deserialize_with = "lenient"
    )]
    node_type: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    visible: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    hidden: Option<bool>,
    #[serde(deserialize_with = "lenient_f64")]
    opacity: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    absolute_bounding_box: Option<BoundsDef>,
    #[serde(deserialize_with = "lenient")]
    absolute_render_bounds: Option<BoundsDef>,
    #[serde(deserialize_with = "lenient")]
    bounding_box: Option<BoundsDef>,
    #[serde(deserialize_with = "lenient")]
    bounds: Option<BoundsDef>,
    #[serde(deserialize_with = "lenient_f64")]
    x: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    y: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    width: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    height: Option<f64>,
    fills: Option<Value>,
    strokes: Option<Value>,
    background_color: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    characters: Option<String>,
    #[serde(deserialize_with = "lenient")]
    text: Option<String>,
    #[serde(deserialize_with = "lenient")]
    style: Option<TypeStyleDef>,
    #[serde(deserialize_with = "lenient_f64")]
    font_size: Option<f64>,
    #[serde(deserialize_with = "lenient_weight")]
    font_weight: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    line_height: Option<f64>,
    reactions: Option<Value>,
    interactions: Option<Value>,
    on_click: Option<Value>,
    #[serde(rename = "transitionNodeID")]
    transition_node_id: Option<Value>,
    #[serde(deserialize_with = "lenient")]
    role: Option<String>,
    #[serde(deserialize_with = "lenient")]
    semantic_role: Option<String>,
    #[serde(deserialize_with = "lenient")]
    accessibility_role: Option<String>,
    #[serde(deserialize_with = "lenient")]
    accessibility: Option<AccessibilityDef>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct BoundsDef {
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    #[serde(alias = "w")]
    width: f64,
    #[serde(alias = "h")]
    height: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TypeStyleDef {
    #[serde(deserialize_with = "lenient_f64")]
    font_size: Option<f64>,
    #[serde(deserialize_with = "lenient_weight")]
    font_weight: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    line_height_px: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AccessibilityDef {
    #[serde(deserialize_with = "lenient")]
    role: Option<String>,
}

fn lenient<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = Value::deserialize(d)?;
    Ok(T::deserialize(v).ok())
}

/// Numbers, or strings holding a number.
fn lenient_f64<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number_like(&Value::deserialize(d)?))
}

fn lenient_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => Some(b),
        Value::String(s) if s.trim().eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.trim().eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    })
}

/// Numeric weights plus the CSS `normal` / `bold` keywords.
fn lenient_weight<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(number_like(&v).or_else(|| match v.as_str().map(str::trim) {
        Some(k) if k.eq_ignore_ascii_case("bold") => Some(700.0),
        Some(k) if k.eq_ignore_ascii_case("normal") => Some(400.0),
        _ => None,
    }))
}

fn number_like(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl NodeDef {
    fn is_pruned(&self) -> bool {
        self.visible == Some(false)
            || self.hidden == Some(true)
            || self.opacity.is_some_and(|o| o <= 0.0)
    }

    fn id_string(&self) -> Option<String> {
        value_id(self.id.as_ref()?)
    }

    /// Absolute boxes win over parent-relative `x`/`y`; the flag reports which kind was used.
    fn bounds(&self) -> Option<(Bounds, bool)> {
        let absolute = self
            .absolute_bounding_box
            .or(self.absolute_render_bounds)
            .or(self.bounding_box)
            .or(self.bounds);
        if let Some(b) = absolute {
            return Some((Bounds::new(b.x, b.y, b.width, b.height), true));
        }
        let (w, h) = (self.width?, self.height?);
        Some((
            Bounds::new(self.x.unwrap_or(0.0), self.y.unwrap_or(0.0), w, h),
            false,
        ))
    }

    fn has_interaction_marker(&self) -> bool {
        let non_empty = |v: &Option<Value>| match v {
            Some(Value::Array(a)) => !a.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        };
        non_empty(&self.reactions)
            || non_empty(&self.interactions)
            || non_empty(&self.on_click)
            || non_empty(&self.transition_node_id)
    }

    fn role(&self) -> Option<&str> {
        self.role
            .as_deref()
            .or(self.semantic_role.as_deref())
            .or(self.accessibility_role.as_deref())
            .or(self.accessibility.as_ref().and_then(|a| a.role.as_deref()))
    }
}

/// Wire paint lists are bottom-to-top; the returned stack is topmost first.
fn paint_stack(v: Option<&Value>, opacity: f64) -> PaintStack {
    let Some(Value::Array(items)) = v else {
        return PaintStack::new();
    };
    items
        .iter()
        .rev()
        .filter_map(paint_color)
        .map(|c| c.scale_alpha(opacity))
        .collect()
}

/// Walk a nested object graph into `set`.
///
/// `root_parent` is the id the payload's top-level nodes hang under (set for expansions).
/// Hidden or zero-opacity nodes are pruned with their whole subtree. Nodes lacking an id or type
/// are skipped, and their children attach to the nearest kept ancestor.
pub(crate) fn walk_tree(root: &Value, root_parent: Option<&str>, set: &mut RecordSet) {
    let mut stack: Vec<(&Value, Option<String>)> = Vec::with_capacity(64);
    match root {
        Value::Array(items) => {
            for item in items.iter().rev() {
                stack.push((item, root_parent.map(str::to_owned)));
            }
        }
        _ => stack.push((root, root_parent.map(str::to_owned))),
    }

    while let Some((v, parent_id)) = stack.pop() {
        let def = match NodeDef::deserialize(v) {
            Ok(def) => def,
            Err(e) => {
                tracing::debug!(error = %e, "skipping malformed tree node");
                NodeDef::default()
            }
        };

        let id = def.id_string();
        if def.is_pruned() || id.as_deref().is_some_and(|id| set.is_pruned(id)) {
            mark_subtree_pruned(v, set);
            continue;
        }

        let children_parent = match (id, def.node_type.as_deref()) {
            (Some(id), Some(t)) if !t.trim().is_empty() => {
                let rec = build_record(&def, id.clone(), canonical_type(t), parent_id, set);
                set.upsert(rec);
                Some(id)
            }
            _ => {
                set.malformed += 1;
                parent_id
            }
        };

        if let Some(Value::Array(children)) = v.get("children") {
            for c in children.iter().rev() {
                stack.push((c, children_parent.clone()));
            }
        }
    }
}

/// Record every id under a hidden node so later payloads cannot resurrect any of them.
fn mark_subtree_pruned(root: &Value, set: &mut RecordSet) {
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        if let Some(id) = v.get("id").and_then(value_id) {
            set.mark_pruned(&id);
        }
        if let Some(Value::Array(children)) = v.get("children") {
            stack.extend(children);
        }
    }
}

fn value_id(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn build_record(
    def: &NodeDef,
    id: String,
    node_type: String,
    parent_id: Option<String>,
    set: &mut RecordSet,
) -> NodeRecord {
    let opacity = def.opacity.unwrap_or(1.0);
    let mut fills = paint_stack(def.fills.as_ref(), opacity);
    if fills.is_empty()
        && let Some(bg) = def.background_color.as_ref().and_then(color_from_value)
        && !bg.is_transparent()
    {
        fills.push(bg.scale_alpha(opacity));
    }
    let strokes = paint_stack(def.strokes.as_ref(), opacity);

    let bounds = def.bounds().map(|(b, absolute)| {
        if absolute {
            set.saw_absolute_bounds = true;
        } else {
            set.saw_relative_bounds = true;
        }
        b
    });

    let name = def.name.clone().unwrap_or_default();
    let is_interactive = InteractivitySignals {
        node_type: &node_type,
        name: &name,
        has_interaction_marker: def.has_interaction_marker(),
        role: def.role(),
    }
    .is_interactive();

    let style = def.style.as_ref();
    NodeRecord {
        id,
        name,
        node_type,
        parent_id,
        bounds,
        fills,
        strokes,
        text: def.characters.clone().or_else(|| def.text.clone()),
        font_size: def.font_size.or(style.and_then(|s| s.font_size)),
        font_weight: def.font_weight.or(style.and_then(|s| s.font_weight)),
        line_height: def.line_height.or(style.and_then(|s| s.line_height_px)),
        is_interactive,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/tree.rs"]
mod tests;
