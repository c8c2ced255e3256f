use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::core::Color;
use crate::foundation::error::{BackdropError, BackdropResult};

/// One raw design payload, with its shape resolved once at the boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPayload {
    /// Nested object graph (`id`/`type`/`name`/`children`, bounding boxes, paints).
    Tree(Value),
    /// Inline tag-based metadata text; tag nesting implies parent/child.
    Metadata(String),
    /// Generated code snippet carrying `data-node-id` markers; contributes style hints only.
    CodeSnippet(String),
}

impl RawPayload {
    /// Classify an arbitrary JSON value.
    ///
    /// Objects become [`RawPayload::Tree`] after unwrapping `{"document": ..}` and
    /// `{"nodes": {"<id>": {"document": ..}}}` envelopes. Strings carrying `data-node-id` or
    /// `className` become [`RawPayload::CodeSnippet`]; other strings starting with `<` become
    /// [`RawPayload::Metadata`].
    pub fn sniff(v: Value) -> BackdropResult<Self> {
        match v {
            Value::String(s) => Self::sniff_text(s),
            Value::Object(_) => Ok(Self::Tree(unwrap_envelope(v))),
            Value::Array(_) => Ok(Self::Tree(v)),
            other => Err(BackdropError::payload(format!(
                "unsupported payload shape: {}",
                shape_name(&other)
            ))),
        }
    }

    /// Classify raw text, which may itself be JSON.
    pub fn sniff_text(s: String) -> BackdropResult<Self> {
        let trimmed = s.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let v: Value = serde_json::from_str(trimmed)
                .map_err(|e| BackdropError::payload(format!("parse payload JSON: {e}")))?;
            return Self::sniff(v);
        }
        if s.contains("data-node-id") || s.contains("className") {
            return Ok(Self::CodeSnippet(s));
        }
        if trimmed.starts_with('<') {
            return Ok(Self::Metadata(s));
        }
        Err(BackdropError::payload(
            "text payload is neither tag metadata nor a code snippet",
        ))
    }

    /// Read and classify a payload file.
    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path).map_err(|e| {
            BackdropError::payload(format!("read payload '{}': {e}", path.display()))
        })?;
        Self::sniff_text(s)
    }
}

fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unwrap_envelope(v: Value) -> Value {
    let Value::Object(mut map) = v else {
        return v;
    };
    if map.contains_key("id") {
        return Value::Object(map);
    }
    if let Some(doc) = map.remove("document") {
        return unwrap_envelope(doc);
    }
    if let Some(Value::Object(nodes)) = map.get("nodes") {
        let docs: Vec<Value> = nodes
            .values()
            .map(|entry| match entry.get("document") {
                Some(doc) => doc.clone(),
                None => entry.clone(),
            })
            .collect();
        return match docs.len() {
            1 => docs.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Array(docs),
        };
    }
    Value::Object(map)
}

/// A supplementary payload expanding the subtree rooted at `node_id`.
#[derive(Clone, Debug, PartialEq)]
pub struct Expansion {
    /// Node the expansion belongs to.
    pub node_id: String,
    /// The expansion's content.
    pub payload: RawPayload,
}

/// Color values keyed by node id, bucketed by what they paint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleHints {
    /// Background/shape fills.
    pub fills: BTreeMap<String, Vec<Color>>,
    /// Text foreground fills.
    pub text_fills: BTreeMap<String, Vec<Color>>,
    /// Strokes/borders.
    pub strokes: BTreeMap<String, Vec<Color>>,
}

impl StyleHints {
    /// Return `true` when no bucket has entries.
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.text_fills.is_empty() && self.strokes.is_empty()
    }

    /// Merge another hint set; existing entries win.
    pub fn absorb(&mut self, other: StyleHints) {
        for (k, v) in other.fills {
            self.fills.entry(k).or_insert(v);
        }
        for (k, v) in other.text_fills {
            self.text_fills.entry(k).or_insert(v);
        }
        for (k, v) in other.strokes {
            self.strokes.entry(k).or_insert(v);
        }
    }
}

/// Everything the data-fetch collaborator delivered for one target.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadSet {
    /// Primary traversal context.
    pub primary: RawPayload,
    /// Supplementary subtree expansions, applied in order.
    pub expansions: Vec<Expansion>,
    /// Style hints applied to nodes whose own paints came out empty.
    pub style_hints: StyleHints,
    /// Document-level fallback background.
    pub fallback_background: Option<Color>,
}

impl PayloadSet {
    /// Payload set with only a primary context.
    pub fn new(primary: RawPayload) -> Self {
        Self {
            primary,
            expansions: Vec::new(),
            style_hints: StyleHints::default(),
            fallback_background: None,
        }
    }

    /// Add an expansion keyed by node id.
    pub fn with_expansion(mut self, node_id: impl Into<String>, payload: RawPayload) -> Self {
        self.expansions.push(Expansion {
            node_id: node_id.into(),
            payload,
        });
        self
    }

    /// Replace the style hints.
    pub fn with_style_hints(mut self, hints: StyleHints) -> Self {
        self.style_hints = hints;
        self
    }

    /// Set the document-level fallback background.
    pub fn with_fallback_background(mut self, color: Color) -> Self {
        self.fallback_background = Some(color);
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/payload.rs"]
mod tests;
