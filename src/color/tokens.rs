use std::collections::BTreeMap;

use serde_json::Value;

use crate::color::parse::color_from_value;
use crate::foundation::core::Color;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Named design-token colors used to suggest compliant replacements.
///
/// Tokens are kept ordered by name so every search over the palette is deterministic.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct TokenPalette {
    tokens: BTreeMap<String, Color>,
}

impl TokenPalette {
    /// Empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a token.
    pub fn insert(&mut self, name: impl Into<String>, color: Color) {
        self.tokens.insert(name.into(), color);
    }

    /// Build a palette from a token JSON document.
    ///
    /// Accepts a flat `{ name: color }` map or nested groups (joined with `.`), with leaves given as
    /// color values or `{ "value": .. }` / `{ "$value": .. }` objects. Leaves that do not parse as a
    /// color are skipped with a warning.
    pub fn from_json(v: &Value) -> BackdropResult<Self> {
        let Value::Object(_) = v else {
            return Err(BackdropError::validation(
                "token palette must be a JSON object",
            ));
        };
        let mut out = Self::new();
        collect_tokens(v, String::new(), &mut out);
        Ok(out)
    }

    /// Parse a token JSON document from a reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BackdropResult<Self> {
        let v: Value = serde_json::from_reader(r)
            .map_err(|e| BackdropError::serde(format!("parse token palette JSON: {e}")))?;
        Self::from_json(&v)
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Return `true` when the palette has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look a token up by name.
    pub fn get(&self, name: &str) -> Option<Color> {
        self.tokens.get(name).copied()
    }

    /// Iterate tokens in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Color)> {
        self.tokens.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

fn collect_tokens(v: &Value, prefix: String, out: &mut TokenPalette) {
    match v {
        Value::Object(map) => {
            if let Some(leaf) = map.get("$value").or_else(|| map.get("value")) {
                add_leaf(leaf, prefix, out);
                return;
            }
            if !prefix.is_empty() && map.contains_key("r") && map.contains_key("g") {
                add_leaf(v, prefix, out);
                return;
            }
            for (k, child) in map {
                let name = if prefix.is_empty() {
                    k.clone()
                } else {
                    format!("{prefix}.{k}")
                };
                collect_tokens(child, name, out);
            }
        }
        _ if !prefix.is_empty() => add_leaf(v, prefix, out),
        _ => {}
    }
}

fn add_leaf(v: &Value, name: String, out: &mut TokenPalette) {
    match color_from_value(v) {
        Some(c) => out.insert(name, c),
        None => tracing::warn!(token = %name, value = %v, "skipping token that is not a color"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/tokens.rs"]
mod tests;
