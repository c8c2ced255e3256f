use std::sync::LazyLock;

use regex::Regex;

use crate::color::parse::parse_css_color;
use crate::foundation::core::Color;
use crate::normalize::metadata::{parse_attrs, tags};
use crate::normalize::record::RecordSet;
use crate::scene::payload::StyleHints;

static UTILITY_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(bg|text|border)-(?:\[([^\]]+)\]|(white|black|transparent))(?:\s|$)")
        .expect("utility class pattern is valid")
});

static STYLE_DECL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\b(background-color|backgroundColor|background|border-color|borderColor|border|color)\s*:\s*["']?([^;"'}]+)"#,
    )
    .expect("style declaration pattern is valid")
});

#[derive(Clone, Copy)]
enum Bucket {
    Fill,
    TextFill,
    Stroke,
}

fn push(hints: &mut StyleHints, bucket: Bucket, id: &str, color: Color) {
    let map = match bucket {
        Bucket::Fill => &mut hints.fills,
        Bucket::TextFill => &mut hints.text_fills,
        Bucket::Stroke => &mut hints.strokes,
    };
    map.entry(id.to_owned()).or_default().push(color);
}

/// Parse a CSS value that may carry more than a color (`1px solid #ccc`).
fn color_in_value(v: &str) -> Option<Color> {
    // Utility classes encode spaces as underscores.
    let v = v.replace('_', " ");
    parse_css_color(&v).or_else(|| v.split_whitespace().find_map(parse_css_color))
}

/// Extract style hints from generated markup.
///
/// Each opening tag with a `data-node-id` contributes colors from utility classes
/// (`bg-[..]`, `text-[..]`, `border-[..]`) and inline style declarations.
pub(crate) fn hints_from_code(code: &str) -> StyleHints {
    let mut hints = StyleHints::default();
    for tag in tags(code) {
        if tag.closing {
            continue;
        }
        let attrs = parse_attrs(tag.attrs);
        let Some(id) = attrs.get("data-node-id").filter(|s| !s.is_empty()) else {
            continue;
        };

        let classes = attrs
            .get("classname")
            .or_else(|| attrs.get("class"))
            .map(String::as_str)
            .unwrap_or("");
        // Doubled separators: each match consumes the whitespace on both sides of its class.
        let padded = classes.split_whitespace().collect::<Vec<_>>().join("  ");
        for c in UTILITY_CLASS.captures_iter(&format!(" {padded} ")) {
            let bucket = match &c[1] {
                "bg" => Bucket::Fill,
                "text" => Bucket::TextFill,
                _ => Bucket::Stroke,
            };
            let raw = c.get(2).or_else(|| c.get(3)).map_or("", |m| m.as_str());
            if let Some(color) = color_in_value(raw) {
                push(&mut hints, bucket, id, color);
            }
        }

        // Inline styles may be CSS text or a JSX object literal, so scan the raw attribute text.
        for c in STYLE_DECL.captures_iter(tag.attrs) {
            let bucket = match &c[1] {
                "color" => Bucket::TextFill,
                "border-color" | "borderColor" | "border" => Bucket::Stroke,
                _ => Bucket::Fill,
            };
            if let Some(color) = color_in_value(c[2].trim()) {
                push(&mut hints, bucket, id, color);
            }
        }
    }
    hints
}

/// Fill in paint for records whose own normalization produced none.
///
/// Structurally derived paint is never overwritten. Text nodes take text fills first, then fills.
pub(crate) fn apply_hints(set: &mut RecordSet, hints: &StyleHints) {
    if hints.is_empty() {
        return;
    }
    for rec in set.records_mut() {
        if rec.fills.is_empty() {
            let is_text = rec.node_type == "TEXT" || rec.text.is_some();
            let source = if is_text {
                hints
                    .text_fills
                    .get(&rec.id)
                    .or_else(|| hints.fills.get(&rec.id))
            } else {
                hints.fills.get(&rec.id)
            };
            if let Some(colors) = source {
                rec.fills = colors.iter().copied().collect();
            }
        }
        if rec.strokes.is_empty()
            && let Some(colors) = hints.strokes.get(&rec.id)
        {
            rec.strokes = colors.iter().copied().collect();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/normalize/hints.rs"]
mod tests;
