//! Color parsing for the representations found in design payloads, style hints, and token files.

use crate::foundation::core::Color;
use serde_json::Value;

/// Parse a CSS-like color string.
///
/// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(..)`, `rgba(..)` (comma or space separated,
/// optional `/ alpha`), and the keywords `white`, `black`, `transparent`.
pub fn parse_css_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    match lower.as_str() {
        "white" => return Some(Color::WHITE),
        "black" => return Some(Color::BLACK),
        "transparent" => return Some(Color::TRANSPARENT),
        _ => {}
    }
    if let Some(args) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }
    // Bare hex without '#', as some exporters emit.
    if matches!(s.len(), 6 | 8) && s.chars().all(|c| c.is_ascii_hexdigit()) {
        return parse_hex(s);
    }
    None
}

fn parse_hex(hex: &str) -> Option<Color> {
    fn byte(pair: &str) -> Option<u8> {
        u8::from_str_radix(pair, 16).ok()
    }
    fn nibble(c: &str) -> Option<u8> {
        u8::from_str_radix(c, 16).ok().map(|n| n * 17)
    }

    if !hex.is_ascii() {
        return None;
    }
    let (r, g, b, a) = match hex.len() {
        3 => (nibble(&hex[0..1])?, nibble(&hex[1..2])?, nibble(&hex[2..3])?, 255),
        4 => (
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
            nibble(&hex[3..4])?,
        ),
        6 => (byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255),
        8 => (
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        ),
        _ => return None,
    };
    Some(Color::rgba(r, g, b, f64::from(a) / 255.0))
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts: Vec<&str> = args
        .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let channel = |p: &str| -> Option<u8> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().ok()?;
            return Some((v.clamp(0.0, 100.0) * 2.55).round() as u8);
        }
        let v: f64 = p.parse().ok()?;
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let alpha = |p: &str| -> Option<f64> {
        if let Some(pct) = p.strip_suffix('%') {
            let v: f64 = pct.parse().ok()?;
            return Some(v / 100.0);
        }
        p.parse().ok()
    };
    let a = match parts.get(3) {
        Some(p) => alpha(p)?,
        None => 1.0,
    };
    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

/// Interpret a JSON value as a color.
///
/// Strings go through [`parse_css_color`]. Objects with `r`/`g`/`b` (and optional `a`) are read as
/// unit floats when every channel is at most `1.0`, otherwise as bytes. Arrays of 3 or 4 numbers use
/// the same rule.
pub fn color_from_value(v: &Value) -> Option<Color> {
    match v {
        Value::String(s) => parse_css_color(s),
        Value::Object(map) => {
            let r = map.get("r")?.as_f64()?;
            let g = map.get("g")?.as_f64()?;
            let b = map.get("b")?.as_f64()?;
            let a = map.get("a").and_then(Value::as_f64).unwrap_or(1.0);
            Some(color_from_channels(r, g, b, a))
        }
        Value::Array(items) if items.len() == 3 || items.len() == 4 => {
            let nums: Option<Vec<f64>> = items.iter().map(Value::as_f64).collect();
            let nums = nums?;
            let a = nums.get(3).copied().unwrap_or(1.0);
            Some(color_from_channels(nums[0], nums[1], nums[2], a))
        }
        _ => None,
    }
}

fn color_from_channels(r: f64, g: f64, b: f64, a: f64) -> Color {
    if r <= 1.0 && g <= 1.0 && b <= 1.0 {
        Color::from_unit(r, g, b, a)
    } else {
        let byte = |x: f64| x.clamp(0.0, 255.0).round() as u8;
        Color::rgba(byte(r), byte(g), byte(b), a)
    }
}

/// Interpret one entry of a paint list.
///
/// Design-tree paints look like `{ "type": "SOLID", "color": {..}, "opacity": 0.5, "visible": true }`.
/// Non-solid paints (gradients, images) and hidden paints yield `None`. Bare color values are
/// accepted too.
pub fn paint_color(v: &Value) -> Option<Color> {
    let Value::Object(map) = v else {
        return color_from_value(v);
    };
    if map.get("visible").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    if let Some(kind) = map.get("type").and_then(Value::as_str)
        && !kind.eq_ignore_ascii_case("SOLID")
    {
        return None;
    }
    let base = match map.get("color") {
        Some(c) => color_from_value(c)?,
        None => color_from_value(v)?,
    };
    let opacity = map.get("opacity").and_then(Value::as_f64).unwrap_or(1.0);
    Some(base.scale_alpha(opacity))
}

#[cfg(test)]
#[path = "../../tests/unit/color/parse.rs"]
mod tests;
