use crate::foundation::core::Color;

/// Font size (px) at or above which text is large regardless of weight.
pub const LARGE_TEXT_SIZE: f64 = 24.0;
/// Font size (px) at or above which bold text is large.
pub const LARGE_BOLD_TEXT_SIZE: f64 = 18.5;
/// Minimum weight considered bold for large-text classification.
pub const BOLD_WEIGHT: f64 = 700.0;

fn srgb_to_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of the color's RGB channels (alpha ignored), in `[0, 1]`.
pub fn relative_luminance(c: Color) -> f64 {
    0.2126 * srgb_to_linear(c.r) + 0.7152 * srgb_to_linear(c.g) + 0.0722 * srgb_to_linear(c.b)
}

/// Contrast ratio `(L1 + 0.05) / (L2 + 0.05)` with `L1` the lighter luminance; range `1..=21`.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Flatten `fg` over an opaque `bg`: `fg * a + bg * (1 - a)` per channel.
///
/// The result is always opaque.
pub fn composite_over(fg: Color, bg: Color) -> Color {
    let a = fg.a;
    let blend = |f: u8, b: u8| -> u8 {
        (f64::from(f) * a + f64::from(b) * (1.0 - a))
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Color::rgb(blend(fg.r, bg.r), blend(fg.g, bg.g), blend(fg.b, bg.b))
}

/// General Porter-Duff "over" for two possibly translucent colors.
pub fn blend_over(fg: Color, bg: Color) -> Color {
    let out_a = fg.a + bg.a * (1.0 - fg.a);
    if out_a <= 0.0 {
        return Color::TRANSPARENT;
    }
    let blend = |f: u8, b: u8| -> u8 {
        ((f64::from(f) * fg.a + f64::from(b) * bg.a * (1.0 - fg.a)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Color::rgba(
        blend(fg.r, bg.r),
        blend(fg.g, bg.g),
        blend(fg.b, bg.b),
        out_a,
    )
}

/// Large text: at least 24px, or at least 18.5px when weight is 700 or heavier.
pub fn is_large_text(font_size: f64, font_weight: f64) -> bool {
    font_size >= LARGE_TEXT_SIZE || (font_size >= LARGE_BOLD_TEXT_SIZE && font_weight >= BOLD_WEIGHT)
}

/// Euclidean distance between RGB channels (alpha ignored).
pub fn rgb_distance(a: Color, b: Color) -> f64 {
    let dr = f64::from(a.r) - f64::from(b.r);
    let dg = f64::from(a.g) - f64::from(b.g);
    let db = f64::from(a.b) - f64::from(b.b);
    (dr * dr + dg * dg + db * db).sqrt()
}

#[cfg(test)]
#[path = "../../tests/unit/color/contrast.rs"]
mod tests;
