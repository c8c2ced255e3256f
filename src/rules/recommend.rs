use std::cmp::Ordering;

use serde::Serialize;

use crate::color::contrast::{composite_over, contrast_ratio, rgb_distance};
use crate::color::tokens::TokenPalette;
use crate::foundation::core::Color;

/// A single replacement token.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenChoice {
    /// Token name.
    pub token: String,
    /// Token color.
    pub color: Color,
    /// Contrast ratio reached with the replacement.
    pub ratio: f64,
    /// RGB distance from the color it replaces.
    pub distance: f64,
}

/// A replacement for both colors at once.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Foreground token name.
    pub foreground_token: String,
    /// Foreground token color.
    pub foreground: Color,
    /// Background token name.
    pub background_token: String,
    /// Background token color (always opaque).
    pub background: Color,
    /// Contrast ratio of the pair.
    pub ratio: f64,
    /// Summed RGB distance from both originals.
    pub distance: f64,
}

/// Search outcome for one recommendation slot. A slot with no passing token is reported as such
/// rather than omitted.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Suggestion<T> {
    /// A passing replacement.
    Found(T),
    /// No token in the palette passes.
    NoCandidate,
}

impl<T> Suggestion<T> {
    /// The found value, if any.
    pub fn found(&self) -> Option<&T> {
        match self {
            Self::Found(v) => Some(v),
            Self::NoCandidate => None,
        }
    }
}

impl<T> From<Option<T>> for Suggestion<T> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::NoCandidate, Self::Found)
    }
}

/// Token replacements for a failing color pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Closest passing foreground against the current background.
    pub foreground: Suggestion<TokenChoice>,
    /// Closest passing opaque background against the current foreground.
    pub background: Suggestion<TokenChoice>,
    /// Closest passing combination of both.
    pub pair: Suggestion<TokenPair>,
}

/// Smaller distance wins; ties go to the higher ratio. Palette order breaks the rest.
fn rank(dist_a: f64, ratio_a: f64, dist_b: f64, ratio_b: f64) -> Ordering {
    dist_a
        .total_cmp(&dist_b)
        .then_with(|| ratio_b.total_cmp(&ratio_a))
}

fn keep_best<T>(best: &mut Option<T>, cand: T, key: impl Fn(&T) -> (f64, f64)) {
    let better = match best {
        None => true,
        Some(cur) => {
            let (da, ra) = key(&cand);
            let (db, rb) = key(cur);
            rank(da, ra, db, rb) == Ordering::Less
        }
    };
    if better {
        *best = Some(cand);
    }
}

/// Closest token that passes `required` as a foreground over `background`.
pub fn best_foreground(
    palette: &TokenPalette,
    foreground: Color,
    background: Color,
    required: f64,
) -> Option<TokenChoice> {
    let mut best = None;
    for (name, color) in palette.iter() {
        let ratio = contrast_ratio(composite_over(color, background), background);
        if ratio < required {
            continue;
        }
        let cand = TokenChoice {
            token: name.to_owned(),
            color,
            ratio,
            distance: rgb_distance(color, foreground),
        };
        keep_best(&mut best, cand, |c| (c.distance, c.ratio));
    }
    best
}

/// Closest opaque token that passes `required` as a background behind `foreground`.
pub fn best_background(
    palette: &TokenPalette,
    foreground: Color,
    background: Color,
    required: f64,
) -> Option<TokenChoice> {
    let mut best = None;
    for (name, color) in palette.iter().filter(|(_, c)| c.is_opaque()) {
        let ratio = contrast_ratio(composite_over(foreground, color), color);
        if ratio < required {
            continue;
        }
        let cand = TokenChoice {
            token: name.to_owned(),
            color,
            ratio,
            distance: rgb_distance(color, background),
        };
        keep_best(&mut best, cand, |c| (c.distance, c.ratio));
    }
    best
}

/// Exhaustive search over foreground x opaque-background token pairs.
pub fn best_pair(
    palette: &TokenPalette,
    foreground: Color,
    background: Color,
    required: f64,
) -> Option<TokenPair> {
    let backgrounds: Vec<_> = palette.iter().filter(|(_, c)| c.is_opaque()).collect();
    let mut best = None;
    for (fg_name, fg) in palette.iter() {
        for &(bg_name, bg) in &backgrounds {
            let ratio = contrast_ratio(composite_over(fg, bg), bg);
            if ratio < required {
                continue;
            }
            let cand = TokenPair {
                foreground_token: fg_name.to_owned(),
                foreground: fg,
                background_token: bg_name.to_owned(),
                background: bg,
                ratio,
                distance: rgb_distance(fg, foreground) + rgb_distance(bg, background),
            };
            keep_best(&mut best, cand, |c| (c.distance, c.ratio));
        }
    }
    best
}

/// All three recommendation slots for a failing pair.
pub fn recommend(
    palette: &TokenPalette,
    foreground: Color,
    background: Color,
    required: f64,
) -> Recommendation {
    Recommendation {
        foreground: best_foreground(palette, foreground, background, required).into(),
        background: best_background(palette, foreground, background, required).into(),
        pair: best_pair(palette, foreground, background, required).into(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rules/recommend.rs"]
mod tests;
