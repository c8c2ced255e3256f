use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::contrast::{contrast_ratio, rgb_distance};
use crate::foundation::core::{Bounds, Color, NodeIdx, Vec2};
use crate::raster::png::Raster;
use crate::scene::model::Target;

const FOREGROUND_SAMPLE_BUDGET: f64 = 4096.0;

/// Pixel-sampling parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SamplingSettings {
    /// Distance in pixels between the node edge and each ring point.
    pub ring_padding: f64,
    /// Background samples closer than this (RGB distance) to the foreground are discarded.
    pub foreground_exclusion_distance: f64,
    /// Pixels with alpha below this are treated as transparent.
    pub min_alpha: u8,
    /// Channel quantization step for bucketing.
    pub bucket_size: u8,
    /// Buckets with at least this share of the top count compete on contrast.
    pub foreground_closeness: f64,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            ring_padding: 2.0,
            foreground_exclusion_distance: 24.0,
            min_alpha: 16,
            bucket_size: 8,
            foreground_closeness: 0.5,
        }
    }
}

/// Maps target coordinates onto screenshot pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelMapping {
    origin: Vec2,
    scale: Vec2,
}

impl PixelMapping {
    /// Identity mapping.
    pub fn identity() -> Self {
        Self {
            origin: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
        }
    }

    /// Subtract the target's root bounds and scale to the raster's pixel size.
    pub fn for_target(target: &Target, raster: &Raster) -> Self {
        let Some(root) = target.root_bounds() else {
            return Self::identity();
        };
        let axis = |pixels: u32, extent: f64| {
            if extent > 0.0 && extent.is_finite() {
                f64::from(pixels) / extent
            } else {
                1.0
            }
        };
        Self {
            origin: Vec2::new(root.x, root.y),
            scale: Vec2::new(
                axis(raster.width(), root.width),
                axis(raster.height(), root.height),
            ),
        }
    }

    /// Bounds in pixel space.
    pub fn apply(&self, b: Bounds) -> Bounds {
        Bounds::new(
            (b.x - self.origin.x) * self.scale.x,
            (b.y - self.origin.y) * self.scale.y,
            b.width * self.scale.x,
            b.height * self.scale.y,
        )
    }
}

#[derive(Clone, Copy, Debug)]
struct Bucket {
    sum: [u64; 3],
    count: u32,
}

impl Bucket {
    fn representative(&self) -> Color {
        let n = u64::from(self.count.max(1));
        let avg = |s: u64| ((s + n / 2) / n) as u8;
        Color::rgb(avg(self.sum[0]), avg(self.sum[1]), avg(self.sum[2]))
    }
}

/// Coarse color histogram preserving first-seen order.
struct Histogram {
    step: u8,
    index: HashMap<[u8; 3], usize>,
    buckets: Vec<Bucket>,
}

impl Histogram {
    fn new(step: u8) -> Self {
        Self {
            step: step.max(1),
            index: HashMap::new(),
            buckets: Vec::new(),
        }
    }

    fn add(&mut self, c: Color) {
        let [r, g, b] = c.channels();
        let key = [r / self.step, g / self.step, b / self.step];
        let slot = *self.index.entry(key).or_insert_with(|| {
            self.buckets.push(Bucket {
                sum: [0; 3],
                count: 0,
            });
            self.buckets.len() - 1
        });
        let bucket = &mut self.buckets[slot];
        bucket.sum[0] += u64::from(r);
        bucket.sum[1] += u64::from(g);
        bucket.sum[2] += u64::from(b);
        bucket.count += 1;
    }

    fn max_count(&self) -> u32 {
        self.buckets.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Most frequent bucket; ties go to the first seen.
    fn most_frequent(&self) -> Option<Color> {
        let max = self.max_count();
        self.buckets
            .iter()
            .find(|b| b.count == max && max > 0)
            .map(Bucket::representative)
    }
}

/// Samples a decoded screenshot to infer colors the node graph cannot supply.
pub struct Sampler<'a> {
    raster: &'a Raster,
    mapping: PixelMapping,
    settings: &'a SamplingSettings,
}

impl<'a> Sampler<'a> {
    /// Sampler over `raster` using the mapping derived from `target`.
    pub fn new(raster: &'a Raster, target: &Target, settings: &'a SamplingSettings) -> Self {
        Self {
            raster,
            mapping: PixelMapping::for_target(target, raster),
            settings,
        }
    }

    /// Sampler with an explicit mapping.
    pub fn with_mapping(
        raster: &'a Raster,
        mapping: PixelMapping,
        settings: &'a SamplingSettings,
    ) -> Self {
        Self {
            raster,
            mapping,
            settings,
        }
    }

    fn pixel_bounds(&self, target: &Target, idx: NodeIdx) -> Option<Bounds> {
        let b = target.absolute_bounds(idx)?;
        b.is_well_formed().then(|| self.mapping.apply(b))
    }

    fn visible(&self, x: i64, y: i64) -> Option<Color> {
        let [r, g, b, a] = self.raster.channels(x, y)?;
        (a >= self.settings.min_alpha).then(|| Color::rgba(r, g, b, f64::from(a) / 255.0))
    }

    /// A ring sample counts only if at least one orthogonal neighbor is also visible. Isolated or
    /// diagonal-only pixels are usually anti-aliasing debris.
    fn supported(&self, x: i64, y: i64) -> bool {
        [(1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .any(|(dx, dy)| self.visible(x + dx, y + dy).is_some())
    }

    /// Most frequent color on a ring of eight points just outside the node.
    pub fn sample_background(
        &self,
        target: &Target,
        idx: NodeIdx,
        foreground: Option<Color>,
    ) -> Option<Color> {
        let b = self.pixel_bounds(target, idx)?;
        let pad = self.settings.ring_padding;
        let (x0, y0) = (b.x - pad, b.y - pad);
        let (x1, y1) = (b.x + b.width + pad, b.y + b.height + pad);
        let (cx, cy) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
        let ring = [
            (x0, y0),
            (cx, y0),
            (x1, y0),
            (x1, cy),
            (x1, y1),
            (cx, y1),
            (x0, y1),
            (x0, cy),
        ];

        let mut hist = Histogram::new(self.settings.bucket_size);
        for (fx, fy) in ring {
            let (x, y) = (fx.floor() as i64, fy.floor() as i64);
            let Some(px) = self.visible(x, y) else {
                continue;
            };
            if !self.supported(x, y) {
                continue;
            }
            if let Some(fg) = foreground
                && rgb_distance(px, fg) < self.settings.foreground_exclusion_distance
            {
                continue;
            }
            hist.add(px);
        }
        let picked = hist.most_frequent();
        tracing::debug!(node = %target.node(idx).id, ?picked, "sampled background");
        picked
    }

    /// Dominant glyph color strictly inside the node.
    ///
    /// Among buckets whose count is close to the most frequent one, the bucket with the highest
    /// contrast against `background` wins, since anti-aliased edges are frequent but washed out.
    pub fn sample_foreground(
        &self,
        target: &Target,
        idx: NodeIdx,
        background: Option<Color>,
    ) -> Option<Color> {
        let b = self.pixel_bounds(target, idx)?;
        let (mut left, mut top) = (b.x.floor() as i64, b.y.floor() as i64);
        let (mut right, mut bottom) = (
            (b.x + b.width).ceil() as i64,
            (b.y + b.height).ceil() as i64,
        );
        if right - left > 2 {
            left += 1;
            right -= 1;
        }
        if bottom - top > 2 {
            top += 1;
            bottom -= 1;
        }
        left = left.max(0);
        top = top.max(0);
        right = right.min(i64::from(self.raster.width()));
        bottom = bottom.min(i64::from(self.raster.height()));
        if right <= left || bottom <= top {
            return None;
        }

        let area = ((right - left) * (bottom - top)) as f64;
        let stride = (area / FOREGROUND_SAMPLE_BUDGET).sqrt().ceil().max(1.0) as usize;

        let mut hist = Histogram::new(self.settings.bucket_size);
        for y in (top..bottom).step_by(stride) {
            for x in (left..right).step_by(stride) {
                let Some(px) = self.visible(x, y) else {
                    continue;
                };
                if let Some(bg) = background
                    && rgb_distance(px, bg) < self.settings.foreground_exclusion_distance
                {
                    continue;
                }
                hist.add(px);
            }
        }

        let picked = match background {
            None => hist.most_frequent(),
            Some(bg) => {
                let max = hist.max_count();
                let floor = f64::from(max) * self.settings.foreground_closeness;
                let mut best: Option<(f64, Color)> = None;
                for bucket in hist.buckets.iter().filter(|b| f64::from(b.count) >= floor) {
                    let c = bucket.representative();
                    let ratio = contrast_ratio(c, bg);
                    if best.is_none_or(|(r, _)| ratio > r) {
                        best = Some((ratio, c));
                    }
                }
                best.map(|(_, c)| c)
            }
        };
        tracing::debug!(node = %target.node(idx).id, ?picked, "sampled foreground");
        picked
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/sampler.rs"]
mod tests;
