use image::Rgba;

use crate::error::{PipelineError, Result};
use crate::models::SmoothedPoint;

/// Fixed `[min, max]` value range mapped onto the color scale.
///
/// Computed once over the whole run's smoothed values and shared by
/// every frame, so colors stay comparable across dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

impl ColorDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Global domain over all present smoothed values.
    pub fn from_points(points: &[SmoothedPoint]) -> Result<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for point in points {
            if let Some(value) = point.value {
                min = min.min(value);
                max = max.max(value);
            }
        }

        if min > max {
            return Err(PipelineError::NoData(
                "No present smoothed values to derive a color domain from".to_string(),
            ));
        }

        Ok(Self { min, max })
    }

    /// Position of `value` in the domain, clamped to [0, 1]. A flat
    /// domain maps everything to the midpoint.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.max == self.min {
            return 0.5;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

/// Sequential color scale sampled by linear interpolation between fixed
/// stops (viridis).
#[derive(Debug, Clone, Copy)]
pub struct Palette;

const GRADIENT_STOPS: [[u8; 3]; 10] = [
    [68, 1, 84],
    [72, 40, 120],
    [62, 74, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [109, 205, 89],
    [180, 222, 44],
    [253, 231, 37],
];

/// Fill for cells with no smoothed value on a date. Deliberately
/// neutral so absence never reads as an extreme.
pub const ABSENT_COLOR: Rgba<u8> = Rgba([224, 224, 224, 255]);

pub const BACKGROUND_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub const OUTLINE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

impl Palette {
    /// Color for a cell value under the run's fixed domain; absent
    /// values get the neutral fill.
    pub fn color_for(domain: &ColorDomain, value: Option<f64>) -> Rgba<u8> {
        match value {
            None => ABSENT_COLOR,
            Some(v) => Self::sample(domain.normalize(v)),
        }
    }

    /// Sample the gradient at `t` in [0, 1].
    pub fn sample(t: f64) -> Rgba<u8> {
        let t = t.clamp(0.0, 1.0);
        let scaled = t * (GRADIENT_STOPS.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(GRADIENT_STOPS.len() - 2);
        let frac = scaled - idx as f64;

        let lo = GRADIENT_STOPS[idx];
        let hi = GRADIENT_STOPS[idx + 1];
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;

        Rgba([lerp(lo[0], hi[0]), lerp(lo[1], hi[1]), lerp(lo[2], hi[2]), 255])
    }
}
