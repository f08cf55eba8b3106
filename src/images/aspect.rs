// src/images/aspect.rs
// =============================================================================
// Aspect ratio parsing and output size calculation for image renditions.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AspectRatio {
    Square,
    Widescreen,
    Standard,
    Classic,
    /// Keep the source image's own proportions
    #[default]
    Auto,
}

impl AspectRatio {
    /// (width units, height units), or None for Auto
    fn units(self) -> Option<(u32, u32)> {
        match self {
            AspectRatio::Square => Some((1, 1)),
            AspectRatio::Widescreen => Some((16, 9)),
            AspectRatio::Standard => Some((4, 3)),
            AspectRatio::Classic => Some((3, 2)),
            AspectRatio::Auto => None,
        }
    }

    pub fn is_fixed(self) -> bool {
        self.units().is_some()
    }
}

impl FromStr for AspectRatio {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "1:1" => Ok(AspectRatio::Square),
            "16:9" => Ok(AspectRatio::Widescreen),
            "4:3" => Ok(AspectRatio::Standard),
            "3:2" => Ok(AspectRatio::Classic),
            "auto" | "" => Ok(AspectRatio::Auto),
            other => Err(AppError::BadRequest(format!("Unsupported aspect ratio '{other}'"))),
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.units() {
            Some((w, h)) => write!(f, "{w}:{h}"),
            None => f.write_str("auto"),
        }
    }
}

/// Output size for a rendition `width` pixels wide, taken from a `source`
/// image of (width, height). Never larger than the source.
pub fn target_dimensions(source: (u32, u32), width: u32, aspect: AspectRatio) -> (u32, u32) {
    let (source_w, source_h) = (source.0.max(1), source.1.max(1));
    let width = width.max(1);

    let Some((units_w, units_h)) = aspect.units() else {
        let out_w = width.min(source_w);
        let out_h = scale(source_h, out_w, source_w);
        return (out_w, out_h);
    };

    let box_w = width;
    let box_h = scale(width, units_h, units_w);

    if box_w <= source_w && box_h <= source_h {
        return (box_w, box_h);
    }

    // Shrink the whole box until it fits inside the source
    let fit = f64::min(
        source_w as f64 / box_w as f64,
        source_h as f64 / box_h as f64,
    );
    let out_w = ((box_w as f64 * fit).floor() as u32).clamp(1, source_w);
    let out_h = ((box_h as f64 * fit).floor() as u32).clamp(1, source_h);
    (out_w, out_h)
}

// round(value * num / den), at least 1
fn scale(value: u32, num: u32, den: u32) -> u32 {
    let scaled = (value as f64 * num as f64 / den as f64).round() as u32;
    scaled.max(1)
}
