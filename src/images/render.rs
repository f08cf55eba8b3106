// src/images/render.rs
// =============================================================================
// Turns one uploaded image into five JPEG renditions.
//
// BEGINNER NOTES:
// - DynamicImage is the `image` crate's "any pixel format" image type
// - resize_to_fill = scale then crop the overflow (CSS "object-fit: cover")
// - resize_exact   = scale to exactly the given size; we compute that size
//   from the source proportions ourselves, so nothing gets stretched
// - JPEG has no alpha channel, so everything is converted to RGB first
// - This is CPU work; callers run it with tokio::task::spawn_blocking so it
//   doesn't stall the async runtime
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use tracing::debug;

use super::aspect::{target_dimensions, AspectRatio};
use crate::error::AppError;

/// One output image, ready to be sent as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendition {
    pub size: String,
    /// `data:image/jpeg;base64,...`
    pub data: String,
    pub filename: String,
    pub file_size: usize,
    pub width: u32,
    pub height: u32,
}

/// Requested output options (from the query string).
#[derive(Debug, Clone, Copy)]
pub struct RenditionRequest {
    pub aspect: AspectRatio,
    /// Target width of the "large" rendition
    pub width: u32,
}

// (name, target width, JPEG quality). None = use the requested width.
const PRESETS: [(&str, Option<u32>, u8); 4] = [
    ("preview", Some(100), 80),
    ("small", Some(400), 80),
    ("medium", Some(800), 80),
    ("large", None, 85),
];

const ORIGINAL_QUALITY: u8 = 90;

pub fn render_renditions(
    bytes: &[u8],
    request: RenditionRequest,
) -> Result<Vec<Rendition>, AppError> {
    let source = image::load_from_memory(bytes)
        .map_err(|err| AppError::BadRequest(format!("Unsupported or corrupt image: {err}")))?;
    let dimensions = source.dimensions();
    debug!(
        width = dimensions.0,
        height = dimensions.1,
        aspect = %request.aspect,
        "decoded upload"
    );

    let mut renditions = Vec::with_capacity(PRESETS.len() + 1);

    for (name, preset_width, quality) in PRESETS {
        let width = preset_width.unwrap_or(request.width);
        let (out_w, out_h) = target_dimensions(dimensions, width, request.aspect);

        let resized = if request.aspect.is_fixed() {
            source.resize_to_fill(out_w, out_h, FilterType::Lanczos3)
        } else if (out_w, out_h) == dimensions {
            source.clone()
        } else {
            source.resize_exact(out_w, out_h, FilterType::Lanczos3)
        };

        renditions.push(encode(name, &resized, quality)?);
    }

    renditions.push(encode("original", &source, ORIGINAL_QUALITY)?);

    Ok(renditions)
}

fn encode(name: &str, image: &DynamicImage, quality: u8) -> Result<Rendition, AppError> {
    let rgb = image.to_rgb8();
    let mut buf = Vec::new();

    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|err| AppError::ImageProcessing(format!("{name}: {err}")))?;

    Ok(Rendition {
        size: name.to_string(),
        data: format!("data:image/jpeg;base64,{}", STANDARD.encode(&buf)),
        filename: format!("image-{name}.jpg"),
        file_size: buf.len(),
        width: rgb.width(),
        height: rgb.height(),
    })
}
