// src/images/mod.rs
// =============================================================================
// Image renditions for the image tool endpoint.
//
// Submodules:
// - aspect: aspect ratio parsing and output sizes
// - render: decoding, resizing and JPEG encoding
// =============================================================================

mod aspect;
mod render;

pub use aspect::AspectRatio;
pub use render::{render_renditions, Rendition, RenditionRequest};
