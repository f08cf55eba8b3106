// src/export/mod.rs
// =============================================================================
// This module exports hydrated file records as a single zip archive.
//
// The HTTP server streams the bytes back as a download; the download command
// writes them to disk.
// =============================================================================

mod archive;

pub use archive::{export_archive, todays_archive_filename};
