// src/walk/paths.rs
// =============================================================================
// Base-path stripping for walks that started in a subdirectory.
//
// The comparison is segment by segment, so a base of "src" strips
// "src/index.ts" down to "index.ts" but leaves "src2/index.ts" alone.
// =============================================================================

use crate::github::FileRecord;

// Returns `path` relative to `base` when `base` is a strict leading run of
// whole segments of `path`; otherwise returns `path` unchanged.
pub fn strip_base_path(path: &str, base: &str) -> String {
    let base_segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    if base_segments.is_empty() {
        return path.to_string();
    }

    let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    // Equal to the base (a single-file walk) or not under it at all
    if path_segments.len() <= base_segments.len() || !path_segments.starts_with(&base_segments) {
        return path.to_string();
    }

    path_segments[base_segments.len()..].join("/")
}

/// Rewrites every record's path relative to `base`.
pub fn normalize_paths(files: &mut [FileRecord], base: &str) {
    for file in files.iter_mut() {
        file.path = strip_base_path(&file.path, base);
    }
}
