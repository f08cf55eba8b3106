// src/export/archive.rs
// =============================================================================
// Builds a zip archive from a list of file records, entirely in memory.
//
// Rules:
// - Binary records (images, fonts) are downloaded fresh from download_url
// - Text records use their hydrated content; without content they're skipped
// - Any failed download fails the whole export; no partial archives
// - Deflate at level 9
// =============================================================================

use std::io::{Cursor, Write};

use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use reqwest::Client;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::AppError;
use crate::github::FileRecord;

const COMPRESSION_LEVEL: i64 = 9;

// github-files-2024-05-01.zip
pub fn archive_filename(date: NaiveDate) -> String {
    format!("github-files-{}.zip", date.format("%Y-%m-%d"))
}

pub fn todays_archive_filename() -> String {
    archive_filename(Utc::now().date_naive())
}

/// Fetches binary payloads and zips everything.
pub async fn export_archive(client: &Client, records: &[FileRecord]) -> Result<Vec<u8>, AppError> {
    // All binary downloads run at once; the first failure aborts the export
    let binaries = try_join_all(
        records
            .iter()
            .filter(|record| record.file_type.is_binary())
            .map(|record| fetch_binary(client, record)),
    )
    .await?;
    let mut binaries = binaries.into_iter();

    let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for record in records {
        let name = entry_name(&record.path)?;
        if record.file_type.is_binary() {
            let bytes = binaries
                .next()
                .ok_or_else(|| AppError::ArchiveAssembly("binary payloads out of step".into()))?;
            entries.push((name, bytes));
        } else if let Some(content) = &record.content {
            entries.push((name, content.clone().into_bytes()));
        } else {
            skipped += 1;
        }
    }

    let entry_count = entries.len();
    let archive = tokio::task::spawn_blocking(move || write_archive(entries))
        .await
        .map_err(|err| AppError::ArchiveAssembly(err.to_string()))??;

    info!(
        entries = entry_count,
        skipped,
        bytes = archive.len(),
        "archive assembled"
    );

    Ok(archive)
}

async fn fetch_binary(client: &Client, record: &FileRecord) -> Result<Vec<u8>, AppError> {
    let url = record
        .download_url
        .as_deref()
        .ok_or_else(|| AppError::ArchiveAssembly(format!("{} has no download URL", record.path)))?;

    let fail = |err: reqwest::Error| AppError::ArchiveAssembly(format!("{}: {err}", record.path));

    let response = client.get(url).send().await.map_err(fail)?;
    let response = response.error_for_status().map_err(fail)?;
    let bytes = response.bytes().await.map_err(fail)?;
    Ok(bytes.to_vec())
}

// Archive entry names are the record paths. Absolute paths and '.', '..' or
// empty segments would let an extractor write outside its target directory.
fn entry_name(path: &str) -> Result<String, AppError> {
    let unsafe_path = path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..");

    if unsafe_path {
        return Err(AppError::ArchiveAssembly(format!("unsafe archive path '{path}'")));
    }
    Ok(path.to_string())
}

fn write_archive(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, AppError> {
    let fail = |err: &dyn std::fmt::Display| AppError::ArchiveAssembly(err.to_string());

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(name, options).map_err(|e| fail(&e))?;
        writer.write_all(&data).map_err(|e| fail(&e))?;
    }

    let cursor = writer.finish().map_err(|e| fail(&e))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::FileType;
    use crate::testing::{spawn_fake_github, FakeRepo};
    use std::io::Read;
    use zip::ZipArchive;

    fn text(path: &str, content: Option<&str>) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            file_type: FileType::from_path(path),
            content: content.map(str::to_string),
            size: 0,
            sha: String::new(),
            download_url: None,
        }
    }

    fn binary(path: &str, url: Option<String>) -> FileRecord {
        FileRecord {
            download_url: url,
            ..text(path, None)
        }
    }

    fn read_entries(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index(i).unwrap();
                let mut data = Vec::new();
                file.read_to_end(&mut data).unwrap();
                (file.name().to_string(), data)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_archive_contains_text_and_binary_entries() {
        let png = [0x89u8, b'P', b'N', b'G', 0, 1, 2, 3];
        let server = spawn_fake_github(FakeRepo::new().binary("b.png", &png)).await;
        let records = vec![
            text("a.txt", Some("hi")),
            binary("b.png", Some(server.raw_url("b.png"))),
        ];

        let archive = export_archive(&Client::new(), &records).await.unwrap();
        let entries = read_entries(archive);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a.txt".to_string(), b"hi".to_vec()));
        assert_eq!(entries[1], ("b.png".to_string(), png.to_vec()));
    }

    #[tokio::test]
    async fn test_unreachable_binary_fails_the_whole_export() {
        let server =
            spawn_fake_github(FakeRepo::new().binary("b.png", &[1, 2]).unreachable("b.png")).await;
        let records = vec![
            text("a.txt", Some("hi")),
            binary("b.png", Some(server.raw_url("b.png"))),
        ];

        let result = export_archive(&Client::new(), &records).await;
        assert!(matches!(result, Err(AppError::ArchiveAssembly(_))));
    }

    #[tokio::test]
    async fn test_binary_without_url_fails() {
        let records = vec![binary("font.woff2", None)];
        let result = export_archive(&Client::new(), &records).await;
        assert!(matches!(result, Err(AppError::ArchiveAssembly(_))));
    }

    #[tokio::test]
    async fn test_text_without_content_is_skipped() {
        let records = vec![
            text("a.txt", Some("")),
            text("missing.rs", None),
            text("dir/c.md", Some("# c")),
        ];

        let entries = read_entries(export_archive(&Client::new(), &records).await.unwrap());
        let names: Vec<_> = entries.iter().map(|(n, _)| n.as_str()).collect();

        assert_eq!(names, vec!["a.txt", "dir/c.md"]);
    }

    #[tokio::test]
    async fn test_unsafe_paths_are_rejected() {
        for path in ["../etc/passwd", "/abs.txt", "a//b.txt", "a/./b.txt"] {
            let result = export_archive(&Client::new(), &[text(path, Some("x"))]).await;
            assert!(result.is_err(), "{path} should be rejected");
        }
    }

    #[test]
    fn test_archive_filename_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(archive_filename(date), "github-files-2024-05-01.zip");
        assert!(todays_archive_filename().starts_with("github-files-"));
    }

    #[test]
    fn test_entries_are_deflated() {
        let big = "abc".repeat(10_000);
        let archive = write_archive(vec![("big.txt".into(), big.clone().into_bytes())]).unwrap();
        assert!(archive.len() < big.len() / 10);

        let mut reader = ZipArchive::new(Cursor::new(archive)).unwrap();
        let file = reader.by_name("big.txt").unwrap();
        assert_eq!(file.compression(), CompressionMethod::Deflated);
    }
}
