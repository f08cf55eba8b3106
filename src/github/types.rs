// src/github/types.rs
// =============================================================================
// Data types for GitHub directory listings and the file records we build
// from them.
//
// ContentEntry mirrors one item of the GitHub "repository contents" API.
// FileRecord is our own flattened view of a single file, and it is what the
// HTTP API and the exporter pass around.
// =============================================================================

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One entry of a `GET /repos/{owner}/{repo}/contents/{path}` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContentEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Only present when the path itself is a file
    #[serde(default)]
    pub content: Option<String>,
    /// "base64" for inline bodies; "none" when the file is too large to inline
    #[serde(default)]
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

// The contents API returns an array for a directory and a bare object when
// the path points at a single file
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ContentsResponse {
    Listing(Vec<ContentEntry>),
    Single(Box<ContentEntry>),
}

impl ContentsResponse {
    pub(crate) fn into_entries(self) -> Vec<ContentEntry> {
        match self {
            ContentsResponse::Listing(entries) => entries,
            ContentsResponse::Single(entry) => vec![*entry],
        }
    }
}

/// Coarse content category, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Typescript,
    Javascript,
    Json,
    Markdown,
    Css,
    Scss,
    Less,
    Html,
    Svg,
    Image,
    Font,
    Text,
}

impl FileType {
    pub fn from_path(path: &str) -> Self {
        let file_name = path.rsplit('/').next().unwrap_or(path);
        let extension = match file_name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return FileType::Text,
        };

        match extension.as_str() {
            "ts" | "tsx" => FileType::Typescript,
            "js" | "jsx" => FileType::Javascript,
            "json" => FileType::Json,
            "md" => FileType::Markdown,
            "css" => FileType::Css,
            "scss" => FileType::Scss,
            "less" => FileType::Less,
            "html" => FileType::Html,
            "svg" => FileType::Svg,
            "png" | "jpg" | "jpeg" | "gif" | "ico" => FileType::Image,
            "woff" | "woff2" | "ttf" | "eot" => FileType::Font,
            _ => FileType::Text,
        }
    }

    /// Binary payloads are never stored as text; they are fetched as bytes at export time.
    pub fn is_binary(self) -> bool {
        matches!(self, FileType::Image | FileType::Font)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Typescript => "typescript",
            FileType::Javascript => "javascript",
            FileType::Json => "json",
            FileType::Markdown => "markdown",
            FileType::Css => "css",
            FileType::Scss => "scss",
            FileType::Less => "less",
            FileType::Html => "html",
            FileType::Svg => "svg",
            FileType::Image => "image",
            FileType::Font => "font",
            FileType::Text => "text",
        }
    }
}

/// One file discovered during a walk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(rename = "type", default = "default_file_type")]
    pub file_type: FileType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub sha: String,
    #[serde(default, alias = "downloadUrl")]
    pub download_url: Option<String>,
}

fn default_file_type() -> FileType {
    FileType::Text
}

impl FileRecord {
    pub fn from_entry(entry: ContentEntry) -> Self {
        let file_type = FileType::from_path(&entry.path);

        // Inline bodies are only kept for text types, and only base64 is decoded
        let content = match (file_type.is_binary(), entry.encoding.as_deref()) {
            (false, Some("base64")) => entry.content.as_deref().and_then(decode_inline_content),
            _ => None,
        };

        FileRecord {
            path: entry.path,
            file_type,
            content,
            size: entry.size,
            sha: entry.sha,
            download_url: entry.download_url,
        }
    }

    /// True for text records that still have no content.
    pub fn needs_hydration(&self) -> bool {
        self.content.is_none() && !self.file_type.is_binary()
    }
}

// GitHub wraps base64 bodies at 60 columns, so whitespace is stripped first.
// Returns None when the payload isn't base64 or isn't UTF-8 text.
pub fn decode_inline_content(encoded: &str) -> Option<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, content: Option<&str>) -> ContentEntry {
        ContentEntry {
            path: path.to_string(),
            kind: EntryKind::File,
            size: 5,
            sha: "abc".to_string(),
            download_url: Some(format!("https://raw.example/{path}")),
            content: content.map(str::to_string),
            encoding: Some("base64".to_string()),
        }
    }

    #[test]
    fn test_file_type_by_extension() {
        assert_eq!(FileType::from_path("src/index.tsx"), FileType::Typescript);
        assert_eq!(FileType::from_path("README.MD"), FileType::Markdown);
        assert_eq!(FileType::from_path("assets/logo.PNG"), FileType::Image);
        assert_eq!(FileType::from_path("fonts/inter.woff2"), FileType::Font);
        assert_eq!(FileType::from_path("icon.svg"), FileType::Svg);
        assert_eq!(FileType::from_path("Makefile"), FileType::Text);
        assert_eq!(FileType::from_path("v1.2/LICENSE"), FileType::Text);
        assert_eq!(FileType::from_path("data.unknown"), FileType::Text);
    }

    #[test]
    fn test_binary_set() {
        assert!(FileType::Image.is_binary());
        assert!(FileType::Font.is_binary());
        assert!(!FileType::Svg.is_binary());
        assert!(!FileType::Text.is_binary());
    }

    #[test]
    fn test_decode_inline_content_with_line_breaks() {
        // "hello world\n" split the way GitHub wraps it
        let encoded = "aGVsbG8g\nd29ybGQK\n";
        assert_eq!(decode_inline_content(encoded).as_deref(), Some("hello world\n"));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_inline_content("not base64!!"), None);
    }

    #[test]
    fn test_record_from_entry_decodes_text_only() {
        let text = FileRecord::from_entry(entry("notes.md", Some("aGk=")));
        assert_eq!(text.content.as_deref(), Some("hi"));
        assert!(!text.needs_hydration());

        let image = FileRecord::from_entry(entry("logo.png", Some("aGk=")));
        assert_eq!(image.content, None);
        assert!(!image.needs_hydration());

        let listed = FileRecord::from_entry(entry("main.rs", None));
        assert!(listed.needs_hydration());
    }

    #[test]
    fn test_only_base64_bodies_are_decoded() {
        // Large files come back with encoding "none" and an empty body
        let large = ContentEntry {
            encoding: Some("none".to_string()),
            ..entry("big.json", Some(""))
        };
        let record = FileRecord::from_entry(large);
        assert_eq!(record.content, None);
        assert!(record.needs_hydration());

        let unlabelled = ContentEntry {
            encoding: None,
            ..entry("notes.md", Some("aGk="))
        };
        assert_eq!(FileRecord::from_entry(unlabelled).content, None);
    }

    #[test]
    fn test_contents_response_accepts_object_or_array() {
        let single: ContentsResponse = serde_json::from_str(
            r#"{"path":"a.txt","type":"file","size":1,"sha":"s","download_url":null}"#,
        )
        .unwrap();
        assert_eq!(single.into_entries().len(), 1);

        let listing: ContentsResponse = serde_json::from_str(
            r#"[{"path":"a","type":"dir","sha":"s"},{"path":"b","type":"submodule","sha":"t"}]"#,
        )
        .unwrap();
        let entries = listing.into_entries();
        assert_eq!(entries[0].kind, EntryKind::Dir);
        assert_eq!(entries[1].kind, EntryKind::Submodule);
    }

    #[test]
    fn test_record_wire_format() {
        let record: FileRecord = serde_json::from_str(
            r#"{"path":"b.png","type":"image","downloadUrl":"u","size":3,"sha":""}"#,
        )
        .unwrap();
        assert_eq!(record.download_url.as_deref(), Some("u"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["download_url"], "u");
        assert!(json.get("content").is_none());
    }
}
