// src/walk/tree.rs
// =============================================================================
// Builds a hierarchical view of a flat file list, for display only.
//
// Each path is split on '/' and its segments are merged into a shared-prefix
// tree. Directories come first at every level, then names in order.
// =============================================================================

use serde::Serialize;

use crate::github::{FileRecord, FileType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FileNode {
    Directory {
        name: String,
        path: String,
        children: Vec<FileNode>,
    },
    File {
        name: String,
        path: String,
        #[serde(rename = "type")]
        file_type: FileType,
        size: u64,
    },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            FileNode::Directory { name, .. } | FileNode::File { name, .. } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, FileNode::Directory { .. })
    }
}

pub fn build_tree(files: &[FileRecord]) -> Vec<FileNode> {
    let mut root: Vec<FileNode> = Vec::new();

    for file in files {
        let parts: Vec<&str> = file.path.split('/').filter(|p| !p.is_empty()).collect();
        let Some((leaf, dirs)) = parts.split_last() else {
            continue;
        };

        let mut level = &mut root;
        for (depth, dir) in dirs.iter().enumerate() {
            let existing = level
                .iter()
                .position(|node| node.is_directory() && node.name() == *dir);
            let index = match existing {
                Some(index) => index,
                None => {
                    level.push(FileNode::Directory {
                        name: dir.to_string(),
                        path: parts[..=depth].join("/"),
                        children: Vec::new(),
                    });
                    level.len() - 1
                }
            };
            level = match &mut level[index] {
                FileNode::Directory { children, .. } => children,
                FileNode::File { .. } => unreachable!("index points at a directory"),
            };
        }

        level.push(FileNode::File {
            name: leaf.to_string(),
            path: parts.join("/"),
            file_type: file.file_type,
            size: file.size,
        });
    }

    sort_nodes(&mut root);
    root
}

fn sort_nodes(nodes: &mut [FileNode]) {
    nodes.sort_by(|a, b| {
        b.is_directory()
            .cmp(&a.is_directory())
            .then_with(|| a.name().cmp(b.name()))
    });
    for node in nodes.iter_mut() {
        if let FileNode::Directory { children, .. } = node {
            sort_nodes(children);
        }
    }
}

// Renders the tree as indented text, e.g.
//   src/
//     main.rs  [text, 1.2 KB]
pub fn render_tree(nodes: &[FileNode]) -> String {
    let mut out = String::new();
    render_level(nodes, 0, &mut out);
    out
}

fn render_level(nodes: &[FileNode], depth: usize, out: &mut String) {
    for node in nodes {
        let indent = "  ".repeat(depth);
        match node {
            FileNode::Directory { name, children, .. } => {
                out.push_str(&format!("{indent}{name}/\n"));
                render_level(children, depth + 1, out);
            }
            FileNode::File {
                name,
                file_type,
                size,
                ..
            } => {
                out.push_str(&format!(
                    "{indent}{name}  [{}, {}]\n",
                    file_type.as_str(),
                    format_file_size(*size)
                ));
            }
        }
    }
}

// 0 -> "0 B", 1536 -> "1.5 KB", 1048576 -> "1 MB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    // Two decimals, trailing zeros dropped
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}
