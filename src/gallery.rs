//! Image gallery storage: one directory per category under the uploads root.

use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Categories listed on the gallery page, with their section titles.
pub const CATEGORIES: [(&str, &str); 3] = [
    ("campus", "Campus"),
    ("academic", "Academic"),
    ("student", "Student Life"),
];

/// Rejects anything that is not a single, plain path segment.
pub fn check_segment(kind: &str, value: &str) -> AppResult<()> {
    let bad = value.is_empty() || value == "." || value == ".." || value.contains(['/', '\\', '\0']);
    if bad {
        return Err(AppError::InvalidInput(format!("invalid {}: {:?}", kind, value)));
    }
    Ok(())
}

pub fn category_dir(root: &Path, category: &str) -> AppResult<PathBuf> {
    check_segment("category", category)?;
    Ok(root.join(category))
}

pub fn file_path(root: &Path, category: &str, filename: &str) -> AppResult<PathBuf> {
    check_segment("filename", filename)?;
    Ok(category_dir(root, category)?.join(filename))
}

/// Creates the fixed category directories.
pub async fn ensure_dirs(root: &Path) -> std::io::Result<()> {
    for (category, _) in CATEGORIES {
        tokio::fs::create_dir_all(root.join(category)).await?;
    }
    Ok(())
}

/// Sorted file names in a category; a missing directory lists as empty.
pub async fn list_files(root: &Path, category: &str) -> AppResult<Vec<String>> {
    let dir = category_dir(root, category)?;
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Writes `bytes` as `<root>/<category>/<filename>`, replacing any existing file.
pub async fn save(root: &Path, category: &str, filename: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    let path = file_path(root, category, filename)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, bytes).await?;
    Ok(path)
}

pub async fn read(root: &Path, category: &str, filename: &str) -> AppResult<Vec<u8>> {
    let path = file_path(root, category, filename)?;
    match tokio::fs::read(&path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AppError::NotFound(format!("{}/{} not found", category, filename)))
        }
        Err(e) => Err(e.into()),
    }
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{:02X}", b)),
        }
    }
    out
}
