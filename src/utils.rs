// ABOUTME: Utility functions for the slideforge application
// ABOUTME: Provides helpers for path validation, directory creation and file naming

use crate::errors::{ForgeError, Result};
use std::path::Path;

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ForgeError::ValidationError(format!(
            "Path not found: {:?}",
            path
        )));
    }
    if !path.is_file() {
        return Err(ForgeError::ValidationError(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    } else if !path.is_dir() {
        return Err(ForgeError::ValidationError(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    match file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_directory_exists(parent),
        _ => Ok(()),
    }
}

/// Turn a deck title into a file stem safe on common filesystems.
pub fn sanitize_file_stem(title: &str) -> String {
    let cleaned: String = title
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim();

    if cleaned.is_empty() {
        "presentation".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Length in characters rather than bytes.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_file_stem("Q3: Plans/Goals?"), "Q3_ Plans_Goals_");
        assert_eq!(sanitize_file_stem("  ...  "), "presentation");
        assert_eq!(sanitize_file_stem("Space"), "Space");
    }

    #[test]
    fn parent_directories_are_created() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a").join("b").join("deck.pptx");
        ensure_parent_directory_exists(&file).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
        assert!(ensure_parent_directory_exists(Path::new("deck.pptx")).is_ok());
    }

    #[test]
    fn char_len_counts_characters() {
        assert_eq!(char_len("héllo"), 5);
    }
}
