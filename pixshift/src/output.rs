//! Output naming and destination resolution

use std::path::{Path, PathBuf};

/// Replace characters that are invalid in file names on common
/// platforms, trimming leading/trailing spaces and dots.
pub fn safe_file_stem(stem: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

    let cleaned: String = stem
        .chars()
        .map(|c| if INVALID.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches([' ', '.']);

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Append `_N` before the extension until the path doesn't collide
/// with an existing file
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().unwrap_or(Path::new(""));

    let mut counter = 1;
    loop {
        let candidate = if extension.is_empty() {
            parent.join(format!("{stem}_{counter}"))
        } else {
            parent.join(format!("{stem}_{counter}.{extension}"))
        };
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Default save location: the platform Downloads folder, created if
/// missing; the home directory if neither can be resolved.
pub fn default_output_dir() -> PathBuf {
    let dir = dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."));

    if !dir.exists() {
        let _ = std::fs::create_dir_all(&dir);
    }
    dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_characters_are_replaced() {
        assert_eq!(safe_file_stem("a/b:c*d"), "a_b_c_d");
        assert_eq!(safe_file_stem("  spaced.  "), "spaced");
        assert_eq!(safe_file_stem("***"), "___");
        assert_eq!(safe_file_stem(" ."), "image");
    }

    #[test]
    fn unique_path_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");

        assert_eq!(unique_path(&path), path);

        std::fs::write(&path, b"x").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("photo_1.png"));

        std::fs::write(dir.path().join("photo_1.png"), b"x").unwrap();
        assert_eq!(unique_path(&path), dir.path().join("photo_2.png"));
    }
}
