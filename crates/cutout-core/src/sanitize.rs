//! Filename sanitization for user-supplied upload names.

use std::path::Path;

/// Sanitize a user-supplied filename to a filesystem-safe token.
///
/// Extracts only the base name (strips path components like `../`), then maps
/// every byte outside `[A-Za-z0-9._-]` to `_`. Names that sanitize to nothing
/// usable (empty, `.`, `..`, or only replaced bytes) fall back to the
/// caller-supplied placeholder.
pub fn sanitize_filename(filename: &str, fallback: &str) -> String {
    let base = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or("");

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '_' || c == '.') {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// Base name without the final extension, for building archive member names.
pub fn file_stem(filename: &str) -> &str {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_path_traversal() {
        // Path traversal attempts should be stripped to base name
        assert_eq!(sanitize_filename("../../etc/passwd", "fallback"), "passwd");
        assert_eq!(sanitize_filename("../foo/bar.png", "fallback"), "bar.png");
    }

    #[test]
    fn test_sanitize_filename_normal_names_unchanged() {
        assert_eq!(sanitize_filename("image.png", "fallback"), "image.png");
        assert_eq!(
            sanitize_filename("photo_2024-01.jpeg", "fallback"),
            "photo_2024-01.jpeg"
        );
    }

    #[test]
    fn test_sanitize_filename_replaces_unsafe_bytes() {
        assert_eq!(
            sanitize_filename("my photo (1).png", "fallback"),
            "my_photo__1_.png"
        );
        assert_eq!(sanitize_filename("caf\u{e9}.jpg", "fallback"), "caf_.jpg");
    }

    #[test]
    fn test_sanitize_filename_edge_cases_use_fallback() {
        assert_eq!(sanitize_filename("", "fallback"), "fallback");
        assert_eq!(sanitize_filename(".", "fallback"), "fallback");
        assert_eq!(sanitize_filename("..", "fallback"), "fallback");
        assert_eq!(sanitize_filename("???", "fallback"), "fallback");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("image.png"), "image");
        assert_eq!(file_stem("archive.tar.gz"), "archive.tar");
        assert_eq!(file_stem("noextension"), "noextension");
    }
}
