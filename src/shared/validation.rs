use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters allowed verbatim in storage object keys.
    /// Anything else in an uploaded display name is replaced before the
    /// name becomes part of an object key.
    pub static ref UNSAFE_KEY_CHARS: Regex = Regex::new(r"[^A-Za-z0-9._-]").unwrap();
}

/// Make an uploaded display name safe for use inside a storage object key.
///
/// Replaces path separators and other unsafe characters with `_` so a name
/// like `"../../etc/passwd"` cannot escape the owner's key prefix. Empty
/// names fall back to `"unnamed"`.
pub fn sanitize_file_name(name: &str) -> String {
    let sanitized = UNSAFE_KEY_CHARS.replace_all(name.trim(), "_").to_string();
    let trimmed = sanitized.trim_matches('.');
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_names() {
        assert_eq!(sanitize_file_name("report-v2.pdf"), "report-v2.pdf");
        assert_eq!(sanitize_file_name("IMG_0001.jpeg"), "IMG_0001.jpeg");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("my holiday photo.png"), "my_holiday_photo.png");
        assert_eq!(sanitize_file_name("a/b\\c.txt"), "a_b_c.txt");
        assert_eq!(sanitize_file_name("weird%$name!.gif"), "weird__name_.gif");
    }

    #[test]
    fn test_sanitize_blocks_path_traversal() {
        let sanitized = sanitize_file_name("../../etc/passwd");
        assert!(!sanitized.contains('/'));
        assert!(!sanitized.starts_with('.'));
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_file_name(""), "unnamed");
        assert_eq!(sanitize_file_name("   "), "unnamed");
        assert_eq!(sanitize_file_name("..."), "unnamed");
    }
}
