//! Blob naming rules.
//!
//! Each provider kind carries a validation rule set for collection blob
//! names. Validation runs once at model-build time so a bad name fails
//! the whole context instead of surfacing on the first write.

use crate::CloudProviderKind;

/// Maximum blob name length for the reference object-storage rules.
const MAX_BLOB_NAME_LEN: usize = 1024;

const FORBIDDEN_CHARS: &[char] = &['?', '%', '*', ':', '|', '"', '<', '>'];

/// Returns whether `name` is a valid blob name under the rules of the
/// given provider kind.
///
/// The memory provider deliberately shares the reference rules so tests
/// running against it catch naming errors that would only show up in
/// production otherwise.
pub fn is_blob_name_valid(kind: CloudProviderKind, name: &str) -> bool {
    match kind {
        CloudProviderKind::S3 | CloudProviderKind::Memory => reference_rules(name),
    }
}

/// Reference object-storage rules: non-empty, at most 1024 characters,
/// no uppercase, no `..`, no leading/trailing separators, no backslash,
/// no `//`, none of `? % * : | " < >`.
fn reference_rules(name: &str) -> bool {
    if name.trim().is_empty() || name.chars().count() > MAX_BLOB_NAME_LEN {
        return false;
    }
    if name.chars().any(|c| c.is_uppercase()) {
        return false;
    }
    if name.contains("..") || name.contains('\\') || name.contains("//") {
        return false;
    }
    if name.starts_with('/') || name.ends_with('/') {
        return false;
    }
    if name.contains(FORBIDDEN_CHARS) {
        return false;
    }
    true
}

/// Normalizes a raw name fragment: lowercases and replaces every
/// character outside `[a-z0-9_-]` with an underscore. Structural
/// characters from type signatures (`::`, `<`, `>`, brackets, spaces)
/// all collapse to underscores.
pub fn sanitize_fragment(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_lengths() {
        let ok: String = "a".repeat(1024);
        assert!(is_blob_name_valid(CloudProviderKind::S3, &ok));
        let too_long: String = "a".repeat(1025);
        assert!(!is_blob_name_valid(CloudProviderKind::S3, &too_long));
    }

    #[test]
    fn uppercase_rejected_anywhere() {
        assert!(!is_blob_name_valid(CloudProviderKind::S3, "Users"));
        assert!(!is_blob_name_valid(CloudProviderKind::S3, "useRs"));
        assert!(!is_blob_name_valid(CloudProviderKind::S3, "userS"));
    }

    #[test]
    fn structural_violations_rejected() {
        for bad in ["", "  ", "a..b", "/users", "users/", "a\\b", "a//b"] {
            assert!(!is_blob_name_valid(CloudProviderKind::S3, bad), "{bad:?}");
        }
        for bad in ["a?b", "a%b", "a*b", "a:b", "a|b", "a\"b", "a<b", "a>b"] {
            assert!(!is_blob_name_valid(CloudProviderKind::S3, bad), "{bad:?}");
        }
    }

    #[test]
    fn nested_segments_allowed() {
        assert!(is_blob_name_valid(CloudProviderKind::Memory, "a1b2c3-users"));
        assert!(is_blob_name_valid(CloudProviderKind::Memory, "ab/cd"));
    }

    #[test]
    fn sanitize_collapses_signature_chars() {
        assert_eq!(sanitize_fragment("Box<my::A>"), "box_my__a_");
        assert_eq!(sanitize_fragment("  User  "), "user");
        assert_eq!(sanitize_fragment("a.b+c`d[e]"), "a_b_c_d_e_");
    }
}
