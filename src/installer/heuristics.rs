//! Text heuristics over installer output
//!
//! The installer's human-readable output is not a stable interface. Every check that
//! depends on its wording lives here so it can be tested and replaced in one place.

/// Banner the installer prints when downloaded files fail hash verification
pub const HASH_MISMATCH_BANNER: &str =
    "THESE PACKAGES DO NOT MATCH THE HASHES FROM THE REQUIREMENTS FILE";

/// Whether the installer reported that a newer version of itself is available
///
/// The installer appends "however version X is available" to its stderr.
pub fn installer_is_outdated(stderr: &str) -> bool {
    stderr.contains("however")
}

/// Whether installer output reports a hash verification failure
pub fn is_hash_mismatch(output: &str) -> bool {
    output.contains(HASH_MISMATCH_BANNER)
        || output
            .to_ascii_lowercase()
            .contains("do not match the hashes")
}

/// Drop a post-release segment from a version parsed out of a file name
///
/// Handles the implicit form (`1.0-1`, a numeric segment after a dash) and the
/// explicit form (`1.0.post1`, `1.0-post2`, `1.0post`).
pub fn strip_post_release(version: &str) -> &str {
    let mut segments = version.split('-');
    if let (Some(head), Some(next)) = (segments.next(), segments.next()) {
        if !next.is_empty() && next.chars().all(|c| c.is_ascii_digit()) {
            return head;
        }
    }

    let lower = version.to_ascii_lowercase();
    if let Some(idx) = lower.rfind("post") {
        let tail = &lower[idx + "post".len()..];
        let head = version[..idx].trim_end_matches(['.', '-', '_']);
        let head_is_release = head.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
        if head_is_release && tail.chars().all(|c| c.is_ascii_digit()) {
            return head;
        }
    }

    version
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_is_outdated() {
        assert!(installer_is_outdated(
            "You are using pip version 9.0.1, however version 10.0 is available."
        ));
        assert!(!installer_is_outdated(""));
        assert!(!installer_is_outdated("Requirement already satisfied: pip"));
    }

    #[test]
    fn test_is_hash_mismatch() {
        assert!(is_hash_mismatch(
            "ERROR: THESE PACKAGES DO NOT MATCH THE HASHES FROM THE REQUIREMENTS FILE."
        ));
        assert!(is_hash_mismatch("these packages do not match the hashes"));
        assert!(!is_hash_mismatch("No matching distribution found for foo"));
    }

    #[test]
    fn test_strip_implicit_post_release() {
        assert_eq!(strip_post_release("1.2.3-1"), "1.2.3");
        assert_eq!(strip_post_release("1.2.3-20"), "1.2.3");
    }

    #[test]
    fn test_strip_explicit_post_release() {
        assert_eq!(strip_post_release("1.2.3.post1"), "1.2.3");
        assert_eq!(strip_post_release("1.2.3-post2"), "1.2.3");
        assert_eq!(strip_post_release("1.2.3post"), "1.2.3");
        assert_eq!(strip_post_release("2.0.POST10"), "2.0");
    }

    #[test]
    fn test_keeps_other_versions() {
        assert_eq!(strip_post_release("1.2.3"), "1.2.3");
        assert_eq!(strip_post_release("1.0rc1"), "1.0rc1");
        assert_eq!(strip_post_release("1.0-dev"), "1.0-dev");
        assert_eq!(strip_post_release("1.0.postfix"), "1.0.postfix");
        assert_eq!(strip_post_release("post1"), "post1");
    }
}
