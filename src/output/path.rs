//! Collision-free target directory naming

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{OutputError, OutputResult};

/// Sanitize a tag for filesystem safety.
///
/// Prevents path traversal by replacing dangerous characters:
/// - `/`, `\`, `:` -> `_` (directory separators)
/// - `..` -> `__` (parent directory reference)
///
/// Case is preserved; upstream tags are case-sensitive.
pub fn sanitize_tag(tag: &str) -> String {
    tag.replace("..", "__").replace(['/', '\\', ':'], "_")
}

/// Create and return a directory for `tag` that is unique under `base_dir`.
///
/// The candidate is `base_dir/tag`; if occupied, `tag(1)`, `tag(2)`, ... are
/// tried in order. The directory creation itself claims the name, so two
/// sessions in this process can never be handed the same directory. The base
/// directory is created first if absent.
pub fn unique_tag_dir(base_dir: &Path, tag: &str) -> OutputResult<PathBuf> {
    let name = sanitize_tag(tag);

    std::fs::create_dir_all(base_dir).map_err(|e| {
        OutputError::IoError(format!(
            "failed to create output root {}: {e}",
            base_dir.display()
        ))
    })?;

    let mut counter: u32 = 0;
    loop {
        let candidate = if counter == 0 {
            base_dir.join(&name)
        } else {
            base_dir.join(format!("{name}({counter})"))
        };

        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                counter += 1;
            }
            Err(e) => {
                return Err(OutputError::IoError(format!(
                    "failed to create directory {}: {e}",
                    candidate.display()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_uses_plain_tag() {
        let base = tempfile::tempdir().unwrap();
        let dir = unique_tag_dir(base.path(), "scenery").unwrap();
        assert_eq!(dir, base.path().join("scenery"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_collisions_get_numeric_suffix() {
        let base = tempfile::tempdir().unwrap();
        std::fs::create_dir(base.path().join("scenery")).unwrap();
        std::fs::create_dir(base.path().join("scenery(1)")).unwrap();

        let dir = unique_tag_dir(base.path(), "scenery").unwrap();
        assert_eq!(dir, base.path().join("scenery(2)"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_creates_missing_base_dir() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("img");
        let dir = unique_tag_dir(&nested, "tree").unwrap();
        assert_eq!(dir, nested.join("tree"));
        assert!(dir.is_dir());
    }

    #[test]
    fn test_sanitize_tag() {
        assert_eq!(sanitize_tag("blue_sky"), "blue_sky");
        assert_eq!(sanitize_tag("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_tag("../escape"), "___escape");
        assert_eq!(sanitize_tag("UpperCase"), "UpperCase");
    }

    #[test]
    fn test_sanitized_collision_sequence() {
        let base = tempfile::tempdir().unwrap();
        let first = unique_tag_dir(base.path(), "a/b").unwrap();
        let second = unique_tag_dir(base.path(), "a/b").unwrap();
        assert_eq!(first, base.path().join("a_b"));
        assert_eq!(second, base.path().join("a_b(1)"));
    }
}
