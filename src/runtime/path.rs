//! Lexical path helpers. None of these touch the filesystem.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// Symlinks are not followed.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` if there is nothing left to pop
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => result.push(component),
        }
    }
    result
}

/// Resolve a possibly relative path against a base directory.
///
/// Install paths and config path values are recorded relative to the
/// project root; this turns them into absolute, normalized paths.
pub fn resolve_relative_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base_dir.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_with_dot() {
        assert_eq!(
            normalize_path(Path::new("/project/./vendor/./a")),
            PathBuf::from("/project/vendor/a")
        );
    }

    #[test]
    fn test_normalize_path_with_parent_dir() {
        assert_eq!(
            normalize_path(Path::new("/project/vendor/../lib")),
            PathBuf::from("/project/lib")
        );
    }

    #[test]
    fn test_normalize_path_relative_keeps_leading_parent() {
        assert_eq!(
            normalize_path(Path::new("../vendor/a")),
            PathBuf::from("../vendor/a")
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_resolve_relative_path_joins_base() {
        assert_eq!(
            resolve_relative_path(Path::new("/project"), Path::new("vendor/acme/util")),
            PathBuf::from("/project/vendor/acme/util")
        );
        assert_eq!(
            resolve_relative_path(Path::new("/project/app"), Path::new("../shared")),
            PathBuf::from("/project/shared")
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_resolve_relative_path_absolute_passthrough() {
        assert_eq!(
            resolve_relative_path(Path::new("/project"), Path::new("/opt/./pkg")),
            PathBuf::from("/opt/pkg")
        );
    }
}
