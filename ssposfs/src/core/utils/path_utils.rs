// SPDX-License-Identifier: MIT

//! Path helpers for host paths addressed at the volume.
//!
//! Paths are `/`-separated and always interpreted from the volume root.
//! Empty segments are discarded, so `"//a///b/"` and `"/a/b"` are the same path.

use alloc::{string::String, vec::Vec};

/// Splits a path into its non-empty components.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|part| !part.is_empty()).collect()
}

/// Splits a path into `(parent, name)`.
///
/// The parent is returned with a leading `/`; the root has no parent and yields `None`.
pub fn split_parent(path: &str) -> Option<(String, &str)> {
    let parts = split_path(path);
    let (name, parents) = parts.split_last()?;
    let mut parent = String::from("/");
    parent.push_str(&parents.join("/"));
    Some((parent, name))
}

/// Join two path components with `/`, ensuring no duplicate slash.
pub fn join_paths(base: &str, part: &str) -> String {
    let mut out = String::new();
    out.push_str(base.trim_end_matches('/'));
    out.push('/');
    out.push_str(part.trim_start_matches('/'));
    out
}

/// Extracts the last component of the path (file or directory name).
pub fn extract_name_from_path(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path_discards_empty_segments() {
        assert_eq!(split_path("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(split_path("//a///b/"), vec!["a", "b"]);
        assert!(split_path("/").is_empty());
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_split_parent() {
        let (parent, name) = split_parent("/d/f").unwrap();
        assert_eq!(parent, "/d");
        assert_eq!(name, "f");

        let (parent, name) = split_parent("/a").unwrap();
        assert_eq!(parent, "/");
        assert_eq!(name, "a");

        assert!(split_parent("/").is_none());
    }

    #[test]
    fn test_join_and_extract() {
        assert_eq!(join_paths("/", "a"), "/a");
        assert_eq!(join_paths("/d/", "/f"), "/d/f");
        assert_eq!(extract_name_from_path("/d/f"), "f");
        assert_eq!(extract_name_from_path("/d/"), "d");
    }
}
