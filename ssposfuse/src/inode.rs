// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use ssposfs::{join_paths, split_parent};

pub const ROOT_INO: u64 = fuser::FUSE_ROOT_ID;

/// Inode numbers handed to the kernel, keyed by path.
///
/// The volume has no inodes of its own; numbers are assigned on first sight
/// and live until the path is removed or the volume is unmounted.
#[derive(Debug)]
pub struct InodeTable {
    paths: HashMap<u64, String>,
    inos: HashMap<String, u64>,
    next: u64,
}

impl Default for InodeTable {
    fn default() -> Self {
        let mut table = Self {
            paths: HashMap::new(),
            inos: HashMap::new(),
            next: ROOT_INO + 1,
        };
        table.paths.insert(ROOT_INO, "/".to_owned());
        table.inos.insert("/".to_owned(), ROOT_INO);
        table
    }
}

impl InodeTable {
    pub fn path(&self, ino: u64) -> Option<&str> {
        self.paths.get(&ino).map(String::as_str)
    }

    pub fn child_path(&self, parent: u64, name: &str) -> Option<String> {
        self.path(parent).map(|p| join_paths(p, name))
    }

    /// Inode of the directory holding `path` (the root is its own parent).
    pub fn parent_ino(&mut self, path: &str) -> u64 {
        match split_parent(path) {
            Some((parent, _)) => self.get_or_insert(&parent),
            None => ROOT_INO,
        }
    }

    pub fn get_or_insert(&mut self, path: &str) -> u64 {
        if let Some(&ino) = self.inos.get(path) {
            return ino;
        }
        let ino = self.next;
        self.next += 1;
        self.paths.insert(ino, path.to_owned());
        self.inos.insert(path.to_owned(), ino);
        ino
    }

    pub fn forget(&mut self, path: &str) {
        if let Some(ino) = self.inos.remove(path) {
            self.paths.remove(&ino);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_is_preassigned() {
        let table = InodeTable::default();
        assert_eq!(table.path(ROOT_INO), Some("/"));
        assert_eq!(table.child_path(ROOT_INO, "a").as_deref(), Some("/a"));
        assert!(table.path(ROOT_INO + 1).is_none());
    }

    #[test]
    fn test_numbers_are_stable_until_forgotten() {
        let mut table = InodeTable::default();
        let a = table.get_or_insert("/d/a");
        assert_eq!(table.get_or_insert("/d/a"), a);
        assert_ne!(table.get_or_insert("/d/b"), a);

        let d = table.parent_ino("/d/a");
        assert_eq!(table.path(d), Some("/d"));
        assert_eq!(table.parent_ino("/d"), ROOT_INO);
        assert_eq!(table.parent_ino("/"), ROOT_INO);

        table.forget("/d/a");
        assert!(table.path(a).is_none());
        assert_ne!(table.get_or_insert("/d/a"), a);
    }
}
