// SPDX-License-Identifier: MIT

use alloc::{string::String, vec::Vec};

use ssposio::prelude::*;

pub use crate::core::resolver::*;
use crate::core::utils::{path_utils::split_path, time_utils::from_unix_secs};
use crate::fs::sspos::{dir, file, meta::*, types::*};

/// A resolved path: its entry and where that entry's record lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsposNode {
    pub entry: SsposEntry,
    /// Byte offset of the entry record inside its parent; `None` for the root,
    /// which has no record.
    pub offset: Option<u64>,
}

impl SsposNode {
    /// Synthetic root entry: a directory at the first data block.
    pub fn root(meta: &SsposMeta) -> Self {
        Self {
            entry: SsposEntry::new(EntryKind::Dir, meta.root_unit(), "", 0),
            offset: None,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.offset.is_none()
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.entry.is_dir()
    }

    /// Head of the node's own chain.
    #[inline]
    pub fn head(&self) -> u32 {
        self.entry.block
    }
}

/// Walks `path` from the root, one directory lookup per segment.
///
/// Side-effect free: the image is only read.
pub fn resolve<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    path: &str,
) -> FsResolverResult<SsposNode> {
    let mut node = SsposNode::root(meta);
    for segment in split_path(path) {
        if !node.is_dir() {
            return Err(FsResolverError::NotADirectory);
        }
        let slot = dir::find(io, meta, node.head(), segment)?.ok_or(FsResolverError::NotFound)?;
        node = SsposNode {
            entry: slot.entry,
            offset: Some(slot.offset),
        };
    }
    Ok(node)
}

/// Attributes reported for a node. The root reports its derived size.
pub fn node_attributes<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    node: &SsposNode,
) -> FsResolverResult<FileAttributes> {
    let base = if node.is_dir() {
        FileAttributes::new_dir()
    } else {
        FileAttributes::new_file()
    };
    let size = if node.is_root() {
        dir::derived_size(io, meta, node.head())?
    } else {
        node.entry.size
    };
    Ok(base
        .with_size(size as u64)
        .with_modified(from_unix_secs(node.entry.mtime)))
}

/// Read-only view over an sspos volume implementing [`FsResolver`].
pub struct SsposResolver<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a SsposMeta,
}

impl<'a, IO: BlockIO + ?Sized> SsposResolver<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a SsposMeta) -> Self {
        Self { io, meta }
    }

    pub fn resolve(&mut self, path: &str) -> FsResolverResult<SsposNode> {
        resolve(&mut *self.io, self.meta, path)
    }
}

impl<IO: BlockIO + ?Sized> FsResolver for SsposResolver<'_, IO> {
    fn read_dir(&mut self, path: &str) -> FsResolverResult<Vec<String>> {
        let node = self.resolve(path)?;
        if !node.is_dir() {
            return Err(FsResolverError::NotADirectory);
        }
        Ok(dir::list(&mut *self.io, self.meta, node.head())?
            .into_iter()
            .map(|e| e.name)
            .collect())
    }

    fn read_file(&mut self, path: &str) -> FsResolverResult<Vec<u8>> {
        let node = self.resolve(path)?;
        crate::ensure!(!node.is_dir(), FsResolverError::Invalid("sspos: path is a directory"));
        let size = node.entry.size as usize;
        Ok(file::read_range(&mut *self.io, self.meta, &node.entry, 0, size)?)
    }

    fn read_attributes(&mut self, path: &str) -> FsResolverResult<FileAttributes> {
        let node = self.resolve(path)?;
        node_attributes(&mut *self.io, self.meta, &node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::*;
    use crate::fs::sspos::{filesystem::SsposFs, formatter::SsposFormatter};

    fn volume() -> Vec<u8> {
        let meta = SsposMeta::new(512, 8195).unwrap();
        let mut buf = vec![0u8; meta.size_bytes() as usize];
        SsposFormatter::new(&mut MemBlockIO::new(&mut buf), &meta)
            .format(false)
            .unwrap();
        let mut fs = SsposFs::mount(MemBlockIO::new(&mut buf)).unwrap();
        fs.mkdir("/docs", 0o755).unwrap();
        fs.create("/docs/a.txt", 0o644).unwrap();
        fs.write("/docs/a.txt", b"hello", 0).unwrap();
        fs.create("/top", 0o644).unwrap();
        buf
    }

    #[test]
    fn test_resolve_root_and_nested() {
        let mut buf = volume();
        let meta = SsposMeta::new(512, 8195).unwrap();
        let mut io = MemBlockIO::new(&mut buf);

        let root = resolve(&mut io, &meta, "/").unwrap();
        assert!(root.is_root() && root.is_dir());
        assert_eq!(root.head(), meta.data_start);
        assert_eq!(resolve(&mut io, &meta, "").unwrap(), root);

        let file = resolve(&mut io, &meta, "/docs/a.txt").unwrap();
        assert!(!file.is_dir());
        assert_eq!(file.entry.size, 5);
        // Resolution only reads, so it is repeatable.
        assert_eq!(resolve(&mut io, &meta, "docs//a.txt").unwrap(), file);
    }

    #[test]
    fn test_resolve_errors() {
        let mut buf = volume();
        let meta = SsposMeta::new(512, 8195).unwrap();
        let mut io = MemBlockIO::new(&mut buf);

        assert_eq!(
            resolve(&mut io, &meta, "/missing"),
            Err(FsResolverError::NotFound)
        );
        assert_eq!(
            resolve(&mut io, &meta, "/top/x"),
            Err(FsResolverError::NotADirectory)
        );
    }

    #[test]
    fn test_parse_tree_snapshot() {
        let mut buf = volume();
        let meta = SsposMeta::new(512, 8195).unwrap();
        let mut io = MemBlockIO::new(&mut buf);
        let mut resolver = SsposResolver::new(&mut io, &meta);

        assert_eq!(resolver.read_dir("/").unwrap(), vec!["docs", "top"]);
        assert!(resolver.exists("/docs/a.txt").unwrap());
        assert!(!resolver.exists("/docs/b.txt").unwrap());

        let tree = resolver.parse_tree("/").unwrap();
        let counts = tree.counts();
        assert_eq!((counts.dirs, counts.files, counts.bytes), (2, 2, 5));
        match tree.child("docs").and_then(|d| d.child("a.txt")) {
            Some(FsNode::File { content, .. }) => assert_eq!(content, b"hello"),
            other => panic!("unexpected node: {other:?}"),
        }

        // Root size is the sum of its live entry lengths.
        let attr = resolver.read_attributes("/").unwrap();
        assert_eq!(attr.size, (18 + 4) + (18 + 3));
        assert!(attr.dir);
    }
}
