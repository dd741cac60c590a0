// SPDX-License-Identifier: MIT

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

pub mod attr;
pub mod node;

pub use node::*;

pub use crate::core::errors::{FsResolverError, FsResolverResult};

use crate::core::utils::path_utils::*;

/// Read-only, path-addressed view of a mounted volume.
///
/// Implemented by each filesystem engine; used to snapshot trees for the
/// checker, for tests and for diagnostics.
///
/// Notes:
/// - Paths use `/` as separator and are resolved from the volume root.
/// - Children are listed in on-disk order.
pub trait FsResolver {
    /// Returns the names of the live entries inside the given directory path.
    fn read_dir(&mut self, path: &str) -> FsResolverResult<Vec<String>>;

    /// Returns the full content of the file at the given path.
    fn read_file(&mut self, path: &str) -> FsResolverResult<Vec<u8>>;

    /// Returns the attributes of the entry at the given path.
    fn read_attributes(&mut self, path: &str) -> FsResolverResult<FileAttributes>;

    /// Returns `Ok(false)` when the path does not resolve.
    fn exists(&mut self, path: &str) -> FsResolverResult<bool> {
        match self.read_attributes(path) {
            Ok(_) => Ok(true),
            Err(FsResolverError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Builds an [`FsNode`] for `path`.
    ///
    /// Directories are descended into only when `recurse` is set.
    fn build_node(&mut self, path: &str, recurse: bool) -> FsResolverResult<FsNode> {
        let attr = self.read_attributes(path)?;
        let name = extract_name_from_path(path).to_string();
        if attr.dir {
            let mut children = Vec::new();
            if recurse {
                for entry in self.read_dir(path)? {
                    let entry_path = join_paths(path, &entry);
                    children.push(self.build_node(&entry_path, recurse)?);
                }
            }
            Ok(FsNode::Dir {
                name,
                children,
                attr,
            })
        } else {
            let content = self.read_file(path)?;
            Ok(FsNode::File {
                name,
                content,
                attr,
            })
        }
    }

    /// Snapshot of the whole subtree under `path`.
    fn parse_tree(&mut self, path: &str) -> FsResolverResult<FsNode> {
        self.build_node(path, true)
    }
}
