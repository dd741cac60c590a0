// SPDX-License-Identifier: MIT

//! Host-facing operation surface.
//!
//! A host adapter (FUSE, a test harness, a shell) dispatches OS-level calls
//! into this trait. Operations the volume format cannot express answer
//! [`FsOpsError::Unsupported`] explicitly instead of being ignored.

use alloc::{string::String, vec::Vec};

use time::OffsetDateTime;

pub use crate::core::errors::{FsOpsError, FsOpsResult};
use crate::core::resolver::attr::FileAttributes;

/// Volume-wide usage figures (statfs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeStats {
    pub block_size: u32,
    /// Blocks of the data region, root block included.
    pub total_blocks: u32,
    pub free_blocks: u32,
    /// Longest entry name accepted by `create`/`mkdir`.
    pub max_name_len: u32,
}

impl VolumeStats {
    pub fn used_blocks(&self) -> u32 {
        self.total_blocks.saturating_sub(self.free_blocks)
    }
}

/// Path-addressed file operations.
///
/// Every path is absolute from the volume root. The trait carries defaults
/// for the calls a volume may not implement.
pub trait FsOperations {
    /// Attribute lookup.
    fn getattr(&mut self, path: &str) -> FsOpsResult<FileAttributes>;

    /// Directory listing, `.` and `..` first.
    fn readdir(&mut self, path: &str) -> FsOpsResult<Vec<String>>;

    /// Reads at most `size` bytes starting at `offset`.
    fn read(&mut self, path: &str, size: usize, offset: u64) -> FsOpsResult<Vec<u8>>;

    /// Writes `data` at `offset`, growing the file if needed. Returns the number of bytes written.
    fn write(&mut self, path: &str, data: &[u8], offset: u64) -> FsOpsResult<usize>;

    /// Creates an empty regular file.
    fn create(&mut self, path: &str, mode: u32) -> FsOpsResult;

    /// Creates an empty directory.
    fn mkdir(&mut self, path: &str, mode: u32) -> FsOpsResult;

    /// Removes a regular file.
    fn unlink(&mut self, path: &str) -> FsOpsResult;

    /// Removes an empty directory.
    fn rmdir(&mut self, _path: &str) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn statfs(&mut self) -> FsOpsResult<VolumeStats>;

    fn rename(&mut self, _from: &str, _to: &str) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn symlink(&mut self, _target: &str, _link: &str) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn readlink(&mut self, _path: &str) -> FsOpsResult<String> {
        Err(FsOpsError::Unsupported)
    }

    fn chmod(&mut self, _path: &str, _mode: u32) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn chown(&mut self, _path: &str, _uid: Option<u32>, _gid: Option<u32>) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn truncate(&mut self, _path: &str, _size: u64) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn utimens(
        &mut self,
        _path: &str,
        _atime: Option<OffsetDateTime>,
        _mtime: Option<OffsetDateTime>,
    ) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn getxattr(&mut self, _path: &str, _name: &str) -> FsOpsResult<Vec<u8>> {
        Err(FsOpsError::Unsupported)
    }

    fn setxattr(&mut self, _path: &str, _name: &str, _value: &[u8]) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }

    fn listxattr(&mut self, _path: &str) -> FsOpsResult<Vec<String>> {
        Err(FsOpsError::Unsupported)
    }

    fn removexattr(&mut self, _path: &str, _name: &str) -> FsOpsResult {
        Err(FsOpsError::Unsupported)
    }
}
