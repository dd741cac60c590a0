// SPDX-License-Identifier: MIT

use time::OffsetDateTime;

/// Default permission bits of a directory.
pub const DEFAULT_DIR_MODE: u32 = 0o755;
/// Default permission bits of a regular file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Attributes of a node as reported to the host.
///
/// The volume format only records kind, size and mtime; permissions are
/// fixed per kind and the remaining timestamps mirror `modified`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAttributes {
    pub dir: bool,
    pub size: u64,
    pub modified: OffsetDateTime,
    /// Permission bits only (no file type bits).
    pub mode: u32,
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self::new_file()
    }
}

impl FileAttributes {
    /// Directory attributes with default permissions.
    pub fn new_dir() -> Self {
        Self {
            dir: true,
            size: 0,
            modified: OffsetDateTime::UNIX_EPOCH,
            mode: DEFAULT_DIR_MODE,
        }
    }

    /// Regular file attributes with default permissions.
    pub fn new_file() -> Self {
        Self {
            dir: false,
            size: 0,
            modified: OffsetDateTime::UNIX_EPOCH,
            mode: DEFAULT_FILE_MODE,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_modified(mut self, modified: OffsetDateTime) -> Self {
        self.modified = modified;
        self
    }
}
