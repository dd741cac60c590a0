// SPDX-License-Identifier: MIT

use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use ssposio::prelude::*;
use tracing::debug;

pub use crate::core::host::*;
use crate::core::resolver::attr::FileAttributes;
use crate::core::utils::{path_utils::split_parent, time_utils::now_unix_secs};
use crate::fs::sspos::{
    allocator::SsposAllocator, constant::*, dir, file, filesystem::SsposFs, resolver,
    types::EntryKind,
};

impl<IO: BlockIO> FsOperations for SsposFs<IO> {
    fn getattr(&mut self, path: &str) -> FsOpsResult<FileAttributes> {
        let node = self.lookup(path)?;
        Ok(resolver::node_attributes(&mut self.io, &self.meta, &node)?)
    }

    fn readdir(&mut self, path: &str) -> FsOpsResult<Vec<String>> {
        let node = self.lookup(path)?;
        if !node.is_dir() {
            return Err(FsOpsError::NotADirectory);
        }
        let mut names = vec![".".to_string(), "..".to_string()];
        names.extend(
            dir::list(&mut self.io, &self.meta, node.head())?
                .into_iter()
                .map(|e| e.name),
        );
        Ok(names)
    }

    fn read(&mut self, path: &str, size: usize, offset: u64) -> FsOpsResult<Vec<u8>> {
        let node = self.lookup(path)?;
        if node.is_dir() {
            return Err(FsOpsError::IsADirectory);
        }
        Ok(file::read_range(&mut self.io, &self.meta, &node.entry, offset, size)?)
    }

    fn write(&mut self, path: &str, data: &[u8], offset: u64) -> FsOpsResult<usize> {
        let node = self.lookup(path)?;
        if node.is_dir() {
            return Err(FsOpsError::IsADirectory);
        }
        if data.is_empty() {
            return Ok(0);
        }
        let record = node.offset.ok_or(FsOpsError::IsADirectory)?;

        let end = offset
            .checked_add(data.len() as u64)
            .filter(|&end| end <= u32::MAX as u64)
            .ok_or(FsOpsError::FileTooLarge)?;
        let old_size = node.entry.size as u64;
        let new_size = old_size.max(end) as u32;

        // Size and mtime are patched before the data lands.
        self.io.write_u32_at(record + SSPOS_ENTRY_SIZE_OFFSET, new_size)?;
        self.io.write_u64_at(record + SSPOS_ENTRY_MTIME_OFFSET, now_unix_secs())?;

        let alloc = SsposAllocator::new(&self.meta);
        file::write_range(
            &mut self.io,
            &self.meta,
            &alloc,
            node.head(),
            old_size,
            offset,
            data,
        )?;
        debug!(path, offset, len = data.len(), size = new_size, "sspos: wrote file");
        Ok(data.len())
    }

    fn create(&mut self, path: &str, mode: u32) -> FsOpsResult {
        let (parent, name) = split_parent(path).ok_or(FsOpsError::AlreadyExists)?;
        self.create_entry(&parent, name, EntryKind::from_mode(mode))
    }

    fn mkdir(&mut self, path: &str, _mode: u32) -> FsOpsResult {
        let (parent, name) = split_parent(path).ok_or(FsOpsError::AlreadyExists)?;
        self.create_entry(&parent, name, EntryKind::Dir)
    }

    fn unlink(&mut self, path: &str) -> FsOpsResult {
        let node = self.lookup(path)?;
        if node.is_dir() {
            return Err(FsOpsError::IsADirectory);
        }
        let (parent, _) = split_parent(path).ok_or(FsOpsError::IsADirectory)?;
        self.remove_entry(&parent, &node)
    }

    fn rmdir(&mut self, path: &str) -> FsOpsResult {
        let node = self.lookup(path)?;
        if !node.is_dir() {
            return Err(FsOpsError::NotADirectory);
        }
        let (parent, _) = split_parent(path).ok_or(FsOpsError::Unsupported)?;
        crate::ensure!(
            dir::is_empty(&mut self.io, &self.meta, node.head())?,
            FsOpsError::NotEmpty
        );
        self.remove_entry(&parent, &node)
    }

    fn statfs(&mut self) -> FsOpsResult<VolumeStats> {
        self.stat_volume()
    }
}
