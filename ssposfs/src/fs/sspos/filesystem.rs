// SPDX-License-Identifier: MIT

use ssposio::prelude::*;
use tracing::{debug, info};

use crate::core::errors::*;
use crate::core::host::VolumeStats;
use crate::core::utils::time_utils::now_unix_secs;
use crate::fs::sspos::{
    allocator::SsposAllocator,
    checker::SsposChecker,
    constant::*,
    cursor,
    dir,
    meta::*,
    resolver::{self, SsposNode, SsposResolver},
    types::*,
};

/// A mounted sspos volume.
///
/// Owns the backing store for the lifetime of the mount. Operations are
/// synchronous read-modify-write cycles against the store; callers
/// serialize access (the type is `&mut self` throughout).
#[derive(Debug)]
pub struct SsposFs<IO: BlockIO> {
    pub(crate) io: IO,
    pub(crate) meta: SsposMeta,
}

impl<IO: BlockIO> SsposFs<IO> {
    /// Reads and validates the superblock, then derives the layout.
    ///
    /// A bad signature, version or block size aborts the mount.
    pub fn mount(mut io: IO) -> FsResult<Self> {
        let sb: SsposSuperblock = io.read_struct(SSPOS_SUPERBLOCK_ADDR)?;
        let meta = SsposMeta::from_superblock(&sb)?;
        info!(
            block_size = meta.block_size,
            block_count = meta.block_count,
            data_start = meta.data_start,
            data_blocks = meta.data_blocks,
            "sspos: mounted volume"
        );
        Ok(Self { io, meta })
    }

    /// Flushes the store and hands it back.
    pub fn unmount(mut self) -> FsResult<IO> {
        self.io.flush()?;
        info!("sspos: unmounted volume");
        Ok(self.io)
    }

    pub fn meta(&self) -> &SsposMeta {
        &self.meta
    }

    /// Raw access to the backing store.
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    pub fn resolver(&mut self) -> SsposResolver<'_, IO> {
        SsposResolver::new(&mut self.io, &self.meta)
    }

    pub fn checker(&mut self) -> SsposChecker<'_, IO> {
        SsposChecker::new(&mut self.io, &self.meta)
    }

    /// Side-effect free path lookup.
    pub fn resolve(&mut self, path: &str) -> FsResolverResult<SsposNode> {
        resolver::resolve(&mut self.io, &self.meta, path)
    }

    /// Like [`Self::resolve`], with lookup failures mapped to host errors.
    pub(crate) fn lookup(&mut self, path: &str) -> FsOpsResult<SsposNode> {
        self.resolve(path).map_err(|e| match e {
            FsResolverError::NotFound => FsOpsError::NotFound,
            FsResolverError::NotADirectory => FsOpsError::NotADirectory,
            other => other.into(),
        })
    }

    pub fn stat_volume(&mut self) -> FsOpsResult<VolumeStats> {
        let free = SsposAllocator::new(&self.meta).count_free(&mut self.io)?;
        Ok(VolumeStats {
            block_size: self.meta.block_size,
            total_blocks: self.meta.data_blocks,
            free_blocks: free,
            max_name_len: self.meta.max_name_len() as u32,
        })
    }

    /// Rewrites the size field of the directory at `path` from its live entries.
    ///
    /// The root has no record and is left alone.
    pub fn recompute_dir_size(&mut self, path: &str) -> FsOpsResult {
        let node = self.lookup(path)?;
        let Some(offset) = node.offset else {
            return Ok(());
        };
        let size = dir::derived_size(&mut self.io, &self.meta, node.head())?;
        self.io.write_u32_at(offset + SSPOS_ENTRY_SIZE_OFFSET, size)?;
        debug!(path, size, "sspos: recomputed directory size");
        Ok(())
    }

    /// Adds a `kind` entry named `name` under `parent`, with one fresh block.
    pub(crate) fn create_entry(&mut self, parent: &str, name: &str, kind: EntryKind) -> FsOpsResult {
        if name.len() > self.meta.max_name_len() {
            return Err(FsOpsError::NameTooLong);
        }
        validate_name(name).map_err(|_| FsOpsError::InvalidName)?;

        let dir_node = self.lookup(parent)?;
        crate::ensure!(dir_node.is_dir(), FsOpsError::NotADirectory);
        if dir::find(&mut self.io, &self.meta, dir_node.head(), name)?.is_some() {
            crate::bail!(FsOpsError::AlreadyExists);
        }

        // The parent grows before the child gets its head block.
        let alloc = SsposAllocator::new(&self.meta);
        dir::reserve_slot(
            &mut self.io,
            &self.meta,
            &alloc,
            dir_node.head(),
            SSPOS_ENTRY_SIZE + name.len(),
        )?;
        let block = alloc.allocate_next(&mut self.io)?;
        let entry = SsposEntry::new(kind, block, name, now_unix_secs());
        let appended = self
            .io
            .zero_fill(self.meta.block_offset(block), self.meta.block_size as usize)
            .map_err(FsOpsError::from)
            .and_then(|()| dir::append_entry(&mut self.io, &self.meta, &alloc, dir_node.head(), &entry));
        if let Err(e) = appended {
            // The new block is not reachable yet.
            alloc.free(&mut self.io, block)?;
            return Err(e);
        }

        self.recompute_dir_size(parent)?;
        debug!(parent, name, block, ?kind, "sspos: created entry");
        Ok(())
    }

    /// Tombstones the record of `node`, frees its chain and refreshes the parent size.
    pub(crate) fn remove_entry(&mut self, parent: &str, node: &SsposNode) -> FsOpsResult {
        let offset = node.offset.ok_or(FsOpsError::Unsupported)?;
        self.io
            .write_u32_at(offset + SSPOS_ENTRY_BLOCK_OFFSET, SSPOS_TOMBSTONE)?;

        let chain = cursor::collect_chain(&mut self.io, &self.meta, node.head())?;
        let alloc = SsposAllocator::new(&self.meta);
        for block in &chain {
            alloc.free(&mut self.io, *block)?;
        }

        self.recompute_dir_size(parent)?;
        debug!(parent, name = %node.entry.name, blocks = chain.len(), "sspos: removed entry");
        Ok(())
    }
}
