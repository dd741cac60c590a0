// SPDX-License-Identifier: MIT

use ssposio::prelude::*;
use tracing::info;

pub use crate::core::formatter::*;

use crate::fs::sspos::{allocator::SsposAllocator, constant::*, meta::*, types::*};

/// SsposFormatter:
/// - Writes the superblock and clears the reserved block behind it.
/// - Clears the bitmap, then marks the root block as the only allocated block.
/// - Writes an empty root directory.
/// - Touches the last block so file-backed images reach their declared size.
pub struct SsposFormatter<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a SsposMeta,
}

impl<'a, IO: BlockIO + ?Sized> SsposFormatter<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a SsposMeta) -> Self {
        Self { io, meta }
    }

    fn write_superblock(&mut self) -> FsFormatterResult {
        let block_size = self.meta.block_size as usize;
        let offset = self.meta.block_offset(self.meta.superblock_block);
        self.io
            .zero_fill(offset, block_size * SSPOS_SUPERBLOCK_BLOCKS as usize)?;

        let sb = SsposSuperblock::from_meta(self.meta);
        self.io.write_struct(SSPOS_SUPERBLOCK_ADDR, &sb)?;
        Ok(())
    }

    fn write_bitmap(&mut self) -> FsFormatterResult {
        let len = self.meta.bitmap_blocks as usize * self.meta.block_size as usize;
        self.io.zero_fill(self.meta.bitmap_offset(), len)?;
        SsposAllocator::new(self.meta).allocate(&mut *self.io, self.meta.root_unit())?;
        Ok(())
    }

    fn write_root_dir(&mut self) -> FsFormatterResult {
        let root = self.meta.block_offset(self.meta.root_unit());
        self.io.zero_fill(root, self.meta.block_size as usize)?;
        Ok(())
    }

    fn reserve_image(&mut self) -> FsFormatterResult {
        let last = self.meta.block_offset(self.meta.block_count - 1);
        self.io.zero_fill(last, self.meta.block_size as usize)?;
        Ok(())
    }
}

impl<IO: BlockIO + ?Sized> FsFormatter for SsposFormatter<'_, IO> {
    fn format(&mut self, full_format: bool) -> FsFormatterResult {
        self.reserve_image()?;
        if full_format {
            zero_data_region(&mut *self.io, self.meta)?;
        }
        self.write_superblock()?;
        self.write_bitmap()?;
        self.write_root_dir()?;
        info!(
            block_size = self.meta.block_size,
            block_count = self.meta.block_count,
            data_blocks = self.meta.data_blocks,
            full_format,
            "sspos: formatted volume"
        );
        Ok(())
    }

    fn flush(&mut self) -> FsFormatterResult {
        self.io.flush()?;
        Ok(())
    }
}
