// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use ssposio::prelude::*;
use tracing::debug;

pub use crate::core::errors::{FsAllocatorError, FsAllocatorResult};
use crate::core::utils::bitmap::BitmapOps;
use crate::fs::sspos::meta::*;

/// Bit-per-block allocator over the on-disk bitmap.
///
/// Nothing is cached: every call reads and rewrites the single bitmap byte
/// it touches, so the image stays the only source of truth.
#[derive(Debug, Clone, Copy)]
pub struct SsposAllocator<'a> {
    meta: &'a SsposMeta,
}

impl<'a> SsposAllocator<'a> {
    pub fn new(meta: &'a SsposMeta) -> Self {
        Self { meta }
    }

    fn locate(&self, block: u32) -> FsAllocatorResult<(u64, u8)> {
        self.meta
            .bit_location(block)
            .ok_or(FsAllocatorError::InvalidBlock(block))
    }

    pub fn is_allocated<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        block: u32,
    ) -> FsAllocatorResult<bool> {
        let (offset, bit) = self.locate(block)?;
        Ok(io.read_u8_at(offset)? >> bit & 1 == 1)
    }

    /// Sets the bit of `block`.
    pub fn allocate<IO: BlockIO + ?Sized>(&self, io: &mut IO, block: u32) -> FsAllocatorResult {
        self.update_bit(io, block, true)
    }

    /// Clears the bit of `block`.
    pub fn free<IO: BlockIO + ?Sized>(&self, io: &mut IO, block: u32) -> FsAllocatorResult {
        self.update_bit(io, block, false)?;
        debug!(block, "sspos: freed block");
        Ok(())
    }

    fn update_bit<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        block: u32,
        value: bool,
    ) -> FsAllocatorResult {
        let (offset, bit) = self.locate(block)?;
        let mut byte = [io.read_u8_at(offset)?];
        byte.set_bit(bit as usize, value);
        io.write_u8_at(offset, byte[0])?;
        Ok(())
    }

    /// Lowest free block of the data region.
    pub fn find_first_free<IO: BlockIO + ?Sized>(&self, io: &mut IO) -> FsAllocatorResult<u32> {
        self.free_blocks(io)
            .next()
            .unwrap_or(Err(FsAllocatorError::OutOfSpace))
    }

    /// First-fit allocation: finds the lowest free block and marks it.
    pub fn allocate_next<IO: BlockIO + ?Sized>(&self, io: &mut IO) -> FsAllocatorResult<u32> {
        let block = self.find_first_free(io)?;
        self.allocate(io, block)?;
        debug!(block, "sspos: allocated block");
        Ok(block)
    }

    /// Low-to-high scan over the free blocks.
    pub fn free_blocks<'io, IO: BlockIO + ?Sized>(&self, io: &'io mut IO) -> FreeBlocks<'a, 'io, IO> {
        FreeBlocks::new(self.meta, io)
    }

    /// Number of clear bits over the data region.
    pub fn count_free<IO: BlockIO + ?Sized>(&self, io: &mut IO) -> FsAllocatorResult<u32> {
        let per_block = self.meta.bits_per_bitmap_block() as usize;
        let mut remaining = self.meta.data_blocks as usize;
        let mut buf = vec![0u8; self.meta.block_size as usize];
        let mut used = 0usize;
        let mut index = 0u32;
        while remaining > 0 {
            io.read_at(self.meta.block_offset(self.meta.bitmap_start + index), &mut buf)?;
            let limit = remaining.min(per_block);
            used += buf.count_ones_below(limit);
            remaining -= limit;
            index += 1;
        }
        Ok(self.meta.data_blocks - used as u32)
    }
}

/// Iterator over free blocks, lowest first.
///
/// Holds one bitmap block at a time; ends after the last block covered by
/// the bitmap, or after the first IO error.
pub struct FreeBlocks<'a, 'io, IO: BlockIO + ?Sized> {
    meta: &'a SsposMeta,
    io: &'io mut IO,
    buf: Vec<u8>,
    loaded: Option<u32>,
    next_bit: usize,
}

impl<'a, 'io, IO: BlockIO + ?Sized> FreeBlocks<'a, 'io, IO> {
    fn new(meta: &'a SsposMeta, io: &'io mut IO) -> Self {
        Self {
            meta,
            io,
            buf: vec![0u8; meta.block_size as usize],
            loaded: None,
            next_bit: 0,
        }
    }
}

impl<IO: BlockIO + ?Sized> Iterator for FreeBlocks<'_, '_, IO> {
    type Item = FsAllocatorResult<u32>;

    fn next(&mut self) -> Option<Self::Item> {
        let limit = self.meta.data_blocks as usize;
        let per_block = self.meta.bits_per_bitmap_block() as usize;

        while self.next_bit < limit {
            let index = (self.next_bit / per_block) as u32;
            if self.loaded != Some(index) {
                let offset = self.meta.block_offset(self.meta.bitmap_start + index);
                if let Err(e) = self.io.read_at(offset, &mut self.buf) {
                    self.next_bit = limit;
                    return Some(Err(e.into()));
                }
                self.loaded = Some(index);
            }

            let base = index as usize * per_block;
            let local_limit = (limit - base).min(per_block);
            match self.buf.find_first_zero(self.next_bit - base, local_limit) {
                Some(bit) => {
                    self.next_bit = base + bit + 1;
                    return Some(Ok(self.meta.data_start + (base + bit) as u32));
                }
                None => self.next_bit = base + per_block,
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (SsposMeta, Vec<u8>) {
        let meta = SsposMeta::new(512, 8195).unwrap();
        let buf = vec![0u8; meta.size_bytes() as usize];
        (meta, buf)
    }

    #[test]
    fn test_allocate_and_free_touch_single_bit() {
        let (meta, mut buf) = setup();
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        alloc.allocate(&mut io, 4099 + 9).unwrap();
        assert!(alloc.is_allocated(&mut io, 4108).unwrap());
        assert!(!alloc.is_allocated(&mut io, 4107).unwrap());
        assert_eq!(io.read_u8_at(meta.bitmap_offset() + 1).unwrap(), 0b0000_0010);

        alloc.free(&mut io, 4108).unwrap();
        assert!(!alloc.is_allocated(&mut io, 4108).unwrap());
        assert_eq!(io.read_u8_at(meta.bitmap_offset() + 1).unwrap(), 0);
    }

    #[test]
    fn test_first_fit_prefers_lowest_block() {
        let (meta, mut buf) = setup();
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        let a = alloc.allocate_next(&mut io).unwrap();
        let b = alloc.allocate_next(&mut io).unwrap();
        let c = alloc.allocate_next(&mut io).unwrap();
        assert_eq!((a, b, c), (4099, 4100, 4101));

        alloc.free(&mut io, b).unwrap();
        assert_eq!(alloc.allocate_next(&mut io).unwrap(), b);
        assert_eq!(alloc.allocate_next(&mut io).unwrap(), 4102);
    }

    #[test]
    fn test_out_of_space() {
        let (meta, mut buf) = setup();
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        io.write_at(meta.bitmap_offset(), &[0xFF; 512]).unwrap();
        assert_eq!(alloc.count_free(&mut io).unwrap(), 0);
        assert_eq!(
            alloc.allocate_next(&mut io),
            Err(FsAllocatorError::OutOfSpace)
        );
    }

    #[test]
    fn test_rejects_blocks_outside_data_region() {
        let (meta, mut buf) = setup();
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        assert_eq!(
            alloc.allocate(&mut io, meta.bitmap_start),
            Err(FsAllocatorError::InvalidBlock(meta.bitmap_start))
        );
        assert_eq!(
            alloc.free(&mut io, 8195),
            Err(FsAllocatorError::InvalidBlock(8195))
        );
    }

    #[test]
    fn test_free_blocks_iterator_and_count() {
        let (meta, mut buf) = setup();
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        io.write_u8_at(meta.bitmap_offset(), 0b1111_0101).unwrap();
        let first: Vec<u32> = alloc
            .free_blocks(&mut io)
            .take(3)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(first, vec![4099 + 1, 4099 + 3, 4099 + 8]);
        assert_eq!(alloc.free_blocks(&mut io).count(), 4096 - 6);
        assert_eq!(alloc.count_free(&mut io).unwrap(), 4096 - 6);
    }

    #[test]
    fn test_scan_is_bounded_by_data_region() {
        // 32 MiB volume: the bitmap covers 14 * 4096 blocks, all of which exist.
        let meta = SsposMeta::new(512, 65536).unwrap();
        let mut buf = vec![0u8; meta.size_bytes() as usize];
        let alloc = SsposAllocator::new(&meta);
        let mut io = MemBlockIO::new(&mut buf);

        let last = alloc.free_blocks(&mut io).last().unwrap().unwrap();
        assert_eq!(last, meta.last_data_unit());
        assert_eq!(alloc.count_free(&mut io).unwrap(), meta.data_blocks);
    }
}
