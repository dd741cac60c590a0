// SPDX-License-Identifier: MIT

pub use crate::core::meta::*;

use crate::core::errors::{FsParsingError, FsParsingResult};
use crate::fs::sspos::{constant::*, types::SsposSuperblock};

/// Layout of an sspos volume, derived once from block size and block count.
///
/// Every unit handled by this type is an absolute block index, the same value
/// stored on disk (`byte_address / block_size`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsposMeta {
    pub block_size: u32,
    pub block_count: u32,
    /// Informational counter carried by the superblock.
    pub alloc_count: u32,

    pub superblock_block: u32,
    pub bitmap_start: u32,
    pub bitmap_blocks: u32,

    pub data_start: u32,
    /// Blocks of the data region covered by the bitmap and present on the volume.
    pub data_blocks: u32,
}

impl SsposMeta {
    /// Layout for a volume of `block_count` blocks of `block_size` bytes.
    pub fn new(block_size: u32, block_count: u32) -> FsParsingResult<Self> {
        if !block_size.is_power_of_two()
            || block_size < SSPOS_MIN_BLOCK_SIZE
            || block_size > (2u32 << (8 + SSPOS_MAX_BLOCK_SIZE_EXP))
        {
            return Err(FsParsingError::Invalid("sspos: unsupported block size"));
        }

        let bs = block_size as u64;
        let superblock_block = (SSPOS_SUPERBLOCK_ADDR / bs) as u32;
        let bitmap_start = superblock_block + SSPOS_SUPERBLOCK_BLOCKS;
        crate::ensure!(
            block_count > bitmap_start,
            FsParsingError::Invalid("sspos: volume too small")
        );

        // Bitmap sizing used by the image creator: floor of the fixed point
        // `bitmap_blocks * bits_per_block ~= remaining blocks`.
        let bits = 8 * bs;
        let usable = (block_count - bitmap_start) as u64;
        let rest = usable * bits / (bits + 1);
        let bitmap_blocks = (rest / bits) as u32;
        crate::ensure!(
            bitmap_blocks > 0,
            FsParsingError::Invalid("sspos: volume too small for a bitmap block")
        );

        let data_start = bitmap_start + bitmap_blocks;
        let covered = bitmap_blocks as u64 * bits;
        let data_blocks = covered.min((block_count - data_start) as u64) as u32;
        crate::ensure!(
            data_blocks > 0,
            FsParsingError::Invalid("sspos: volume has no data block")
        );

        Ok(Self {
            block_size,
            block_count,
            alloc_count: 1,
            superblock_block,
            bitmap_start,
            bitmap_blocks,
            data_start,
            data_blocks,
        })
    }

    /// Layout of a mounted volume.
    pub fn from_superblock(sb: &SsposSuperblock) -> FsParsingResult<Self> {
        sb.validate()?;
        let block_size = sb
            .block_size()
            .ok_or(FsParsingError::Invalid("sspos: block size exponent out of range"))?;
        let mut meta = Self::new(block_size, sb.block_count())?;
        meta.alloc_count = sb.alloc_count();
        Ok(meta)
    }

    /// Exponent such that `block_size == 2 << (8 + exp)`.
    pub fn block_size_exp(&self) -> u8 {
        (self.block_size.trailing_zeros() - 9) as u8
    }

    /// Bytes of a block available after the next-block pointer.
    #[inline]
    pub fn payload_size(&self) -> usize {
        self.block_size as usize - SSPOS_LINK_SIZE
    }

    #[inline]
    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }

    /// Byte offset of the first payload byte of `block`.
    #[inline]
    pub fn payload_offset(&self, block: u32) -> u64 {
        self.block_offset(block) + SSPOS_LINK_SIZE as u64
    }

    #[inline]
    pub fn bitmap_offset(&self) -> u64 {
        self.block_offset(self.bitmap_start)
    }

    #[inline]
    pub fn bits_per_bitmap_block(&self) -> u32 {
        self.block_size * 8
    }

    /// Byte offset and bit of the bitmap bit tracking `block`.
    pub fn bit_location(&self, block: u32) -> Option<(u64, u8)> {
        if !self.is_valid_unit(block) {
            return None;
        }
        let k = (block - self.data_start) as u64;
        Some((self.bitmap_offset() + k / 8, (k % 8) as u8))
    }

    /// Longest name an entry can carry on this volume.
    pub fn max_name_len(&self) -> usize {
        SSPOS_MAX_NAME_LEN.min(self.payload_size() - SSPOS_ENTRY_SIZE)
    }
}

impl FsMeta<u32> for SsposMeta {
    fn unit_size(&self) -> usize {
        self.block_size as usize
    }

    fn unit_offset(&self, unit: u32) -> u64 {
        self.block_offset(unit)
    }

    fn root_unit(&self) -> u32 {
        self.data_start
    }

    fn first_data_unit(&self) -> u32 {
        self.data_start
    }

    fn last_data_unit(&self) -> u32 {
        self.data_start + self.data_blocks - 1
    }

    fn total_units(&self) -> usize {
        self.data_blocks as usize
    }

    fn size_bytes(&self) -> u64 {
        self.block_offset(self.block_count)
    }
}
