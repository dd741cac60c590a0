// SPDX-License-Identifier: MIT

// === Superblock ===

pub const SSPOS_SIGNATURE: &[u8; 8] = b"sspos FS";
pub const SSPOS_VERSION: u8 = 1;
/// Byte address of the superblock, independent of the block size.
pub const SSPOS_SUPERBLOCK_ADDR: u64 = 4096 * 512;
/// Superblock plus one reserved block precede the bitmap.
pub const SSPOS_SUPERBLOCK_BLOCKS: u32 = 2;
pub const SSPOS_SUPERBLOCK_SIZE: usize = 18;

// === Block geometry ===

pub const SSPOS_DEFAULT_BLOCK_SIZE: u32 = 512;
pub const SSPOS_MIN_BLOCK_SIZE: u32 = 512;
pub const SSPOS_MAX_BLOCK_SIZE_EXP: u8 = 7; // 64 KiB
/// Size of the next-block pointer prefixing every block.
pub const SSPOS_LINK_SIZE: usize = 4;
pub const SSPOS_END_OF_CHAIN: u32 = 0;

// === Directory entries ===

/// kind(1) + block(4) + size(4) + mtime(8) + name_len(1)
pub const SSPOS_ENTRY_SIZE: usize = 18;
pub const SSPOS_ENTRY_KIND_OFFSET: u64 = 0;
pub const SSPOS_ENTRY_BLOCK_OFFSET: u64 = 1;
pub const SSPOS_ENTRY_SIZE_OFFSET: u64 = 5;
pub const SSPOS_ENTRY_MTIME_OFFSET: u64 = 9;
pub const SSPOS_ENTRY_NAME_LEN_OFFSET: u64 = 17;
pub const SSPOS_MAX_NAME_LEN: usize = u8::MAX as usize;

pub const SSPOS_KIND_DIR: u8 = 0;
pub const SSPOS_KIND_FILE: u8 = 1;
/// `block` value of a deleted entry.
pub const SSPOS_TOMBSTONE: u32 = 0;

// === Host mode bits ===

pub const S_IFMT: u32 = 0o170000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFREG: u32 = 0o100000;
