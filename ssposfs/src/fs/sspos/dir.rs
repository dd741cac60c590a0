// SPDX-License-Identifier: MIT

//! Directory payload codec.
//!
//! A directory is a chain whose payload holds entries packed back to back.
//! Inside a block, a zero name length (or too little room for a header)
//! ends the live region; the walk then continues with the next block.

use alloc::vec::Vec;

use ssposio::prelude::*;
use tracing::debug;

use crate::core::errors::{FsOpsResult, FsParsingError, FsResolverError, FsResolverResult};
use crate::fs::sspos::{
    allocator::SsposAllocator,
    constant::*,
    cursor::{self, ChainCursor},
    meta::*,
    types::{RawEntryHeader, SsposEntry},
};

/// A decoded entry and the byte offset of its record on the image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirSlot {
    pub entry: SsposEntry,
    pub offset: u64,
}

/// Position right after the last live entry of a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEnd {
    pub block: u32,
    /// Offset inside `block`, link prefix included.
    pub pos: usize,
}

/// Forward scan over the entries of a directory chain.
///
/// Tombstones are stepped over and not yielded unless
/// [`DirEntries::with_tombstones`] is used.
pub struct DirEntries<'a, 'io, IO: BlockIO + ?Sized> {
    meta: &'a SsposMeta,
    io: &'io mut IO,
    chain: ChainCursor<'a>,
    block: Option<u32>,
    pos: usize,
    tombstones: bool,
    done: bool,
}

impl<'a, 'io, IO: BlockIO + ?Sized> DirEntries<'a, 'io, IO> {
    pub fn new(meta: &'a SsposMeta, io: &'io mut IO, head: u32) -> Self {
        Self {
            meta,
            io,
            chain: ChainCursor::new(meta, head),
            block: None,
            pos: SSPOS_LINK_SIZE,
            tombstones: false,
            done: false,
        }
    }

    pub fn with_tombstones(mut self) -> Self {
        self.tombstones = true;
        self
    }

    fn fail(&mut self, err: FsResolverError) -> Option<FsResolverResult<DirSlot>> {
        self.done = true;
        Some(Err(err))
    }
}

impl<IO: BlockIO + ?Sized> Iterator for DirEntries<'_, '_, IO> {
    type Item = FsResolverResult<DirSlot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let block_size = self.meta.block_size as usize;

        loop {
            let block = match self.block {
                Some(b) => b,
                None => match self.chain.next_with(&mut *self.io)? {
                    Ok(link) => {
                        self.block = Some(link.block);
                        self.pos = SSPOS_LINK_SIZE;
                        link.block
                    }
                    Err(e) => return self.fail(e.into()),
                },
            };

            if self.pos + SSPOS_ENTRY_SIZE > block_size {
                self.block = None;
                continue;
            }

            let offset = self.meta.block_offset(block) + self.pos as u64;
            let header: RawEntryHeader = match self.io.read_struct(offset) {
                Ok(h) => h,
                Err(e) => return self.fail(e.into()),
            };
            if header.is_terminator() {
                self.block = None;
                continue;
            }

            let name_len = header.name_len as usize;
            if self.pos + SSPOS_ENTRY_SIZE + name_len > block_size {
                return self.fail(FsParsingError::Corrupted.into());
            }
            let mut name = vec![0u8; name_len];
            if let Err(e) = self
                .io
                .read_at(offset + SSPOS_ENTRY_SIZE as u64, &mut name)
            {
                return self.fail(e.into());
            }
            self.pos += SSPOS_ENTRY_SIZE + name_len;

            let entry = match SsposEntry::from_raw(&header, &name) {
                Ok(entry) => entry,
                Err(e) => return self.fail(e.into()),
            };
            if entry.is_tombstone() && !self.tombstones {
                continue;
            }
            return Some(Ok(DirSlot { entry, offset }));
        }
    }
}

/// First live entry named `name`.
pub fn find<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
    name: &str,
) -> FsResolverResult<Option<DirSlot>> {
    for slot in DirEntries::new(meta, io, head) {
        let slot = slot?;
        if slot.entry.name == name {
            return Ok(Some(slot));
        }
    }
    Ok(None)
}

/// Live entries of a directory, in on-disk order.
pub fn list<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
) -> FsResolverResult<Vec<SsposEntry>> {
    DirEntries::new(meta, io, head)
        .map(|slot| slot.map(|s| s.entry))
        .collect()
}

/// Size a directory entry must record: `ENTRY_SIZE + name_len` per live child.
pub fn derived_size<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
) -> FsResolverResult<u32> {
    let mut size = 0u32;
    for slot in DirEntries::new(meta, io, head) {
        size += slot?.entry.encoded_len() as u32;
    }
    Ok(size)
}

pub fn is_empty<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
) -> FsResolverResult<bool> {
    match DirEntries::new(meta, io, head).next() {
        None => Ok(true),
        Some(slot) => slot.map(|_| false),
    }
}

/// Locates the append position: last block of the chain, first terminator slot.
pub fn end_of_entries<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
) -> FsResolverResult<DirEnd> {
    let block = cursor::tail(io, meta, head)?;
    let block_size = meta.block_size as usize;
    let base = meta.block_offset(block);

    let mut pos = SSPOS_LINK_SIZE;
    while pos + SSPOS_ENTRY_SIZE <= block_size {
        let name_len = io.read_u8_at(base + pos as u64 + SSPOS_ENTRY_NAME_LEN_OFFSET)? as usize;
        if name_len == 0 {
            break;
        }
        if pos + SSPOS_ENTRY_SIZE + name_len > block_size {
            return Err(FsParsingError::Corrupted.into());
        }
        pos += SSPOS_ENTRY_SIZE + name_len;
    }
    Ok(DirEnd { block, pos })
}

/// Makes room for a record of `len` bytes at the end of the directory chain.
///
/// When the last block lacks room, a zeroed block is allocated and linked at
/// the tail. Returns the byte offset of the free slot.
pub fn reserve_slot<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    alloc: &SsposAllocator<'_>,
    head: u32,
    len: usize,
) -> FsOpsResult<u64> {
    let end = end_of_entries(io, meta, head)?;
    if meta.block_size as usize - end.pos >= len {
        return Ok(meta.block_offset(end.block) + end.pos as u64);
    }

    let new = alloc.allocate_next(io)?;
    io.zero_fill(meta.block_offset(new), meta.block_size as usize)?;
    cursor::append_block(io, meta, end.block, new)?;
    debug!(dir = head, block = new, "sspos: extended directory chain");
    Ok(meta.block_offset(new) + SSPOS_LINK_SIZE as u64)
}

/// Writes `entry` at the end of the directory chain starting at `head`.
///
/// Extends the chain through [`reserve_slot`] when needed. Returns the byte
/// offset of the new record. The owning directory's size field is left to
/// the caller.
pub fn append_entry<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    alloc: &SsposAllocator<'_>,
    head: u32,
    entry: &SsposEntry,
) -> FsOpsResult<u64> {
    let raw = entry.to_raw_buffer()?;
    let offset = reserve_slot(io, meta, alloc, head, raw.len())?;
    io.write_at(offset, &raw)?;
    debug!(dir = head, name = %entry.name, offset, "sspos: appended entry");
    Ok(offset)
}
