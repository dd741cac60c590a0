// SPDX-License-Identifier: MIT

//! File content over block chains.
//!
//! Byte `i` of a file lives in block `i / P` of its chain, at payload
//! offset `i % P`, where `P = block_size - 4`.

use alloc::vec::Vec;

use ssposio::prelude::*;
use tracing::debug;

use crate::core::errors::{FsCursorError, FsCursorResult, FsOpsResult};
use crate::fs::sspos::{
    allocator::SsposAllocator,
    cursor::{self, ChainCursor},
    meta::*,
    types::SsposEntry,
};

/// Reads up to `len` bytes at `offset`, clipped to the recorded size.
///
/// Empty when `offset` is at or past the end of the file. Fails if the chain
/// is shorter than the recorded size.
pub fn read_range<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    entry: &SsposEntry,
    offset: u64,
    len: usize,
) -> FsCursorResult<Vec<u8>> {
    let end = (entry.size as u64).min(offset.saturating_add(len as u64));
    if offset >= end {
        return Ok(Vec::new());
    }

    let payload = meta.payload_size() as u64;
    let mut out = vec![0u8; (end - offset) as usize];
    let mut chain = ChainCursor::new(meta, entry.block);
    let mut start = 0u64;

    while start < end {
        let link = match chain.next_with(io) {
            Some(link) => link?,
            None => return Err(FsCursorError::Other("sspos: chain shorter than file size")),
        };
        let stop = start + payload;
        let from = start.max(offset);
        let to = stop.min(end);
        if from < to {
            let dst = (from - offset) as usize..(to - offset) as usize;
            io.read_at(meta.payload_offset(link.block) + (from - start), &mut out[dst])?;
        }
        start = stop;
    }
    Ok(out)
}

/// Writes `data` at `offset` into the chain starting at `head`.
///
/// Bytes between `old_size` and `offset` read back as zeros. The chain is
/// extended one zeroed block at a time, linked at its current tail, until it
/// covers `offset + data.len()`.
pub fn write_range<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    alloc: &SsposAllocator<'_>,
    head: u32,
    old_size: u64,
    offset: u64,
    data: &[u8],
) -> FsOpsResult {
    if data.is_empty() {
        return Ok(());
    }
    let payload = meta.payload_size() as u64;
    let end = offset + data.len() as u64;
    let last_index = (end - 1) / payload;

    let mut block = head;
    let mut index = 0u64;
    loop {
        let start = index * payload;
        let stop = start + payload;
        let base = meta.payload_offset(block);

        // Stale bytes of an existing block inside the gap.
        let gap_from = start.max(old_size);
        let gap_to = stop.min(offset);
        if gap_from < gap_to {
            io.zero_fill(base + (gap_from - start), (gap_to - gap_from) as usize)?;
        }

        let from = start.max(offset);
        let to = stop.min(end);
        if from < to {
            let src = &data[(from - offset) as usize..(to - offset) as usize];
            io.write_at(base + (from - start), src)?;
        }

        if index == last_index {
            return Ok(());
        }

        let mut next = cursor::read_next(io, meta, block)?;
        if next == 0 {
            next = alloc.allocate_next(io)?;
            io.zero_fill(meta.block_offset(next), meta.block_size as usize)?;
            cursor::append_block(io, meta, block, next)?;
            debug!(tail = block, block = next, "sspos: extended file chain");
        }
        block = next;
        index += 1;
    }
}

/// Number of chain blocks needed to hold `size` bytes (a file always owns one).
pub fn blocks_for_size(meta: &SsposMeta, size: u64) -> u64 {
    size.div_ceil(meta.payload_size() as u64).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::sspos::types::EntryKind;

    const HEAD: u32 = 4100;

    fn setup() -> (SsposMeta, Vec<u8>) {
        let meta = SsposMeta::new(512, 8195).unwrap();
        let buf = vec![0u8; meta.size_bytes() as usize];
        (meta, buf)
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn entry(size: usize) -> SsposEntry {
        let mut e = SsposEntry::new(EntryKind::File, HEAD, "f", 0);
        e.size = size as u32;
        e
    }

    #[test]
    fn test_write_spans_blocks_and_reads_back() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);
        let alloc = SsposAllocator::new(&meta);
        alloc.allocate(&mut io, 4099).unwrap();
        alloc.allocate(&mut io, HEAD).unwrap();

        let data = pattern(1017);
        write_range(&mut io, &meta, &alloc, HEAD, 0, 0, &data).unwrap();

        let chain = cursor::collect_chain(&mut io, &meta, HEAD).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.len() as u64, blocks_for_size(&meta, 1017));

        let e = entry(1017);
        assert_eq!(read_range(&mut io, &meta, &e, 0, 1017).unwrap(), data);
        assert_eq!(read_range(&mut io, &meta, &e, 500, 100).unwrap(), &data[500..600]);
        assert_eq!(read_range(&mut io, &meta, &e, 1000, 100).unwrap(), &data[1000..]);
        assert!(read_range(&mut io, &meta, &e, 1017, 10).unwrap().is_empty());
    }

    #[test]
    fn test_overwrite_in_the_middle() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);
        let alloc = SsposAllocator::new(&meta);
        alloc.allocate(&mut io, HEAD).unwrap();

        let mut expected = pattern(800);
        write_range(&mut io, &meta, &alloc, HEAD, 0, 0, &expected).unwrap();
        write_range(&mut io, &meta, &alloc, HEAD, 800, 500, &[0xAA; 20]).unwrap();
        expected[500..520].fill(0xAA);

        let e = entry(800);
        assert_eq!(read_range(&mut io, &meta, &e, 0, 800).unwrap(), expected);
        assert_eq!(cursor::collect_chain(&mut io, &meta, HEAD).unwrap().len(), 2);
    }

    #[test]
    fn test_sparse_write_zero_fills_gap() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);
        let alloc = SsposAllocator::new(&meta);
        alloc.allocate(&mut io, HEAD).unwrap();

        // Stale bytes left in the head block by a previous owner.
        io.write_at(meta.payload_offset(HEAD), &[0x55; 508]).unwrap();
        write_range(&mut io, &meta, &alloc, HEAD, 4, 0, b"abcd").unwrap();
        write_range(&mut io, &meta, &alloc, HEAD, 4, 1000, b"xyz").unwrap();

        let got = read_range(&mut io, &meta, &entry(1003), 0, 1003).unwrap();
        assert_eq!(&got[..4], b"abcd");
        assert!(got[4..1000].iter().all(|&b| b == 0));
        assert_eq!(&got[1000..], b"xyz");
    }

    #[test]
    fn test_short_chain_is_reported() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);
        assert!(read_range(&mut io, &meta, &entry(600), 0, 600).is_err());
    }
}
