// SPDX-License-Identifier: MIT

use alloc::vec::Vec;

use ssposio::prelude::*;

pub use crate::core::errors::{FsCursorError, FsCursorResult};
use crate::fs::sspos::{constant::*, meta::*};

/// One step of a chain walk: a block and the pointer stored in its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub block: u32,
    pub next: u32,
}

impl ChainLink {
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next == SSPOS_END_OF_CHAIN
    }
}

/// Reads the next-block pointer of `block`.
pub fn read_next<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    block: u32,
) -> FsCursorResult<u32> {
    if !meta.is_valid_unit(block) {
        return Err(FsCursorError::InvalidBlock(block));
    }
    Ok(io.read_u32_at(meta.block_offset(block))?)
}

/// Links `new` after `tail` by rewriting the pointer of `tail` in place.
pub fn append_block<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    tail: u32,
    new: u32,
) -> FsCursorResult {
    if !meta.is_valid_unit(tail) {
        return Err(FsCursorError::InvalidBlock(tail));
    }
    if new != SSPOS_END_OF_CHAIN && !meta.is_valid_unit(new) {
        return Err(FsCursorError::InvalidBlock(new));
    }
    io.write_u32_at(meta.block_offset(tail), new)?;
    Ok(())
}

/// Walks a chain from its head, one block per step.
///
/// Each step re-reads the pointer from the image. A head of `0` is an empty
/// chain. The walk fails on a pointer outside the data region and on a
/// chain longer than the data region (a loop).
#[derive(Debug, Clone)]
pub struct ChainCursor<'a> {
    meta: &'a SsposMeta,
    current: Option<u32>,
    seen: usize,
}

impl<'a> ChainCursor<'a> {
    pub fn new(meta: &'a SsposMeta, head: u32) -> Self {
        Self {
            meta,
            current: (head != SSPOS_END_OF_CHAIN).then_some(head),
            seen: 0,
        }
    }

    /// One iteration step.
    pub fn next_with<IO>(&mut self, io: &mut IO) -> Option<FsCursorResult<ChainLink>>
    where
        IO: BlockIO + ?Sized,
    {
        let block = self.current.take()?;
        self.seen += 1;
        if self.seen > self.meta.total_units() {
            return Some(Err(FsCursorError::LoopDetected));
        }

        let next = match read_next(io, self.meta, block) {
            Ok(n) => n,
            Err(e) => return Some(Err(e)),
        };
        if next != SSPOS_END_OF_CHAIN {
            if !self.meta.is_valid_unit(next) {
                return Some(Err(FsCursorError::InvalidBlock(next)));
            }
            self.current = Some(next);
        }
        Some(Ok(ChainLink { block, next }))
    }

    /// Borrows `io` for a plain [`Iterator`].
    pub fn iter<'io, IO: BlockIO + ?Sized>(self, io: &'io mut IO) -> ChainWalk<'a, 'io, IO> {
        ChainWalk { cursor: self, io }
    }
}

/// [`ChainCursor`] bound to an IO backend.
pub struct ChainWalk<'a, 'io, IO: BlockIO + ?Sized> {
    cursor: ChainCursor<'a>,
    io: &'io mut IO,
}

impl<IO: BlockIO + ?Sized> Iterator for ChainWalk<'_, '_, IO> {
    type Item = FsCursorResult<ChainLink>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_with(&mut *self.io)
    }
}

/// Every block of the chain starting at `head`, in order.
pub fn collect_chain<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &SsposMeta,
    head: u32,
) -> FsCursorResult<Vec<u32>> {
    ChainCursor::new(meta, head)
        .iter(io)
        .map(|link| link.map(|l| l.block))
        .collect()
}

/// Last block of a non-empty chain.
pub fn tail<IO: BlockIO + ?Sized>(io: &mut IO, meta: &SsposMeta, head: u32) -> FsCursorResult<u32> {
    for link in ChainCursor::new(meta, head).iter(io) {
        let link = link?;
        if link.is_last() {
            return Ok(link.block);
        }
    }
    Err(FsCursorError::InvalidBlock(head))
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
    fn test_walk_linked_chain() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);

        append_block(&mut io, &meta, 4100, 4105).unwrap();
        append_block(&mut io, &meta, 4105, 4102).unwrap();
        // On-disk pointer is the absolute block index, big-endian.
        assert_eq!(io.read_u32_at(4100 * 512).unwrap(), 4105);

        let links: Vec<ChainLink> = ChainCursor::new(&meta, 4100)
            .iter(&mut io)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(
            links,
            vec![
                ChainLink { block: 4100, next: 4105 },
                ChainLink { block: 4105, next: 4102 },
                ChainLink { block: 4102, next: 0 },
            ]
        );
        assert!(links[2].is_last());
        assert_eq!(collect_chain(&mut io, &meta, 4100).unwrap(), vec![4100, 4105, 4102]);
        assert_eq!(tail(&mut io, &meta, 4100).unwrap(), 4102);
    }

    #[test]
    fn test_empty_chain() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);
        assert!(collect_chain(&mut io, &meta, 0).unwrap().is_empty());
        assert!(tail(&mut io, &meta, 0).is_err());
    }

    #[test]
    fn test_loop_detected() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);

        append_block(&mut io, &meta, 4100, 4101).unwrap();
        append_block(&mut io, &meta, 4101, 4100).unwrap();
        assert_eq!(
            collect_chain(&mut io, &meta, 4100),
            Err(FsCursorError::LoopDetected)
        );
    }

    #[test]
    fn test_pointer_outside_data_region() {
        let (meta, mut buf) = setup();
        let mut io = MemBlockIO::new(&mut buf);

        io.write_u32_at(meta.block_offset(4100), 12).unwrap();
        assert_eq!(
            collect_chain(&mut io, &meta, 4100),
            Err(FsCursorError::InvalidBlock(12))
        );
        assert_eq!(
            append_block(&mut io, &meta, 4100, 9000),
            Err(FsCursorError::InvalidBlock(9000))
        );
        assert_eq!(
            collect_chain(&mut io, &meta, 5),
            Err(FsCursorError::InvalidBlock(5))
        );
    }
}
