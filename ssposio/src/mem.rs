// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOError, BlockIOResult, BlockIOSetLen};

/// In-memory implementation of `BlockIO`.
///
/// Useful for tests and throwaway volumes built in RAM.
#[derive(Debug)]
pub struct MemBlockIO<'a> {
    buffer: &'a mut [u8],
    logical_len: usize,
}

impl<'a> MemBlockIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let logical_len = buffer.len();
        Self {
            buffer,
            logical_len,
        }
    }

    #[inline]
    fn check_bounds(&self, offset: u64, len: usize) -> BlockIOResult<usize> {
        let end = offset
            .checked_add(len as u64)
            .ok_or(BlockIOError::OutOfBounds)?;
        if end > self.logical_len as u64 {
            return Err(BlockIOError::OutOfBounds);
        }
        Ok(offset as usize)
    }
}

impl<'a> BlockIO for MemBlockIO<'a> {
    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        let start = self.check_bounds(offset, data.len())?;
        self.buffer[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        let start = self.check_bounds(offset, buf.len())?;
        buf.copy_from_slice(&self.buffer[start..start + buf.len()]);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        Ok(())
    }
}

impl<'a> BlockIOSetLen for MemBlockIO<'a> {
    fn set_len(&mut self, new_len: u64) -> BlockIOResult {
        if new_len > self.buffer.len() as u64 {
            return Err(BlockIOError::OutOfBounds);
        }
        self.logical_len = new_len as usize;
        Ok(())
    }
}
