// SPDX-License-Identifier: MIT

use std::io::{Error, Read, Seek, SeekFrom, Write};

use crate::{BlockIO, BlockIOError, BlockIOResult, BlockIOSetLen};

/// `BlockIO` over any seekable byte stream (image file, block device, cursor).
///
/// Every call seeks explicitly to its absolute offset; the stream position
/// left behind by a previous call is never relied upon.
#[derive(Debug)]
pub struct StdBlockIO<T: Read + Write + Seek> {
    io: T,
}

impl<T: Read + Write + Seek> StdBlockIO<T> {
    #[inline]
    pub fn new(io: T) -> Self {
        Self { io }
    }
}

impl<T: Read + Write + Seek> BlockIO for StdBlockIO<T> {
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.write_all(data)?;
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        self.io.seek(SeekFrom::Start(offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> BlockIOResult {
        self.io.flush()?;
        Ok(())
    }
}

impl BlockIOSetLen for StdBlockIO<std::fs::File> {
    fn set_len(&mut self, len: u64) -> BlockIOResult {
        self.io.set_len(len)?;
        self.flush()
    }
}

impl BlockIOSetLen for StdBlockIO<&mut std::fs::File> {
    fn set_len(&mut self, len: u64) -> BlockIOResult {
        self.io.set_len(len)?;
        self.flush()
    }
}

impl From<Error> for BlockIOError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        BlockIOError::Io(e.kind())
    }
}
