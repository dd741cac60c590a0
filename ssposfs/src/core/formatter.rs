// SPDX-License-Identifier: MIT

pub use crate::core::errors::{FsFormatterError, FsFormatterResult};

use crate::core::meta::FsMeta;
use ssposio::{BlockIO, BlockIOExt};

/// A Formatter for a filesystem type.
///
/// Implementations encapsulate all required state (I/O backend, metadata) and
/// write an empty volume: every structure a later mount expects.
///
/// A *full format* also clears the data region; a quick format only writes
/// the metadata and the root directory.
pub trait FsFormatter {
    /// Format the filesystem.
    #[must_use = "format result must be checked for errors"]
    fn format(&mut self, full_format: bool) -> FsFormatterResult;

    /// Flush any buffered writes to disk.
    #[must_use = "flush result must be checked for errors"]
    fn flush(&mut self) -> FsFormatterResult {
        Ok(())
    }
}

/// Zeroes every allocatable unit of the data region.
pub fn zero_data_region<M: FsMeta<u32>, IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &M,
) -> FsFormatterResult {
    let first = meta.first_data_unit();
    let last = meta.last_data_unit();
    if first > last {
        return Ok(());
    }

    let start = meta.unit_offset(first);
    let end = meta.unit_offset(last) + meta.unit_size() as u64;
    let len = usize::try_from(end.saturating_sub(start))
        .map_err(|_| FsFormatterError::Invalid("data region too large for host"))?;

    io.zero_fill(start, len)?;
    Ok(())
}
