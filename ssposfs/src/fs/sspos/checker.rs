// SPDX-License-Identifier: MIT

use alloc::{string::String, vec::Vec};

use ssposio::prelude::*;

pub use crate::core::checker::*;

use crate::core::{
    errors::FsResolverResult,
    utils::{bitmap::BitmapOps, path_utils::join_paths},
};
use crate::fs::sspos::{
    constant::*,
    cursor,
    dir::{DirEntries, DirSlot},
    file::blocks_for_size,
    meta::*,
    types::SsposSuperblock,
};

#[derive(Clone, Debug)]
pub struct SsposCheckOptions {
    pub phases: VerifyPhases,
    pub fail_fast: bool,
    /// Per-block findings reported for each bitmap code before summarizing.
    pub max_reported: usize,
}

impl Default for SsposCheckOptions {
    fn default() -> Self {
        Self {
            phases: VerifyPhases::ALL,
            fail_fast: false,
            max_reported: 16,
        }
    }
}

impl VerifierOptionsLike for SsposCheckOptions {
    fn phases(&self) -> VerifyPhases {
        self.phases
    }
    fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

#[derive(Debug)]
struct DirRecord {
    path: String,
    /// `None` for the root, which has no record.
    stored: Option<u32>,
    derived: u32,
}

#[derive(Debug)]
struct FileRecord {
    path: String,
    size: u32,
    chain_len: usize,
}

/// Result of one walk of the tree from the root.
#[derive(Debug, Default)]
struct TreeScan {
    /// One bit per data block, set when some live chain holds it.
    reachable: Vec<u8>,
    dirs: Vec<DirRecord>,
    files: Vec<FileRecord>,
    tombstones: usize,
}

pub struct SsposChecker<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a SsposMeta,
    scan: Option<TreeScan>,
}

impl<'a, IO: BlockIO + ?Sized> SsposChecker<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a SsposMeta) -> Self {
        Self {
            io,
            meta,
            scan: None,
        }
    }

    /// Marks the blocks of a chain as reachable.
    ///
    /// Returns `None` when the chain cannot be followed or its head is
    /// already owned by another chain; the caller must not descend into it.
    fn mark_chain(
        &mut self,
        scan: &mut TreeScan,
        path: &str,
        head: u32,
        rep: &mut VerifyReport,
    ) -> Option<usize> {
        let chain = match cursor::collect_chain(&mut *self.io, self.meta, head) {
            Ok(chain) => chain,
            Err(e) => {
                rep.push(Finding::err("TREE.CHAIN", format!("{path}: {e}")));
                return None;
            }
        };

        let mut head_shared = false;
        for (i, &block) in chain.iter().enumerate() {
            let bit = (block - self.meta.data_start) as usize;
            if scan.reachable.get_bit(bit) {
                rep.push(Finding::err(
                    "TREE.CROSSLINK",
                    format!("{path}: block {block} is already part of another chain"),
                ));
                head_shared |= i == 0;
            } else {
                scan.reachable.set_bit(bit, true);
            }
        }
        (!head_shared).then_some(chain.len())
    }

    fn walk(&mut self, rep: &mut VerifyReport) -> TreeScan {
        let mut scan = TreeScan {
            reachable: vec![0u8; (self.meta.data_blocks as usize).div_ceil(8)],
            ..TreeScan::default()
        };
        let mut stack: Vec<(String, u32, Option<u32>)> =
            vec![(String::from("/"), self.meta.root_unit(), None)];

        while let Some((path, head, stored)) = stack.pop() {
            if self.mark_chain(&mut scan, &path, head, rep).is_none() {
                continue;
            }

            let slots: Vec<FsResolverResult<DirSlot>> =
                DirEntries::new(self.meta, &mut *self.io, head)
                    .with_tombstones()
                    .collect();
            let mut derived = 0u32;
            for slot in slots {
                let slot = match slot {
                    Ok(slot) => slot,
                    Err(e) => {
                        rep.push(Finding::err("TREE.ENTRY", format!("{path}: {e}")));
                        break;
                    }
                };
                let entry = slot.entry;
                if entry.is_tombstone() {
                    scan.tombstones += 1;
                    continue;
                }
                derived += entry.encoded_len() as u32;
                let child = join_paths(&path, &entry.name);
                if entry.is_dir() {
                    stack.push((child, entry.block, Some(entry.size)));
                } else if let Some(chain_len) = self.mark_chain(&mut scan, &child, entry.block, rep)
                {
                    scan.files.push(FileRecord {
                        path: child,
                        size: entry.size,
                        chain_len,
                    });
                }
            }
            scan.dirs.push(DirRecord {
                path,
                stored,
                derived,
            });
        }
        scan
    }

    fn take_scan(&mut self, rep: &mut VerifyReport) -> TreeScan {
        match self.scan.take() {
            Some(scan) => scan,
            None => self.walk(rep),
        }
    }
}

/* ========================= FsChecker impl ========================= */

impl<IO: BlockIO + ?Sized> FsChecker for SsposChecker<'_, IO> {
    type Options = SsposCheckOptions;

    fn check_superblock(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let sb: SsposSuperblock = self.io.read_struct(SSPOS_SUPERBLOCK_ADDR)?;
        if let Err(e) = sb.validate() {
            rep.push(Finding::err("SB.INVALID", format!("Superblock: {e}")));
            return Ok(());
        }
        if sb.block_size() != Some(self.meta.block_size) || sb.block_count() != self.meta.block_count
        {
            rep.push(Finding::err(
                "SB.GEOMETRY",
                format!(
                    "Superblock geometry ({:?} x {}) differs from the mounted layout ({} x {})",
                    sb.block_size(),
                    sb.block_count(),
                    self.meta.block_size,
                    self.meta.block_count
                ),
            ));
        } else {
            rep.push(Finding::info("SB.OK", "Superblock signature and version OK"));
        }
        Ok(())
    }

    fn check_geometry(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let on_disk = self.meta.block_count - self.meta.data_start;
        if on_disk > self.meta.data_blocks {
            rep.push(Finding::warn(
                "GEOM.UNCOVERED",
                format!(
                    "{} blocks past the bitmap coverage can never be allocated",
                    on_disk - self.meta.data_blocks
                ),
            ));
        }
        rep.push(Finding::info(
            "GEOM.LAYOUT",
            format!(
                "bitmap={}+{} data={}+{} block_size={}",
                self.meta.bitmap_start,
                self.meta.bitmap_blocks,
                self.meta.data_start,
                self.meta.data_blocks,
                self.meta.block_size
            ),
        ));
        Ok(())
    }

    fn check_tree(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let scan = self.walk(rep);
        rep.push(Finding::info(
            "TREE.WALK",
            format!(
                "Walked {} dirs, {} files, {} tombstones",
                scan.dirs.len(),
                scan.files.len(),
                scan.tombstones
            ),
        ));
        self.scan = Some(scan);
        Ok(())
    }

    fn check_bitmap(&mut self, opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let scan = self.take_scan(rep);
        let mut bitmap = vec![0u8; scan.reachable.len()];
        self.io.read_at(self.meta.bitmap_offset(), &mut bitmap)?;

        let (mut leaks, mut missing) = (0usize, 0usize);
        for bit in 0..self.meta.data_blocks as usize {
            let block = self.meta.data_start + bit as u32;
            match (bitmap.get_bit(bit), scan.reachable.get_bit(bit)) {
                (true, false) => {
                    leaks += 1;
                    if leaks <= opt.max_reported {
                        rep.push(Finding::err(
                            "BITMAP.LEAK",
                            format!("Block {block} is allocated but unreachable"),
                        ));
                    }
                }
                (false, true) => {
                    missing += 1;
                    if missing <= opt.max_reported {
                        rep.push(Finding::err(
                            "BITMAP.MISSING",
                            format!("Block {block} is in use but marked free"),
                        ));
                    }
                }
                _ => {}
            }
        }
        if leaks > opt.max_reported || missing > opt.max_reported {
            rep.push(Finding::warn(
                "BITMAP.TOTAL",
                format!("{leaks} leaked and {missing} unmarked blocks in total"),
            ));
        }
        if leaks == 0 && missing == 0 {
            rep.push(Finding::info("BITMAP.OK", "Bitmap matches reachable blocks"));
        }

        self.scan = Some(scan);
        Ok(())
    }

    fn check_sizes(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let scan = self.take_scan(rep);
        let payload = self.meta.payload_size() as u64;

        for d in &scan.dirs {
            if let Some(stored) = d.stored
                && stored != d.derived
            {
                rep.push(Finding::err(
                    "SIZE.DIR",
                    format!("{}: size {stored} but live entries need {}", d.path, d.derived),
                ));
            }
        }
        for f in &scan.files {
            let capacity = f.chain_len as u64 * payload;
            if f.size as u64 > capacity {
                rep.push(Finding::err(
                    "SIZE.FILE",
                    format!("{}: size {} exceeds its {} block chain", f.path, f.size, f.chain_len),
                ));
            } else if f.chain_len as u64 > blocks_for_size(self.meta, f.size as u64) {
                rep.push(Finding::warn(
                    "SIZE.SLACK",
                    format!("{}: {} blocks hold only {} bytes", f.path, f.chain_len, f.size),
                ));
            }
        }

        self.scan = Some(scan);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::*;
    use crate::fs::sspos::{
        allocator::SsposAllocator, filesystem::SsposFs, formatter::SsposFormatter,
    };

    fn meta() -> SsposMeta {
        SsposMeta::new(512, 8195).unwrap()
    }

    fn volume() -> Vec<u8> {
        let meta = meta();
        let mut buf = vec![0u8; meta.size_bytes() as usize];
        SsposFormatter::new(&mut MemBlockIO::new(&mut buf), &meta)
            .format(false)
            .unwrap();
        buf
    }

    fn populate(buf: &mut [u8]) {
        let mut fs = SsposFs::mount(MemBlockIO::new(buf)).unwrap();
        fs.mkdir("/d", 0o755).unwrap();
        fs.create("/d/f", 0o644).unwrap();
        fs.write("/d/f", &[7u8; 1200], 0).unwrap();
        fs.create("/a", 0o644).unwrap();
        fs.create("/b", 0o644).unwrap();
        fs.unlink("/b").unwrap();
    }

    fn check(buf: &mut [u8]) -> VerifyReport {
        let meta = meta();
        let mut io = MemBlockIO::new(buf);
        SsposChecker::new(&mut io, &meta).check_all().unwrap()
    }

    #[test]
    fn test_fresh_and_populated_volumes_are_clean() {
        let mut buf = volume();
        let rep = check(&mut buf);
        assert!(!rep.has_error(), "{rep}");
        assert!(rep.has_code("BITMAP.OK"));

        populate(&mut buf);
        let rep = check(&mut buf);
        assert!(!rep.has_error(), "{rep}");
        assert!(rep.has_code("SB.OK"));
    }

    #[test]
    fn test_leaked_block_is_reported() {
        let mut buf = volume();
        populate(&mut buf);
        let meta = meta();
        SsposAllocator::new(&meta)
            .allocate(&mut MemBlockIO::new(&mut buf), meta.data_start + 100)
            .unwrap();

        let rep = check(&mut buf);
        assert!(rep.has_code("BITMAP.LEAK"));
        assert!(!rep.has_code("BITMAP.MISSING"));
    }

    #[test]
    fn test_stale_directory_size_is_reported() {
        let mut buf = volume();
        populate(&mut buf);
        let offset = {
            let mut fs = SsposFs::mount(MemBlockIO::new(&mut buf)).unwrap();
            fs.resolve("/d").unwrap().offset.unwrap()
        };
        MemBlockIO::new(&mut buf)
            .write_u32_at(offset + SSPOS_ENTRY_SIZE_OFFSET, 99)
            .unwrap();

        let rep = check(&mut buf);
        assert!(rep.has_code("SIZE.DIR"));
        assert!(rep.first_error().is_some());
    }

    #[test]
    fn test_cross_linked_files_are_reported() {
        let mut buf = volume();
        let (a, b_offset) = {
            let mut fs = SsposFs::mount(MemBlockIO::new(&mut buf)).unwrap();
            fs.create("/a", 0o644).unwrap();
            fs.create("/b", 0o644).unwrap();
            let a = fs.resolve("/a").unwrap().head();
            (a, fs.resolve("/b").unwrap().offset.unwrap())
        };
        MemBlockIO::new(&mut buf)
            .write_u32_at(b_offset + SSPOS_ENTRY_BLOCK_OFFSET, a)
            .unwrap();

        let rep = check(&mut buf);
        assert!(rep.has_code("TREE.CROSSLINK"));
        // The old block of /b is now orphaned.
        assert!(rep.has_code("BITMAP.LEAK"));
    }

    #[test]
    fn test_bad_signature_fails_fast() {
        let mut buf = volume();
        buf[SSPOS_SUPERBLOCK_ADDR as usize] = b'X';
        let meta = meta();
        let mut io = MemBlockIO::new(&mut buf);
        let opt = SsposCheckOptions {
            fail_fast: true,
            ..Default::default()
        };
        let rep = SsposChecker::new(&mut io, &meta).check_with(&opt).unwrap();
        assert!(rep.has_code("SB.INVALID"));
        assert!(!rep.has_code("TREE.WALK"));
    }

    #[test]
    fn test_oversized_file_is_reported() {
        let mut buf = volume();
        let offset = {
            let mut fs = SsposFs::mount(MemBlockIO::new(&mut buf)).unwrap();
            fs.create("/f", 0o644).unwrap();
            fs.resolve("/f").unwrap().offset.unwrap()
        };
        MemBlockIO::new(&mut buf)
            .write_u32_at(offset + SSPOS_ENTRY_SIZE_OFFSET, 509)
            .unwrap();

        let rep = check(&mut buf);
        assert!(rep.has_code("SIZE.FILE"));
    }
}
