// SPDX-License-Identifier: MIT

//! FUSE adapter: kernel requests arrive through `fuser`, are translated from
//! inode numbers to paths, and are forwarded to [`FsOperations`].

use std::ffi::OsStr;
use std::os::raw::c_int;
use std::path::Path;
use std::time::{Duration, SystemTime};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyStatfs, ReplyWrite, ReplyXattr, Request,
    TimeOrNow,
};
use ssposfs::join_paths;
use ssposfs::sspos::*;
use time::OffsetDateTime;
use tracing::{info, trace, warn};

use crate::inode::{InodeTable, ROOT_INO};

/// Attributes change under every write, so the kernel keeps them briefly.
const ATTR_TTL: Duration = Duration::from_secs(1);

// ── Errors ──────────────────────────────────────────────────────────────────

/// POSIX code returned to the kernel for an operation failure.
pub fn to_errno(error: &FsOpsError) -> c_int {
    match error {
        FsOpsError::NotFound | FsOpsError::Resolver(FsResolverError::NotFound) => libc::ENOENT,
        FsOpsError::NotADirectory | FsOpsError::Resolver(FsResolverError::NotADirectory) => {
            libc::ENOTDIR
        }
        FsOpsError::AlreadyExists => libc::EEXIST,
        FsOpsError::IsADirectory => libc::EISDIR,
        FsOpsError::NotEmpty => libc::ENOTEMPTY,
        FsOpsError::NameTooLong => libc::ENAMETOOLONG,
        FsOpsError::InvalidName => libc::EINVAL,
        FsOpsError::FileTooLarge => libc::EFBIG,
        FsOpsError::Unsupported => libc::ENOSYS,
        FsOpsError::Allocator(FsAllocatorError::OutOfSpace) => libc::ENOSPC,
        FsOpsError::IO(_)
        | FsOpsError::Allocator(_)
        | FsOpsError::Cursor(_)
        | FsOpsError::Parsing(_)
        | FsOpsError::Resolver(_)
        | FsOpsError::Other(_) => libc::EIO,
    }
}

/// Failed operation, with what the log line needs.
struct FuseErrorContext<'a> {
    error: &'a FsOpsError,
    operation: &'static str,
    path: &'a str,
    offset: Option<u64>,
}

impl FuseErrorContext<'_> {
    fn log_and_errno(&self) -> c_int {
        let errno = to_errno(self.error);
        // Lookups of missing names are routine.
        if errno == libc::ENOENT {
            trace!(
                op = self.operation,
                path = self.path,
                errno,
                error = %self.error,
                "FUSE op returned ENOENT"
            );
        } else {
            warn!(
                op = self.operation,
                path = self.path,
                offset = self.offset,
                errno,
                error = %self.error,
                "FUSE op failed"
            );
        }
        errno
    }
}

fn check<T>(
    result: FsOpsResult<T>,
    operation: &'static str,
    path: &str,
    offset: Option<u64>,
) -> Result<T, c_int> {
    result.map_err(|error| {
        FuseErrorContext {
            error: &error,
            operation,
            path,
            offset,
        }
        .log_and_errno()
    })
}

// ── Type conversions ────────────────────────────────────────────────────────

fn to_file_attr(ino: u64, attr: &FileAttributes, blksize: u32, uid: u32, gid: u32) -> FileAttr {
    let modified = SystemTime::from(attr.modified);
    FileAttr {
        ino,
        size: attr.size,
        blocks: attr.size.div_ceil(512),
        atime: modified,
        mtime: modified,
        ctime: modified,
        crtime: modified,
        kind: if attr.dir {
            FileType::Directory
        } else {
            FileType::RegularFile
        },
        perm: (attr.mode & 0o7777) as u16,
        nlink: if attr.dir { 2 } else { 1 },
        uid,
        gid,
        rdev: 0,
        blksize,
        flags: 0,
    }
}

fn to_offset_date_time(t: TimeOrNow) -> OffsetDateTime {
    match t {
        TimeOrNow::SpecificTime(st) => OffsetDateTime::from(st),
        TimeOrNow::Now => OffsetDateTime::now_utc(),
    }
}

/// One line of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirItem {
    pub ino: u64,
    /// Offset of the next item, as the kernel passes it back.
    pub offset: i64,
    pub kind: FileType,
    pub name: String,
}

/// Attribute changes requested through `setattr`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetAttr {
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
    pub atime: Option<OffsetDateTime>,
    pub mtime: Option<OffsetDateTime>,
}

/// Requester identity stamped on reported attributes.
#[derive(Debug, Clone, Copy)]
pub struct Owner {
    pub uid: u32,
    pub gid: u32,
}

impl From<&Request<'_>> for Owner {
    fn from(req: &Request<'_>) -> Self {
        Self {
            uid: req.uid(),
            gid: req.gid(),
        }
    }
}

// ── Adapter ─────────────────────────────────────────────────────────────────

/// A mounted sspos volume served to the kernel.
pub struct SsposFuse<IO: BlockIO> {
    fs: SsposFs<IO>,
    inodes: InodeTable,
}

impl<IO: BlockIO> SsposFuse<IO> {
    pub fn new(fs: SsposFs<IO>) -> Self {
        Self {
            fs,
            inodes: InodeTable::default(),
        }
    }

    fn path(&self, ino: u64) -> Result<String, c_int> {
        self.inodes.path(ino).map(str::to_owned).ok_or(libc::ENOENT)
    }

    fn child(&self, parent: u64, name: &OsStr) -> Result<String, c_int> {
        let name = name.to_str().ok_or(libc::EINVAL)?;
        self.inodes.child_path(parent, name).ok_or(libc::ENOENT)
    }

    fn attr_of(&mut self, path: &str, op: &'static str, owner: Owner) -> Result<FileAttr, c_int> {
        let attr = check(self.fs.getattr(path), op, path, None)?;
        let ino = self.inodes.get_or_insert(path);
        Ok(to_file_attr(ino, &attr, self.fs.meta().block_size, owner.uid, owner.gid))
    }

    pub fn do_getattr(&mut self, ino: u64, owner: Owner) -> Result<FileAttr, c_int> {
        let path = self.path(ino)?;
        self.attr_of(&path, "getattr", owner)
    }

    pub fn do_lookup(&mut self, parent: u64, name: &OsStr, owner: Owner) -> Result<FileAttr, c_int> {
        let path = self.child(parent, name)?;
        self.attr_of(&path, "lookup", owner)
    }

    pub fn do_readdir(&mut self, ino: u64, offset: i64) -> Result<Vec<DirItem>, c_int> {
        let path = self.path(ino)?;
        let names = check(self.fs.readdir(&path), "readdir", &path, None)?;
        let skip = usize::try_from(offset).unwrap_or(0);

        let mut items = Vec::new();
        for (i, name) in names.into_iter().enumerate().skip(skip) {
            let (ino, kind) = match name.as_str() {
                "." => (ino, FileType::Directory),
                ".." => (self.inodes.parent_ino(&path), FileType::Directory),
                _ => {
                    let child = join_paths(&path, &name);
                    let attr = check(self.fs.getattr(&child), "readdir", &child, None)?;
                    let kind = if attr.dir {
                        FileType::Directory
                    } else {
                        FileType::RegularFile
                    };
                    (self.inodes.get_or_insert(&child), kind)
                }
            };
            items.push(DirItem {
                ino,
                offset: (i + 1) as i64,
                kind,
                name,
            });
        }
        Ok(items)
    }

    pub fn do_read(&mut self, ino: u64, offset: i64, size: u32) -> Result<Vec<u8>, c_int> {
        let path = self.path(ino)?;
        let offset = u64::try_from(offset).unwrap_or(0);
        check(
            self.fs.read(&path, size as usize, offset),
            "read",
            &path,
            Some(offset),
        )
    }

    pub fn do_write(&mut self, ino: u64, offset: i64, data: &[u8]) -> Result<u32, c_int> {
        let path = self.path(ino)?;
        let offset = u64::try_from(offset).unwrap_or(0);
        let written = check(self.fs.write(&path, data, offset), "write", &path, Some(offset))?;
        Ok(u32::try_from(written).unwrap_or(u32::MAX))
    }

    pub fn do_create(
        &mut self,
        parent: u64,
        name: &OsStr,
        mode: u32,
        owner: Owner,
    ) -> Result<FileAttr, c_int> {
        let path = self.child(parent, name)?;
        check(self.fs.create(&path, mode), "create", &path, None)?;
        self.attr_of(&path, "create", owner)
    }

    pub fn do_mkdir(
        &mut self,
        parent: u64,
        name: &OsStr,
        mode: u32,
        owner: Owner,
    ) -> Result<FileAttr, c_int> {
        let path = self.child(parent, name)?;
        check(self.fs.mkdir(&path, mode), "mkdir", &path, None)?;
        self.attr_of(&path, "mkdir", owner)
    }

    pub fn do_unlink(&mut self, parent: u64, name: &OsStr) -> Result<(), c_int> {
        let path = self.child(parent, name)?;
        check(self.fs.unlink(&path), "unlink", &path, None)?;
        self.inodes.forget(&path);
        Ok(())
    }

    pub fn do_rmdir(&mut self, parent: u64, name: &OsStr) -> Result<(), c_int> {
        let path = self.child(parent, name)?;
        check(self.fs.rmdir(&path), "rmdir", &path, None)?;
        self.inodes.forget(&path);
        Ok(())
    }

    pub fn do_rename(
        &mut self,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
    ) -> Result<(), c_int> {
        let from = self.child(parent, name)?;
        let to = self.child(newparent, newname)?;
        check(self.fs.rename(&from, &to), "rename", &from, None)
    }

    pub fn do_symlink(
        &mut self,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        owner: Owner,
    ) -> Result<FileAttr, c_int> {
        let link = self.child(parent, link_name)?;
        let target = target.to_string_lossy();
        check(self.fs.symlink(&target, &link), "symlink", &link, None)?;
        self.attr_of(&link, "symlink", owner)
    }

    pub fn do_readlink(&mut self, ino: u64) -> Result<Vec<u8>, c_int> {
        let path = self.path(ino)?;
        let target = check(self.fs.readlink(&path), "readlink", &path, None)?;
        Ok(target.into_bytes())
    }

    /// Applies each requested change in turn; the volume rejects all of them.
    pub fn do_setattr(&mut self, ino: u64, req: SetAttr, owner: Owner) -> Result<FileAttr, c_int> {
        let path = self.path(ino)?;
        if let Some(mode) = req.mode {
            check(self.fs.chmod(&path, mode), "chmod", &path, None)?;
        }
        if req.uid.is_some() || req.gid.is_some() {
            check(self.fs.chown(&path, req.uid, req.gid), "chown", &path, None)?;
        }
        if let Some(size) = req.size {
            check(self.fs.truncate(&path, size), "truncate", &path, Some(size))?;
        }
        if req.atime.is_some() || req.mtime.is_some() {
            check(
                self.fs.utimens(&path, req.atime, req.mtime),
                "utimens",
                &path,
                None,
            )?;
        }
        self.attr_of(&path, "setattr", owner)
    }

    pub fn do_getxattr(&mut self, ino: u64, name: &OsStr) -> Result<Vec<u8>, c_int> {
        let path = self.path(ino)?;
        let name = name.to_str().ok_or(libc::EINVAL)?;
        check(self.fs.getxattr(&path, name), "getxattr", &path, None)
    }

    pub fn do_listxattr(&mut self, ino: u64) -> Result<Vec<u8>, c_int> {
        let path = self.path(ino)?;
        let names = check(self.fs.listxattr(&path), "listxattr", &path, None)?;
        let mut out = Vec::new();
        for name in names {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
        Ok(out)
    }

    pub fn do_setxattr(&mut self, ino: u64, name: &OsStr, value: &[u8]) -> Result<(), c_int> {
        let path = self.path(ino)?;
        let name = name.to_str().ok_or(libc::EINVAL)?;
        check(self.fs.setxattr(&path, name, value), "setxattr", &path, None)
    }

    pub fn do_removexattr(&mut self, ino: u64, name: &OsStr) -> Result<(), c_int> {
        let path = self.path(ino)?;
        let name = name.to_str().ok_or(libc::EINVAL)?;
        check(self.fs.removexattr(&path, name), "removexattr", &path, None)
    }

    pub fn do_statfs(&mut self) -> Result<VolumeStats, c_int> {
        check(self.fs.statfs(), "statfs", "/", None)
    }
}

fn reply_xattr(payload: Vec<u8>, size: u32, reply: ReplyXattr) {
    let len = u32::try_from(payload.len()).unwrap_or(u32::MAX);
    if size == 0 {
        reply.size(len);
    } else if len > size {
        reply.error(libc::ERANGE);
    } else {
        reply.data(&payload);
    }
}

impl<IO: BlockIO> Filesystem for SsposFuse<IO> {
    fn destroy(&mut self) {
        match self.fs.io_mut().flush() {
            Ok(()) => info!("sspos: flushed image on unmount"),
            Err(e) => warn!(error = %e, "sspos: flush on unmount failed"),
        }
    }

    fn getattr(&mut self, req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.do_getattr(ino, req.into()) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(errno) => reply.error(errno),
        }
    }

    fn lookup(&mut self, req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.do_lookup(parent, name, req.into()) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        match self.do_read(ino, offset, size) {
            Ok(data) => reply.data(&data),
            Err(errno) => reply.error(errno),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        match self.do_readdir(ino, offset) {
            Ok(items) => {
                for item in &items {
                    if reply.add(item.ino, item.offset, item.kind, &item.name) {
                        break;
                    }
                }
                reply.ok();
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        match self.do_write(ino, offset, data) {
            Ok(written) => reply.written(written),
            Err(errno) => reply.error(errno),
        }
    }

    fn create(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        match self.do_create(parent, name, mode, req.into()) {
            Ok(attr) => reply.created(&ATTR_TTL, &attr, 0, 0, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn mkdir(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        match self.do_mkdir(parent, name, mode, req.into()) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn unlink(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.do_unlink(parent, name) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn rmdir(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.do_rmdir(parent, name) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        parent: u64,
        name: &OsStr,
        newparent: u64,
        newname: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        match self.do_rename(parent, name, newparent, newname) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn symlink(
        &mut self,
        req: &Request<'_>,
        parent: u64,
        link_name: &OsStr,
        target: &Path,
        reply: ReplyEntry,
    ) {
        match self.do_symlink(parent, link_name, target, req.into()) {
            Ok(attr) => reply.entry(&ATTR_TTL, &attr, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn readlink(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyData) {
        match self.do_readlink(ino) {
            Ok(target) => reply.data(&target),
            Err(errno) => reply.error(errno),
        }
    }

    fn setattr(
        &mut self,
        req: &Request<'_>,
        ino: u64,
        mode: Option<u32>,
        uid: Option<u32>,
        gid: Option<u32>,
        size: Option<u64>,
        atime: Option<TimeOrNow>,
        mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let changes = SetAttr {
            mode,
            uid,
            gid,
            size,
            atime: atime.map(to_offset_date_time),
            mtime: mtime.map(to_offset_date_time),
        };
        match self.do_setattr(ino, changes, req.into()) {
            Ok(attr) => reply.attr(&ATTR_TTL, &attr),
            Err(errno) => reply.error(errno),
        }
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        size: u32,
        reply: ReplyXattr,
    ) {
        match self.do_getxattr(ino, name) {
            Ok(value) => reply_xattr(value, size, reply),
            Err(errno) => reply.error(errno),
        }
    }

    fn listxattr(&mut self, _req: &Request<'_>, ino: u64, size: u32, reply: ReplyXattr) {
        match self.do_listxattr(ino) {
            Ok(names) => reply_xattr(names, size, reply),
            Err(errno) => reply.error(errno),
        }
    }

    fn setxattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        name: &OsStr,
        value: &[u8],
        _flags: i32,
        _position: u32,
        reply: ReplyEmpty,
    ) {
        match self.do_setxattr(ino, name, value) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn removexattr(&mut self, _req: &Request<'_>, ino: u64, name: &OsStr, reply: ReplyEmpty) {
        match self.do_removexattr(ino, name) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        match self.do_statfs() {
            Ok(stats) => reply.statfs(
                stats.total_blocks as u64,
                stats.free_blocks as u64,
                stats.free_blocks as u64,
                // Every entry owns at least one block.
                stats.total_blocks as u64,
                stats.free_blocks as u64,
                stats.block_size,
                stats.max_name_len,
                stats.block_size,
            ),
            Err(errno) => reply.error(errno),
        }
    }
}

// ── Mount entrypoint ────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MountOptions {
    pub allow_other: bool,
    pub auto_unmount: bool,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            allow_other: true,
            auto_unmount: false,
        }
    }
}

pub fn build_mount_options(options: &MountOptions) -> Vec<MountOption> {
    let mut opts = vec![
        MountOption::FSName("sspos".to_owned()),
        MountOption::Subtype("sspos".to_owned()),
        MountOption::RW,
        MountOption::NoAtime,
    ];
    if options.allow_other {
        opts.push(MountOption::AllowOther);
    }
    if options.auto_unmount {
        opts.push(MountOption::AutoUnmount);
    }
    opts
}

/// Serves `fs` at `mountpoint` in the foreground until it is unmounted.
pub fn mount<IO: BlockIO>(
    fs: SsposFs<IO>,
    mountpoint: &Path,
    options: &MountOptions,
) -> std::io::Result<()> {
    let fuse_opts = build_mount_options(options);
    info!(mountpoint = %mountpoint.display(), allow_other = options.allow_other, "sspos: serving volume");
    fuser::mount2(SsposFuse::new(fs), mountpoint, &fuse_opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: Owner = Owner { uid: 1000, gid: 100 };

    fn image() -> Vec<u8> {
        let meta = SsposMeta::new(512, 8195).unwrap();
        let mut buf = vec![0u8; meta.size_bytes() as usize];
        SsposFormatter::new(&mut MemBlockIO::new(&mut buf), &meta)
            .format(false)
            .unwrap();
        buf
    }

    fn adapter(buf: &mut [u8]) -> SsposFuse<MemBlockIO<'_>> {
        SsposFuse::new(SsposFs::mount(MemBlockIO::new(buf)).unwrap())
    }

    #[test]
    fn test_errno_mapping() {
        assert_eq!(to_errno(&FsOpsError::NotFound), libc::ENOENT);
        assert_eq!(
            to_errno(&FsOpsError::Resolver(FsResolverError::NotFound)),
            libc::ENOENT
        );
        assert_eq!(
            to_errno(&FsOpsError::Allocator(FsAllocatorError::OutOfSpace)),
            libc::ENOSPC
        );
        assert_eq!(to_errno(&FsOpsError::Unsupported), libc::ENOSYS);
        assert_eq!(to_errno(&FsOpsError::AlreadyExists), libc::EEXIST);
        assert_eq!(to_errno(&FsOpsError::NotEmpty), libc::ENOTEMPTY);
        assert_eq!(to_errno(&FsOpsError::Other("boom")), libc::EIO);
    }

    #[test]
    fn test_create_write_read_through_inodes() {
        let mut buf = image();
        let mut fuse = adapter(&mut buf);

        let attr = fuse
            .do_create(ROOT_INO, OsStr::new("a"), 0o100644, OWNER)
            .unwrap();
        assert_eq!(attr.kind, FileType::RegularFile);
        assert_eq!(attr.perm, 0o644);
        assert_eq!((attr.uid, attr.gid), (1000, 100));
        assert_eq!(attr.blksize, 512);

        assert_eq!(fuse.do_write(attr.ino, 0, &[9u8; 600]).unwrap(), 600);
        assert_eq!(fuse.do_read(attr.ino, 500, 4096).unwrap(), vec![9u8; 100]);

        let again = fuse.do_lookup(ROOT_INO, OsStr::new("a"), OWNER).unwrap();
        assert_eq!(again.ino, attr.ino);
        assert_eq!(again.size, 600);
        assert_eq!(again.blocks, 2);
    }

    #[test]
    fn test_readdir_reports_dot_entries_and_offsets() {
        let mut buf = image();
        let mut fuse = adapter(&mut buf);

        let dir = fuse.do_mkdir(ROOT_INO, OsStr::new("d"), 0o755, OWNER).unwrap();
        assert_eq!(dir.kind, FileType::Directory);
        fuse.do_create(dir.ino, OsStr::new("f"), 0o644, OWNER).unwrap();

        let items = fuse.do_readdir(dir.ino, 0).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec![".", "..", "f"]);
        assert_eq!(items[0].ino, dir.ino);
        assert_eq!(items[1].ino, ROOT_INO);
        assert_eq!(items[2].kind, FileType::RegularFile);
        assert_eq!(items[2].offset, 3);

        let rest = fuse.do_readdir(dir.ino, 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].name, "f");
    }

    #[test]
    fn test_unlink_forgets_inode() {
        let mut buf = image();
        let mut fuse = adapter(&mut buf);

        let attr = fuse.do_create(ROOT_INO, OsStr::new("a"), 0o644, OWNER).unwrap();
        fuse.do_unlink(ROOT_INO, OsStr::new("a")).unwrap();
        assert_eq!(fuse.do_getattr(attr.ino, OWNER).err(), Some(libc::ENOENT));
        assert_eq!(fuse.do_lookup(ROOT_INO, OsStr::new("a"), OWNER).err(), Some(libc::ENOENT));
        assert_eq!(fuse.do_rmdir(ROOT_INO, OsStr::new("a")).err(), Some(libc::ENOENT));
    }

    #[test]
    fn test_unsupported_requests() {
        let mut buf = image();
        let mut fuse = adapter(&mut buf);
        let attr = fuse.do_create(ROOT_INO, OsStr::new("a"), 0o644, OWNER).unwrap();

        assert_eq!(fuse.do_rename(ROOT_INO, OsStr::new("a"), ROOT_INO, OsStr::new("b")).err(), Some(libc::ENOSYS));
        assert_eq!(fuse.do_symlink(ROOT_INO, OsStr::new("l"), Path::new("/a"), OWNER).err(), Some(libc::ENOSYS));
        assert_eq!(fuse.do_readlink(attr.ino).err(), Some(libc::ENOSYS));
        assert_eq!(fuse.do_listxattr(attr.ino).err(), Some(libc::ENOSYS));
        assert_eq!(fuse.do_setxattr(attr.ino, OsStr::new("user.k"), b"v").err(), Some(libc::ENOSYS));

        let chmod = SetAttr {
            mode: Some(0o600),
            ..SetAttr::default()
        };
        assert_eq!(fuse.do_setattr(attr.ino, chmod, OWNER).err(), Some(libc::ENOSYS));
        let truncate = SetAttr {
            size: Some(0),
            ..SetAttr::default()
        };
        assert_eq!(fuse.do_setattr(attr.ino, truncate, OWNER).err(), Some(libc::ENOSYS));
        assert!(fuse.do_setattr(attr.ino, SetAttr::default(), OWNER).is_ok());
    }

    #[test]
    fn test_statfs_and_mount_options() {
        let mut buf = image();
        let mut fuse = adapter(&mut buf);
        let stats = fuse.do_statfs().unwrap();
        assert_eq!(stats.block_size, 512);
        assert_eq!(stats.used_blocks(), 1);

        let opts = build_mount_options(&MountOptions::default());
        assert!(opts.contains(&MountOption::AllowOther));
        assert!(!opts.contains(&MountOption::AutoUnmount));
    }
}
