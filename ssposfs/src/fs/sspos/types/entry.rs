// SPDX-License-Identifier: MIT

use alloc::{string::String, vec::Vec};

use zerocopy::byteorder::big_endian::{U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::core::errors::{FsParsingError, FsParsingResult};
use crate::fs::sspos::constant::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

impl EntryKind {
    /// `0` is a directory, any other value a file.
    pub fn from_raw(raw: u8) -> Self {
        if raw == SSPOS_KIND_DIR {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }

    pub fn to_raw(self) -> u8 {
        match self {
            EntryKind::Dir => SSPOS_KIND_DIR,
            EntryKind::File => SSPOS_KIND_FILE,
        }
    }

    /// Kind requested by a host `mode`.
    pub fn from_mode(mode: u32) -> Self {
        if mode & S_IFMT == S_IFDIR {
            EntryKind::Dir
        } else {
            EntryKind::File
        }
    }
}

/// Fixed 18-byte prefix of a directory entry. The name follows it.
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct RawEntryHeader {
    pub kind: u8,
    pub block: U32,
    pub size: U32,
    pub mtime: U64,
    pub name_len: u8,
}

const _: () = assert!(core::mem::size_of::<RawEntryHeader>() == SSPOS_ENTRY_SIZE);

impl RawEntryHeader {
    /// A zero name length ends the live entries of a block.
    #[inline]
    pub fn is_terminator(&self) -> bool {
        self.name_len == 0
    }
}

/// Decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsposEntry {
    pub kind: EntryKind,
    /// Head of the entry's own chain, [`SSPOS_TOMBSTONE`] once deleted.
    pub block: u32,
    pub size: u32,
    /// Seconds since epoch.
    pub mtime: u64,
    pub name: String,
}

impl SsposEntry {
    pub fn new(kind: EntryKind, block: u32, name: &str, mtime: u64) -> Self {
        Self {
            kind,
            block,
            size: 0,
            mtime,
            name: String::from(name),
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    #[inline]
    pub fn is_tombstone(&self) -> bool {
        self.block == SSPOS_TOMBSTONE
    }

    /// Bytes taken by this entry inside a directory payload.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        SSPOS_ENTRY_SIZE + self.name.len()
    }

    pub fn header(&self) -> RawEntryHeader {
        RawEntryHeader {
            kind: self.kind.to_raw(),
            block: U32::new(self.block),
            size: U32::new(self.size),
            mtime: U64::new(self.mtime),
            name_len: self.name.len() as u8,
        }
    }

    /// Serializes header and name.
    pub fn to_raw_buffer(&self) -> FsParsingResult<Vec<u8>> {
        validate_name(&self.name)?;
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.extend_from_slice(self.header().as_bytes());
        buf.extend_from_slice(self.name.as_bytes());
        Ok(buf)
    }

    pub fn from_raw(header: &RawEntryHeader, name: &[u8]) -> FsParsingResult<Self> {
        if name.len() != header.name_len as usize {
            return Err(FsParsingError::Corrupted);
        }
        let name = core::str::from_utf8(name)
            .map_err(|_| FsParsingError::Invalid("sspos: entry name is not UTF-8"))?;
        Ok(Self {
            kind: EntryKind::from_raw(header.kind),
            block: header.block.get(),
            size: header.size.get(),
            mtime: header.mtime.get(),
            name: String::from(name),
        })
    }
}

/// Checks that `name` can be stored as a single entry name.
pub fn validate_name(name: &str) -> FsParsingResult {
    if name.is_empty() || name == "." || name == ".." {
        return Err(FsParsingError::Invalid("sspos: reserved or empty name"));
    }
    if name.len() > SSPOS_MAX_NAME_LEN {
        return Err(FsParsingError::Invalid("sspos: name too long"));
    }
    if name.contains(['/', '\0']) {
        return Err(FsParsingError::Invalid("sspos: name contains a separator"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_wire_layout() {
        let mut entry = SsposEntry::new(EntryKind::File, 4100, "a.txt", 0x0102_0304_0506_0708);
        entry.size = 600;
        let raw = entry.to_raw_buffer().unwrap();

        assert_eq!(raw.len(), 18 + 5);
        assert_eq!(raw[0], 1);
        assert_eq!(&raw[1..5], &4100u32.to_be_bytes());
        assert_eq!(&raw[5..9], &600u32.to_be_bytes());
        assert_eq!(&raw[9..17], &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(raw[17], 5);
        assert_eq!(&raw[18..], b"a.txt");

        let header = RawEntryHeader::read_from_bytes(&raw[..18]).unwrap();
        assert_eq!(SsposEntry::from_raw(&header, &raw[18..]).unwrap(), entry);
    }

    #[test]
    fn test_kind_decoding() {
        assert_eq!(EntryKind::from_raw(0), EntryKind::Dir);
        assert_eq!(EntryKind::from_raw(1), EntryKind::File);
        assert_eq!(EntryKind::from_raw(7), EntryKind::File);
        assert_eq!(EntryKind::from_mode(S_IFDIR | 0o755), EntryKind::Dir);
        assert_eq!(EntryKind::from_mode(S_IFREG | 0o644), EntryKind::File);
        assert_eq!(EntryKind::from_mode(0o644), EntryKind::File);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("f").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name(&"x".repeat(255)).is_ok());
        assert!(validate_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_from_raw_rejects_invalid_utf8() {
        let header = SsposEntry::new(EntryKind::File, 4100, "ab", 0).header();
        assert!(SsposEntry::from_raw(&header, &[0xFF, 0xFE]).is_err());
        assert_eq!(
            SsposEntry::from_raw(&header, b"abc"),
            Err(FsParsingError::Corrupted)
        );
    }
}
