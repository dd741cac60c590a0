// SPDX-License-Identifier: MIT

use zerocopy::byteorder::big_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::core::errors::{FsParsingError, FsParsingResult};
use crate::fs::sspos::{constant::*, meta::SsposMeta};

/// On-disk superblock, stored at [`SSPOS_SUPERBLOCK_ADDR`].
#[derive(IntoBytes, FromBytes, KnownLayout, Immutable, Copy, Clone, Debug)]
#[repr(C)]
pub struct SsposSuperblock {
    pub signature: [u8; 8],
    pub version: u8,
    /// Block size is `2 << (8 + exp)`.
    pub block_size_exp: u8,
    pub block_count: U32,
    pub alloc_count: U32,
}

const _: () = assert!(core::mem::size_of::<SsposSuperblock>() == SSPOS_SUPERBLOCK_SIZE);

impl SsposSuperblock {
    pub fn from_meta(meta: &SsposMeta) -> Self {
        Self {
            signature: *SSPOS_SIGNATURE,
            version: SSPOS_VERSION,
            block_size_exp: meta.block_size_exp(),
            block_count: U32::new(meta.block_count),
            alloc_count: U32::new(meta.alloc_count),
        }
    }

    /// Decoded block size, `None` when the exponent is out of range.
    pub fn block_size(&self) -> Option<u32> {
        (self.block_size_exp <= SSPOS_MAX_BLOCK_SIZE_EXP).then(|| 2u32 << (8 + self.block_size_exp))
    }

    pub fn block_count(&self) -> u32 {
        self.block_count.get()
    }

    pub fn alloc_count(&self) -> u32 {
        self.alloc_count.get()
    }

    /// Signature, version and block size checks performed at mount.
    pub fn validate(&self) -> FsParsingResult {
        if &self.signature != SSPOS_SIGNATURE {
            return Err(FsParsingError::Invalid("sspos: bad superblock signature"));
        }
        if self.version != SSPOS_VERSION {
            return Err(FsParsingError::Unsupported);
        }
        if self.block_size().is_none() {
            return Err(FsParsingError::Invalid("sspos: block size exponent out of range"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_superblock_layout_is_big_endian() {
        let meta = SsposMeta::new(512, 8195).unwrap();
        let sb = SsposSuperblock::from_meta(&meta);
        let bytes = sb.as_bytes();

        assert_eq!(&bytes[0..8], b"sspos FS");
        assert_eq!(bytes[8], 1);
        assert_eq!(bytes[9], 0);
        assert_eq!(&bytes[10..14], &8195u32.to_be_bytes());
        assert_eq!(&bytes[14..18], &meta.alloc_count.to_be_bytes());
    }

    #[test]
    fn test_block_size_exponent() {
        let mut sb = SsposSuperblock::from_meta(&SsposMeta::new(512, 8195).unwrap());
        assert_eq!(sb.block_size(), Some(512));
        sb.block_size_exp = 1;
        assert_eq!(sb.block_size(), Some(1024));
        sb.block_size_exp = 200;
        assert_eq!(sb.block_size(), None);
        assert!(sb.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_signature_and_version() {
        let good = SsposSuperblock::from_meta(&SsposMeta::new(512, 8195).unwrap());
        assert!(good.validate().is_ok());

        let mut bad = good;
        bad.signature = *b"sspos fs";
        assert!(matches!(bad.validate(), Err(FsParsingError::Invalid(_))));

        let mut bad = good;
        bad.version = 2;
        assert_eq!(bad.validate(), Err(FsParsingError::Unsupported));
    }
}
