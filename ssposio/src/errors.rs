// SPDX-License-Identifier: MIT

use core::fmt;

/// Result type for BlockIO operations.
pub type BlockIOResult<T = ()> = core::result::Result<T, BlockIOError>;

/// Error type for BlockIO operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockIOError {
    Other(&'static str),
    OutOfBounds,
    Unsupported,
    /// Failure reported by the host backing store.
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl BlockIOError {
    pub fn msg(&self) -> &'static str {
        match self {
            BlockIOError::Other(msg) => msg,
            BlockIOError::OutOfBounds => "Out of bounds",
            BlockIOError::Unsupported => "Unsupported operation",
            #[cfg(feature = "std")]
            BlockIOError::Io(std::io::ErrorKind::UnexpectedEof) => "Unexpected end of image",
            #[cfg(feature = "std")]
            BlockIOError::Io(_) => "Backing store I/O error",
        }
    }
}

impl From<&'static str> for BlockIOError {
    #[inline]
    fn from(msg: &'static str) -> Self {
        BlockIOError::Other(msg)
    }
}

impl fmt::Display for BlockIOError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "std")]
            BlockIOError::Io(kind) => write!(f, "{} ({kind})", self.msg()),
            _ => write!(f, "{}", self.msg()),
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain() {
        assert_eq!(BlockIOError::OutOfBounds.to_string(), "Out of bounds");
        assert_eq!(BlockIOError::from("boom").to_string(), "boom");
    }

    #[test]
    fn test_display_io_kind() {
        let err = BlockIOError::Io(std::io::ErrorKind::UnexpectedEof);
        assert!(err.to_string().starts_with("Unexpected end of image"));
    }
}
