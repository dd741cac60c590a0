// SPDX-License-Identifier: MIT

use core::fmt;

pub use ssposio::errors::*;

macro_rules! display_with_causes {
    ($($t:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $t {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.msg())?;
                    let mut current = self.source();
                    while let Some(src) = current {
                        write!(f, "\n  caused by: {}", src.msg())?;
                        current = src.source();
                    }
                    Ok(())
                }
            }
        )+
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsAllocatorError {
    IO(BlockIOError),
    /// Every bit of the bitmap is set.
    OutOfSpace,
    /// Block outside the data region handed to the allocator.
    InvalidBlock(u32),
    Other(&'static str),
}

impl FsAllocatorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsAllocatorError::IO(_) => "IO error",
            FsAllocatorError::OutOfSpace => "No free block left on volume",
            FsAllocatorError::InvalidBlock(_) => "Block outside of the data region",
            FsAllocatorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsAllocatorError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsParsingError {
    Unsupported,
    Corrupted,
    Invalid(&'static str),
    Other(&'static str),
}

impl FsParsingError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsParsingError::Unsupported => "Unsupported volume",
            FsParsingError::Corrupted => "Corrupted structure",
            FsParsingError::Invalid(msg) => msg,
            FsParsingError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCursorError {
    IO(BlockIOError),
    InvalidBlock(u32),
    LoopDetected,
    Other(&'static str),
}

impl FsCursorError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsCursorError::IO(_) => "IO error",
            FsCursorError::InvalidBlock(_) => "Invalid block in chain",
            FsCursorError::LoopDetected => "Loop detected in block chain",
            FsCursorError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsCursorError::IO(e) => Some(FsError::IO(*e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsResolverError {
    IO(BlockIOError),
    Cursor(FsCursorError),
    Parsing(FsParsingError),
    NotFound,
    NotADirectory,
    Invalid(&'static str),
    Other(&'static str),
}

impl FsResolverError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsResolverError::IO(_) => "IO error",
            FsResolverError::Cursor(_) => "Cursor error",
            FsResolverError::Parsing(_) => "Parsing error",
            FsResolverError::NotFound => "Path not found",
            FsResolverError::NotADirectory => "Path component is not a directory",
            FsResolverError::Invalid(msg) => msg,
            FsResolverError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsResolverError::IO(e) => Some(FsError::IO(*e)),
            FsResolverError::Cursor(e) => Some(FsError::Cursor(*e)),
            FsResolverError::Parsing(e) => Some(FsError::Parsing(*e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsFormatterError {
    IO(BlockIOError),
    Allocator(FsAllocatorError),
    Invalid(&'static str),
    Other(&'static str),
}

impl FsFormatterError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsFormatterError::IO(_) => "IO error",
            FsFormatterError::Allocator(_) => "Allocator error",
            FsFormatterError::Invalid(msg) => msg,
            FsFormatterError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsFormatterError::IO(e) => Some(FsError::IO(*e)),
            FsFormatterError::Allocator(e) => Some(FsError::Allocator(*e)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsCheckerError {
    IO(BlockIOError),
    Parsing(FsParsingError),
    Cursor(FsCursorError),
    Invalid(&'static str),
    Other(&'static str),
}

impl FsCheckerError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsCheckerError::IO(_) => "IO error",
            FsCheckerError::Parsing(_) => "Parsing error",
            FsCheckerError::Cursor(_) => "Cursor error",
            FsCheckerError::Invalid(msg) => msg,
            FsCheckerError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsCheckerError::IO(e) => Some(FsError::IO(*e)),
            FsCheckerError::Parsing(e) => Some(FsError::Parsing(*e)),
            FsCheckerError::Cursor(e) => Some(FsError::Cursor(*e)),
            _ => None,
        }
    }
}

/// Errors of the path-addressed file operations (getattr, read, write, create, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOpsError {
    IO(BlockIOError),
    Allocator(FsAllocatorError),
    Cursor(FsCursorError),
    Parsing(FsParsingError),
    Resolver(FsResolverError),
    NotFound,
    AlreadyExists,
    NotADirectory,
    IsADirectory,
    NotEmpty,
    NameTooLong,
    InvalidName,
    FileTooLarge,
    /// Operation declared unsupported by the volume format (rename, symlink, chmod, ...).
    Unsupported,
    Other(&'static str),
}

impl FsOpsError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsOpsError::IO(_) => "IO error",
            FsOpsError::Allocator(_) => "Allocator error",
            FsOpsError::Cursor(_) => "Cursor error",
            FsOpsError::Parsing(_) => "Parsing error",
            FsOpsError::Resolver(_) => "Resolver error",
            FsOpsError::NotFound => "No such file or directory",
            FsOpsError::AlreadyExists => "Entry already exists",
            FsOpsError::NotADirectory => "Not a directory",
            FsOpsError::IsADirectory => "Is a directory",
            FsOpsError::NotEmpty => "Directory not empty",
            FsOpsError::NameTooLong => "Name too long",
            FsOpsError::InvalidName => "Invalid entry name",
            FsOpsError::FileTooLarge => "File too large",
            FsOpsError::Unsupported => "Operation not supported",
            FsOpsError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsOpsError::IO(e) => Some(FsError::IO(*e)),
            FsOpsError::Allocator(e) => Some(FsError::Allocator(*e)),
            FsOpsError::Cursor(e) => Some(FsError::Cursor(*e)),
            FsOpsError::Parsing(e) => Some(FsError::Parsing(*e)),
            FsOpsError::Resolver(e) => Some(FsError::Resolver(*e)),
            _ => None,
        }
    }
}

/// Top-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IO(BlockIOError),
    Allocator(FsAllocatorError),
    Parsing(FsParsingError),
    Cursor(FsCursorError),
    Resolver(FsResolverError),
    Formatter(FsFormatterError),
    Checker(FsCheckerError),
    Ops(FsOpsError),
    Other(&'static str),
}

impl FsError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsError::IO(e) => e.msg(),
            FsError::Allocator(e) => e.msg(),
            FsError::Parsing(e) => e.msg(),
            FsError::Cursor(e) => e.msg(),
            FsError::Resolver(e) => e.msg(),
            FsError::Formatter(e) => e.msg(),
            FsError::Checker(e) => e.msg(),
            FsError::Ops(e) => e.msg(),
            FsError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsError::Allocator(e) => e.source(),
            FsError::Parsing(e) => e.source(),
            FsError::Cursor(e) => e.source(),
            FsError::Resolver(e) => e.source(),
            FsError::Formatter(e) => e.source(),
            FsError::Checker(e) => e.source(),
            FsError::Ops(e) => e.source(),
            FsError::IO(_) | FsError::Other(_) => None,
        }
    }
}

display_with_causes!(
    FsAllocatorError,
    FsParsingError,
    FsCursorError,
    FsResolverError,
    FsFormatterError,
    FsCheckerError,
    FsOpsError,
    FsError,
);

#[cfg(feature = "std")]
impl std::error::Error for FsError {}

// === type Fs*Result ===

pub type FsResult<T = ()> = Result<T, FsError>;
pub type FsAllocatorResult<T = ()> = Result<T, FsAllocatorError>;
pub type FsParsingResult<T = ()> = Result<T, FsParsingError>;
pub type FsCursorResult<T = ()> = Result<T, FsCursorError>;
pub type FsResolverResult<T = ()> = Result<T, FsResolverError>;
pub type FsFormatterResult<T = ()> = Result<T, FsFormatterError>;
pub type FsCheckerResult<T = ()> = Result<T, FsCheckerError>;
pub type FsOpsResult<T = ()> = Result<T, FsOpsError>;

crate::fs_error_wiring! {
    top => FsError {
        BlockIOError     : IO,
        FsAllocatorError : Allocator,
        FsParsingError   : Parsing,
        FsCursorError    : Cursor,
        FsResolverError  : Resolver,
        FsFormatterError : Formatter,
        FsCheckerError   : Checker,
        FsOpsError       : Ops,
    },
    str_into => [
        FsAllocatorError,
        FsParsingError,
        FsCursorError,
        FsResolverError,
        FsFormatterError,
        FsCheckerError,
        FsOpsError,
    ],
    sub => {
        BlockIOError     => [ FsAllocatorError::IO, FsCursorError::IO, FsResolverError::IO, FsFormatterError::IO, FsCheckerError::IO, FsOpsError::IO ],
        FsAllocatorError => [ FsFormatterError::Allocator, FsOpsError::Allocator ],
        FsParsingError   => [ FsResolverError::Parsing, FsCheckerError::Parsing, FsOpsError::Parsing ],
        FsCursorError    => [ FsResolverError::Cursor, FsCheckerError::Cursor, FsOpsError::Cursor ],
        FsResolverError  => [ FsOpsError::Resolver ],
    },
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_display() {
        let low = BlockIOError::OutOfBounds;
        let top: FsError = FsOpsError::Cursor(FsCursorError::IO(low)).into();

        let text = top.to_string();
        assert!(text.starts_with("Cursor error"));
        assert!(text.contains("caused by: IO error"));
        assert!(text.contains("caused by: Out of bounds"));
    }

    #[test]
    fn test_str_into_other() {
        let err: FsOpsError = "custom failure".into();
        assert_eq!(err, FsOpsError::Other("custom failure"));

        let top: FsError = "bad layout".into();
        assert_eq!(top, FsError::Other("bad layout"));
        assert_eq!(top.to_string(), "bad layout");
    }
}
