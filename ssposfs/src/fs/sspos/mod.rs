// SPDX-License-Identifier: MIT

pub mod allocator;
pub mod checker;
pub mod constant;
pub mod cursor;
pub mod dir;
pub mod file;
pub mod filesystem;
pub mod formatter;
pub mod meta;
pub mod ops;
pub mod resolver;
pub mod types;

// === Public Interface ===
pub mod traits {
    pub use super::allocator::SsposAllocator;
    pub use super::checker::{
        Finding, Severity, SsposCheckOptions, SsposChecker, VerifyPhases, VerifyReport,
    };
    pub use super::formatter::SsposFormatter;
    pub use super::meta::SsposMeta;
    pub use super::resolver::{SsposNode, SsposResolver};
}

pub mod prelude {
    pub use super::constant::SSPOS_DEFAULT_BLOCK_SIZE;
    pub use super::filesystem::SsposFs;
    pub use super::traits::*;
    pub use super::types::{EntryKind, SsposEntry, SsposSuperblock};
    pub use crate::core::errors::*;
    pub use crate::core::traits::*;
    pub use ssposio::prelude::*;
}
