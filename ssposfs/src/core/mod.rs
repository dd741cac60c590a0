// SPDX-License-Identifier: MIT

// === Sub-modules ===
pub mod checker;
pub mod errors;
pub mod formatter;
pub mod host;
pub mod macros;
pub mod meta;
pub mod resolver;
pub mod utils;

// === Core Traits ===
pub mod traits {
    pub use super::checker::FsChecker;
    pub use super::formatter::FsFormatter;
    pub use super::host::{FsOperations, VolumeStats};
    pub use super::meta::FsMeta;
    pub use super::resolver::{FsNode, FsResolver, attr::FileAttributes};
}

// === Error types ===
pub use errors::*;

// === Utilities ===
pub use utils::{bitmap::BitmapOps, path_utils::*, time_utils::*};
