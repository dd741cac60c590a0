// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[macro_use]
extern crate alloc;

// Core Modules
pub mod core;
pub mod fs;

// Reusable types and traits
pub use core::traits::*;

// Utilities
pub use core::utils::path_utils::*;

/// sspos FS implementation.
///
/// See [`sspos::SsposFs`] for the mounted engine, [`sspos::SsposFormatter`]
/// and [`sspos::SsposChecker`].
pub mod sspos {
    pub use super::fs::sspos::prelude::*;
}
