// SPDX-License-Identifier: MIT

pub mod sspos;
