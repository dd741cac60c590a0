// SPDX-License-Identifier: MIT

//! Time utilities for entry timestamps.
//!
//! Entries store their mtime as big-endian seconds since the UNIX epoch.
//!
//! - In `std` mode, uses the system clock.
//! - In `no_std`, returns UNIX_EPOCH as fixed timestamp.

use time::OffsetDateTime;

/// Returns the current UTC time.
pub fn now_utc() -> OffsetDateTime {
    #[cfg(feature = "std")]
    {
        OffsetDateTime::now_utc()
    }

    #[cfg(not(feature = "std"))]
    {
        OffsetDateTime::UNIX_EPOCH
    }
}

/// Seconds since epoch, as stored on disk. Pre-epoch instants clamp to 0.
pub fn to_unix_secs(t: OffsetDateTime) -> u64 {
    u64::try_from(t.unix_timestamp()).unwrap_or(0)
}

/// Inverse of [`to_unix_secs`]. Values past the supported calendar range clamp to the epoch.
pub fn from_unix_secs(secs: u64) -> OffsetDateTime {
    i64::try_from(secs)
        .ok()
        .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

/// Current time in on-disk representation.
pub fn now_unix_secs() -> u64 {
    to_unix_secs(now_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unix_secs_conversion() {
        let t = from_unix_secs(1_700_000_000);
        assert_eq!(to_unix_secs(t), 1_700_000_000);
        assert_eq!(from_unix_secs(u64::MAX), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(to_unix_secs(OffsetDateTime::UNIX_EPOCH - time::Duration::hours(1)), 0);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_now_is_after_epoch() {
        assert!(now_unix_secs() > 0);
    }
}
