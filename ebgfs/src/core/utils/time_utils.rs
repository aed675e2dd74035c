// SPDX-License-Identifier: MIT

//! Time utilities for filesystem timestamps.
//!
//! - In `std` mode, uses the system clock.
//! - In `no_std`, returns UNIX_EPOCH as fixed timestamp.

use time::OffsetDateTime;

/// Returns the current UTC time.
///
/// - In `std` mode, returns the actual system UTC time.
/// - In `no_std`, returns `OffsetDateTime::UNIX_EPOCH` as fallback.
pub fn now_utc() -> OffsetDateTime {
    #[cfg(feature = "std")]
    {
        OffsetDateTime::now_utc()
    }

    #[cfg(not(feature = "std"))]
    {
        // Fallback: use UNIX_EPOCH (1970-01-01T00:00:00Z).
        OffsetDateTime::UNIX_EPOCH
    }
}

/// Seconds since the epoch, clamped to the 32-bit timestamp fields
/// the superblock carries.
pub fn unix_now() -> u32 {
    now_utc().unix_timestamp().clamp(0, u32::MAX as i64) as u32
}
