// SPDX-License-Identifier: MIT

pub mod bitmap;
#[cfg(feature = "std")]
pub mod mount_utils;
pub mod time_utils;
