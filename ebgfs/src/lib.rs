#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
#[macro_use]
extern crate alloc;

// Core Modules
pub mod core;
#[cfg(any(feature = "std", feature = "alloc"))]
pub mod fs;

// Reusable types and traits
pub use crate::core::errors::*;
pub use crate::core::utils::bitmap::*;

// Utilities
#[cfg(feature = "std")]
pub use crate::core::utils::mount_utils::{MountState, ensure_not_mounted_rw, mount_state};
pub use crate::core::utils::time_utils::unix_now;

#[cfg(any(feature = "std", feature = "alloc"))]
/// Ext-family block group bitmap engine.
///
/// See [`ext::ExtFs`] for the filesystem handle, [`ext::ExtChecker`] for
/// consistency checking and [`ext::UninitOptions`] for the group uninit
/// transition.
pub mod ext {
    pub use super::fs::ext::prelude::*;
}
