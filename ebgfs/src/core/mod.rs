// SPDX-License-Identifier: MIT

// === Sub-modules ===
#[cfg(any(feature = "std", feature = "alloc"))]
pub mod checker;
pub mod errors;
pub mod macros;
pub mod utils;

// === Error types ===
pub use errors::*;

// === Utilities ===
pub use utils::bitmap::*;
pub use utils::time_utils::*;

// === Standard-only extensions ===
#[cfg(feature = "std")]
pub use utils::mount_utils::*;
