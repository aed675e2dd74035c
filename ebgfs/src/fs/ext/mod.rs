// SPDX-License-Identifier: MIT
pub mod bitmap;
pub mod bitmap_io;
pub mod checker;
pub mod checksum;
pub mod constant;
pub mod filesystem;
pub mod gdt;
pub mod meta;
pub mod types;
pub mod uninit;
pub mod utils;

// Public Interface
pub mod traits {
    pub use super::bitmap::{BitmapStore, KindLayout};
    pub use super::checker::{ExtCheckOptions, ExtChecker};
    pub use super::filesystem::{ExtFs, FsFlags, ImageLayout};
    pub use super::gdt::GroupDescTable;
    pub use super::meta::ExtMeta;
    pub use super::uninit::{GroupOutcome, Ineligibility, UninitOptions, UninitReport};
}

pub mod prelude {
    pub use super::filesystem::ExtFs;
    pub use super::traits::*;
    pub use super::types::{BgFlags, ExtGroupDesc, ExtSuperblock};
    pub use crate::core::checker::*;
    pub use crate::core::errors::*;
    pub use crate::core::utils::bitmap::*;
    pub use ebgio::prelude::*;
}
