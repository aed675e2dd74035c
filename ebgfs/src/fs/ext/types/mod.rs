// SPDX-License-Identifier: MIT

mod flags;
mod group_desc;
mod superblock;

pub use flags::BgFlags;
pub use group_desc::ExtGroupDesc;
pub use superblock::ExtSuperblock;
