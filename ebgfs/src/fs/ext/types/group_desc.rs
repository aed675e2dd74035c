// SPDX-License-Identifier: MIT
//! On-disk block group descriptor structure

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::core::utils::bitmap::BitmapKind;
use crate::fs::ext::constant::EXT_DESC_SIZE;
use crate::fs::ext::types::flags::BgFlags;

/// Block group descriptor (classic 32-byte layout).
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
#[derive(Default)]
pub struct ExtGroupDesc {
    /// Block bitmap block
    pub bg_block_bitmap: u32,
    /// Inode bitmap block
    pub bg_inode_bitmap: u32,
    /// Inode table block
    pub bg_inode_table: u32,
    /// Free blocks count
    pub bg_free_blocks_count: u16,
    /// Free inodes count
    pub bg_free_inodes_count: u16,
    /// Used directories count
    pub bg_used_dirs_count: u16,
    /// Block group flags
    pub bg_flags: BgFlags,
    /// Exclude bitmap block
    pub bg_exclude_bitmap: u32,
    /// Block bitmap checksum
    pub bg_block_bitmap_csum: u16,
    /// Inode bitmap checksum
    pub bg_inode_bitmap_csum: u16,
    /// Unused inode count
    pub bg_itable_unused: u16,
    /// Group descriptor checksum
    pub bg_checksum: u16,
}

impl ExtGroupDesc {
    /// Create a new block group descriptor
    pub fn new(
        block_bitmap: u32,
        inode_bitmap: u32,
        inode_table: u32,
        free_blocks: u16,
        free_inodes: u16,
        used_dirs: u16,
    ) -> Self {
        Self {
            bg_block_bitmap: block_bitmap,
            bg_inode_bitmap: inode_bitmap,
            bg_inode_table: inode_table,
            bg_free_blocks_count: free_blocks,
            bg_free_inodes_count: free_inodes,
            bg_used_dirs_count: used_dirs,
            ..Default::default()
        }
    }

    /// Get free blocks count widened to the per-group arithmetic width
    pub fn free_blocks(&self) -> u32 {
        self.bg_free_blocks_count as u32
    }

    /// Get free inodes count widened to the per-group arithmetic width
    pub fn free_inodes(&self) -> u32 {
        self.bg_free_inodes_count as u32
    }

    /// Where this group's bitmap of the given kind lives (0 = none stored)
    pub fn bitmap_location(&self, kind: BitmapKind) -> u32 {
        match kind {
            BitmapKind::Block => self.bg_block_bitmap,
            BitmapKind::Inode => self.bg_inode_bitmap,
            BitmapKind::Exclude => self.bg_exclude_bitmap,
        }
    }

    pub fn set_bitmap_location(&mut self, kind: BitmapKind, block: u32) {
        match kind {
            BitmapKind::Block => self.bg_block_bitmap = block,
            BitmapKind::Inode => self.bg_inode_bitmap = block,
            BitmapKind::Exclude => self.bg_exclude_bitmap = block,
        }
    }

    /// Encode to raw bytes
    pub fn to_bytes(&self) -> [u8; EXT_DESC_SIZE] {
        // Safe: ExtGroupDesc is exactly 32 bytes by layout and static assert
        *zerocopy::IntoBytes::as_bytes(self)
            .first_chunk()
            .expect("ExtGroupDesc size mismatch")
    }
}

// Ensure the struct is exactly 32 bytes
const _: () = assert!(core::mem::size_of::<ExtGroupDesc>() == EXT_DESC_SIZE);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_layout() {
        let mut desc = ExtGroupDesc::new(10, 11, 12, 512, 128, 0);
        desc.bg_flags = BgFlags::lazy_init();
        desc.bg_checksum = 0xBEEF;

        let raw = desc.to_bytes();
        assert_eq!(&raw[0..4], &10u32.to_le_bytes());
        assert_eq!(&raw[18..20], &0x0007u16.to_le_bytes());
        assert_eq!(&raw[30..32], &0xBEEFu16.to_le_bytes());
    }

    #[test]
    fn test_bitmap_locations() {
        let mut desc = ExtGroupDesc::new(10, 11, 12, 512, 128, 0);
        desc.bg_exclude_bitmap = 13;

        assert_eq!(desc.bitmap_location(BitmapKind::Block), 10);
        assert_eq!(desc.bitmap_location(BitmapKind::Inode), 11);
        assert_eq!(desc.bitmap_location(BitmapKind::Exclude), 13);

        desc.set_bitmap_location(BitmapKind::Block, 42);
        assert_eq!(desc.bitmap_location(BitmapKind::Block), 42);
    }
}
