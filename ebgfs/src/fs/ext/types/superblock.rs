// SPDX-License-Identifier: MIT
//! On-disk superblock structure

use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

use crate::fs::ext::constant::*;

/// Superblock (1024 bytes at byte offset 1024).
///
/// Classic rev-1 layout. Fields past the feature words are only carried
/// through, never interpreted.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
pub struct ExtSuperblock {
    // 0x00
    /// Total inode count
    pub s_inodes_count: u32,
    /// Total block count
    pub s_blocks_count: u32,
    /// Reserved block count
    pub s_r_blocks_count: u32,
    /// Free block count
    pub s_free_blocks_count: u32,
    // 0x10
    /// Free inode count
    pub s_free_inodes_count: u32,
    /// First data block (1 for 1 KiB blocks, 0 otherwise)
    pub s_first_data_block: u32,
    /// Block size = 1024 << s_log_block_size
    pub s_log_block_size: u32,
    /// Cluster size = 1024 << s_log_cluster_size
    pub s_log_cluster_size: u32,
    // 0x20
    /// Blocks per group
    pub s_blocks_per_group: u32,
    /// Clusters per group
    pub s_clusters_per_group: u32,
    /// Inodes per group
    pub s_inodes_per_group: u32,
    /// Mount time
    pub s_mtime: u32,
    // 0x30
    /// Write time
    pub s_wtime: u32,
    /// Mount count
    pub s_mnt_count: u16,
    /// Max mount count
    pub s_max_mnt_count: u16,
    /// Magic signature (0xEF53)
    pub s_magic: u16,
    /// Filesystem state
    pub s_state: u16,
    /// Behavior on errors
    pub s_errors: u16,
    /// Minor revision level
    pub s_minor_rev_level: u16,
    // 0x40
    /// Time of last check
    pub s_lastcheck: u32,
    /// Max time between checks
    pub s_checkinterval: u32,
    /// Creator OS
    pub s_creator_os: u32,
    /// Revision level
    pub s_rev_level: u32,
    // 0x50
    /// Default reserved UID
    pub s_def_resuid: u16,
    /// Default reserved GID
    pub s_def_resgid: u16,
    /// First non-reserved inode
    pub s_first_ino: u32,
    /// Inode size
    pub s_inode_size: u16,
    /// Block group number of this superblock copy
    pub s_block_group_nr: u16,
    /// Compatible feature set
    pub s_feature_compat: u32,
    // 0x60
    /// Incompatible feature set
    pub s_feature_incompat: u32,
    /// Read-only compatible feature set
    pub s_feature_ro_compat: u32,
    /// 128-bit UUID for volume
    pub s_uuid: [u8; 16],
    // 0x78
    /// Volume label
    pub s_volume_name: [u8; 16],
    // 0x88
    /// Directory where filesystem was last mounted
    pub s_last_mounted: [u8; 64],
    // 0xC8
    /// For compression (algorithm usage bitmap)
    pub s_algorithm_usage_bitmap: u32,
    // 0xCC
    /// Padding before s_desc_size
    pub s_padding_1: [u8; 50],
    // 0xFE
    /// Size of group descriptors (64-bit feature)
    pub s_desc_size: u16,
    // 0x100
    /// Remaining fields (padding to 1024 bytes)
    pub s_reserved: [u8; 768],
}

impl ExtSuperblock {
    pub fn magic_ok(&self) -> bool {
        self.s_magic == EXT_SUPERBLOCK_MAGIC
    }

    /// Decoded block size. Callers validate `s_log_block_size` first.
    pub fn block_size(&self) -> u32 {
        EXT_MIN_BLOCK_SIZE << self.s_log_block_size
    }

    pub fn has_compat(&self, feature: u32) -> bool {
        (self.s_feature_compat & feature) != 0
    }

    pub fn has_incompat(&self, feature: u32) -> bool {
        (self.s_feature_incompat & feature) != 0
    }

    pub fn has_ro_compat(&self, feature: u32) -> bool {
        (self.s_feature_ro_compat & feature) != 0
    }
}

impl Default for ExtSuperblock {
    fn default() -> Self {
        let mut sb = Self::new_zeroed();
        sb.s_magic = EXT_SUPERBLOCK_MAGIC;
        sb.s_rev_level = EXT_DYNAMIC_REV;
        sb.s_first_data_block = 1; // matches the zeroed s_log_block_size (1 KiB)
        sb.s_state = 1;
        sb.s_errors = 1;
        sb.s_first_ino = 11;
        sb.s_inode_size = 128;
        sb
    }
}

// Ensure the struct is exactly 1024 bytes
const _: () = assert!(core::mem::size_of::<ExtSuperblock>() == EXT_SUPERBLOCK_SIZE);
