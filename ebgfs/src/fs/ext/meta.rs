// SPDX-License-Identifier: MIT

use crate::core::errors::{OpenError, OpenResult};
use crate::ensure;
use crate::fs::ext::constant::*;
use crate::fs::ext::types::ExtSuperblock;
use crate::fs::ext::utils;

/// Decoded filesystem geometry, validated once at open.
///
/// Everything the bitmap engine needs, detached from the raw superblock so
/// packed-field reads happen in exactly one place.
#[derive(Debug, Clone, Copy)]
pub struct ExtMeta {
    pub uuid: [u8; 16],
    pub block_size: u32,
    pub first_data_block: u32,
    pub blocks_count: u32,
    pub inodes_count: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub group_count: u32,
    pub csum_flag: bool,
    pub sparse_super: bool,
    pub exclude_bitmap: bool,
}

impl ExtMeta {
    pub fn from_superblock(sb: &ExtSuperblock) -> OpenResult<Self> {
        ensure!(sb.magic_ok(), OpenError::BadMagic);
        ensure!(
            { sb.s_rev_level } <= EXT_MAX_SUPP_REV,
            OpenError::Unsupported("unsupported revision level")
        );
        ensure!(
            { sb.s_log_block_size } <= EXT_MAX_BLOCK_LOG_SIZE,
            OpenError::Corrupted("invalid block size")
        );
        ensure!(
            { sb.s_feature_incompat } & !EXT_INCOMPAT_SUPPORTED == 0,
            OpenError::Unsupported("unsupported incompatible features")
        );
        let desc_size = { sb.s_desc_size };
        ensure!(
            desc_size == 0 || desc_size as usize == EXT_DESC_SIZE,
            OpenError::Unsupported("wide group descriptors")
        );

        let block_size = sb.block_size();
        let blocks_per_group = { sb.s_blocks_per_group };
        let inodes_per_group = { sb.s_inodes_per_group };
        let max_per_group = |cap: u32| cap.min(block_size * 8);

        ensure!(
            blocks_per_group != 0
                && blocks_per_group % 8 == 0
                && blocks_per_group <= max_per_group(EXT_MAX_BLOCKS_PER_GROUP),
            OpenError::Corrupted("invalid blocks per group")
        );
        ensure!(
            inodes_per_group != 0
                && inodes_per_group % 8 == 0
                && inodes_per_group <= max_per_group(EXT_MAX_INODES_PER_GROUP),
            OpenError::Corrupted("invalid inodes per group")
        );

        let first_data_block = { sb.s_first_data_block };
        let expected_first = if block_size == EXT_MIN_BLOCK_SIZE { 1 } else { 0 };
        ensure!(
            first_data_block == expected_first,
            OpenError::Corrupted("invalid first data block")
        );

        let blocks_count = { sb.s_blocks_count };
        ensure!(
            blocks_count > first_data_block,
            OpenError::Corrupted("invalid block count")
        );

        let group_count =
            ((blocks_count - first_data_block) as u64).div_ceil(blocks_per_group as u64) as u32;

        let inodes_count = { sb.s_inodes_count };
        ensure!(
            inodes_count as u64 == group_count as u64 * inodes_per_group as u64,
            OpenError::Corrupted("invalid inode count")
        );

        let gdt_blocks =
            (group_count as u64 * EXT_DESC_SIZE as u64).div_ceil(block_size as u64);
        ensure!(
            first_data_block as u64 + 1 + gdt_blocks <= blocks_count as u64,
            OpenError::Corrupted("descriptor table exceeds filesystem")
        );

        Ok(Self {
            uuid: sb.s_uuid,
            block_size,
            first_data_block,
            blocks_count,
            inodes_count,
            blocks_per_group,
            inodes_per_group,
            group_count,
            csum_flag: sb.has_ro_compat(EXT_FEATURE_RO_COMPAT_GDT_CSUM),
            sparse_super: sb.has_ro_compat(EXT_FEATURE_RO_COMPAT_SPARSE_SUPER),
            exclude_bitmap: sb.has_compat(EXT_FEATURE_COMPAT_EXCLUDE_BITMAP),
        })
    }

    pub fn has_group_checksums(&self) -> bool {
        self.csum_flag
    }

    pub fn has_sparse_super(&self) -> bool {
        self.sparse_super
    }

    pub fn has_exclude_bitmap(&self) -> bool {
        self.exclude_bitmap
    }

    pub fn bits_per_block(&self) -> u32 {
        self.block_size * 8
    }

    pub fn block_offset(&self, block: u32) -> u64 {
        block as u64 * self.block_size as u64
    }

    /// Block holding the first descriptor table copy.
    pub fn gdt_block(&self) -> u32 {
        self.first_data_block + 1
    }

    /// Blocks one descriptor table copy occupies.
    pub fn gdt_blocks(&self) -> u32 {
        ((self.group_count as u64 * EXT_DESC_SIZE as u64).div_ceil(self.block_size as u64)) as u32
    }

    pub fn first_block_of_group(&self, group: u32) -> u32 {
        self.first_data_block + group * self.blocks_per_group
    }

    /// Blocks actually present in the last group (equals `blocks_per_group`
    /// when the device size is group-aligned).
    pub fn last_group_blocks(&self) -> u32 {
        let rem = (self.blocks_count - self.first_data_block) % self.blocks_per_group;
        if rem == 0 { self.blocks_per_group } else { rem }
    }

    /// Whether `group` carries a superblock/descriptor backup.
    pub fn group_has_super(&self, group: u32) -> bool {
        utils::group_has_super(self.sparse_super, group)
    }
}
