// SPDX-License-Identifier: MIT

//! In-memory bitmap stores, one per bitmap kind.
//!
//! A store is a flat bit array covering every group of the filesystem at a
//! fixed per-group stride. Block and exclude bitmaps track blocks starting at
//! the first data block; the inode bitmap tracks inodes starting at inode 1.

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::vec::Vec;

use crate::core::errors::{BitmapIoError, BitmapIoResult};
use crate::core::utils::bitmap::{BitmapKind, BitmapOps};
use crate::fs::ext::meta::ExtMeta;
use crate::fs::ext::types::BgFlags;

/// Descriptor flag that marks a group's bitmap of this kind as never written.
pub fn kind_uninit_flag(kind: BitmapKind) -> u16 {
    match kind {
        BitmapKind::Inode => BgFlags::INODE_UNINIT,
        BitmapKind::Block | BitmapKind::Exclude => BgFlags::BLOCK_UNINIT,
    }
}

/// Geometry of one bitmap kind: which element bit 0 maps to and how many
/// bits each group contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindLayout {
    pub kind: BitmapKind,
    /// Element number bit 0 maps to.
    pub base: u32,
    /// Bits per group.
    pub stride: u32,
    pub group_count: u32,
}

impl KindLayout {
    pub fn for_kind(meta: &ExtMeta, kind: BitmapKind) -> Self {
        let (base, stride) = match kind {
            BitmapKind::Block | BitmapKind::Exclude => {
                (meta.first_data_block, meta.blocks_per_group)
            }
            BitmapKind::Inode => (1, meta.inodes_per_group),
        };
        Self {
            kind,
            base,
            stride,
            group_count: meta.group_count,
        }
    }

    pub fn total_bits(&self) -> u64 {
        self.stride as u64 * self.group_count as u64
    }

    pub fn stride_bytes(&self) -> usize {
        self.stride as usize / 8
    }

    /// Maps an element number to its flat bit index, if it is in range.
    pub fn bit_of(&self, element: u32) -> Option<u64> {
        let bit = (element as u64).checked_sub(self.base as u64)?;
        (bit < self.total_bits()).then_some(bit)
    }
}

/// One loaded bitmap kind.
pub struct BitmapStore {
    layout: KindLayout,
    bits: Vec<u8>,
}

impl BitmapStore {
    /// Allocates an all-zero store for the kind's full geometry.
    pub fn new(layout: KindLayout) -> BitmapIoResult<Self> {
        let len = (layout.total_bits() as usize).div_ceil(8);
        let mut bits = Vec::new();
        bits.try_reserve_exact(len)
            .map_err(|_| BitmapIoError::OutOfMemory)?;
        bits.resize(len, 0);
        Ok(Self { layout, bits })
    }

    pub fn kind(&self) -> BitmapKind {
        self.layout.kind
    }

    pub fn layout(&self) -> &KindLayout {
        &self.layout
    }

    /// The stride-sized byte run holding one group's bits.
    pub fn group_bytes(&self, group: u32) -> &[u8] {
        let start = group as usize * self.layout.stride_bytes();
        &self.bits[start..start + self.layout.stride_bytes()]
    }

    pub fn group_bytes_mut(&mut self, group: u32) -> &mut [u8] {
        let start = group as usize * self.layout.stride_bytes();
        let end = start + self.layout.stride_bytes();
        &mut self.bits[start..end]
    }

    /// Sets the element's bit. `None` if the element is outside the layout.
    pub fn mark(&mut self, element: u32) -> Option<()> {
        let bit = self.layout.bit_of(element)?;
        self.bits.set_bit(bit as usize, true);
        Some(())
    }

    /// Clears the element's bit. `None` if the element is outside the layout.
    pub fn unmark(&mut self, element: u32) -> Option<()> {
        let bit = self.layout.bit_of(element)?;
        self.bits.set_bit(bit as usize, false);
        Some(())
    }

    pub fn is_marked(&self, element: u32) -> Option<bool> {
        let bit = self.layout.bit_of(element)?;
        Some(self.bits.get_bit(bit as usize))
    }

    pub fn count_used(&self) -> u64 {
        self.bits
            .count_ones_in_range(0, self.layout.total_bits() as usize) as u64
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bits
    }
}
