// SPDX-License-Identifier: MIT

//! Bitmap primitives shared by every bitmap family.
//!
//! Provides the bit-level operations on byte slices used as allocation
//! bitmaps, plus the [`BitmapKind`] / [`KindSet`] vocabulary the engine
//! and the error types speak.

use core::fmt;

use bitflags::bitflags;

/// The bitmap families a block group carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitmapKind {
    /// One bit per block of the group.
    Block,
    /// One bit per inode of the group.
    Inode,
    /// Snapshot exclude bitmap, block-addressed like [`BitmapKind::Block`].
    Exclude,
}

/// Processing order used by the engine loops.
pub const BITMAP_KINDS: [BitmapKind; 3] = [BitmapKind::Block, BitmapKind::Inode, BitmapKind::Exclude];

impl BitmapKind {
    pub const fn name(self) -> &'static str {
        match self {
            BitmapKind::Block => "block",
            BitmapKind::Inode => "inode",
            BitmapKind::Exclude => "exclude",
        }
    }

    pub const fn mask(self) -> KindSet {
        match self {
            BitmapKind::Block => KindSet::BLOCK,
            BitmapKind::Inode => KindSet::INODE,
            BitmapKind::Exclude => KindSet::EXCLUDE,
        }
    }
}

impl fmt::Display for BitmapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

bitflags! {
    /// Selection of bitmap kinds for a single engine call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KindSet: u8 {
        const BLOCK   = 1 << 0;
        const INODE   = 1 << 1;
        const EXCLUDE = 1 << 2;
        const ALL     = Self::BLOCK.bits() | Self::INODE.bits() | Self::EXCLUDE.bits();
    }
}

/// Extension trait for bitmap operations on byte slices.
///
/// All operations use little-endian bit ordering within bytes:
/// - Bit 0 is the LSB of byte 0
/// - Bit 7 is the MSB of byte 0
/// - Bit 8 is the LSB of byte 1, etc.
pub trait BitmapOps {
    /// Sets or clears a bit at the given position.
    ///
    /// Does nothing if `bit` is out of bounds.
    fn set_bit(&mut self, bit: usize, value: bool);

    /// Gets the value of a bit at the given position.
    ///
    /// Returns `false` if `bit` is out of bounds.
    fn get_bit(&self, bit: usize) -> bool;

    /// Sets or clears every bit in `[start, end)`, clamped to the bitmap.
    fn set_range(&mut self, start: usize, end: usize, value: bool);

    /// Counts the number of set bits in the given range `[start, end)`.
    fn count_ones_in_range(&self, start: usize, end: usize) -> usize;

    /// Counts the total number of set bits in the entire bitmap.
    fn count_ones(&self) -> usize;
}

impl BitmapOps for [u8] {
    #[inline]
    fn set_bit(&mut self, bit: usize, value: bool) {
        if let Some(byte) = self.get_mut(bit / 8) {
            let mask = 1u8 << (bit % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    #[inline]
    fn get_bit(&self, bit: usize) -> bool {
        self.get(bit / 8)
            .is_some_and(|b| (b & (1 << (bit % 8))) != 0)
    }

    fn set_range(&mut self, start: usize, end: usize, value: bool) {
        let end = end.min(self.len() * 8);
        if start >= end {
            return;
        }

        // Ragged edges bit by bit, whole bytes in one go.
        let first_full = start.div_ceil(8);
        let last_full = end / 8;

        if first_full >= last_full {
            for bit in start..end {
                self.set_bit(bit, value);
            }
            return;
        }

        for bit in start..first_full * 8 {
            self.set_bit(bit, value);
        }
        let fill = if value { 0xFF } else { 0x00 };
        self[first_full..last_full].fill(fill);
        for bit in last_full * 8..end {
            self.set_bit(bit, value);
        }
    }

    fn count_ones_in_range(&self, start: usize, end: usize) -> usize {
        (start..end).filter(|&i| self.get_bit(i)).count()
    }

    fn count_ones(&self) -> usize {
        self.iter().map(|b| b.count_ones() as usize).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_bit() {
        let mut bitmap = [0u8; 4];

        // Set bit 0
        bitmap.set_bit(0, true);
        assert!(bitmap.get_bit(0));
        assert_eq!(bitmap[0], 0b00000001);

        // Set bit 7
        bitmap.set_bit(7, true);
        assert!(bitmap.get_bit(7));
        assert_eq!(bitmap[0], 0b10000001);

        // Set bit 8 (first bit of second byte)
        bitmap.set_bit(8, true);
        assert!(bitmap.get_bit(8));
        assert_eq!(bitmap[1], 0b00000001);

        // Clear bit 0
        bitmap.set_bit(0, false);
        assert!(!bitmap.get_bit(0));
        assert_eq!(bitmap[0], 0b10000000);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut bitmap = [0u8; 2];

        // Out of bounds set should do nothing
        bitmap.set_bit(100, true);
        assert_eq!(bitmap, [0, 0]);

        // Out of bounds get should return false
        assert!(!bitmap.get_bit(100));
    }

    #[test]
    fn test_set_range() {
        let mut bitmap = [0u8; 4];

        // Spans a byte boundary: ragged head, full byte, ragged tail
        bitmap.set_range(5, 19, true);
        assert_eq!(bitmap, [0b11100000, 0xFF, 0b00000111, 0]);

        bitmap.set_range(6, 18, false);
        assert_eq!(bitmap, [0b00100000, 0x00, 0b00000100, 0]);

        // Within a single byte
        let mut small = [0u8; 1];
        small.set_range(2, 5, true);
        assert_eq!(small[0], 0b00011100);

        // Clamped past the end
        let mut clamped = [0u8; 1];
        clamped.set_range(4, 100, true);
        assert_eq!(clamped[0], 0b11110000);
    }

    #[test]
    fn test_count_ones() {
        let bitmap = [0b10101010u8, 0b11110000, 0b00001111];

        assert_eq!(bitmap.count_ones(), 4 + 4 + 4);
        assert_eq!(bitmap.count_ones_in_range(0, 8), 4);
        assert_eq!(bitmap.count_ones_in_range(8, 16), 4);
    }

    #[test]
    fn test_kind_masks() {
        assert!(KindSet::ALL.contains(BitmapKind::Block.mask()));
        assert!(KindSet::ALL.contains(BitmapKind::Inode.mask()));
        assert!(KindSet::ALL.contains(BitmapKind::Exclude.mask()));

        let just_blocks = KindSet::BLOCK;
        assert!(just_blocks.contains(BitmapKind::Block.mask()));
        assert!(!just_blocks.contains(BitmapKind::Inode.mask()));
    }
}
