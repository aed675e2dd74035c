// SPDX-License-Identifier: MIT

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Block group state flags (`bg_flags` in the descriptor).
///
/// Kept as a raw u16 newtype so descriptors stay zerocopy-transparent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromBytes, IntoBytes, KnownLayout, Immutable)]
#[repr(transparent)]
pub struct BgFlags(u16);

impl BgFlags {
    /// Inode bitmap never initialized (bit 0)
    pub const INODE_UNINIT: u16 = 0x0001;

    /// Block bitmap never initialized (bit 1)
    pub const BLOCK_UNINIT: u16 = 0x0002;

    /// Inode table zeroed on disk (bit 2)
    pub const INODE_ZEROED: u16 = 0x0004;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, flag: u16) -> bool {
        (self.0 & flag) == flag
    }

    pub const fn with_flag(mut self, flag: u16) -> Self {
        self.0 |= flag;
        self
    }

    pub const fn without_flag(mut self, flag: u16) -> Self {
        self.0 &= !flag;
        self
    }

    /// The exact flag set a freshly uninitialized group carries.
    pub const fn lazy_init() -> Self {
        Self(Self::INODE_UNINIT | Self::BLOCK_UNINIT | Self::INODE_ZEROED)
    }

    pub const fn is_block_uninit(self) -> bool {
        self.contains(Self::BLOCK_UNINIT)
    }

    pub const fn is_inode_uninit(self) -> bool {
        self.contains(Self::INODE_UNINIT)
    }
}

impl From<u16> for BgFlags {
    fn from(value: u16) -> Self {
        Self::from_bits(value)
    }
}

impl From<BgFlags> for u16 {
    fn from(flags: BgFlags) -> Self {
        flags.bits()
    }
}

impl Default for BgFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bg_flags_basic() {
        let flags = BgFlags::empty();
        assert_eq!(flags.bits(), 0);
        assert!(!flags.is_block_uninit());
        assert!(!flags.is_inode_uninit());
    }

    #[test]
    fn test_bg_flags_lazy_init() {
        let flags = BgFlags::lazy_init();
        assert!(flags.is_block_uninit());
        assert!(flags.is_inode_uninit());
        assert!(flags.contains(BgFlags::INODE_ZEROED));
        assert_eq!(flags.bits(), 0x0007);
    }

    #[test]
    fn test_bg_flags_with_without() {
        let flags = BgFlags::empty().with_flag(BgFlags::BLOCK_UNINIT);
        assert!(flags.is_block_uninit());
        assert!(!flags.is_inode_uninit());

        let cleared = flags.without_flag(BgFlags::BLOCK_UNINIT);
        assert_eq!(cleared.bits(), 0);
    }

    #[test]
    fn test_bg_flags_roundtrip_u16() {
        let flags = BgFlags::from(0x0005u16); // INODE_UNINIT | INODE_ZEROED
        assert!(flags.is_inode_uninit());
        assert!(!flags.is_block_uninit());
        let raw: u16 = flags.into();
        assert_eq!(raw, 0x0005);
    }

    #[test]
    fn test_bg_flags_layout() {
        assert_eq!(
            core::mem::size_of::<BgFlags>(),
            core::mem::size_of::<u16>()
        );
    }
}
