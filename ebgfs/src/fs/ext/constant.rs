// SPDX-License-Identifier: MIT
// ebgfs/fs/ext/constant.rs

// === Superblock ===

// Magic number (in s_magic)
pub const EXT_SUPERBLOCK_MAGIC: u16 = 0xEF53;

// Superblock size (in logical memory)
pub const EXT_SUPERBLOCK_SIZE: usize = 1024;

pub const EXT_SUPERBLOCK_OFFSET: u64 = 1024;

// === Block Size ===

pub const EXT_MIN_BLOCK_SIZE: u32 = 1024;
pub const EXT_MAX_BLOCK_SIZE: u32 = 65536;

// Largest accepted s_log_block_size (1024 << 6 = 65536)
pub const EXT_MAX_BLOCK_LOG_SIZE: u32 = 6;

// === Revision ===

pub const EXT_GOOD_OLD_REV: u32 = 0;
pub const EXT_DYNAMIC_REV: u32 = 1;
pub const EXT_MAX_SUPP_REV: u32 = EXT_DYNAMIC_REV;

// === Block Groups ===

// Classic descriptor width; wide (64-bit) descriptors are not handled.
pub const EXT_DESC_SIZE: usize = 32;

// Free counts in a 32-byte descriptor are 16-bit, which caps the group size.
pub const EXT_MAX_BLOCKS_PER_GROUP: u32 = 65528;
pub const EXT_MAX_INODES_PER_GROUP: u32 = 65528;

// === Filesystem Features (Superblock flags) ===

// Compatible features
pub const EXT_FEATURE_COMPAT_DIR_PREALLOC: u32 = 0x0001;
pub const EXT_FEATURE_COMPAT_HAS_JOURNAL: u32 = 0x0004;
pub const EXT_FEATURE_COMPAT_EXT_ATTR: u32 = 0x0008;
pub const EXT_FEATURE_COMPAT_RESIZE_INODE: u32 = 0x0010;
pub const EXT_FEATURE_COMPAT_DIR_INDEX: u32 = 0x0020;
pub const EXT_FEATURE_COMPAT_EXCLUDE_BITMAP: u32 = 0x0100;

// Incompatible features
pub const EXT_FEATURE_INCOMPAT_COMPRESSION: u32 = 0x0001;
pub const EXT_FEATURE_INCOMPAT_FILETYPE: u32 = 0x0002;
pub const EXT_FEATURE_INCOMPAT_RECOVER: u32 = 0x0004;
pub const EXT_FEATURE_INCOMPAT_JOURNAL_DEV: u32 = 0x0008;
pub const EXT_FEATURE_INCOMPAT_META_BG: u32 = 0x0010;
pub const EXT_FEATURE_INCOMPAT_EXTENTS: u32 = 0x0040;
pub const EXT_FEATURE_INCOMPAT_64BIT: u32 = 0x0080;
pub const EXT_FEATURE_INCOMPAT_MMP: u32 = 0x0100;
pub const EXT_FEATURE_INCOMPAT_FLEX_BG: u32 = 0x0200;

// Read-only compatible features
pub const EXT_FEATURE_RO_COMPAT_SPARSE_SUPER: u32 = 0x0001;
pub const EXT_FEATURE_RO_COMPAT_LARGE_FILE: u32 = 0x0002;
pub const EXT_FEATURE_RO_COMPAT_HUGE_FILE: u32 = 0x0008;
pub const EXT_FEATURE_RO_COMPAT_GDT_CSUM: u32 = 0x0010;
pub const EXT_FEATURE_RO_COMPAT_DIR_NLINK: u32 = 0x0020;
pub const EXT_FEATURE_RO_COMPAT_EXTRA_ISIZE: u32 = 0x0040;

// Everything we can honor beyond the base layout.
pub const EXT_INCOMPAT_SUPPORTED: u32 = EXT_FEATURE_INCOMPAT_FILETYPE;
