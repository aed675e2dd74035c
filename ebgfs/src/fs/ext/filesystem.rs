// SPDX-License-Identifier: MIT

//! Open filesystem handle.
//!
//! Owns the decoded superblock, the descriptor table and any loaded bitmap
//! stores. All writes are deferred until [`ExtFs::flush`] and gated on dirty
//! flags, so a handle that only reads never touches the device.

use bitflags::bitflags;
use ebgio::prelude::*;

use crate::core::errors::{BitmapIoError, BitmapIoResult, FsResult, OpenResult};
use crate::core::utils::bitmap::BitmapKind;
use crate::core::utils::time_utils::unix_now;
use crate::fs::ext::bitmap::BitmapStore;
use crate::fs::ext::constant::EXT_SUPERBLOCK_OFFSET;
use crate::fs::ext::gdt::GroupDescTable;
use crate::fs::ext::meta::ExtMeta;
use crate::fs::ext::types::ExtSuperblock;

bitflags! {
    /// Runtime state of an open handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FsFlags: u32 {
        /// Handle may write back to the device.
        const RW = 1 << 0;
        /// Backing store is a streamed metadata image, not a filesystem.
        const IMAGE_FILE = 1 << 1;
        /// Flush only the primary superblock, skipping backups and
        /// descriptor table copies.
        const SUPER_ONLY = 1 << 2;
        /// Superblock or descriptors changed since the last flush.
        const SB_DIRTY = 1 << 3;
        /// Block bitmap changed since the last flush.
        const BB_DIRTY = 1 << 4;
        /// Inode bitmap changed since the last flush.
        const IB_DIRTY = 1 << 5;
        /// Exclude bitmap changed since the last flush.
        const EB_DIRTY = 1 << 6;
    }
}

pub fn kind_dirty_flag(kind: BitmapKind) -> FsFlags {
    match kind {
        BitmapKind::Block => FsFlags::BB_DIRTY,
        BitmapKind::Inode => FsFlags::IB_DIRTY,
        BitmapKind::Exclude => FsFlags::EB_DIRTY,
    }
}

/// Start blocks of the bitmap runs inside a streamed metadata image.
///
/// Image files carry the block bitmaps of all groups back to back, then the
/// inode bitmaps. Exclude bitmaps have no image representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageLayout {
    pub block_bitmap_start: u32,
    pub inode_bitmap_start: u32,
}

impl ImageLayout {
    pub fn start(&self, kind: BitmapKind) -> Option<u32> {
        match kind {
            BitmapKind::Block => Some(self.block_bitmap_start),
            BitmapKind::Inode => Some(self.inode_bitmap_start),
            BitmapKind::Exclude => None,
        }
    }
}

/// An open ext filesystem.
pub struct ExtFs<'a, IO: BlockIO + ?Sized> {
    pub(crate) io: &'a mut IO,
    pub(crate) sb: ExtSuperblock,
    pub(crate) meta: ExtMeta,
    pub(crate) gdt: GroupDescTable,
    pub(crate) flags: FsFlags,
    pub(crate) image: Option<ImageLayout>,
    pub(crate) block_map: Option<BitmapStore>,
    pub(crate) inode_map: Option<BitmapStore>,
    pub(crate) exclude_map: Option<BitmapStore>,
}

impl<'a, IO: BlockIO + ?Sized> ExtFs<'a, IO> {
    /// Opens read-only.
    pub fn open(io: &'a mut IO) -> OpenResult<Self> {
        Self::open_with_flags(io, FsFlags::empty())
    }

    /// Opens for writing. Flushes will reach the device.
    pub fn open_rw(io: &'a mut IO) -> OpenResult<Self> {
        Self::open_with_flags(io, FsFlags::RW)
    }

    pub fn open_with_flags(io: &'a mut IO, flags: FsFlags) -> OpenResult<Self> {
        let sb: ExtSuperblock = io.read_struct(EXT_SUPERBLOCK_OFFSET)?;
        let meta = ExtMeta::from_superblock(&sb)?;
        let gdt = GroupDescTable::read_from(io, &meta)?;
        Ok(Self {
            io,
            sb,
            meta,
            gdt,
            flags,
            image: None,
            block_map: None,
            inode_map: None,
            exclude_map: None,
        })
    }

    /// Opens a streamed metadata image. Bitmap loads read whole blocks
    /// sequentially from the start blocks in `layout` instead of following
    /// the descriptor locations.
    pub fn open_image(io: &'a mut IO, layout: ImageLayout) -> OpenResult<Self> {
        let mut fs = Self::open_with_flags(io, FsFlags::IMAGE_FILE)?;
        fs.image = Some(layout);
        Ok(fs)
    }

    pub fn meta(&self) -> &ExtMeta {
        &self.meta
    }

    pub fn superblock(&self) -> &ExtSuperblock {
        &self.sb
    }

    pub fn descriptors(&self) -> &GroupDescTable {
        &self.gdt
    }

    pub fn flags(&self) -> FsFlags {
        self.flags
    }

    pub fn is_rw(&self) -> bool {
        self.flags.contains(FsFlags::RW)
    }

    pub fn group_count(&self) -> u32 {
        self.meta.group_count
    }

    pub fn bitmap(&self, kind: BitmapKind) -> Option<&BitmapStore> {
        match kind {
            BitmapKind::Block => self.block_map.as_ref(),
            BitmapKind::Inode => self.inode_map.as_ref(),
            BitmapKind::Exclude => self.exclude_map.as_ref(),
        }
    }

    pub fn is_loaded(&self, kind: BitmapKind) -> bool {
        self.bitmap(kind).is_some()
    }

    pub fn is_dirty(&self, kind: BitmapKind) -> bool {
        self.flags.contains(kind_dirty_flag(kind))
    }

    fn store_mut(&mut self, kind: BitmapKind) -> Option<&mut BitmapStore> {
        match kind {
            BitmapKind::Block => self.block_map.as_mut(),
            BitmapKind::Inode => self.inode_map.as_mut(),
            BitmapKind::Exclude => self.exclude_map.as_mut(),
        }
    }

    /// Sets one element's bit in a loaded bitmap and marks the kind dirty.
    pub fn mark(&mut self, kind: BitmapKind, element: u32) -> BitmapIoResult {
        let store = self
            .store_mut(kind)
            .ok_or(BitmapIoError::Invalid("bitmap not loaded"))?;
        store
            .mark(element)
            .ok_or(BitmapIoError::Invalid("element outside bitmap range"))?;
        self.flags.insert(kind_dirty_flag(kind));
        Ok(())
    }

    /// Clears one element's bit in a loaded bitmap and marks the kind dirty.
    pub fn unmark(&mut self, kind: BitmapKind, element: u32) -> BitmapIoResult {
        let store = self
            .store_mut(kind)
            .ok_or(BitmapIoError::Invalid("bitmap not loaded"))?;
        store
            .unmark(element)
            .ok_or(BitmapIoError::Invalid("element outside bitmap range"))?;
        self.flags.insert(kind_dirty_flag(kind));
        Ok(())
    }

    /// [`Self::mark`] for the block bitmap, addressed by block number.
    pub fn mark_block_used(&mut self, block: u32) -> BitmapIoResult {
        self.mark(BitmapKind::Block, block)
    }

    /// [`Self::mark`] for the inode bitmap, addressed by inode number.
    pub fn mark_inode_used(&mut self, inode: u32) -> BitmapIoResult {
        self.mark(BitmapKind::Inode, inode)
    }

    pub fn is_marked(&self, kind: BitmapKind, element: u32) -> BitmapIoResult<bool> {
        let store = self
            .bitmap(kind)
            .ok_or(BitmapIoError::Invalid("bitmap not loaded"))?;
        store
            .is_marked(element)
            .ok_or(BitmapIoError::Invalid("element outside bitmap range"))
    }

    /// Marks the superblock and descriptor table for the next flush.
    pub fn mark_super_dirty(&mut self) {
        self.flags.insert(FsFlags::SB_DIRTY);
    }

    pub fn set_super_only(&mut self) {
        self.flags.insert(FsFlags::SUPER_ONLY);
    }

    pub fn clear_super_only(&mut self) {
        self.flags.remove(FsFlags::SUPER_ONLY);
    }

    /// Writes everything dirty back: superblock and descriptors first, then
    /// bitmaps. Clean state writes nothing.
    pub fn flush(&mut self) -> FsResult {
        if self.flags.contains(FsFlags::SB_DIRTY) {
            if !self.is_rw() {
                return Err(BitmapIoError::ReadOnlyFilesystem.into());
            }
            self.write_super()?;
            self.flags.remove(FsFlags::SB_DIRTY);
        }
        self.flush_dirty_bitmaps()?;
        Ok(())
    }

    /// Flushes dirty state, then the backing store itself.
    pub fn close(mut self) -> FsResult {
        self.flush()?;
        self.io.flush()?;
        Ok(())
    }

    fn write_super(&mut self) -> FsResult {
        self.sb.s_wtime = unix_now();
        if !self.flags.contains(FsFlags::SUPER_ONLY) {
            for group in 1..self.meta.group_count {
                if !self.meta.group_has_super(group) {
                    continue;
                }
                let first = self.meta.first_block_of_group(group);
                let mut backup = self.sb;
                backup.s_block_group_nr = group as u16;
                self.io
                    .write_struct(self.meta.block_offset(first), &backup)?;
                self.gdt.write_to(&mut *self.io, &self.meta, first + 1)?;
            }
            self.gdt
                .write_to(&mut *self.io, &self.meta, self.meta.gdt_block())?;
        }
        self.sb.s_block_group_nr = 0;
        self.io.write_struct(EXT_SUPERBLOCK_OFFSET, &self.sb)?;
        Ok(())
    }
}
