// SPDX-License-Identifier: MIT

//! Bitmap read/write engine.
//!
//! Reads walk the descriptor table group by group; a group whose descriptor
//! carries the kind's uninit flag AND a valid checksum is synthesized as all
//! zero without touching the device. Image handles instead stream the bitmap
//! blocks sequentially from the image layout's start blocks.
//!
//! Writes go through one scratch block prefilled with 0xFF so the bits past
//! the per-group stride always land on disk as ones. A kind's dirty flag is
//! only cleared after every group of that kind has been written, so a failed
//! flush can be retried without losing state.

use ebgio::prelude::*;

use crate::core::errors::{BitmapIoError, BitmapIoResult};
use crate::core::utils::bitmap::{BITMAP_KINDS, BitmapKind, BitmapOps, KindSet};
use crate::fs::ext::bitmap::{BitmapStore, KindLayout, kind_uninit_flag};
use crate::fs::ext::filesystem::{ExtFs, FsFlags, ImageLayout, kind_dirty_flag};
use crate::fs::ext::gdt::GroupDescTable;
use crate::fs::ext::meta::ExtMeta;
use crate::fs::ext::utils::alloc_block_buf;

impl<'a, IO: BlockIO + ?Sized> ExtFs<'a, IO> {
    /// Loads the requested bitmap kinds, skipping kinds already in memory.
    ///
    /// The exclude kind is silently dropped from the request when the
    /// filesystem does not carry exclude bitmaps.
    pub fn load_bitmaps(&mut self, kinds: KindSet) -> BitmapIoResult {
        self.load_bitmaps_inner(kinds, false)
    }

    /// Loads the requested kinds from disk even if already in memory,
    /// discarding unflushed changes. On failure the kind being reloaded
    /// keeps its previous store.
    pub fn reload_bitmaps(&mut self, kinds: KindSet) -> BitmapIoResult {
        self.load_bitmaps_inner(kinds, true)
    }

    fn load_bitmaps_inner(&mut self, kinds: KindSet, force: bool) -> BitmapIoResult {
        for kind in BITMAP_KINDS {
            if !kinds.contains(kind.mask()) {
                continue;
            }
            if kind == BitmapKind::Exclude && !self.meta.exclude_bitmap {
                continue;
            }
            if !force && self.is_loaded(kind) {
                continue;
            }
            let layout = KindLayout::for_kind(&self.meta, kind);
            let store = if self.flags.contains(FsFlags::IMAGE_FILE) {
                let image = self
                    .image
                    .ok_or(BitmapIoError::Invalid("image layout missing"))?;
                read_kind_streamed(&mut *self.io, &self.meta, &image, layout)?
            } else {
                read_kind_grouped(&mut *self.io, &self.meta, &self.gdt, layout)?
            };
            self.install(kind, store);
        }
        Ok(())
    }

    fn install(&mut self, kind: BitmapKind, store: BitmapStore) {
        match kind {
            BitmapKind::Block => self.block_map = Some(store),
            BitmapKind::Inode => self.inode_map = Some(store),
            BitmapKind::Exclude => self.exclude_map = Some(store),
        }
        // A fresh load matches the device again.
        self.flags.remove(kind_dirty_flag(kind));
    }

    /// Writes back every requested kind that is loaded and dirty.
    pub fn write_bitmaps(&mut self, kinds: KindSet) -> BitmapIoResult {
        if !self.flags.contains(FsFlags::RW) {
            return Err(BitmapIoError::ReadOnlyFilesystem);
        }
        for kind in BITMAP_KINDS {
            if !kinds.contains(kind.mask()) || !self.flags.contains(kind_dirty_flag(kind)) {
                continue;
            }
            let store = match kind {
                BitmapKind::Block => self.block_map.as_ref(),
                BitmapKind::Inode => self.inode_map.as_ref(),
                BitmapKind::Exclude => self.exclude_map.as_ref(),
            };
            let Some(store) = store else {
                continue;
            };
            write_kind_grouped(&mut *self.io, &self.meta, &self.gdt, store)?;
            self.flags.remove(kind_dirty_flag(kind));
        }
        Ok(())
    }

    /// [`Self::write_bitmaps`] for whatever is dirty; a no-op on a clean
    /// handle, even a read-only one.
    pub fn flush_dirty_bitmaps(&mut self) -> BitmapIoResult {
        if !self
            .flags
            .intersects(FsFlags::BB_DIRTY | FsFlags::IB_DIRTY | FsFlags::EB_DIRTY)
        {
            return Ok(());
        }
        self.write_bitmaps(KindSet::ALL)
    }
}

fn read_kind_grouped<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &ExtMeta,
    gdt: &GroupDescTable,
    layout: KindLayout,
) -> BitmapIoResult<BitmapStore> {
    let kind = layout.kind;
    let trust_flag = kind_uninit_flag(kind);
    let mut store = BitmapStore::new(layout)?;
    let mut scratch = alloc_block_buf(meta.block_size as usize)?;

    for group in 0..layout.group_count {
        let desc = gdt.desc(group);
        // An uninit flag is only trusted when the descriptor checksum holds.
        if meta.csum_flag
            && { desc.bg_flags }.contains(trust_flag)
            && gdt.verify_checksum(&meta.uuid, group)
        {
            continue;
        }
        let location = desc.bitmap_location(kind);
        if location == 0 {
            continue;
        }
        io.read_blocks(location as u64, 1, meta.block_size as usize, &mut scratch)
            .map_err(|source| BitmapIoError::ReadFailed {
                kind,
                group,
                source,
            })?;
        let dst = store.group_bytes_mut(group);
        dst.copy_from_slice(&scratch[..dst.len()]);
    }
    Ok(store)
}

fn read_kind_streamed<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &ExtMeta,
    image: &ImageLayout,
    layout: KindLayout,
) -> BitmapIoResult<BitmapStore> {
    let kind = layout.kind;
    let Some(start) = image.start(kind) else {
        return Err(BitmapIoError::ImageUnsupported(kind));
    };
    let mut store = BitmapStore::new(layout)?;
    let mut scratch = alloc_block_buf(meta.block_size as usize)?;

    let total = layout.total_bits();
    let bits_per_block = meta.bits_per_block() as u64;
    let mut done = 0u64;
    let mut block = start as u64;
    while done < total {
        // Both operands are byte multiples, so cnt always is too.
        let cnt = bits_per_block.min(total - done);
        io.read_blocks(block, 1, meta.block_size as usize, &mut scratch)
            .map_err(|source| BitmapIoError::ReadFailed {
                kind,
                group: (done / layout.stride as u64) as u32,
                source,
            })?;
        let at = (done / 8) as usize;
        let len = (cnt / 8) as usize;
        store.bytes_mut()[at..at + len].copy_from_slice(&scratch[..len]);
        done += cnt;
        block += 1;
    }
    Ok(store)
}

fn write_kind_grouped<IO: BlockIO + ?Sized>(
    io: &mut IO,
    meta: &ExtMeta,
    gdt: &GroupDescTable,
    store: &BitmapStore,
) -> BitmapIoResult {
    let kind = store.kind();
    let skip_flag = kind_uninit_flag(kind);
    let mut buf = alloc_block_buf(meta.block_size as usize)?;
    // Prefilled once; every group overwrites the stride prefix, the tail
    // bits past the stride stay set.
    buf.fill(0xFF);

    let last_group = store.layout().group_count - 1;
    for group in 0..store.layout().group_count {
        let desc = gdt.desc(group);
        // Unlike the read side, the flag alone skips the group.
        if meta.csum_flag && { desc.bg_flags }.contains(skip_flag) {
            continue;
        }
        let location = desc.bitmap_location(kind);
        if location == 0 {
            continue;
        }
        let src = store.group_bytes(group);
        buf[..src.len()].copy_from_slice(src);
        if kind == BitmapKind::Block && group == last_group {
            let live = meta.last_group_blocks();
            if live != meta.blocks_per_group {
                buf.set_range(live as usize, meta.bits_per_block() as usize, true);
            }
        }
        io.write_blocks(location as u64, 1, meta.block_size as usize, &buf)
            .map_err(|source| BitmapIoError::WriteFailed {
                kind,
                group,
                source,
            })?;
    }
    Ok(())
}
