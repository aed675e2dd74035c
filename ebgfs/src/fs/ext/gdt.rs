// SPDX-License-Identifier: MIT

//! In-memory group descriptor table.

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::vec::Vec;

use ebgio::prelude::*;
use zerocopy::{FromBytes, IntoBytes};

use crate::core::errors::{OpenError, OpenResult};
use crate::fs::ext::checksum::group_desc_checksum;
use crate::fs::ext::constant::EXT_DESC_SIZE;
use crate::fs::ext::meta::ExtMeta;
use crate::fs::ext::types::ExtGroupDesc;

/// All group descriptors of the filesystem, one table copy in memory.
///
/// The table is read from the block after the superblock and holds exactly
/// `group_count` entries; trailing bytes of the last descriptor block are
/// padding.
#[derive(Debug, Clone, Default)]
pub struct GroupDescTable {
    descs: Vec<ExtGroupDesc>,
}

impl GroupDescTable {
    pub fn from_descs(descs: Vec<ExtGroupDesc>) -> Self {
        Self { descs }
    }

    pub fn read_from<IO: BlockIO + ?Sized>(io: &mut IO, meta: &ExtMeta) -> OpenResult<Self> {
        let gdt_blocks = meta.gdt_blocks() as usize;
        let block_size = meta.block_size as usize;

        let mut raw = Vec::new();
        raw.try_reserve_exact(gdt_blocks * block_size)
            .map_err(|_| OpenError::Other("out of memory"))?;
        raw.resize(gdt_blocks * block_size, 0);
        io.read_blocks(meta.gdt_block() as u64, gdt_blocks, block_size, &mut raw)?;

        let count = meta.group_count as usize;
        let mut descs = Vec::new();
        descs
            .try_reserve_exact(count)
            .map_err(|_| OpenError::Other("out of memory"))?;
        for chunk in raw[..count * EXT_DESC_SIZE].chunks_exact(EXT_DESC_SIZE) {
            let desc = ExtGroupDesc::read_from_bytes(chunk)
                .map_err(|_| OpenError::Corrupted("group descriptor size"))?;
            descs.push(desc);
        }
        Ok(Self { descs })
    }

    /// Writes one block-padded table copy starting at `at_block`.
    pub fn write_to<IO: BlockIO + ?Sized>(
        &self,
        io: &mut IO,
        meta: &ExtMeta,
        at_block: u32,
    ) -> BlockIOResult {
        let gdt_blocks = meta.gdt_blocks() as usize;
        let block_size = meta.block_size as usize;

        let mut raw = Vec::new();
        raw.try_reserve_exact(gdt_blocks * block_size)
            .map_err(|_| BlockIOError::Other("out of memory"))?;
        raw.resize(gdt_blocks * block_size, 0);

        let bytes = self.as_bytes();
        raw[..bytes.len()].copy_from_slice(bytes);
        io.write_blocks(at_block as u64, gdt_blocks, block_size, &raw)
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    /// Panics if `group` is out of range.
    pub fn desc(&self, group: u32) -> &ExtGroupDesc {
        &self.descs[group as usize]
    }

    /// Panics if `group` is out of range.
    pub fn desc_mut(&mut self, group: u32) -> &mut ExtGroupDesc {
        &mut self.descs[group as usize]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, ExtGroupDesc> {
        self.descs.iter()
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.descs.as_slice().as_bytes()
    }

    pub fn verify_checksum(&self, uuid: &[u8; 16], group: u32) -> bool {
        let desc = self.desc(group);
        group_desc_checksum(uuid, group, desc) == { desc.bg_checksum }
    }

    pub fn set_checksum(&mut self, uuid: &[u8; 16], group: u32) {
        let sum = group_desc_checksum(uuid, group, self.desc(group));
        self.desc_mut(group).bg_checksum = sum;
    }
}

#[cfg(all(test, feature = "mem", feature = "std"))]
mod tests {
    use super::*;

    fn two_group_meta() -> ExtMeta {
        ExtMeta {
            uuid: [9u8; 16],
            block_size: 1024,
            first_data_block: 1,
            blocks_count: 1 + 512 * 2,
            inodes_count: 128,
            blocks_per_group: 512,
            inodes_per_group: 64,
            group_count: 2,
            csum_flag: true,
            sparse_super: true,
            exclude_bitmap: false,
        }
    }

    #[test]
    fn test_read_write_roundtrip() {
        let meta = two_group_meta();
        let mut image = vec![0u8; 1024 * 8];
        {
            let mut io = MemBlockIO::new(&mut image);
            let mut table = GroupDescTable::from_descs(vec![
                ExtGroupDesc::new(3, 4, 5, 500, 53, 1),
                ExtGroupDesc::new(515, 516, 517, 512, 64, 0),
            ]);
            table.set_checksum(&meta.uuid, 0);
            table.set_checksum(&meta.uuid, 1);
            table.write_to(&mut io, &meta, meta.gdt_block()).unwrap();
        }

        let mut io = MemBlockIO::new(&mut image);
        let table = GroupDescTable::read_from(&mut io, &meta).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!({ table.desc(0).bg_block_bitmap }, 3);
        assert_eq!({ table.desc(1).bg_inode_bitmap }, 516);
        assert!(table.verify_checksum(&meta.uuid, 0));
        assert!(table.verify_checksum(&meta.uuid, 1));
    }

    #[test]
    fn test_mutation_invalidates_checksum() {
        let meta = two_group_meta();
        let mut table = GroupDescTable::from_descs(vec![ExtGroupDesc::new(3, 4, 5, 500, 53, 1)]);
        table.set_checksum(&meta.uuid, 0);
        assert!(table.verify_checksum(&meta.uuid, 0));

        table.desc_mut(0).bg_free_blocks_count = 499;
        assert!(!table.verify_checksum(&meta.uuid, 0));

        table.set_checksum(&meta.uuid, 0);
        assert!(table.verify_checksum(&meta.uuid, 0));
    }
}
