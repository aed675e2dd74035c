// SPDX-License-Identifier: MIT

//! Consistency checking.
//!
//! The checker reads the device directly rather than going through an open
//! handle, so a filesystem too corrupt to open still produces findings
//! instead of a hard error. Phases build on each other: geometry needs a
//! plausible superblock, descriptor and bitmap checks need geometry.

use ebgio::prelude::*;

use crate::core::checker::{Finding, FsChecker, VerifierOptionsLike, VerifyPhases, VerifyReport};
use crate::core::errors::{CheckError, CheckResult, OpenError};
use crate::core::utils::bitmap::{BITMAP_KINDS, BitmapKind, BitmapOps};
use crate::fs::ext::bitmap::kind_uninit_flag;
use crate::fs::ext::constant::EXT_SUPERBLOCK_OFFSET;
use crate::fs::ext::filesystem::ExtFs;
use crate::fs::ext::gdt::GroupDescTable;
use crate::fs::ext::meta::ExtMeta;
use crate::fs::ext::types::ExtSuperblock;
use crate::fs::ext::utils::alloc_block_buf;

#[derive(Debug, Clone, Copy)]
pub struct ExtCheckOptions {
    pub phases: VerifyPhases,
    pub fail_fast: bool,
}

impl Default for ExtCheckOptions {
    fn default() -> Self {
        Self {
            phases: VerifyPhases::ALL,
            fail_fast: false,
        }
    }
}

impl VerifierOptionsLike for ExtCheckOptions {
    fn phases(&self) -> VerifyPhases {
        self.phases
    }

    fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

/// Standalone consistency checker over a block device.
pub struct ExtChecker<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    sb: Option<ExtSuperblock>,
    meta: Option<ExtMeta>,
    gdt: Option<GroupDescTable>,
}

impl<'a, IO: BlockIO + ?Sized> ExtChecker<'a, IO> {
    pub fn new(io: &'a mut IO) -> Self {
        Self {
            io,
            sb: None,
            meta: None,
            gdt: None,
        }
    }

    fn read_super(&mut self) -> CheckResult<ExtSuperblock> {
        if let Some(sb) = self.sb {
            return Ok(sb);
        }
        let sb: ExtSuperblock = self.io.read_struct(EXT_SUPERBLOCK_OFFSET)?;
        self.sb = Some(sb);
        Ok(sb)
    }
}

impl<'a, IO: BlockIO + ?Sized> FsChecker for ExtChecker<'a, IO> {
    type Options = ExtCheckOptions;

    fn check_super(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> CheckResult<()> {
        let sb = self.read_super()?;
        if !sb.magic_ok() {
            rep.push(Finding::err("SB.MAGIC", "superblock magic mismatch"));
            return Ok(());
        }
        if { sb.s_state } & 1 == 0 {
            rep.push(Finding::warn("SB.STATE", "filesystem not cleanly unmounted"));
        }
        Ok(())
    }

    fn check_geometry(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> CheckResult<()> {
        let sb = self.read_super()?;
        match ExtMeta::from_superblock(&sb) {
            Ok(meta) => self.meta = Some(meta),
            Err(e) => rep.push(Finding::err("GEOM.DECODE", e.msg())),
        }
        Ok(())
    }

    fn check_descriptors(
        &mut self,
        _opt: &Self::Options,
        rep: &mut VerifyReport,
    ) -> CheckResult<()> {
        let Some(meta) = self.meta else {
            return Ok(());
        };
        let gdt = match GroupDescTable::read_from(&mut *self.io, &meta) {
            Ok(gdt) => gdt,
            Err(OpenError::IO(e)) => return Err(CheckError::IO(e)),
            Err(e) => {
                rep.push(Finding::err("BG.TABLE", e.msg()));
                return Ok(());
            }
        };

        for group in 0..meta.group_count {
            if meta.csum_flag && !gdt.verify_checksum(&meta.uuid, group) {
                rep.push(Finding::err(
                    "BG.CSUM",
                    format!("group {group}: descriptor checksum mismatch"),
                ));
            }
            let desc = gdt.desc(group);
            for kind in BITMAP_KINDS {
                if kind == BitmapKind::Exclude && !meta.exclude_bitmap {
                    continue;
                }
                let location = desc.bitmap_location(kind);
                if location == 0 {
                    continue;
                }
                if location < meta.first_data_block || location >= meta.blocks_count {
                    rep.push(Finding::err(
                        "BG.RANGE",
                        format!(
                            "group {group}: {kind} bitmap at block {location} outside filesystem"
                        ),
                    ));
                }
            }
            let itable = { desc.bg_inode_table };
            if itable != 0 && (itable < meta.first_data_block || itable >= meta.blocks_count) {
                rep.push(Finding::err(
                    "BG.RANGE",
                    format!("group {group}: inode table at block {itable} outside filesystem"),
                ));
            }
        }
        self.gdt = Some(gdt);
        Ok(())
    }

    /// Compares each group's on-disk bitmap population against the
    /// descriptor free counts. Uninit groups and zero locations are skipped.
    fn check_bitmaps(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> CheckResult<()> {
        let Some(meta) = self.meta else {
            return Ok(());
        };
        let Some(gdt) = self.gdt.as_ref() else {
            return Ok(());
        };
        let mut scratch = alloc_block_buf(meta.block_size as usize)
            .map_err(|_| CheckError::Other("out of memory"))?;

        for group in 0..meta.group_count {
            let desc = gdt.desc(group);
            for kind in [BitmapKind::Block, BitmapKind::Inode] {
                if meta.csum_flag && { desc.bg_flags }.contains(kind_uninit_flag(kind)) {
                    continue;
                }
                let location = desc.bitmap_location(kind);
                if location == 0 {
                    continue;
                }
                if location < meta.first_data_block || location >= meta.blocks_count {
                    // Already reported by the descriptor phase.
                    continue;
                }
                let live = match kind {
                    BitmapKind::Block if group == meta.group_count - 1 => {
                        meta.last_group_blocks()
                    }
                    BitmapKind::Block | BitmapKind::Exclude => meta.blocks_per_group,
                    BitmapKind::Inode => meta.inodes_per_group,
                };
                let free = match kind {
                    BitmapKind::Inode => desc.free_inodes(),
                    _ => desc.free_blocks(),
                };
                if free > live {
                    rep.push(Finding::err(
                        "BG.FREE",
                        format!("group {group}: {kind} free count {free} exceeds group size {live}"),
                    ));
                    continue;
                }
                self.io
                    .read_blocks(location as u64, 1, meta.block_size as usize, &mut scratch)?;
                let used = scratch.count_ones_in_range(0, live as usize) as u32;
                let expected = live - free;
                if used != expected {
                    rep.push(Finding::err(
                        "BM.COUNT",
                        format!(
                            "group {group}: {kind} bitmap has {used} bits set, descriptor implies {expected}"
                        ),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Pass/fail probe: superblock decodes and every descriptor checksum
    /// holds.
    fn fast_check(&mut self) -> CheckResult {
        let sb = self.read_super()?;
        let meta = ExtMeta::from_superblock(&sb).map_err(|e| match e {
            OpenError::IO(io) => CheckError::IO(io),
            other => CheckError::Invalid(other.msg()),
        })?;
        let gdt = GroupDescTable::read_from(&mut *self.io, &meta).map_err(|e| match e {
            OpenError::IO(io) => CheckError::IO(io),
            other => CheckError::Invalid(other.msg()),
        })?;
        if meta.csum_flag {
            for group in 0..meta.group_count {
                if !gdt.verify_checksum(&meta.uuid, group) {
                    return Err(CheckError::CorruptDescriptor(group));
                }
            }
        }
        Ok(())
    }
}

impl<'a, IO: BlockIO + ?Sized> ExtFs<'a, IO> {
    /// A checker over the same device, independent of this handle's
    /// in-memory state.
    pub fn checker(&mut self) -> ExtChecker<'_, IO> {
        ExtChecker::new(&mut *self.io)
    }
}

#[cfg(all(test, feature = "mem", feature = "std"))]
mod tests {
    use super::*;
    use crate::core::checker::Severity;
    use crate::fs::ext::checksum::group_desc_checksum;
    use crate::fs::ext::constant::*;
    use crate::fs::ext::types::ExtGroupDesc;
    use zerocopy::IntoBytes;

    const UUID: [u8; 16] = [0x11; 16];

    // Two groups, the second short (100 blocks) and fully free. Bitmap
    // population matches the descriptor free counts exactly.
    fn build_image() -> Vec<u8> {
        let mut sb = ExtSuperblock::default();
        sb.s_blocks_per_group = 512;
        sb.s_inodes_per_group = 64;
        sb.s_blocks_count = 1 + 512 + 100;
        sb.s_inodes_count = 128;
        sb.s_uuid = UUID;
        sb.s_feature_ro_compat =
            EXT_FEATURE_RO_COMPAT_GDT_CSUM | EXT_FEATURE_RO_COMPAT_SPARSE_SUPER;

        let mut descs = [
            ExtGroupDesc::new(3, 4, 5, 488, 53, 1),
            ExtGroupDesc::new(515, 516, 517, 100, 64, 0),
        ];
        descs[0].bg_checksum = group_desc_checksum(&UUID, 0, &descs[0]);
        descs[1].bg_checksum = group_desc_checksum(&UUID, 1, &descs[1]);

        let mut image = vec![0u8; 1024 * 613];
        image[1024..2048].copy_from_slice(sb.as_bytes());
        image[2048..2048 + 64].copy_from_slice(descs.as_bytes());

        // Group 0: 24 used blocks, 11 used inodes.
        image[3 * 1024] = 0xFF;
        image[3 * 1024 + 1] = 0xFF;
        image[3 * 1024 + 2] = 0x7F;
        image[3 * 1024 + 10] = 0x01;
        image[4 * 1024] = 0xFF;
        image[4 * 1024 + 1] = 0x07;
        // Group 1: no used blocks; padding past the 100 live bits is all
        // ones, as a flush leaves it.
        for b in image[515 * 1024..516 * 1024].iter_mut() {
            *b = 0xFF;
        }
        for b in image[515 * 1024..515 * 1024 + 12].iter_mut() {
            *b = 0;
        }
        image[515 * 1024 + 12] = 0xF0;
        image
    }

    #[test]
    fn test_clean_filesystem_passes() {
        let mut image = build_image();
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        assert!(rep.ok(), "unexpected findings:\n{rep}");
        assert!(rep.findings.is_empty());
        checker.fast_check().unwrap();
    }

    #[test]
    fn test_bad_magic_reported() {
        let mut image = build_image();
        image[1024 + 0x38] = 0x00;
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        assert!(rep.has_error());
        assert!(rep.findings.iter().any(|f| f.code == "SB.MAGIC"));
        assert_eq!(
            checker.fast_check().unwrap_err(),
            CheckError::Invalid("Bad superblock magic")
        );
    }

    #[test]
    fn test_fail_fast_stops_after_super_phase() {
        let mut image = build_image();
        image[1024 + 0x38] = 0x00;
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let opt = ExtCheckOptions {
            fail_fast: true,
            ..ExtCheckOptions::default()
        };
        let rep = checker.check_with(&opt).unwrap();
        assert_eq!(rep.count(Severity::Error), 1);
        assert_eq!(rep.findings[0].code, "SB.MAGIC");
    }

    #[test]
    fn test_corrupt_descriptor_checksum() {
        let mut image = build_image();
        // Flip the free block count of group 1 without fixing the checksum.
        let desc_base = 2048 + 32;
        image[desc_base + 12] = 99;
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        assert!(rep.findings.iter().any(|f| f.code == "BG.CSUM"));
        assert_eq!(
            checker.fast_check().unwrap_err(),
            CheckError::CorruptDescriptor(1)
        );
    }

    #[test]
    fn test_free_count_mismatch() {
        let mut image = build_image();
        // One extra used block on disk that the descriptor does not know of.
        image[3 * 1024 + 20] = 0x01;
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        // The descriptor itself is intact, only the bitmap drifted.
        assert!(!rep.findings.iter().any(|f| f.code == "BG.CSUM"));
        assert!(rep.findings.iter().any(|f| f.code == "BM.COUNT"));
    }

    #[test]
    fn test_short_last_group_counts_live_bits_only() {
        // The all-ones padding in group 1's block bitmap must not count.
        let mut image = build_image();
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        assert!(!rep.findings.iter().any(|f| f.code == "BM.COUNT"));
    }

    #[test]
    fn test_bitmap_location_out_of_range() {
        let mut image = build_image();
        // Point group 1's inode bitmap past the end of the filesystem.
        let desc_base = 2048 + 32;
        image[desc_base + 4..desc_base + 8].copy_from_slice(&10_000u32.to_le_bytes());
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let rep = checker.check_all().unwrap();
        assert!(rep.findings.iter().any(|f| f.code == "BG.RANGE"));
    }

    #[test]
    fn test_phase_filter() {
        let mut image = build_image();
        let desc_base = 2048 + 32;
        image[desc_base + 12] = 99;
        let mut io = MemBlockIO::new(&mut image);
        let mut checker = ExtChecker::new(&mut io);
        let opt = ExtCheckOptions {
            phases: VerifyPhases::SUPER,
            fail_fast: false,
        };
        let rep = checker.check_with(&opt).unwrap();
        assert!(rep.findings.is_empty());
    }
}
