// SPDX-License-Identifier: MIT

//! Marking never-used groups as uninitialized.
//!
//! A group whose descriptor says it holds no data at all can be flagged
//! BLOCK_UNINIT/INODE_UNINIT so later bitmap loads synthesize it instead of
//! reading the device. The transition only rewrites descriptors; the bitmap
//! blocks themselves are left alone.

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::vec::Vec;

use core::fmt;

use ebgio::prelude::*;

use crate::core::errors::{UninitError, UninitResult};
use crate::ensure;
use crate::fs::ext::filesystem::{ExtFs, FsFlags};
use crate::fs::ext::types::BgFlags;

/// Options for [`ExtFs::uninit_groups`].
#[derive(Debug, Clone, Copy)]
pub struct UninitOptions {
    /// First group of the range. Group 0 always stays initialized.
    pub from: u32,
    /// Last group of the range, inclusive.
    pub to: u32,
    /// Convert in memory only; the handle stays clean so close writes
    /// nothing.
    pub dry_run: bool,
    /// Convert ineligible groups too.
    pub force: bool,
}

/// One reason a group is not safe to mark uninitialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    SuperBackup,
    UsedBlocks(u32),
    UsedInodes(u32),
    UsedDirs(u32),
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn s(n: u32) -> &'static str {
            if n == 1 { "" } else { "s" }
        }
        match self {
            Ineligibility::SuperBackup => write!(f, "holds a superblock backup"),
            Ineligibility::UsedBlocks(n) => write!(f, "{} used block{}", n, s(*n)),
            Ineligibility::UsedInodes(n) => write!(f, "{} used inode{}", n, s(*n)),
            Ineligibility::UsedDirs(n) => write!(f, "{} used dir{}", n, s(*n)),
        }
    }
}

/// Per-group result of a transition run.
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    pub group: u32,
    /// Whether the group's descriptor was rewritten (dry runs included).
    pub converted: bool,
    pub findings: Vec<Ineligibility>,
}

#[derive(Debug, Clone, Default)]
pub struct UninitReport {
    pub outcomes: Vec<GroupOutcome>,
}

impl UninitReport {
    pub fn converted(&self) -> usize {
        self.outcomes.iter().filter(|o| o.converted).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.converted).count()
    }
}

impl<'a, IO: BlockIO + ?Sized> ExtFs<'a, IO> {
    /// Marks every eligible group in `[from, to]` uninitialized.
    ///
    /// Eligible means: no superblock backup, all blocks free, all inodes
    /// free, no directories. With `force` the eligibility findings are
    /// reported but ignored. Nothing reaches the device until the next
    /// flush; a dry run still rewrites descriptors in memory but leaves
    /// the handle flags alone, so nothing ever flushes.
    pub fn uninit_groups(&mut self, opt: &UninitOptions) -> UninitResult<UninitReport> {
        ensure!(self.meta.csum_flag, UninitError::FeatureUnsupported);
        let last = self.meta.group_count - 1;
        ensure!(
            opt.from >= 1 && opt.from <= last,
            UninitError::StartOutOfRange {
                start: opt.from,
                last,
            }
        );
        ensure!(
            opt.to >= opt.from && opt.to <= last,
            UninitError::EndOutOfRange {
                end: opt.to,
                start: opt.from,
                last,
            }
        );

        let uuid = self.meta.uuid;
        let mut outcomes = Vec::with_capacity((opt.to - opt.from + 1) as usize);
        for group in opt.from..=opt.to {
            let findings = self.group_findings(group);
            let converted = findings.is_empty() || opt.force;
            if converted {
                let desc = self.gdt.desc_mut(group);
                desc.bg_itable_unused = 0;
                desc.bg_flags = BgFlags::lazy_init();
                self.gdt.set_checksum(&uuid, group);
            }
            outcomes.push(GroupOutcome {
                group,
                converted,
                findings,
            });
        }
        if !opt.dry_run {
            // Descriptor backups must follow, not just the primary copy.
            self.flags.remove(FsFlags::SUPER_ONLY);
            self.flags.insert(FsFlags::SB_DIRTY);
        }
        Ok(UninitReport { outcomes })
    }

    fn group_findings(&self, group: u32) -> Vec<Ineligibility> {
        let mut findings = Vec::new();
        if self.meta.group_has_super(group) {
            findings.push(Ineligibility::SuperBackup);
        }
        let desc = self.gdt.desc(group);
        if let Some(n) = used_count(self.meta.blocks_per_group, desc.free_blocks()) {
            findings.push(Ineligibility::UsedBlocks(n));
        }
        if let Some(n) = used_count(self.meta.inodes_per_group, desc.free_inodes()) {
            findings.push(Ineligibility::UsedInodes(n));
        }
        let used_dirs = { desc.bg_used_dirs_count };
        if used_dirs != 0 {
            findings.push(Ineligibility::UsedDirs(used_dirs as u32));
        }
        findings
    }
}

/// `None` only when the free count matches capacity exactly.
fn used_count(capacity: u32, free: u32) -> Option<u32> {
    if free == capacity {
        None
    } else if free > capacity {
        // A free count above capacity is corrupt; the group reads fully
        // used.
        Some(capacity)
    } else {
        Some(capacity - free)
    }
}
