// SPDX-License-Identifier: MIT

use std::fs::OpenOptions;
use std::path::PathBuf;

use colored::Colorize;
use ebgfs::ext::*;
use ebgfs::{MountState, ensure_not_mounted_rw};
use ebgio::prelude::StdBlockIO;

pub struct UninitArgs {
    pub filesystem: PathBuf,
    pub start_group: Option<u32>,
    pub end_group: Option<u32>,
    pub dry_run: bool,
    pub force: bool,
}

pub fn run(args: &UninitArgs) -> anyhow::Result<()> {
    let path = &args.filesystem;

    // Never rewrite descriptors underneath a read-write mount.
    let state =
        ensure_not_mounted_rw(path).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;
    if state == MountState::ReadOnly {
        crate::log_normal!(
            "{} {} is mounted read-only",
            "warning:".yellow(),
            path.display()
        );
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("cannot open {} read-write: {}", path.display(), e))?;

    let mut io = StdBlockIO::new(&mut file);
    let mut fs =
        ExtFs::open_rw(&mut io).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?;

    // Uninitialized groups only exist under the descriptor checksum feature.
    if !fs.meta().csum_flag {
        anyhow::bail!(
            "{}: filesystem lacks the group checksum feature (uninit_bg)",
            path.display()
        );
    }

    let last = fs.group_count() - 1;
    let opt = UninitOptions {
        from: args.start_group.unwrap_or(1),
        to: args.end_group.unwrap_or(last),
        dry_run: args.dry_run,
        force: args.force,
    };

    let report = fs
        .uninit_groups(&opt)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    for outcome in &report.outcomes {
        let why = outcome
            .findings
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        if outcome.converted && outcome.findings.is_empty() {
            crate::log_verbose!("group {:>5}: {}", outcome.group, "converted".green());
        } else if outcome.converted {
            crate::log_verbose!(
                "group {:>5}: {} ({})",
                outcome.group,
                "converted (forced)".green(),
                why
            );
        } else {
            crate::log_verbose!("group {:>5}: {} ({})", outcome.group, "skipped".yellow(), why);
        }
    }

    fs.close().map_err(|e| anyhow::anyhow!("{}", e))?;

    if args.dry_run {
        crate::log_normal!(
            "dry run: {} of {} group(s) would be converted",
            report.converted(),
            report.outcomes.len()
        );
    } else {
        crate::log_normal!(
            "{} group(s) converted, {} skipped",
            report.converted().to_string().green(),
            report.skipped().to_string().yellow()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, Write};
    use zerocopy::IntoBytes;

    const UUID: [u8; 16] = [0x33; 16];

    // Three groups: 0 and 1 hold sparse backups, group 2 is free to convert.
    fn build_image(with_csum: bool) -> Vec<u8> {
        let mut sb = ExtSuperblock::default();
        sb.s_blocks_per_group = 512;
        sb.s_inodes_per_group = 64;
        sb.s_blocks_count = 1 + 512 * 3;
        sb.s_inodes_count = 192;
        sb.s_uuid = UUID;
        sb.s_feature_ro_compat = ebgfs::fs::ext::constant::EXT_FEATURE_RO_COMPAT_SPARSE_SUPER;
        if with_csum {
            sb.s_feature_ro_compat |= ebgfs::fs::ext::constant::EXT_FEATURE_RO_COMPAT_GDT_CSUM;
        }

        let mut table = GroupDescTable::from_descs(vec![
            ExtGroupDesc::new(3, 4, 5, 500, 53, 1),
            ExtGroupDesc::new(515, 516, 517, 510, 64, 0),
            ExtGroupDesc::new(1025, 1026, 1027, 512, 64, 0),
        ]);
        if with_csum {
            for group in 0..3 {
                table.set_checksum(&UUID, group);
            }
        }

        let mut image = vec![0u8; 1024 * 1537];
        image[1024..2048].copy_from_slice(sb.as_bytes());
        let raw = table.as_bytes();
        image[2048..2048 + raw.len()].copy_from_slice(raw);
        image
    }

    fn args_for(path: &std::path::Path, dry_run: bool) -> UninitArgs {
        UninitArgs {
            filesystem: path.to_path_buf(),
            start_group: None,
            end_group: None,
            dry_run,
            force: false,
        }
    }

    #[test]
    fn test_missing_target_fails() {
        let args = args_for(std::path::Path::new("/no/such/filesystem.img"), false);
        assert!(run(&args).is_err());
    }

    #[test]
    fn test_feature_gate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&build_image(false)).unwrap();
        file.flush().unwrap();

        let err = run(&args_for(file.path(), false)).unwrap_err();
        assert!(err.to_string().contains("group checksum feature"));
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let image = build_image(true);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&image).unwrap();
        file.flush().unwrap();

        run(&args_for(file.path(), true)).unwrap();

        let mut after = Vec::new();
        file.rewind().unwrap();
        file.read_to_end(&mut after).unwrap();
        assert_eq!(after, image);
    }

    #[test]
    fn test_converts_empty_group() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&build_image(true)).unwrap();
        file.flush().unwrap();

        run(&args_for(file.path(), false)).unwrap();

        let mut after = Vec::new();
        file.rewind().unwrap();
        file.read_to_end(&mut after).unwrap();
        // Group 2's descriptor now carries the lazy-init flag set; group 1
        // stays untouched behind its superblock backup.
        let flags_off = 2048 + 2 * 32 + 18;
        assert_eq!(&after[flags_off..flags_off + 2], &[0x07, 0x00]);
        let g1_flags = 2048 + 32 + 18;
        assert_eq!(&after[g1_flags..g1_flags + 2], &[0x00, 0x00]);
    }
}
