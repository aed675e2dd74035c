// SPDX-License-Identifier: MIT

//! Mount-state probe for devices and image files.
//!
//! An image that is mounted read-write must not be rewritten underneath the
//! kernel, so administrative tools check here before opening a target.

use std::fs;
use std::path::Path;

use crate::core::errors::{MountError, MountResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    NotMounted,
    ReadOnly,
    ReadWrite,
}

/// Looks the target up in the kernel mount table.
///
/// Only meaningful on Linux. Other platforms report `NotMounted`: images
/// there are regular files that never appear as mounted devices. Loop-mounted
/// images show up under their `/dev/loop*` name, not the backing file, and
/// are reported `NotMounted` as well.
pub fn mount_state(target: &Path) -> MountResult<MountState> {
    #[cfg(target_os = "linux")]
    {
        let resolved = fs::canonicalize(target).map_err(|_| MountError::Indeterminate)?;
        let table =
            fs::read_to_string("/proc/self/mounts").map_err(|_| MountError::Indeterminate)?;

        for line in table.lines() {
            let mut fields = line.split_whitespace();
            let (Some(device), Some(_mountpoint), Some(_fstype), Some(options)) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            else {
                continue;
            };
            // Device entries may themselves be symlinks (/dev/disk/by-uuid/...).
            let device_resolved = fs::canonicalize(device).unwrap_or_else(|_| device.into());
            if device_resolved != resolved {
                continue;
            }
            let read_only = options.split(',').any(|o| o == "ro");
            return Ok(if read_only {
                MountState::ReadOnly
            } else {
                MountState::ReadWrite
            });
        }
        Ok(MountState::NotMounted)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = target;
        Ok(MountState::NotMounted)
    }
}

/// Refuses targets mounted read-write; passes the state through otherwise.
pub fn ensure_not_mounted_rw(target: &Path) -> MountResult<MountState> {
    match mount_state(target)? {
        MountState::ReadWrite => Err(MountError::MountedReadWrite),
        state => Ok(state),
    }
}
