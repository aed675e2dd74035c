// SPDX-License-Identifier: MIT

//! Small layout helpers shared across the ext modules.

#[cfg(all(not(feature = "std"), feature = "alloc"))]
use alloc::vec::Vec;

use crate::core::errors::{BitmapIoError, BitmapIoResult};

fn test_root(mut a: u32, b: u32) -> bool {
    loop {
        if a < b {
            return false;
        }
        if a == b {
            return true;
        }
        if a % b != 0 {
            return false;
        }
        a /= b;
    }
}

/// Whether `group` carries a superblock/descriptor backup.
///
/// Without sparse_super every group does; with it only group 1 and the
/// powers of 3, 5 and 7.
pub fn group_has_super(sparse_super: bool, group: u32) -> bool {
    if group == 0 {
        return true;
    }
    if !sparse_super {
        return true;
    }
    if group == 1 {
        return true;
    }
    if group % 2 == 0 {
        return false;
    }
    test_root(group, 3) || test_root(group, 5) || test_root(group, 7)
}

/// One zeroed block-sized scratch buffer, with allocation failure surfaced
/// instead of aborting.
pub fn alloc_block_buf(block_size: usize) -> BitmapIoResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(block_size)
        .map_err(|_| BitmapIoError::OutOfMemory)?;
    buf.resize(block_size, 0);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_backup_groups() {
        let sparse: [u32; 9] = [0, 1, 3, 5, 7, 9, 25, 27, 49];
        for g in sparse {
            assert!(group_has_super(true, g), "group {g} should hold a backup");
        }
        for g in [2, 4, 6, 8, 10, 15, 21, 33, 50] {
            assert!(!group_has_super(true, g), "group {g} should not hold a backup");
        }
    }

    #[test]
    fn test_dense_backup_groups() {
        for g in 0..12 {
            assert!(group_has_super(false, g));
        }
    }

    #[test]
    fn test_alloc_block_buf() {
        let buf = alloc_block_buf(4096).unwrap();
        assert_eq!(buf.len(), 4096);
        assert!(buf.iter().all(|&b| b == 0));
    }
}
