// SPDX-License-Identifier: MIT

//! Group descriptor checksum.
//!
//! The checksum seals a descriptor against the volume identity and its own
//! position, so a descriptor copied between groups (or filesystems) stops
//! verifying. It is a pure function; the engine only ever compares outputs.

use crc32fast::Hasher;

use crate::fs::ext::constant::EXT_DESC_SIZE;
use crate::fs::ext::types::ExtGroupDesc;

/// Checksum a descriptor must carry: volume UUID, group index, then the
/// descriptor bytes up to (excluding) the trailing checksum field.
pub fn group_desc_checksum(uuid: &[u8; 16], group: u32, desc: &ExtGroupDesc) -> u16 {
    let bytes = desc.to_bytes();

    let mut hasher = Hasher::new();
    hasher.update(uuid);
    hasher.update(&group.to_le_bytes());
    hasher.update(&bytes[..EXT_DESC_SIZE - 2]);
    hasher.finalize() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_ignores_stored_checksum() {
        let uuid = [7u8; 16];
        let mut desc = ExtGroupDesc::new(10, 11, 12, 512, 64, 0);

        let before = group_desc_checksum(&uuid, 3, &desc);
        desc.bg_checksum = 0xFFFF;
        let after = group_desc_checksum(&uuid, 3, &desc);
        assert_eq!(before, after);
    }

    #[test]
    fn test_checksum_binds_group_and_uuid() {
        let uuid = [7u8; 16];
        let desc = ExtGroupDesc::new(10, 11, 12, 512, 64, 0);

        assert_ne!(
            group_desc_checksum(&uuid, 3, &desc),
            group_desc_checksum(&uuid, 4, &desc)
        );
        assert_ne!(
            group_desc_checksum(&uuid, 3, &desc),
            group_desc_checksum(&[8u8; 16], 3, &desc)
        );
    }

    #[test]
    fn test_checksum_tracks_fields() {
        let uuid = [7u8; 16];
        let mut desc = ExtGroupDesc::new(10, 11, 12, 512, 64, 0);
        let before = group_desc_checksum(&uuid, 0, &desc);
        desc.bg_free_blocks_count = 511;
        assert_ne!(before, group_desc_checksum(&uuid, 0, &desc));
    }
}
