// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOError, BlockIOResult};

/// In-memory implementation of `BlockIO`.
///
/// Useful for tests, RAM-backed images, virtual disks.
#[derive(Debug)]
pub struct MemBlockIO<'a> {
    buffer: &'a mut [u8],
    partition_offset: u64,
    logical_len: usize,
}

impl<'a> MemBlockIO<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        let logical_len = buffer.len();

        Self {
            buffer,
            logical_len,
            partition_offset: 0,
        }
    }

    #[inline]
    pub fn new_with_offset(buffer: &'a mut [u8], partition_offset: u64) -> Self {
        let logical_len = buffer.len();

        Self {
            buffer,
            logical_len,
            partition_offset,
        }
    }

    #[inline]
    fn check_bounds(&self, abs_off: u64, len: usize) -> BlockIOResult {
        let end = abs_off
            .checked_add(len as u64)
            .ok_or(BlockIOError::OutOfBounds)?;
        let max = self
            .partition_offset
            .checked_add(self.logical_len as u64)
            .ok_or(BlockIOError::OutOfBounds)?;
        if end > max {
            return Err(BlockIOError::OutOfBounds);
        }
        Ok(())
    }
}

impl<'a> BlockIO for MemBlockIO<'a> {
    #[inline(always)]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        let abs_offset = self.partition_offset + offset;
        self.check_bounds(abs_offset, data.len())?;
        let dst = &mut self.buffer[abs_offset as usize..abs_offset as usize + data.len()];
        dst.copy_from_slice(data);
        Ok(())
    }

    #[inline(always)]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        let abs_offset = self.partition_offset + offset;
        self.check_bounds(abs_offset, buf.len())?;
        let src = &self.buffer[abs_offset as usize..abs_offset as usize + buf.len()];
        buf.copy_from_slice(src);
        Ok(())
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        Ok(())
    }

    #[inline]
    fn set_offset(&mut self, partition_offset: u64) -> u64 {
        self.partition_offset = partition_offset;
        partition_offset
    }

    #[inline]
    fn partition_offset(&self) -> u64 {
        self.partition_offset
    }
}
