// SPDX-License-Identifier: MIT
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules
pub mod errors;
mod macros;
pub mod stats;

// Backend modules
#[cfg(feature = "mem")]
mod mem;

#[cfg(feature = "std")]
mod std;

// Prelude re-exports (central entrypoint)
pub mod prelude {
    pub use super::BlockIO;
    pub use super::BlockIOExt;
    pub use super::BlockIOStructExt;
    pub use super::errors::*;
    pub use super::stats::*;

    #[cfg(feature = "mem")]
    pub use super::mem::MemBlockIO;

    #[cfg(feature = "std")]
    pub use super::std::StdBlockIO;
}

// Internal use
use errors::*;

// Constants

/// Maximum size of internal scratch buffer (used for zero fill and
/// struct reads). 4 KiB = typical page size and common disk block size.
pub const BLOCK_BUF_SIZE: usize = 4096;

// Traits

/// Block IO abstraction trait.
///
/// Allows read/write/flush at arbitrary offsets.
/// Implementations may target RAM, files, block devices, etc.
pub trait BlockIO {
    /// Writes `data` at `offset` (absolute).
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult;

    /// Reads `buf.len()` bytes into `buf` from `offset` (absolute).
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult;

    /// Flushes any buffered data (may be a no-op).
    fn flush(&mut self) -> BlockIOResult;

    fn set_offset(&mut self, partition_offset: u64) -> u64;
    fn partition_offset(&self) -> u64;
}

/// Extension helpers for BlockIO.
///
/// Provides optimized or convenient helpers:
/// - whole-block reads/writes addressed by block number
/// - zero fill, primitive reads/writes
pub trait BlockIOExt: BlockIO {
    /// Reads `count` whole blocks of `block_size` starting at block `block`.
    ///
    /// `buf.len()` must be exactly `count * block_size`.
    #[inline(always)]
    fn read_blocks(
        &mut self,
        block: u64,
        count: usize,
        block_size: usize,
        buf: &mut [u8],
    ) -> BlockIOResult {
        if buf.len() != count * block_size {
            return Err(BlockIOError::Other("read_blocks: buffer length mismatch"));
        }
        self.read_at(block * block_size as u64, buf)
    }

    /// Writes `count` whole blocks of `block_size` starting at block `block`.
    ///
    /// `buf.len()` must be exactly `count * block_size`.
    #[inline(always)]
    fn write_blocks(
        &mut self,
        block: u64,
        count: usize,
        block_size: usize,
        buf: &[u8],
    ) -> BlockIOResult {
        if buf.len() != count * block_size {
            return Err(BlockIOError::Other("write_blocks: buffer length mismatch"));
        }
        self.write_at(block * block_size as u64, buf)
    }

    /// Fills a region with zeroes.
    #[inline(always)]
    fn zero_fill(&mut self, offset: u64, len: usize) -> BlockIOResult {
        const ZERO_BUF: [u8; BLOCK_BUF_SIZE] = [0u8; BLOCK_BUF_SIZE];
        let mut remaining = len;
        let mut off = offset;
        while remaining > 0 {
            let chunk = remaining.min(ZERO_BUF.len());
            self.write_at(off, &ZERO_BUF[..chunk])?;
            off += chunk as u64;
            remaining -= chunk;
        }
        Ok(())
    }

    // Implements read/write helpers for primitive types (u16, u32, u64)
    blockio_impl_primitive_rw!(u16, u32, u64);
}

impl<T: BlockIO + ?Sized> BlockIOExt for T {}

/// Extension trait for reading and writing structs using zerocopy.
///
/// Provides helpers to read a struct from a given offset and write a struct
/// at a given offset. Requires the struct to implement zerocopy traits for
/// safe conversion.
pub trait BlockIOStructExt: BlockIO {
    /// Reads a struct of type `T` from the given offset.
    fn read_struct<T: zerocopy::FromBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
    ) -> BlockIOResult<T> {
        let size = core::mem::size_of::<T>();
        assert!(size <= BLOCK_BUF_SIZE, "read_struct: type too large");
        let mut buf = [0u8; BLOCK_BUF_SIZE];
        self.read_at(offset, &mut buf[..size])?;
        T::read_from_bytes(&buf[..size]).map_err(|_| BlockIOError::Other("read_struct failed"))
    }

    /// Writes a struct of type `T` at the given offset.
    fn write_struct<T: zerocopy::IntoBytes + zerocopy::KnownLayout + zerocopy::Immutable>(
        &mut self,
        offset: u64,
        val: &T,
    ) -> BlockIOResult {
        let bytes = val.as_bytes();
        self.write_at(offset, bytes)
    }
}

impl<T: BlockIO + ?Sized> BlockIOStructExt for T {}
