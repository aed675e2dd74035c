// SPDX-License-Identifier: MIT

use crate::{BlockIO, BlockIOResult};

/// Simple counters, no_std friendly.
#[derive(Clone, Copy, Default, Debug)]
pub struct IoStats {
    pub reads: u64,
    pub read_bytes: u64,
    pub writes: u64,
    pub write_bytes: u64,
    pub flushes: u64,
}

impl IoStats {
    #[inline]
    pub fn reset(&mut self) {
        *self = IoStats::default();
    }
}

/// Transparent instrumentation wrapper.
///
/// Counts every read/write passing through to the inner backend. Used by
/// higher layers to assert I/O contracts (e.g. a skipped group produces no
/// block read or write at all).
pub struct IOCounter<'a, IO: BlockIO + ?Sized> {
    inner: &'a mut IO,
    pub stats: IoStats,
}

impl<'a, IO: BlockIO + ?Sized> IOCounter<'a, IO> {
    #[inline]
    pub fn new(inner: &'a mut IO) -> Self {
        Self {
            inner,
            stats: IoStats::default(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> IoStats {
        self.stats
    }

    #[inline]
    pub fn into_inner(self) -> &'a mut IO {
        self.inner
    }
}

impl<'a, IO: BlockIO + ?Sized> BlockIO for IOCounter<'a, IO> {
    #[inline]
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        self.stats.writes += 1;
        self.stats.write_bytes += data.len() as u64;
        self.inner.write_at(offset, data)
    }

    #[inline]
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        self.stats.reads += 1;
        self.stats.read_bytes += buf.len() as u64;
        self.inner.read_at(offset, buf)
    }

    #[inline]
    fn flush(&mut self) -> BlockIOResult {
        self.stats.flushes += 1;
        self.inner.flush()
    }

    #[inline]
    fn set_offset(&mut self, p: u64) -> u64 {
        self.inner.set_offset(p)
    }

    #[inline]
    fn partition_offset(&self) -> u64 {
        self.inner.partition_offset()
    }
}

#[cfg(all(test, feature = "mem", feature = "std"))]
mod test {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn test_counts_reads_and_writes() {
        let mut buf = [0u8; 64];
        let mut io = MemBlockIO::new(&mut buf);
        let mut counter = IOCounter::new(&mut io);

        counter.write_at(0, &[1, 2, 3, 4]).unwrap();
        let mut out = [0u8; 2];
        counter.read_at(0, &mut out).unwrap();
        counter.flush().unwrap();

        let stats = counter.snapshot();
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.write_bytes, 4);
        assert_eq!(stats.reads, 1);
        assert_eq!(stats.read_bytes, 2);
        assert_eq!(stats.flushes, 1);
    }
}
