// SPDX-License-Identifier: MIT

use std::io::{Error, Read, Seek, SeekFrom, Write};

use crate::{BlockIO, BlockIOError, BlockIOResult};

#[derive(Debug)]
pub struct StdBlockIO<'a, T: Read + Write + Seek> {
    io: &'a mut T,
    partition_offset: u64,
}

impl<'a, T: Read + Write + Seek> StdBlockIO<'a, T> {
    #[inline]
    pub fn new(io: &'a mut T) -> Self {
        Self {
            io,
            partition_offset: 0,
        }
    }

    #[inline]
    pub fn new_with_offset(io: &'a mut T, partition_offset: u64) -> Self {
        Self {
            io,
            partition_offset,
        }
    }
}

impl<'a, T: Read + Write + Seek> BlockIO for StdBlockIO<'a, T> {
    fn write_at(&mut self, offset: u64, data: &[u8]) -> BlockIOResult {
        let abs_offset = self.partition_offset + offset;
        self.io.seek(SeekFrom::Start(abs_offset))?;
        self.io.write_all(data)?;
        Ok(())
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> BlockIOResult {
        let abs_offset = self.partition_offset + offset;
        self.io.seek(SeekFrom::Start(abs_offset))?;
        self.io.read_exact(buf)?;
        Ok(())
    }

    fn flush(&mut self) -> BlockIOResult {
        self.io.flush()?;
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

impl From<Error> for BlockIOError {
    #[cold]
    #[inline(never)]
    fn from(e: Error) -> Self {
        // Leak the string to produce a 'static str. Acceptable for error mapping.
        let leaked_str: &'static str = Box::leak(e.to_string().into_boxed_str());
        BlockIOError::Other(leaked_str)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::prelude::*;
    use tempfile::tempfile;

    #[test]
    fn test_rw() {
        let mut file = tempfile().unwrap();
        let mut io = StdBlockIO::new(&mut file);
        io.write_at(10, &[1, 2, 3, 4]).unwrap();

        let mut output = [0u8; 4];
        io.read_at(10, &mut output).unwrap();
        assert_eq!(output, [1, 2, 3, 4]);
    }

    #[test]
    fn test_block_rw() {
        let mut file = tempfile().unwrap();
        let mut io = StdBlockIO::new(&mut file);

        let input = [0xCD; 32];
        let mut output = [0u8; 32];

        io.write_blocks(1, 4, 8, &input).unwrap();
        io.read_blocks(1, 4, 8, &mut output).unwrap();

        assert_eq!(input, output);
    }

    #[test]
    fn test_read_past_end_fails() {
        let mut file = tempfile().unwrap();
        let mut io = StdBlockIO::new(&mut file);

        io.write_at(0, &[0u8; 16]).unwrap();

        let mut output = [0u8; 8];
        assert!(io.read_at(12, &mut output).is_err());
    }

    #[test]
    fn test_zero_fill() {
        let mut file = tempfile().unwrap();
        let mut io = StdBlockIO::new(&mut file);

        io.write_at(42, &[0xFF; 8]).unwrap();
        io.zero_fill(42, 8).unwrap();

        let mut buf = [0xAA; 8];
        io.read_at(42, &mut buf).unwrap();

        assert_eq!(buf, [0u8; 8]);
    }
}
