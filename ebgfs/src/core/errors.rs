// SPDX-License-Identifier: MIT

use core::fmt;

pub use ebgio::errors::*;

use crate::core::utils::bitmap::BitmapKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenError {
    IO(BlockIOError),
    BadMagic,
    Unsupported(&'static str),
    Corrupted(&'static str),
    Invalid(&'static str),
    Other(&'static str),
}

impl OpenError {
    pub fn msg(&self) -> &'static str {
        match self {
            OpenError::IO(_) => "IO error",
            OpenError::BadMagic => "Bad superblock magic",
            OpenError::Unsupported(msg) => msg,
            OpenError::Corrupted(msg) => msg,
            OpenError::Invalid(msg) => msg,
            OpenError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            OpenError::IO(e) => Some(FsError::IO(e.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitmapIoError {
    IO(BlockIOError),
    ReadFailed {
        kind: BitmapKind,
        group: u32,
        source: BlockIOError,
    },
    WriteFailed {
        kind: BitmapKind,
        group: u32,
        source: BlockIOError,
    },
    ReadOnlyFilesystem,
    ImageUnsupported(BitmapKind),
    OutOfMemory,
    Invalid(&'static str),
    Other(&'static str),
}

impl BitmapIoError {
    pub fn msg(&self) -> &'static str {
        match self {
            BitmapIoError::IO(_) => "IO error",
            BitmapIoError::ReadFailed { .. } => "Failed to read bitmap block",
            BitmapIoError::WriteFailed { .. } => "Failed to write bitmap block",
            BitmapIoError::ReadOnlyFilesystem => "Filesystem opened read-only",
            BitmapIoError::ImageUnsupported(_) => "Bitmap kind has no image representation",
            BitmapIoError::OutOfMemory => "Out of memory",
            BitmapIoError::Invalid(msg) => msg,
            BitmapIoError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            BitmapIoError::IO(e) => Some(FsError::IO(e.clone())),
            BitmapIoError::ReadFailed { source, .. } => Some(FsError::IO(source.clone())),
            BitmapIoError::WriteFailed { source, .. } => Some(FsError::IO(source.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for BitmapIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        match self {
            BitmapIoError::ReadFailed { kind, group, .. }
            | BitmapIoError::WriteFailed { kind, group, .. } => {
                write!(f, " ({} bitmap, group {})", kind, group)?;
            }
            BitmapIoError::ImageUnsupported(kind) => {
                write!(f, " ({} bitmap)", kind)?;
            }
            _ => {}
        }
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UninitError {
    IO(BlockIOError),
    FeatureUnsupported,
    StartOutOfRange { start: u32, last: u32 },
    EndOutOfRange { end: u32, start: u32, last: u32 },
    Other(&'static str),
}

impl UninitError {
    pub fn msg(&self) -> &'static str {
        match self {
            UninitError::IO(_) => "IO error",
            UninitError::FeatureUnsupported => "Filesystem lacks the group checksum feature",
            UninitError::StartOutOfRange { .. } => "Start group out of range",
            UninitError::EndOutOfRange { .. } => "End group out of range",
            UninitError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            UninitError::IO(e) => Some(FsError::IO(e.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for UninitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        match self {
            UninitError::StartOutOfRange { start, last } => {
                write!(f, " (group {}, expected 1..={})", start, last)?;
            }
            UninitError::EndOutOfRange { end, start, last } => {
                write!(f, " (group {}, expected {}..={})", end, start, last)?;
            }
            _ => {}
        }
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckError {
    IO(BlockIOError),
    CorruptDescriptor(u32),
    Invalid(&'static str),
    Other(&'static str),
}

impl CheckError {
    pub fn msg(&self) -> &'static str {
        match self {
            CheckError::IO(_) => "IO error",
            CheckError::CorruptDescriptor(_) => "Group descriptor checksum mismatch",
            CheckError::Invalid(msg) => msg,
            CheckError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            CheckError::IO(e) => Some(FsError::IO(e.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        if let CheckError::CorruptDescriptor(group) = self {
            write!(f, " (group {})", group)?;
        }
        let mut current = self.source();
        while let Some(src) = current {
            write!(f, "\n  caused by: {}", src.msg())?;
            current = src.source();
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountError {
    Indeterminate,
    MountedReadWrite,
    Other(&'static str),
}

impl MountError {
    pub fn msg(&self) -> &'static str {
        match self {
            MountError::Indeterminate => "Unable to determine mount state",
            MountError::MountedReadWrite => "Filesystem is mounted read-write",
            MountError::Other(msg) => msg,
        }
    }
}

impl fmt::Display for MountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.msg())?;
        Ok(())
    }
}

/// Top-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    IO(BlockIOError),
    Open(OpenError),
    Bitmap(BitmapIoError),
    Uninit(UninitError),
    Check(CheckError),
    Mount(MountError),
    Other(&'static str),
}

impl FsError {
    pub fn msg(&self) -> &'static str {
        match self {
            FsError::IO(e) => e.msg(),
            FsError::Open(e) => e.msg(),
            FsError::Bitmap(e) => e.msg(),
            FsError::Uninit(e) => e.msg(),
            FsError::Check(e) => e.msg(),
            FsError::Mount(e) => e.msg(),
            FsError::Other(msg) => msg,
        }
    }

    pub fn source(&self) -> Option<FsError> {
        match self {
            FsError::Open(e) => e.source(),
            FsError::Bitmap(e) => e.source(),
            FsError::Uninit(e) => e.source(),
            FsError::Check(e) => e.source(),
            FsError::IO(_) => None,
            FsError::Mount(_) => None,
            FsError::Other(_) => None,
        }
    }
}

impl fmt::Display for FsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Each sub-error renders its own detail and cause chain.
        match self {
            FsError::IO(e) => write!(f, "{e}"),
            FsError::Open(e) => write!(f, "{e}"),
            FsError::Bitmap(e) => write!(f, "{e}"),
            FsError::Uninit(e) => write!(f, "{e}"),
            FsError::Check(e) => write!(f, "{e}"),
            FsError::Mount(e) => write!(f, "{e}"),
            FsError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

// === type *Result ===

pub type FsResult<T = ()> = Result<T, FsError>;
pub type OpenResult<T = ()> = Result<T, OpenError>;
pub type BitmapIoResult<T = ()> = Result<T, BitmapIoError>;
pub type UninitResult<T = ()> = Result<T, UninitError>;
pub type CheckResult<T = ()> = Result<T, CheckError>;
pub type MountResult<T = ()> = Result<T, MountError>;

crate::fs_error_wiring! {
    top => FsError {
        BlockIOError  : IO,
        OpenError     : Open,
        BitmapIoError : Bitmap,
        UninitError   : Uninit,
        CheckError    : Check,
        MountError    : Mount,
    },
    str_into => [
        OpenError,
        BitmapIoError,
        UninitError,
        CheckError,
        MountError,
    ],
    sub => {
        BlockIOError => [ OpenError::IO, BitmapIoError::IO, UninitError::IO, CheckError::IO ],
    },
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_display() {
        let low = BlockIOError::OutOfBounds;
        let read = BitmapIoError::ReadFailed {
            kind: BitmapKind::Block,
            group: 7,
            source: low,
        };
        let top = FsError::Bitmap(read);

        let rendered = format!("{top}");
        assert!(rendered.contains("block bitmap, group 7"));
        assert!(rendered.contains("caused by: Out of bounds"));
    }

    #[test]
    fn test_range_error_display() {
        let err = UninitError::EndOutOfRange {
            end: 9,
            start: 2,
            last: 7,
        };
        assert_eq!(format!("{err}"), "End group out of range (group 9, expected 2..=7)");
    }

    #[test]
    fn test_str_conversion() {
        let err: BitmapIoError = "scratch buffer too small".into();
        assert_eq!(err, BitmapIoError::Other("scratch buffer too small"));

        let top: FsError = BlockIOError::OutOfBounds.into();
        assert!(matches!(top, FsError::IO(BlockIOError::OutOfBounds)));
    }
}
