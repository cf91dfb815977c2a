use std::fmt;

/// Errors surfaced by host-facing loading paths (ROM/floppy/RAM-disk
/// loading). Per spec.md §7 these never propagate into the emulation
/// loop itself — a bad load just leaves the affected device in its
/// prior (or default) state and the caller decides what to do.
#[derive(Debug)]
pub enum CoreError {
    /// Boot ROM image is the wrong size for the low-memory shadow region.
    RomSizeMismatch { expected: usize, actual: usize },

    /// Floppy image couldn't be read at all (I/O error from the host).
    Io(std::io::Error),

    /// Floppy image was larger than `FDD_SIZE` and got truncated on load.
    /// Not fatal — recorded as a warning by the caller, not an error.
    FloppyImageTruncated { actual: usize, truncated_to: usize },

    /// RAM-disk snapshot handed to `SET_RAM_DISK` isn't exactly the
    /// 512 KiB region size.
    RamDiskSizeMismatch { expected: usize, actual: usize },

    /// Drive index outside `0..4` passed to a mount/dismount request.
    InvalidDriveIndex(u8),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RomSizeMismatch { expected, actual } => {
                write!(f, "boot ROM: expected {expected} bytes, got {actual}")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::FloppyImageTruncated {
                actual,
                truncated_to,
            } => write!(
                f,
                "floppy image truncated from {actual} to {truncated_to} bytes"
            ),
            Self::RamDiskSizeMismatch { expected, actual } => {
                write!(f, "RAM-disk snapshot: expected {expected} bytes, got {actual}")
            }
            Self::InvalidDriveIndex(i) => write!(f, "invalid drive index: {i}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// `{errors, warnings, prints}` bundle spec.md §7 describes for host-facing
/// loading paths. `errors` abort the load; `warnings` are recoverable
/// (e.g. a truncated floppy image still loads, just short); `prints` are
/// purely informational (e.g. "loaded 820 KiB floppy into drive 0").
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<CoreError>,
    pub warnings: Vec<String>,
    pub prints: Vec<String>,
}

impl LoadReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}
