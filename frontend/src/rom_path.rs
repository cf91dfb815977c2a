//! Boot ROM / floppy image loading from host paths.
//!
//! Grounded on the teacher's own ROM-path resolution shape (a thin
//! `std::fs::read` wrapper reporting I/O failures through the same error
//! type the core uses for in-band load failures) but trimmed down: the
//! Vector-06C board takes one boot ROM file and up to four raw CHS floppy
//! images directly off disk, not a MAME-style ROM set or ZIP archive.

use std::path::Path;
use vector06c_core::error::CoreError;

/// Reads a file into memory, wrapping I/O failures in [`CoreError`] so
/// callers can fold them into the same `{errors, warnings, prints}`
/// reporting the core itself uses (spec.md §7).
pub fn read_image(path: &Path) -> Result<Vec<u8>, CoreError> {
    std::fs::read(path).map_err(CoreError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_an_existing_file() {
        let dir = std::env::temp_dir().join("vector06c_rom_path_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("boot.rom");
        std::fs::write(&path, [0xAAu8; 64]).unwrap();

        let data = read_image(&path).unwrap();
        assert_eq!(data, vec![0xAAu8; 64]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let path = Path::new("/nonexistent/path/does-not-exist.rom");
        assert!(matches!(read_image(path), Err(CoreError::Io(_))));
    }
}
