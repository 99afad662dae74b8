use crate::error::Result;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

/// Upper bound on bytes read back from a lock file.
///
/// A `u64` offset is at most 20 decimal digits, so anything longer than
/// this is not a value we wrote.
pub const LOCK_READ_MAX: u64 = 64;

/// Reads a persisted byte offset from a lock file.
///
/// The file holds a single decimal ASCII integer. Errors (missing file,
/// non-numeric content) are returned to the caller, which normally falls
/// back to offset 0.
pub fn read_offset<P: AsRef<Path>>(path: P) -> Result<u64> {
    let mut content = String::new();
    File::open(path)?
        .take(LOCK_READ_MAX)
        .read_to_string(&mut content)?;
    Ok(content.trim().parse::<u64>()?)
}

/// Persists a byte offset to a lock file, truncating previous content.
pub fn write_offset<P: AsRef<Path>>(path: P, offset: u64) -> Result<()> {
    fs::write(path, offset.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.lock");
        write_offset(&path, 376).unwrap();
        assert_eq!(read_offset(&path).unwrap(), 376);

        // Rewriting a shorter value must not leave stale digits behind
        write_offset(&path, 8).unwrap();
        assert_eq!(read_offset(&path).unwrap(), 8);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_offset(dir.path().join("absent.lock")).is_err());
    }

    #[test]
    fn test_non_numeric_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.lock");
        std::fs::write(&path, "not-an-offset").unwrap();
        assert!(read_offset(&path).is_err());
    }

    #[test]
    fn test_oversized_content_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.lock");
        std::fs::write(&path, "1".repeat(100)).unwrap();
        assert!(read_offset(&path).is_err());
    }

    #[quickcheck]
    fn prop_round_trip(offset: u64) -> bool {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.lock");
        write_offset(&path, offset).unwrap();
        read_offset(&path).unwrap() == offset
    }
}
