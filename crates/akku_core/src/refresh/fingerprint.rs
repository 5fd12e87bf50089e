//! Content fingerprints for staleness detection.
//!
//! A file source is hashed over its bytes. A directory source is hashed over
//! each regular file directly inside it, in file-name order: relative path,
//! then length-prefixed content. Nested directories are not read by any
//! parser and are not covered.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Computes the hex-encoded SHA-256 fingerprint of a file or directory.
pub fn fingerprint_path(path: &Path) -> io::Result<String> {
    if fs::metadata(path)?.is_dir() {
        fingerprint_directory(path)
    } else {
        Ok(hex::encode(Sha256::digest(fs::read(path)?)))
    }
}

fn fingerprint_directory(root: &Path) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();

    for item in walker {
        let item = item.map_err(io::Error::from)?;
        // Same test the archive parser applies: links count by their target.
        if !item.path().is_file() {
            continue;
        }
        let relative = item.path().strip_prefix(root).unwrap_or(item.path());
        let content = fs::read(item.path())?;

        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::fingerprint_path;
    use std::fs;

    #[test]
    fn file_fingerprint_is_stable_and_byte_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.org");
        fs::write(&path, "* Log\n- [2020-01-01] a").unwrap();

        let first = fingerprint_path(&path).unwrap();
        assert_eq!(first, fingerprint_path(&path).unwrap());
        assert_eq!(first.len(), 64);

        fs::write(&path, "* Log\n- [2020-01-01] b").unwrap();
        assert_ne!(first, fingerprint_path(&path).unwrap());
    }

    #[test]
    fn directory_fingerprint_covers_names_and_content() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("20200101"), "one").unwrap();
        fs::write(dir.path().join("20200102"), "two").unwrap();
        let first = fingerprint_path(dir.path()).unwrap();
        assert_eq!(first, fingerprint_path(dir.path()).unwrap());

        fs::rename(dir.path().join("20200102"), dir.path().join("20200103")).unwrap();
        let renamed = fingerprint_path(dir.path()).unwrap();
        assert_ne!(first, renamed);

        fs::write(dir.path().join("20200101"), "onf").unwrap();
        assert_ne!(renamed, fingerprint_path(dir.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn directory_fingerprint_follows_linked_day_files() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("monday.org");
        fs::write(&target, "* day\nv1").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("20220301.org")).unwrap();
        std::os::unix::fs::symlink(outside.path().join("gone.org"), dir.path().join("20220302.org"))
            .unwrap();

        let before = fingerprint_path(dir.path()).unwrap();
        fs::write(&target, "* day\nv2").unwrap();
        assert_ne!(before, fingerprint_path(dir.path()).unwrap());
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(fingerprint_path(&dir.path().join("absent.org")).is_err());
    }
}
