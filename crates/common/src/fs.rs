//! Atomic file writes.
//!
//! `treb-registry` persists several JSON files that must never be observed
//! half-written (§4.9 invariant 3: "write to sibling `<file>.tmp` then
//! rename-overwrite atomically"). This is the one place that dance is
//! implemented so every caller gets the same crash-safety guarantee.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `<file>.tmp` next to `path`, matching §4.9's "write to sibling `<file>.tmp`".
fn sibling_tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `contents` to `path` via a sibling temp file + rename so a reader
/// never observes a partially written file, and a crash between the write and
/// the rename leaves the original `path` untouched.
///
/// Returns a plain `io::Result` rather than this crate's own `Result`: every
/// caller across the workspace has its own `thiserror` enum with a
/// `#[from] std::io::Error` arm, so `?` converts directly without this crate's
/// `CommonError` getting in the way.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let tmp_path = sibling_tmp_path(path);
    {
        let mut file = std::fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.flush()?;
        file.sync_all()?;
    }
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Removes any stale `.tmp` files left behind by an interrupted
/// [`atomic_write`] (crash between create and persist). Safe to call on every
/// startup: a leftover temp file is never the current value of anything.
pub fn clean_stale_tmp_files(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("tmp") {
            let _ = std::fs::remove_file(&path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_write_creates_file_with_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.json");
        atomic_write(&path, b"{\"a\":1}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn atomic_write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.json");
        atomic_write(&path, b"first").unwrap();
        atomic_write(&path, b"second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn clean_stale_tmp_files_removes_only_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("keep.json"), "x").unwrap();
        std::fs::write(dir.path().join("stale.tmp"), "y").unwrap();
        clean_stale_tmp_files(dir.path()).unwrap();
        assert!(dir.path().join("keep.json").exists());
        assert!(!dir.path().join("stale.tmp").exists());
    }
}
