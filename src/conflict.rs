use crate::hasher;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::warn;

/// Outcome of reconciling a source file against the destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileDecision {
    /// Nothing occupies the destination path.
    Transfer,
    /// Destination is newer than (or as new as) the source.
    SkipNewer,
    /// Same size and content; likely the same file re-copied with a
    /// touched mtime. Dedupe wins over apparent freshness.
    SkipDuplicate,
    /// Source is newer and the content genuinely differs.
    Replace,
}

/// Outcome of reconciling a source folder against the destination slot.
/// Folders are judged on mtime alone; hashing a whole tree costs too
/// much to be worth it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderDecision {
    Transfer,
    /// Destination is at least as new; content presumed already present.
    SkipPresent,
    /// Destination is stale: remove its tree, then transfer.
    Replace,
}

pub fn decide_file(
    src: &Path,
    src_mtime: SystemTime,
    src_size: u64,
    dest: &Path,
) -> io::Result<FileDecision> {
    let dest_metadata = match fs::metadata(dest) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(FileDecision::Transfer),
        Err(err) => return Err(err),
    };

    if dest_metadata.modified()? >= src_mtime {
        return Ok(FileDecision::SkipNewer);
    }
    if dest_metadata.len() != src_size {
        return Ok(FileDecision::Replace);
    }
    // Sizes match; only byte-identical content suppresses the replace.
    if hashes_match(src, dest) {
        Ok(FileDecision::SkipDuplicate)
    } else {
        Ok(FileDecision::Replace)
    }
}

pub fn decide_folder(oldest_mtime: SystemTime, dest: &Path) -> io::Result<FolderDecision> {
    let dest_metadata = match fs::metadata(dest) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(FolderDecision::Transfer),
        Err(err) => return Err(err),
    };

    if dest_metadata.modified()? >= oldest_mtime {
        Ok(FolderDecision::SkipPresent)
    } else {
        Ok(FolderDecision::Replace)
    }
}

/// An unreadable file on either side counts as "no match", biasing the
/// decision toward Replace instead of halting the pass.
fn hashes_match(src: &Path, dest: &Path) -> bool {
    let src_hash = match hasher::content_hash(src) {
        Ok(hash) => hash,
        Err(err) => {
            warn!("Could not hash {}: {}", src.display(), err);
            return false;
        }
    };
    let dest_hash = match hasher::content_hash(dest) {
        Ok(hash) => hash,
        Err(err) => {
            warn!("Could not hash {}: {}", dest.display(), err);
            return false;
        }
    };
    src_hash == dest_hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::time::Duration;

    fn pin(path: &Path, epoch: i64) {
        filetime::set_file_mtime(path, FileTime::from_unix_time(epoch, 0)).unwrap();
    }

    fn at(epoch: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(epoch)
    }

    #[test]
    fn test_absent_destination_transfers() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        fs::write(&src, b"x").unwrap();

        let decision =
            decide_file(&src, at(1_600_000_000), 1, &tmp.path().join("dest/a.txt")).unwrap();
        assert_eq!(decision, FileDecision::Transfer);
    }

    #[test]
    fn test_newer_destination_skips() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();
        pin(&dest, 1_700_000_000);

        let decision = decide_file(&src, at(1_600_000_000), 3, &dest).unwrap();
        assert_eq!(decision, FileDecision::SkipNewer);

        // Equal mtimes also skip.
        let decision = decide_file(&src, at(1_700_000_000), 3, &dest).unwrap();
        assert_eq!(decision, FileDecision::SkipNewer);
    }

    #[test]
    fn test_stale_destination_different_size_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, b"longer content").unwrap();
        fs::write(&dest, b"tiny").unwrap();
        pin(&dest, 1_500_000_000);

        let decision = decide_file(&src, at(1_600_000_000), 14, &dest).unwrap();
        assert_eq!(decision, FileDecision::Replace);
    }

    #[test]
    fn test_identical_content_dedupes_despite_newer_source() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, b"same bytes").unwrap();
        fs::write(&dest, b"same bytes").unwrap();
        pin(&dest, 1_500_000_000);

        let decision = decide_file(&src, at(1_600_000_000), 10, &dest).unwrap();
        assert_eq!(decision, FileDecision::SkipDuplicate);
    }

    #[test]
    fn test_same_size_different_content_replaces() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.txt");
        let dest = tmp.path().join("b.txt");
        fs::write(&src, b"same length A").unwrap();
        fs::write(&dest, b"same length B").unwrap();
        pin(&dest, 1_500_000_000);

        let decision = decide_file(&src, at(1_600_000_000), 13, &dest).unwrap();
        assert_eq!(decision, FileDecision::Replace);
    }

    #[test]
    fn test_unreadable_source_biases_to_replace() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("ghost.txt"); // never created
        let dest = tmp.path().join("b.txt");
        fs::write(&dest, b"ten bytes!").unwrap();
        pin(&dest, 1_500_000_000);

        let decision = decide_file(&src, at(1_600_000_000), 10, &dest).unwrap();
        assert_eq!(decision, FileDecision::Replace);
    }

    #[test]
    fn test_folder_decisions() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join("Folders/box");

        assert_eq!(
            decide_folder(at(1_600_000_000), &dest).unwrap(),
            FolderDecision::Transfer
        );

        fs::create_dir_all(&dest).unwrap();
        pin(&dest, 1_700_000_000);
        assert_eq!(
            decide_folder(at(1_600_000_000), &dest).unwrap(),
            FolderDecision::SkipPresent
        );

        pin(&dest, 1_500_000_000);
        assert_eq!(
            decide_folder(at(1_600_000_000), &dest).unwrap(),
            FolderDecision::Replace
        );
    }
}
