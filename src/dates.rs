use chrono::{DateTime, Local};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// The (year, month) destination grouping derived for an item.
///
/// `year` is four digits, `month` the full unabbreviated English month
/// name ("January"), both rendered in the local timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateBucket {
    pub year: String,
    pub month: String,
}

impl DateBucket {
    pub fn from_mtime(mtime: SystemTime) -> DateBucket {
        let dt: DateTime<Local> = DateTime::from(mtime);
        DateBucket {
            year: dt.format("%Y").to_string(),
            month: dt.format("%B").to_string(),
        }
    }
}

/// Modification time of a single file (or folder) on disk.
pub fn mtime_of(path: &Path) -> io::Result<SystemTime> {
    std::fs::metadata(path)?.modified()
}

/// The earliest modification time among all files under `folder`,
/// recursively. A folder's "age" should reflect its oldest content, so
/// folders assembled from long-held files land in the period they
/// originated from, not when they were last touched. A folder with no
/// files at all falls back to its own mtime.
pub fn oldest_mtime(folder: &Path) -> io::Result<SystemTime> {
    let mut oldest: Option<SystemTime> = None;

    for entry in WalkDir::new(folder) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("Skipping unreadable entry under {}: {}", folder.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(err) => {
                debug!("No metadata for {}: {}", entry.path().display(), err);
                continue;
            }
        };
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(err) => {
                debug!("No mtime for {}: {}", entry.path().display(), err);
                continue;
            }
        };
        oldest = Some(match oldest {
            Some(current) if current <= modified => current,
            _ => modified,
        });
    }

    match oldest {
        Some(t) => Ok(t),
        None => mtime_of(folder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;
    use std::fs;
    use std::time::Duration;

    fn secs(epoch: i64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(epoch as u64)
    }

    #[test]
    fn test_bucket_formatting() {
        // 2019-03-15 12:00:00 UTC. The local offset can shift the day,
        // but not out of March for any real-world timezone.
        let bucket = DateBucket::from_mtime(secs(1_552_651_200));
        assert_eq!(bucket.year, "2019");
        assert_eq!(bucket.month, "March");
    }

    #[test]
    fn test_oldest_mtime_picks_earliest_descendant_file() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("Photos2020");
        let nested = root.join("spring");
        fs::create_dir_all(&nested).unwrap();

        let newer = root.join("nov.jpg");
        let older = nested.join("mar.jpg");
        fs::write(&newer, b"nov").unwrap();
        fs::write(&older, b"mar").unwrap();

        // 2019-11-02 vs 2019-03-15
        filetime::set_file_mtime(&newer, FileTime::from_unix_time(1_572_652_800, 0)).unwrap();
        filetime::set_file_mtime(&older, FileTime::from_unix_time(1_552_651_200, 0)).unwrap();

        let oldest = oldest_mtime(&root).unwrap();
        assert_eq!(oldest, secs(1_552_651_200));
        assert_eq!(DateBucket::from_mtime(oldest).year, "2019");
    }

    #[test]
    fn test_oldest_mtime_empty_folder_falls_back_to_own_mtime() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("empty");
        fs::create_dir(&root).unwrap();
        // 2022-06-01
        filetime::set_file_mtime(&root, FileTime::from_unix_time(1_654_041_600, 0)).unwrap();

        let oldest = oldest_mtime(&root).unwrap();
        assert_eq!(DateBucket::from_mtime(oldest).year, "2022");
    }

    #[test]
    fn test_oldest_mtime_ignores_subfolder_mtimes() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("box");
        let sub = root.join("sub");
        fs::create_dir_all(&sub).unwrap();
        let file = sub.join("f.txt");
        fs::write(&file, b"x").unwrap();

        filetime::set_file_mtime(&file, FileTime::from_unix_time(1_600_000_000, 0)).unwrap();
        // Directory mtimes are older than the file, but only files count.
        filetime::set_file_mtime(&sub, FileTime::from_unix_time(1_000_000_000, 0)).unwrap();
        filetime::set_file_mtime(&root, FileTime::from_unix_time(1_000_000_000, 0)).unwrap();

        assert_eq!(oldest_mtime(&root).unwrap(), secs(1_600_000_000));
    }
}
