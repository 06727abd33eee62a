use crate::permissions::{self, PermissionPolicy};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Move removes the source after a successful transfer; Copy keeps it
/// and preserves metadata (mtime) on the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferMode {
    Move,
    Copy,
}

/// Performs the physical relocation of files and folder trees.
///
/// Destination parent directories are created as needed. After a
/// successful transfer the configured [`PermissionPolicy`] is applied
/// to the destination; permission failures are logged inside
/// [`permissions::apply`] and never fail the transfer.
pub struct Transferrer {
    mode: TransferMode,
    policy: PermissionPolicy,
}

impl Transferrer {
    pub fn new(mode: TransferMode, policy: PermissionPolicy) -> Self {
        Self { mode, policy }
    }

    pub fn transfer_file(&self, src: &Path, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        match self.mode {
            TransferMode::Move => move_path(src, dest)?,
            TransferMode::Copy => copy_file(src, dest)?,
        }
        permissions::apply(self.policy, dest);
        Ok(())
    }

    pub fn transfer_folder(&self, src: &Path, dest: &Path) -> io::Result<()> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        match self.mode {
            TransferMode::Move => move_path(src, dest)?,
            TransferMode::Copy => copy_tree(src, dest)?,
        }
        permissions::apply(self.policy, dest);
        Ok(())
    }
}

/// Rename, falling back to copy-then-delete when the destination is on
/// another device (rename cannot cross filesystems).
fn move_path(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(err) => {
            debug!(
                "Rename {} -> {} failed ({}), falling back to copy and delete",
                src.display(),
                dest.display(),
                err
            );
            if src.is_dir() {
                copy_tree(src, dest)?;
                fs::remove_dir_all(src)
            } else {
                copy_file(src, dest)?;
                fs::remove_file(src)
            }
        }
    }
}

/// Copy bytes and permissions, then pin the source mtime onto the
/// destination so date bucketing stays stable across re-copies.
fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
    fs::copy(src, dest)?;
    let metadata = fs::metadata(src)?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&metadata))
}

fn copy_tree(src: &Path, dest: &Path) -> io::Result<()> {
    fs::create_dir_all(dest)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target = dest.join(entry.file_name());

        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else if file_type.is_file() {
            copy_file(&entry.path(), &target)?;
        } else {
            debug!("Skipping symlink {}", entry.path().display());
        }
    }

    // Children first, then the directory's own mtime.
    let metadata = fs::metadata(src)?;
    filetime::set_file_mtime(dest, FileTime::from_last_modification_time(&metadata))
}
