use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// What to do with filesystem permissions after a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionPolicy {
    /// Keep whatever permissions the transfer produced.
    Preserve,
    /// Files 0o444, directories 0o555.
    ReadOnly,
    /// Files 0o666, directories 0o777.
    ReadWrite,
    /// Everything 0o777.
    Full,
}

impl PermissionPolicy {
    /// Parse the `PERMISSIONS` setting. Unknown values warn and fall
    /// back to `Preserve`; a bad value is never fatal.
    pub fn parse_lenient(raw: &str) -> PermissionPolicy {
        match raw.to_lowercase().as_str() {
            "original" | "preserve" => PermissionPolicy::Preserve,
            "read" => PermissionPolicy::ReadOnly,
            "write" => PermissionPolicy::ReadWrite,
            "full" => PermissionPolicy::Full,
            other => {
                warn!("Invalid PERMISSIONS value: {}. Using 'original'.", other);
                PermissionPolicy::Preserve
            }
        }
    }

    /// (file_mode, dir_mode) for the policy; `None` means leave alone.
    fn modes(&self) -> Option<(u32, u32)> {
        match self {
            PermissionPolicy::Preserve => None,
            PermissionPolicy::ReadOnly => Some((0o444, 0o555)),
            PermissionPolicy::ReadWrite => Some((0o666, 0o777)),
            PermissionPolicy::Full => Some((0o777, 0o777)),
        }
    }
}

/// Apply `policy` to a just-transferred file or folder tree, descendants
/// first, then the root itself. Failures are logged and swallowed: the
/// transfer already succeeded and is never rolled back over a chmod.
pub fn apply(policy: PermissionPolicy, target: &Path) {
    let Some((file_mode, dir_mode)) = policy.modes() else {
        debug!("Preserving original permissions for {}", target.display());
        return;
    };

    if let Err(err) = apply_modes(target, file_mode, dir_mode) {
        warn!(
            "Failed to set permissions for {}: {}",
            target.display(),
            err
        );
    }
}

#[cfg(unix)]
fn apply_modes(target: &Path, file_mode: u32, dir_mode: u32) -> std::io::Result<()> {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let chmod = |path: &Path, mode: u32| -> std::io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    };

    if target.is_dir() {
        // contents_first so children are still traversable while their
        // parent keeps its original mode.
        for entry in WalkDir::new(target).contents_first(true) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.path() == target {
                continue;
            }
            let mode = if entry.file_type().is_dir() {
                dir_mode
            } else {
                file_mode
            };
            chmod(entry.path(), mode)?;
        }
        chmod(target, dir_mode)?;
    } else {
        chmod(target, file_mode)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn apply_modes(target: &Path, _file_mode: u32, _dir_mode: u32) -> std::io::Result<()> {
    debug!(
        "Permission policies are a no-op on this platform ({})",
        target.display()
    );
    Ok(())
}
