use crate::classifier;
use crate::config::AppConfig;
use crate::conflict::{self, FileDecision, FolderDecision};
use crate::dates::{self, DateBucket};
use crate::transfer::Transferrer;
use glob::Pattern;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// One failed item. Collected per pass and handed to the notifier;
/// never persisted across passes.
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub path: PathBuf,
    pub error: String,
}

/// Outcome counters and failures for one full pass over the source tree.
#[derive(Debug, Default)]
pub struct PassReport {
    pub duration: Duration,
    pub files_transferred: usize,
    pub files_replaced: usize,
    pub files_skipped: usize,
    pub files_suppressed: usize,
    pub folders_transferred: usize,
    pub folders_replaced: usize,
    pub folders_skipped: usize,
    pub failures: Vec<FailureRecord>,
}

/// Source folders fully accounted for in the current pass, either
/// transferred or confirmed already present at the destination.
///
/// Containment is a path-segment ancestor check (`Path::starts_with`),
/// not a string prefix: `Foo` must never cover `FooBar`.
#[derive(Debug, Default)]
struct RelocatedSet {
    paths: Vec<PathBuf>,
}

impl RelocatedSet {
    fn insert(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    fn covers(&self, path: &Path) -> bool {
        self.paths.iter().any(|member| path.starts_with(member))
    }
}

#[derive(Default)]
struct PassState {
    relocated: RelocatedSet,
    report: PassReport,
}

/// Drives one reconciliation pass: traversal, classification, date
/// bucketing, conflict decisions and transfers, with per-item failure
/// accumulation. All per-pass state lives in the returned [`PassReport`]
/// and a pass-local relocated set; the organizer itself is stateless
/// between passes.
pub struct Organizer {
    config: AppConfig,
    transferrer: Transferrer,
    ignore_patterns: Vec<Pattern>,
}

impl Organizer {
    pub fn new(config: AppConfig) -> Self {
        let transferrer = Transferrer::new(config.mode, config.permissions);
        let ignore_patterns: Vec<Pattern> = config
            .ignore_patterns
            .iter()
            .filter_map(|raw| match Pattern::new(raw) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    error!("Invalid glob pattern '{}': {}", raw, err);
                    None
                }
            })
            .collect();
        Self {
            config,
            transferrer,
            ignore_patterns,
        }
    }

    /// Run one full pass over the source tree. Per-item errors land in
    /// the report; nothing short of a poisoned process aborts a pass.
    pub fn run_pass(&self) -> PassReport {
        info!(
            "Starting file organization pass: {} -> {}",
            self.config.source_dir.display(),
            self.config.dest_dir.display()
        );
        let start = Instant::now();
        let mut state = PassState::default();
        self.process_dir(&self.config.source_dir, &mut state);
        state.report.duration = start.elapsed();
        state.report
    }

    /// Pre-order, depth-first. Child folders are decided before child
    /// files, and descent happens last, so a folder's relocation
    /// decision is always finalized before its descendants come up.
    fn process_dir(&self, dir: &Path, state: &mut PassState) {
        let listing = match list_children(dir) {
            Ok(listing) => listing,
            Err(err) => {
                error!("Error reading directory {}: {}", dir.display(), err);
                state.report.failures.push(FailureRecord {
                    path: dir.to_path_buf(),
                    error: err.to_string(),
                });
                return;
            }
        };

        for folder in &listing.folders {
            if self.is_ignored(folder) {
                debug!("Ignoring folder {}", folder.display());
                continue;
            }
            self.organize_folder(folder, state);
        }

        for file in &listing.files {
            if self.is_ignored(file) {
                debug!("Ignoring file {}", file.display());
                continue;
            }
            if state.relocated.covers(file) {
                // Whole-folder relocation already accounts for this
                // file; no decision, no per-file log.
                state.report.files_suppressed += 1;
                continue;
            }
            self.organize_file(file, state);
        }

        for folder in &listing.folders {
            if self.is_ignored(folder) || state.relocated.covers(folder) {
                continue;
            }
            self.process_dir(folder, state);
        }
    }

    fn organize_folder(&self, folder: &Path, state: &mut PassState) {
        let oldest = match dates::oldest_mtime(folder) {
            Ok(oldest) => oldest,
            Err(err) => {
                error!("Error resolving age of folder {}: {}", folder.display(), err);
                state.report.failures.push(FailureRecord {
                    path: folder.to_path_buf(),
                    error: err.to_string(),
                });
                return;
            }
        };
        let bucket = DateBucket::from_mtime(oldest);

        let Some(folder_name) = folder.file_name() else {
            debug!("Folder {} has no name component, skipping", folder.display());
            return;
        };
        let dest_path = self
            .config
            .dest_dir
            .join(&bucket.year)
            .join("Folders")
            .join(folder_name);

        let decision = match conflict::decide_folder(oldest, &dest_path) {
            Ok(decision) => decision,
            Err(err) => {
                error!("Error inspecting {}: {}", dest_path.display(), err);
                state.report.failures.push(FailureRecord {
                    path: folder.to_path_buf(),
                    error: err.to_string(),
                });
                return;
            }
        };

        match decision {
            FolderDecision::SkipPresent => {
                info!(
                    "Skipping folder {} -> {} (destination is newer or same).",
                    folder.display(),
                    dest_path.display()
                );
                state.relocated.insert(folder);
                state.report.folders_skipped += 1;
            }
            FolderDecision::Replace => {
                info!("Replacing folder {} with newer version.", folder.display());
                if let Err(err) = fs::remove_dir_all(&dest_path) {
                    error!(
                        "Error removing stale folder {}: {}",
                        dest_path.display(),
                        err
                    );
                    state.report.failures.push(FailureRecord {
                        path: folder.to_path_buf(),
                        error: err.to_string(),
                    });
                    return;
                }
                self.do_folder_transfer(folder, &dest_path, state, true);
            }
            FolderDecision::Transfer => {
                info!(
                    "Organizing folder {} -> {}",
                    folder.display(),
                    dest_path.display()
                );
                self.do_folder_transfer(folder, &dest_path, state, false);
            }
        }
    }

    fn do_folder_transfer(
        &self,
        folder: &Path,
        dest_path: &Path,
        state: &mut PassState,
        replaced: bool,
    ) {
        match self.transferrer.transfer_folder(folder, dest_path) {
            Ok(()) => {
                state.relocated.insert(folder);
                if replaced {
                    state.report.folders_replaced += 1;
                } else {
                    state.report.folders_transferred += 1;
                }
            }
            Err(err) => {
                error!("Error moving folder {}: {}", folder.display(), err);
                state.report.failures.push(FailureRecord {
                    path: folder.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    fn organize_file(&self, file: &Path, state: &mut PassState) {
        let Some(file_name) = file.file_name() else {
            debug!("File {} has no name component, skipping", file.display());
            return;
        };
        let category = classifier::classify(&file_name.to_string_lossy());

        let (mtime, size) = match fs::metadata(file).and_then(|m| m.modified().map(|t| (t, m.len()))) {
            Ok(facts) => facts,
            Err(err) => {
                error!("Error reading metadata for {}: {}", file.display(), err);
                state.report.failures.push(FailureRecord {
                    path: file.to_path_buf(),
                    error: err.to_string(),
                });
                return;
            }
        };
        let bucket = DateBucket::from_mtime(mtime);

        let dest_path = self
            .config
            .dest_dir
            .join(&bucket.year)
            .join(&bucket.month)
            .join(category.as_str())
            .join(file_name);

        let decision = match conflict::decide_file(file, mtime, size, &dest_path) {
            Ok(decision) => decision,
            Err(err) => {
                error!("Error inspecting {}: {}", dest_path.display(), err);
                state.report.failures.push(FailureRecord {
                    path: file.to_path_buf(),
                    error: err.to_string(),
                });
                return;
            }
        };

        match decision {
            FileDecision::SkipNewer => {
                info!(
                    "Skipping {} -> {} (destination is newer or same).",
                    file.display(),
                    dest_path.display()
                );
                state.report.files_skipped += 1;
            }
            FileDecision::SkipDuplicate => {
                info!(
                    "Skipping duplicate {} -> {} (same content).",
                    file.display(),
                    dest_path.display()
                );
                state.report.files_skipped += 1;
            }
            FileDecision::Replace => {
                info!(
                    "Replacing {} with newer version at {}.",
                    file.display(),
                    dest_path.display()
                );
                self.do_file_transfer(file, &dest_path, state, true);
            }
            FileDecision::Transfer => {
                info!("Organizing {} -> {}", file.display(), dest_path.display());
                self.do_file_transfer(file, &dest_path, state, false);
            }
        }
    }

    fn do_file_transfer(&self, file: &Path, dest_path: &Path, state: &mut PassState, replaced: bool) {
        match self.transferrer.transfer_file(file, dest_path) {
            Ok(()) => {
                if replaced {
                    state.report.files_replaced += 1;
                } else {
                    state.report.files_transferred += 1;
                }
            }
            Err(err) => {
                error!(
                    "Error moving {} to {}: {}",
                    file.display(),
                    dest_path.display(),
                    err
                );
                state.report.failures.push(FailureRecord {
                    path: file.to_path_buf(),
                    error: err.to_string(),
                });
            }
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }
}

struct DirListing {
    folders: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

/// Child folders and files of `dir`, sorted by name so pass order is
/// deterministic. Symlinks are skipped: link semantics are undefined
/// for organization, and following them can escape the source tree.
fn list_children(dir: &Path) -> io::Result<DirListing> {
    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_symlink() {
            debug!("Skipping symlink {}", entry.path().display());
            continue;
        }
        if file_type.is_dir() {
            folders.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    folders.sort();
    files.sort();
    Ok(DirListing { folders, files })
}
