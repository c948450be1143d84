use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;

/// What a sweep removed, and what it could not.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Files deleted.
    pub files_removed: u64,
    /// Bytes reclaimed by deleted files.
    pub bytes_freed: u64,
    /// Empty directories pruned after deletion.
    pub dirs_removed: u64,
    /// Per-entry failures; none of them stopped the sweep.
    pub errors: Vec<String>,
}

/// Delete files under `root` last modified at or before `now - max_age`.
///
/// A missing root is a no-op. Every per-entry error is logged and recorded in the report;
/// the remaining entries are still visited. A directory below `root` is pruned when it ends up
/// empty and was itself last modified at or before the cutoff, so freshly created directories
/// of an in-flight render survive. `root` itself is kept.
#[tracing::instrument(skip(root, max_age), fields(root = %root.display(), max_age_secs = max_age.as_secs()))]
pub fn sweep(root: &Path, max_age: Duration) -> SweepReport {
    let mut report = SweepReport::default();
    if !root.exists() {
        tracing::debug!("sweep root does not exist");
        return report;
    }
    let cutoff = SystemTime::now()
        .checked_sub(max_age)
        .unwrap_or(SystemTime::UNIX_EPOCH);
    sweep_dir(root, cutoff, &mut report, true);
    tracing::info!(
        files_removed = report.files_removed,
        bytes_freed = report.bytes_freed,
        errors = report.errors.len(),
        "sweep finished"
    );
    report
}

/// Run [`sweep`] on a detached thread. The outcome is only logged.
pub fn spawn_sweep(root: PathBuf, max_age: Duration) {
    let spawned = std::thread::Builder::new()
        .name("scenecast-sweep".to_string())
        .spawn(move || {
            sweep(&root, max_age);
        });
    if let Err(e) = spawned {
        tracing::warn!("failed to start background sweep: {e}");
    }
}

/// Returns `true` when `dir` was removed.
fn sweep_dir(dir: &Path, cutoff: SystemTime, report: &mut SweepReport, is_root: bool) -> bool {
    // Read before visiting children; removing them bumps the directory's mtime.
    let prunable = !is_root && modified_at_or_before(dir, cutoff, report);
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            record(report, dir, &e);
            return false;
        }
    };

    let mut empty = true;
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                record(report, dir, &e);
                empty = false;
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                record(report, &path, &e);
                empty = false;
                continue;
            }
        };

        if file_type.is_dir() {
            if !sweep_dir(&path, cutoff, report, false) {
                empty = false;
            }
            continue;
        }

        if !remove_if_expired(&path, cutoff, report) {
            empty = false;
        }
    }

    if !(empty && prunable) {
        return false;
    }
    match std::fs::remove_dir(dir) {
        Ok(()) => {
            report.dirs_removed += 1;
            true
        }
        Err(e) => {
            record(report, dir, &e);
            false
        }
    }
}

fn modified_at_or_before(path: &Path, cutoff: SystemTime, report: &mut SweepReport) -> bool {
    match std::fs::symlink_metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified <= cutoff,
        Err(e) => {
            record(report, path, &e);
            false
        }
    }
}

/// Returns `true` when the entry was removed.
fn remove_if_expired(path: &Path, cutoff: SystemTime, report: &mut SweepReport) -> bool {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            record(report, path, &e);
            return false;
        }
    };
    let modified = match meta.modified() {
        Ok(t) => t,
        Err(e) => {
            record(report, path, &e);
            return false;
        }
    };
    if modified > cutoff {
        return false;
    }
    match std::fs::remove_file(path) {
        Ok(()) => {
            report.files_removed += 1;
            report.bytes_freed += meta.len();
            tracing::debug!(path = %path.display(), "removed expired artifact");
            true
        }
        Err(e) => {
            record(report, path, &e);
            false
        }
    }
}

fn record(report: &mut SweepReport, path: &Path, err: &std::io::Error) {
    tracing::warn!(path = %path.display(), "sweep skipped entry: {err}");
    report.errors.push(format!("{}: {err}", path.display()));
}

#[cfg(test)]
#[path = "../../tests/unit/retention/sweep.rs"]
mod tests;
