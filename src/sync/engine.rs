use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::catalog::Catalog;
use crate::config::LibrarySettings;
use crate::library::{audio_files, extract};

/// Counters for one synchronization pass. Only ever logged by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Audio files seen during the walk.
    pub found: usize,
    /// New rows inserted.
    pub added: usize,
    /// Files already catalogued (not re-extracted).
    pub existing: usize,
    /// Files that could not be written to the catalog.
    pub failed: usize,
    /// Rows pruned because their file is gone.
    pub removed: usize,
    /// Rows that should have been pruned but could not be deleted.
    pub prune_failed: usize,
    /// The pass stopped early and skipped pruning.
    pub cancelled: bool,
}

/// Reconciles the catalog with the configured music folders.
pub struct SyncEngine {
    catalog: Catalog,
    library: LibrarySettings,
}

impl SyncEngine {
    /// Relative roots are anchored to the current directory here, once, so
    /// every catalogued path is absolute and pruning never depends on where
    /// the process happens to run later.
    pub fn new(catalog: Catalog, mut library: LibrarySettings) -> Self {
        for root in &mut library.music_folders {
            match std::path::absolute(&*root) {
                Ok(abs) => *root = abs,
                Err(err) => warn!(root = %root.display(), error = %err, "cannot make music folder absolute"),
            }
        }
        Self { catalog, library }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run one full walk-extract-insert-prune pass to completion.
    pub fn run_pass(&self) -> PassReport {
        self.run_pass_until(&AtomicBool::new(false))
    }

    /// Like [`run_pass`](Self::run_pass), but stop between files once `cancel`
    /// is set. A cancelled pass never prunes.
    pub fn run_pass_until(&self, cancel: &AtomicBool) -> PassReport {
        let started = Instant::now();
        let mut report = PassReport::default();
        info!(roots = self.library.music_folders.len(), "synchronization pass started");

        'roots: for root in &self.library.music_folders {
            if !root.is_dir() {
                warn!(root = %root.display(), "music folder is missing or not a directory, skipping");
                continue;
            }
            for path in audio_files(root, &self.library) {
                if cancel.load(Ordering::Relaxed) {
                    report.cancelled = true;
                    break 'roots;
                }
                report.found += 1;
                self.catalog_file(&path, &mut report);
            }
        }

        if report.cancelled || cancel.load(Ordering::Relaxed) {
            report.cancelled = true;
            warn!(found = report.found, "synchronization pass cancelled, skipping prune");
            return report;
        }

        self.prune(&mut report);

        info!(
            found = report.found,
            added = report.added,
            existing = report.existing,
            failed = report.failed,
            removed = report.removed,
            prune_failed = report.prune_failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "synchronization pass finished"
        );
        report
    }

    fn catalog_file(&self, path: &Path, report: &mut PassReport) {
        match self.catalog.contains_path(path) {
            Ok(true) => {
                report.existing += 1;
                return;
            }
            Ok(false) => {}
            Err(err) => {
                warn!(path = %path.display(), error = %err, "catalog lookup failed, skipping file");
                report.failed += 1;
                return;
            }
        }

        let meta = extract(path);
        match self.catalog.upsert_if_absent(path, &meta) {
            Ok(true) => report.added += 1,
            Ok(false) => report.existing += 1,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "catalog insert failed, skipping file");
                report.failed += 1;
            }
        }
    }

    /// Delete rows whose file no longer exists. Decided by a stat now, not by
    /// what the walk saw, so a file that came back in the meantime stays.
    fn prune(&self, report: &mut PassReport) {
        let entries = match self.catalog.all_entries() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "could not list catalog for pruning");
                return;
            }
        };

        for (id, path) in entries {
            match path.try_exists() {
                Ok(true) => {}
                Ok(false) => match self.catalog.delete_by_id(id) {
                    Ok(_) => {
                        info!(%id, path = %path.display(), "file missing on disk, removed from catalog");
                        report.removed += 1;
                    }
                    Err(err) => {
                        warn!(%id, path = %path.display(), error = %err, "could not remove missing file");
                        report.prune_failed += 1;
                    }
                },
                Err(err) => {
                    debug!(%id, path = %path.display(), error = %err, "cannot stat file, keeping row");
                }
            }
        }
    }
}
