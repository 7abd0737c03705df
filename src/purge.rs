//! Drives one invocation: classify the target, wipe every file, then remove
//! the emptied directories deepest first.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::PurgeConfig;
use crate::error::{PurgeError, WipeError};
use crate::file::{self, FileEntry, Kind, Skipped};
use crate::fill::FillGenerator;
use crate::shred::{FileWiper, Wipe};

#[derive(Debug)]
pub enum Status {
    /// The target no longer exists.
    Done,
    /// Some files or directories survived; the report names them.
    PartiallyFailed,
    /// Nothing was overwritten.
    Aborted(PurgeError),
}

/// A directory that could not be removed, usually because something inside survived.
#[derive(Debug)]
pub struct LeftDir {
    pub path: PathBuf,
    pub source: io::Error,
}

#[derive(Debug)]
pub struct PurgeReport {
    pub target: PathBuf,
    pub wiped: Vec<FileEntry>,
    pub failed: Vec<WipeError>,
    pub skipped: Vec<Skipped>,
    pub removed_dirs: Vec<PathBuf>,
    pub remaining_dirs: Vec<LeftDir>,
    pub status: Status,
}

impl PurgeReport {
    fn new(target: &Path) -> Self {
        PurgeReport {
            target: target.to_path_buf(),
            wiped: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
            removed_dirs: Vec::new(),
            remaining_dirs: Vec::new(),
            status: Status::Done,
        }
    }

    fn abort(mut self, err: PurgeError) -> Self {
        warn!("aborting purge of {}: {}", self.target.display(), err);
        self.status = Status::Aborted(err);
        self
    }

    fn finish(mut self) -> Self {
        if !self.failed.is_empty() || !self.skipped.is_empty() || !self.remaining_dirs.is_empty() {
            self.status = Status::PartiallyFailed;
        }
        self
    }

    pub fn is_done(&self) -> bool {
        matches!(self.status, Status::Done)
    }

    pub fn bytes_wiped(&self) -> u64 {
        self.wiped.iter().map(|f| f.size).sum()
    }
}

impl fmt::Display for PurgeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Status::Aborted(err) = &self.status {
            return write!(f, "aborted {}: {}", self.target.display(), err);
        }
        writeln!(
            f,
            "{}: {} files wiped ({} bytes), {} failed, {} skipped, {} directories removed, {} left",
            self.target.display(),
            self.wiped.len(),
            self.bytes_wiped(),
            self.failed.len(),
            self.skipped.len(),
            self.removed_dirs.len(),
            self.remaining_dirs.len()
        )?;
        for err in &self.failed {
            if err.content_destroyed() {
                writeln!(f, "  failed: {} (content destroyed)", err)?;
            } else {
                writeln!(f, "  failed: {}", err)?;
            }
        }
        for entry in &self.skipped {
            writeln!(f, "  skipped: {} ({})", entry.path.display(), entry.kind)?;
        }
        for dir in &self.remaining_dirs {
            writeln!(f, "  left behind: {} ({})", dir.path.display(), dir.source)?;
        }
        match self.status {
            Status::Done => write!(f, "done"),
            _ => write!(f, "partially failed"),
        }
    }
}

/// Purges `config.path` with the OS entropy source. Always returns a report.
pub fn purge(config: &PurgeConfig) -> PurgeReport {
    let report = PurgeReport::new(&config.path);
    if let Err(err) = config.spec.validate() {
        return report.abort(err);
    }
    let fill = match FillGenerator::for_kind(config.spec.kind) {
        Ok(fill) => fill,
        Err(err) => return report.abort(err),
    };
    let mut wiper = FileWiper::new(config.spec, fill);
    purge_with(&config.path, &mut wiper)
}

/// Purges `target` using `wiper` for every regular file.
pub fn purge_with<W: Wipe + ?Sized>(target: &Path, wiper: &mut W) -> PurgeReport {
    let mut report = PurgeReport::new(target);
    let kind = match file::classify(target) {
        Ok(kind) => kind,
        Err(source) => {
            return report.abort(PurgeError::WalkFailed {
                path: target.to_path_buf(),
                source,
            })
        }
    };

    match kind {
        Kind::Missing => report.abort(PurgeError::TargetMissing(target.to_path_buf())),
        Kind::Directory => purge_tree(report, target, wiper),
        _ => {
            // non-regular targets are refused by the wiper itself
            wipe_one(&mut report, target, wiper);
            report.finish()
        }
    }
}

fn purge_tree<W: Wipe + ?Sized>(mut report: PurgeReport, root: &Path, wiper: &mut W) -> PurgeReport {
    let tree = match file::walk_dir(root) {
        Ok(tree) => tree,
        Err(err) => return report.abort(err),
    };
    info!(
        "{}: {} files, {} directories, {} skipped",
        root.display(),
        tree.files.len(),
        tree.dirs.len(),
        tree.skipped.len()
    );
    report.skipped = tree.skipped;
    if tree.files.is_empty() {
        debug!("{}: no regular files to overwrite", root.display());
    }

    let mut files = tree.files;
    while let Some(entry) = files.next() {
        if !wipe_one(&mut report, &entry.path, wiper) {
            for rest in files.by_ref() {
                report.failed.push(WipeError::NotAttempted { path: rest.path });
            }
        }
    }

    for dir in tree.dirs {
        match fs::remove_dir(&dir) {
            Ok(()) => report.removed_dirs.push(dir),
            Err(source) => {
                warn!("leaving {}: {}", dir.display(), source);
                report.remaining_dirs.push(LeftDir { path: dir, source });
            }
        }
    }
    report.finish()
}

/// Returns false when the run cannot go on.
fn wipe_one<W: Wipe + ?Sized>(report: &mut PurgeReport, path: &Path, wiper: &mut W) -> bool {
    match wiper.wipe(path) {
        Ok(size) => {
            report.wiped.push(FileEntry {
                path: path.to_path_buf(),
                size,
            });
            true
        }
        Err(err) => {
            warn!("{}", err);
            let fatal = err.is_fatal();
            report.failed.push(err);
            !fatal
        }
    }
}
