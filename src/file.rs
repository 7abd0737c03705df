use std::cmp::Reverse;
use std::fmt;
use std::fs::{self, FileType, ReadDir};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::PurgeError;

/// What a path is, without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Kind {
    File,
    Directory,
    Symlink,
    /// Devices, fifos, sockets.
    Special,
    Missing,
}

impl From<FileType> for Kind {
    fn from(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Kind::Symlink
        } else if file_type.is_dir() {
            Kind::Directory
        } else if file_type.is_file() {
            Kind::File
        } else {
            Kind::Special
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::File => "regular file",
            Kind::Directory => "directory",
            Kind::Symlink => "symlink",
            Kind::Special => "special file",
            Kind::Missing => "missing",
        };
        f.write_str(name)
    }
}

pub fn classify<P: AsRef<Path>>(path: P) -> io::Result<Kind> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(metadata.file_type().into()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Kind::Missing),
        Err(e) => Err(e),
    }
}

/// A regular file found by the walk, with its length at discovery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// An entry the walk will not touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub kind: Kind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    File(FileEntry),
    Directory(PathBuf),
    Irregular(Skipped),
}

/// Lazy depth-first listing of everything below a root directory. The root
/// itself is not yielded. The first error ends the walk.
pub struct Walk {
    pending: Vec<PathBuf>,
    current: Option<(PathBuf, ReadDir)>,
    failed: bool,
}

enum Step {
    Found(PathBuf, fs::DirEntry),
    Failed(PathBuf, io::Error),
    Exhausted,
}

impl Walk {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Walk {
            pending: vec![root.as_ref().to_path_buf()],
            current: None,
            failed: false,
        }
    }

    fn fail(&mut self, path: PathBuf, source: io::Error) -> Option<Result<Entry, PurgeError>> {
        self.failed = true;
        Some(Err(PurgeError::WalkFailed { path, source }))
    }
}

impl Iterator for Walk {
    type Item = Result<Entry, PurgeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            let step = match self.current.as_mut() {
                Some((dir, entries)) => match entries.next() {
                    Some(Ok(entry)) => Step::Found(dir.clone(), entry),
                    Some(Err(source)) => Step::Failed(dir.clone(), source),
                    None => Step::Exhausted,
                },
                None => Step::Exhausted,
            };

            match step {
                Step::Found(dir, entry) => {
                    let path = entry.path();
                    let file_type = match entry.file_type() {
                        Ok(file_type) => file_type,
                        Err(source) => return self.fail(dir, source),
                    };
                    return match Kind::from(file_type) {
                        Kind::Directory => {
                            self.pending.push(path.clone());
                            Some(Ok(Entry::Directory(path)))
                        }
                        Kind::File => match entry.metadata() {
                            Ok(metadata) => Some(Ok(Entry::File(FileEntry {
                                path,
                                size: metadata.len(),
                            }))),
                            Err(source) => self.fail(path, source),
                        },
                        kind => Some(Ok(Entry::Irregular(Skipped { path, kind }))),
                    };
                }
                Step::Failed(dir, source) => return self.fail(dir, source),
                Step::Exhausted => {
                    self.current = None;
                    let dir = self.pending.pop()?;
                    match fs::read_dir(&dir) {
                        Ok(entries) => self.current = Some((dir, entries)),
                        Err(source) => return self.fail(dir, source),
                    }
                }
            }
        }
    }
}

pub struct Files(pub Vec<FileEntry>);

impl Files {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Iterator for Files {
    type Item = FileEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.pop()
    }
}

/// Everything under a directory, fully materialized.
pub struct Tree {
    pub files: Files,
    /// Root included, deepest first.
    pub dirs: Vec<PathBuf>,
    pub skipped: Vec<Skipped>,
}

pub fn walk_dir<P: AsRef<Path>>(root: P) -> Result<Tree, PurgeError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    let mut dirs = vec![root.to_path_buf()];
    let mut skipped = Vec::new();

    for entry in Walk::new(root) {
        match entry? {
            Entry::File(file) => {
                debug!("found {} ({} bytes)", file.path.display(), file.size);
                files.push(file);
            }
            Entry::Directory(dir) => dirs.push(dir),
            Entry::Irregular(entry) => {
                warn!("skipping {}: {}", entry.path.display(), entry.kind);
                skipped.push(entry);
            }
        }
    }
    dirs.sort_by_key(|dir| Reverse(dir.components().count()));

    Ok(Tree {
        files: Files(files),
        dirs,
        skipped,
    })
}
