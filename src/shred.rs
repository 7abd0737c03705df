//! Overwrite a single file in place, sync every pass, then unlink it.
//!
//! This relies on the filesystem writing data in place. Journaling,
//! copy-on-write and log-structured filesystems, and flash wear-levelling,
//! may keep older copies of the blocks around.

use std::fs::{self, Metadata, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use rand::RngCore;
use tracing::{debug, info};

use crate::config::WipeSpec;
use crate::error::WipeError;
use crate::fill::FillGenerator;

const BLOCK_SIZE: usize = 64 * 1024;

/// Something a pass can be written to and made durable.
pub trait WipeTarget: Write + Seek {
    fn truncate_to(&mut self, size: u64) -> io::Result<()>;

    /// Must not return before the written data reached stable storage.
    fn sync_to_disk(&mut self) -> io::Result<()>;
}

impl WipeTarget for fs::File {
    fn truncate_to(&mut self, size: u64) -> io::Result<()> {
        self.set_len(size)
    }

    fn sync_to_disk(&mut self) -> io::Result<()> {
        self.sync_all()
    }
}

/// Destroys and removes one file, returning the number of bytes overwritten per pass.
pub trait Wipe {
    fn wipe(&mut self, path: &Path) -> Result<u64, WipeError>;
}

pub struct FileWiper<R> {
    spec: WipeSpec,
    fill: FillGenerator<R>,
}

impl<R: RngCore> FileWiper<R> {
    pub fn new(spec: WipeSpec, fill: FillGenerator<R>) -> Self {
        FileWiper { spec, fill }
    }
}

impl<R: RngCore> Wipe for FileWiper<R> {
    fn wipe(&mut self, path: &Path) -> Result<u64, WipeError> {
        // lstat: a symlink is refused here instead of being followed
        let before = fs::symlink_metadata(path).map_err(|source| WipeError::StatFailed {
            path: path.to_path_buf(),
            source,
        })?;
        if !before.file_type().is_file() {
            return Err(WipeError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }
        let size = before.len();

        let mut file = open_for_wipe(path).map_err(|source| WipeError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let opened = file.metadata().map_err(|source| WipeError::StatFailed {
            path: path.to_path_buf(),
            source,
        })?;
        // the path was swapped between lstat and open
        if !same_file(&before, &opened) {
            return Err(WipeError::NotRegularFile {
                path: path.to_path_buf(),
            });
        }

        overwrite(path, &mut file, size, self.spec, &mut self.fill)?;
        drop(file);

        fs::remove_file(path).map_err(|source| WipeError::UnlinkFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "wiped {} ({} bytes, {} x {})",
            path.display(),
            size,
            self.spec.passes,
            self.spec.kind
        );
        Ok(size)
    }
}

/// Runs every pass of `spec` over `target`. Each pass writes exactly `size`
/// bytes from offset 0, pins the length to `size` and syncs before the next
/// pass starts.
pub fn overwrite<T, R>(
    path: &Path,
    target: &mut T,
    size: u64,
    spec: WipeSpec,
    fill: &mut FillGenerator<R>,
) -> Result<(), WipeError>
where
    T: WipeTarget + ?Sized,
    R: RngCore,
{
    let mut block = vec![0u8; size.min(BLOCK_SIZE as u64) as usize];

    for pass in 1..=spec.passes {
        let incomplete = |source: io::Error| WipeError::Incomplete {
            path: path.to_path_buf(),
            pass,
            source,
        };

        target.seek(SeekFrom::Start(0)).map_err(incomplete)?;
        let mut remaining = size;
        while remaining > 0 {
            let chunk = remaining.min(block.len() as u64) as usize;
            fill.fill_into(&mut block[..chunk], spec.kind)
                .map_err(|source| WipeError::EntropySourceUnavailable {
                    path: path.to_path_buf(),
                    source,
                })?;
            target.write_all(&block[..chunk]).map_err(incomplete)?;
            remaining -= chunk as u64;
        }
        target.truncate_to(size).map_err(incomplete)?;
        target.flush().map_err(incomplete)?;
        target.sync_to_disk().map_err(incomplete)?;
        debug!("{}: pass {}/{} synced", path.display(), pass, spec.passes);
    }
    Ok(())
}

/// Opens for writing without following a final symlink. O_NONBLOCK keeps a
/// fifo swapped in after the lstat from blocking the open; the handle is
/// rejected by the inode comparison right after.
#[cfg(unix)]
pub fn open_for_wipe(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NOFOLLOW | libc::O_NONBLOCK)
        .open(path)
}

#[cfg(not(unix))]
pub fn open_for_wipe(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().write(true).open(path)
}

#[cfg(unix)]
fn same_file(a: &Metadata, b: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    a.dev() == b.dev() && a.ino() == b.ino()
}

#[cfg(not(unix))]
fn same_file(_a: &Metadata, b: &Metadata) -> bool {
    b.is_file()
}
