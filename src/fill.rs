//! Pass buffers: all zeroes, or bytes from a cryptographically secure source.

use rand::rngs::OsRng;
use rand::{ErrorKind, RngCore};

use crate::config::FillKind;
use crate::error::PurgeError;

/// Produces overwrite data. The entropy source is handed in at construction,
/// so tests can swap the OS generator for a seeded or failing one.
pub struct FillGenerator<R = OsRng> {
    source: Option<R>,
}

impl FillGenerator<OsRng> {
    /// Opens the OS secure generator and draws from it once, so a broken
    /// source is reported before any file is touched.
    pub fn os() -> Result<Self, PurgeError> {
        let mut source = OsRng::new().map_err(PurgeError::EntropySourceUnavailable)?;
        let mut probe = [0u8; 16];
        source
            .try_fill_bytes(&mut probe)
            .map_err(PurgeError::EntropySourceUnavailable)?;
        Ok(Self::new(source))
    }

    /// Zero fill never needs entropy, so no source is opened for it.
    pub fn for_kind(kind: FillKind) -> Result<Self, PurgeError> {
        match kind {
            FillKind::Zero => Ok(Self::zeroes()),
            FillKind::Random => Self::os(),
        }
    }
}

impl<R: RngCore> FillGenerator<R> {
    pub fn new(source: R) -> Self {
        FillGenerator {
            source: Some(source),
        }
    }

    /// A generator without an entropy source. Asking it for random data fails.
    pub fn zeroes() -> Self {
        FillGenerator { source: None }
    }

    pub fn fill(&mut self, len: usize, kind: FillKind) -> Result<Vec<u8>, rand::Error> {
        let mut buf = vec![0u8; len];
        self.fill_into(&mut buf, kind)?;
        Ok(buf)
    }

    pub fn fill_into(&mut self, buf: &mut [u8], kind: FillKind) -> Result<(), rand::Error> {
        match kind {
            FillKind::Zero => {
                for byte in buf.iter_mut() {
                    *byte = 0;
                }
                Ok(())
            }
            FillKind::Random => {
                let source = self.source.as_mut().ok_or_else(|| {
                    rand::Error::new(ErrorKind::Unavailable, "no entropy source configured")
                })?;
                if buf.is_empty() {
                    return Ok(());
                }
                source.try_fill_bytes(buf)
            }
        }
    }
}
