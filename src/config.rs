use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::error::PurgeError;

/// What each overwrite pass writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillKind {
    Zero,
    Random,
}

impl FromStr for FillKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zero" => Ok(FillKind::Zero),
            "random" => Ok(FillKind::Random),
            other => Err(format!("unknown fill kind `{}` (expected zero or random)", other)),
        }
    }
}

impl fmt::Display for FillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillKind::Zero => f.write_str("zero"),
            FillKind::Random => f.write_str("random"),
        }
    }
}

/// Number of passes and fill strategy, shared by every file of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WipeSpec {
    pub passes: usize,
    pub kind: FillKind,
}

impl WipeSpec {
    pub fn new(passes: usize, kind: FillKind) -> Result<Self, PurgeError> {
        let spec = WipeSpec { passes, kind };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), PurgeError> {
        if self.passes == 0 {
            return Err(PurgeError::InvalidConfiguration(
                "pass count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurgeConfig {
    /// Absolute, lexically normalized target.
    pub path: PathBuf,
    pub spec: WipeSpec,
}

impl PurgeConfig {
    pub fn new<P: AsRef<Path>>(path: P, passes: usize, kind: FillKind) -> Result<Self, PurgeError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(PurgeError::InvalidConfiguration("empty path".to_string()));
        }
        let cwd = env::current_dir().map_err(|e| {
            PurgeError::InvalidConfiguration(format!("cannot resolve current directory: {}", e))
        })?;
        Ok(PurgeConfig {
            path: resolve(&cwd, path),
            spec: WipeSpec::new(passes, kind)?,
        })
    }
}

/// Joins `path` onto `base` and folds `.` and `..` without touching the
/// filesystem, so a symlinked target is never resolved to what it points at.
pub fn resolve(base: &Path, path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}
