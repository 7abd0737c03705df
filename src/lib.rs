pub mod config;
pub mod error;
pub mod file;
pub mod fill;
pub mod purge;
pub mod shred;

pub use config::{FillKind, PurgeConfig, WipeSpec};
pub use error::{PurgeError, WipeError};
pub use purge::{purge, purge_with, PurgeReport, Status};
pub use shred::{FileWiper, Wipe};
