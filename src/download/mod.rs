//! Download engine: writes a resolved release's files to disk.
//!
//! Separated from the provider layer: providers resolve a release into a
//! file manifest, this module turns that manifest into files under a
//! destination directory. Progress reporting goes through the
//! [`DownloadObserver`] trait so the CLI can render console lines without
//! the engine knowing about output formats.

mod engine;
mod error;

pub use engine::{DownloadEngine, DownloadObserver, DownloadOutcome, SilentObserver};
pub use error::DownloadError;
