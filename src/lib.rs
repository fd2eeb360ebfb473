//! cdnget core library
//!
//! Queries public CDNs (CDNJS, jsDelivr, UNPKG, Google Hosted Libraries)
//! through one normalized data model and downloads library releases to
//! disk.
//!
//! # Architecture
//!
//! - [`provider`] - CDN adapters behind the common `Provider` trait, plus
//!   the registry that maps CDN codes to adapters
//! - [`download`] - Engine that materializes a resolved release on disk
//! - [`app`] - Command orchestration and console rendering

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod download;
pub mod provider;

// Re-export commonly used types
pub use app::{App, CommandError};
pub use download::{DownloadEngine, DownloadError, DownloadObserver, DownloadOutcome};
pub use provider::{
    LibraryDetail, LibrarySummary, Provider, ProviderError, ProviderRegistry, ResolvedRelease,
    build_default_registry,
};
