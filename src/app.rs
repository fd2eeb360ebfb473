//! Command orchestration: maps argument arity onto provider operations
//! and renders console output.
//!
//! The arity contract: zero positional arguments lists the CDNs, one lists
//! a CDN's libraries, two resolves one library (or searches when the
//! argument carries `*`), three resolves one version's file manifest, four
//! downloads it. Five or more is a hard error raised before any provider
//! is touched.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::download::{DownloadEngine, DownloadError, DownloadObserver, DownloadOutcome};
use crate::provider::{
    LibraryDetail, LibrarySummary, Provider, ProviderError, ProviderRegistry, ResolvedRelease,
};

// Loose argument-shape gate; the adapters apply the stricter per-provider
// grammars afterwards. Must let the literal token `latest` through.
static ARG_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| crate::provider::compile_static_regex(r"^[-.\w]+$"));

/// Terminal errors of a single CLI invocation.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The first argument named no registered CDN.
    #[error("{code}: no such CDN.")]
    UnknownProvider {
        /// The unrecognized code.
        code: String,
    },

    /// Five or more positional arguments were given.
    #[error("'{argument}': Too many arguments.")]
    TooManyArguments {
        /// The first surplus (fifth) argument.
        argument: String,
    },

    /// The library argument fails the argument-shape gate.
    #[error("{library}: Unexpected library name.")]
    UnexpectedLibraryName {
        /// The offending argument.
        library: String,
    },

    /// The version argument fails the argument-shape gate.
    #[error("{version}: Unexpected version number.")]
    UnexpectedVersionNumber {
        /// The offending argument.
        version: String,
    },

    /// A provider operation failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The download engine failed.
    #[error(transparent)]
    Download(#[from] DownloadError),
}

impl CommandError {
    /// Creates an unknown-provider error.
    pub fn unknown_provider(code: impl Into<String>) -> Self {
        Self::UnknownProvider { code: code.into() }
    }

    /// Creates a too-many-arguments error naming the first surplus argument.
    pub fn too_many_arguments(argument: impl Into<String>) -> Self {
        Self::TooManyArguments {
            argument: argument.into(),
        }
    }
}

/// One CLI invocation against a provider registry.
pub struct App<'a> {
    registry: &'a ProviderRegistry,
    quiet: bool,
}

impl<'a> App<'a> {
    /// Creates an invocation context. `quiet` switches every renderer to
    /// its minimal form (names, versions, or URLs only).
    #[must_use]
    pub fn new(registry: &'a ProviderRegistry, quiet: bool) -> Self {
        Self { registry, quiet }
    }

    /// Dispatches on argument arity. Returns the rendered output, or
    /// `None` for the download command, which streams progress lines
    /// directly to stdout as files land.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for arity violations, unknown CDN codes,
    /// and any provider or download failure.
    pub async fn run(&self, args: &[String]) -> Result<Option<String>, CommandError> {
        if let Some(surplus) = args.get(4) {
            return Err(CommandError::too_many_arguments(surplus));
        }
        prevalidate(args.get(1), args.get(2))?;
        debug!(arity = args.len(), "dispatching command");

        match args {
            [] => Ok(Some(self.render_providers())),
            [code] => self.list_libraries(code).await.map(Some),
            [code, library] => {
                if library.contains('*') {
                    self.search_libraries(code, library).await.map(Some)
                } else {
                    self.find_library(code, library).await.map(Some)
                }
            }
            [code, library, version] => self.get_library(code, library, version).await.map(Some),
            [code, library, version, dest_root, ..] => {
                self.download_library(code, library, version, dest_root)
                    .await?;
                Ok(None)
            }
        }
    }

    fn provider(&self, code: &str) -> Result<&dyn Provider, CommandError> {
        self.registry
            .get(code)
            .ok_or_else(|| CommandError::unknown_provider(code))
    }

    fn render_providers(&self) -> String {
        let mut out = String::new();
        for provider in self.registry.iter() {
            if self.quiet {
                let _ = writeln!(out, "{}", provider.code());
            } else {
                let _ = writeln!(out, "{:<10}  # {}", provider.code(), provider.site_url());
            }
        }
        out
    }

    async fn list_libraries(&self, code: &str) -> Result<String, CommandError> {
        let provider = self.provider(code)?;
        let libraries = provider
            .list()
            .await?
            .ok_or_else(|| ProviderError::cannot_list(code))?;
        Ok(self.render_library_listing(&libraries))
    }

    async fn search_libraries(&self, code: &str, pattern: &str) -> Result<String, CommandError> {
        let provider = self.provider(code)?;
        let libraries = provider.search(pattern).await?;
        Ok(self.render_library_listing(&libraries))
    }

    fn render_library_listing(&self, libraries: &[LibrarySummary]) -> String {
        let mut out = String::new();
        for library in libraries {
            if self.quiet {
                let _ = writeln!(out, "{}", library.name);
            } else {
                let description = fold_lines(library.description.as_deref().unwrap_or(""));
                let _ = writeln!(out, "{:<20}  # {description}", library.name);
            }
        }
        out
    }

    async fn find_library(&self, code: &str, library: &str) -> Result<String, CommandError> {
        let provider = self.provider(code)?;
        let detail = provider.find(library).await?;
        Ok(self.render_detail(&detail))
    }

    fn render_detail(&self, detail: &LibraryDetail) -> String {
        let mut out = String::new();
        if self.quiet {
            for version in &detail.versions {
                let _ = writeln!(out, "{version}");
            }
            return out;
        }
        push_field(&mut out, "name", Some(&detail.name));
        push_field(&mut out, "desc", detail.description.as_deref());
        push_joined_field(&mut out, "tags", &detail.tags);
        push_field(&mut out, "site", detail.site_url.as_deref());
        push_field(&mut out, "info", detail.info_url.as_deref());
        push_field(&mut out, "license", detail.license.as_deref());
        if !detail.versions.is_empty() {
            out.push_str("versions:\n");
            for version in &detail.versions {
                let _ = writeln!(out, "  - {version}");
            }
        }
        out
    }

    async fn get_library(
        &self,
        code: &str,
        library: &str,
        version: &str,
    ) -> Result<String, CommandError> {
        let provider = self.provider(code)?;
        let release = self.resolve_release(provider, library, version).await?;
        Ok(self.render_release(&release))
    }

    /// Resolves `latest` to a concrete version before asking for the
    /// release manifest.
    async fn resolve_release(
        &self,
        provider: &dyn Provider,
        library: &str,
        version: &str,
    ) -> Result<ResolvedRelease, CommandError> {
        let resolved;
        let version = if version == "latest" {
            resolved = provider.latest_version(library).await?;
            debug!(library, version = %resolved, "resolved latest");
            &resolved
        } else {
            version
        };
        Ok(provider.get(library, version).await?)
    }

    fn render_release(&self, release: &ResolvedRelease) -> String {
        let urls = release.file_urls();
        let mut out = String::new();
        if self.quiet {
            for url in &urls {
                let _ = writeln!(out, "{url}");
            }
            return out;
        }
        push_field(&mut out, "name", Some(&release.name));
        push_field(&mut out, "version", Some(&release.version));
        push_field(&mut out, "desc", release.description.as_deref());
        push_joined_field(&mut out, "tags", &release.tags);
        push_field(&mut out, "site", release.site_url.as_deref());
        push_field(&mut out, "info", release.info_url.as_deref());
        push_field(&mut out, "npmpkg", release.npm_tarball_url.as_deref());
        push_field(&mut out, "default", release.default_entry_point.as_deref());
        push_field(&mut out, "license", release.license.as_deref());
        if !urls.is_empty() {
            out.push_str("urls:\n");
            for url in &urls {
                let _ = writeln!(out, "  - {url}");
            }
        }
        out
    }

    async fn download_library(
        &self,
        code: &str,
        library: &str,
        version: &str,
        dest_root: &str,
    ) -> Result<(), CommandError> {
        let provider = self.provider(code)?;
        // Destination problems are reported before any network resolution.
        let dest = Path::new(dest_root);
        if !dest.exists() {
            return Err(DownloadError::destination_missing(dest).into());
        }
        if !dest.is_dir() {
            return Err(DownloadError::destination_not_directory(dest).into());
        }
        let release = self.resolve_release(provider, library, version).await?;
        let engine = DownloadEngine::new();
        let observer = ConsoleObserver { quiet: self.quiet };
        engine.download(&release, dest, &observer).await?;
        Ok(())
    }
}

/// Loose shape check on the raw arguments, before dispatch. Patterns
/// containing `*` are search input and skip the library check.
fn prevalidate(
    library: Option<&String>,
    version: Option<&String>,
) -> Result<(), CommandError> {
    if let Some(library) = library
        && !library.contains('*')
        && !ARG_TOKEN_RE.is_match(library)
    {
        return Err(CommandError::UnexpectedLibraryName {
            library: library.clone(),
        });
    }
    if let Some(version) = version
        && !ARG_TOKEN_RE.is_match(version)
    {
        return Err(CommandError::UnexpectedVersionNumber {
            version: version.clone(),
        });
    }
    Ok(())
}

fn push_field(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value
        && !value.is_empty()
    {
        let _ = writeln!(out, "{:<9} {value}", format!("{key}:"));
    }
}

fn push_joined_field(out: &mut String, key: &str, values: &[String]) {
    if !values.is_empty() {
        let joined = values.join(", ");
        push_field(out, key, Some(&joined));
    }
}

/// Collapses newlines so multi-line descriptions stay on one listing row.
fn fold_lines(text: &str) -> String {
    text.replace(['\n', '\r'], " ")
}

/// Groups digits of an integer with commas: `257551` -> `257,551`.
fn format_integer(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Renders download progress lines to stdout.
///
/// Quiet mode suppresses everything except `Skipped` notices, which are
/// printed in full since the file intentionally never lands on disk.
struct ConsoleObserver {
    quiet: bool,
}

impl DownloadObserver for ConsoleObserver {
    fn entry_started(&self, label: &str) {
        if !self.quiet {
            print!("{label} ...");
            let _ = std::io::stdout().flush();
        }
    }

    fn entry_finished(&self, label: &str, outcome: &DownloadOutcome) {
        if self.quiet {
            if matches!(outcome, DownloadOutcome::Skipped) {
                println!("{label} ... Skipped");
            }
            return;
        }
        match outcome {
            DownloadOutcome::Created(bytes) => {
                println!(" Done ({} byte)", format_integer(*bytes));
            }
            DownloadOutcome::Unchanged(bytes) => {
                println!(" Done ({} byte) (Unchanged)", format_integer(*bytes));
            }
            DownloadOutcome::CreatedDirectory => println!("Done (Created)"),
            DownloadOutcome::AlreadyExists => println!(" Done (Already exists)"),
            DownloadOutcome::Skipped => println!(" Skipped"),
        }
    }
}
