//! CLI entry point for cdnget.

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use cdnget::app::App;
use cdnget::provider::build_default_registry;

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first, before tracing, so --help works without logs.
    let args = Args::parse();

    // Logs go to stderr so they never mix with command output.
    // Priority: RUST_LOG env var > --debug flag > default (warn).
    let default_level = if args.debug { "cdnget=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let registry = build_default_registry();
    let app = App::new(&registry, args.quiet);
    match app.run(&args.args).await {
        Ok(Some(output)) => {
            // Renderers terminate their own lines; print verbatim.
            print!("{output}");
            let _ = std::io::stdout().flush();
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}
