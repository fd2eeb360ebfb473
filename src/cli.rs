//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Download files from public CDN (cdnjs/jsdelivr/unpkg/google).
#[derive(Parser, Debug)]
#[command(name = "cdnget")]
#[command(author, version, about)]
#[command(after_help = "\
Example:
    $ cdnget                                   # list public CDN names
    $ cdnget [-q] cdnjs                        # list libraries
    $ cdnget [-q] cdnjs 'jquery*'              # search libraries
    $ cdnget [-q] cdnjs jquery                 # list versions
    $ cdnget [-q] cdnjs jquery latest          # show latest version
    $ cdnget [-q] cdnjs jquery 2.2.4           # list files
    $ mkdir -p static/lib                      # create a directory
    $ cdnget [-q] cdnjs jquery 2.2.4 static/lib  # download files
")]
pub struct Args {
    /// Minimal output
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,

    /// [<CDN> [<library> [<version> [<directory>]]]]
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}
