//! Command-line surface: one binary, two transports, selected by flag.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    Http,
    Stdio,
}

/// Single-host text-file editing service.
#[derive(Parser, Debug)]
#[command(name = "textedit-service")]
#[command(about = "Confined, line-oriented text file editing over HTTP or stdio JSON-RPC")]
#[command(version)]
pub struct Args {
    /// Working directory every request is confined to. Must exist, be a
    /// directory, and be writable.
    #[arg(long)]
    pub dir: PathBuf,

    /// Which transport to serve on.
    #[arg(long, value_enum, default_value_t = Transport::Http)]
    pub transport: Transport,

    /// TCP port for the HTTP transport. Ignored for stdio.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Maximum file size in MiB.
    #[arg(long = "max-file-size", default_value_t = 10)]
    pub max_file_size_mb: u64,

    /// Lock acquisition timeout, in seconds, for edit requests.
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Optional advisory cap on in-flight requests. Never required for
    /// correctness; per-file exclusivity is independent of this.
    #[arg(long = "max-concurrent")]
    pub max_concurrent: Option<usize>,
}
