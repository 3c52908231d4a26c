//! Turns parsed CLI args into a validated `ServiceConfig`. Validation
//! happens once, before any filesystem or network activity past the
//! writability probe itself.

use std::sync::Arc;
use std::time::Duration;

use edit_core::ServiceConfig;
use edit_fs::WorkingRoot;

use crate::cli::Args;
use crate::error::{CliError, Result};

const MIN_PORT: u16 = 1024;
const MIN_FILE_SIZE_MB: u64 = 1;
const MAX_FILE_SIZE_MB: u64 = 100;
const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 300;
const MIN_MAX_CONCURRENT: usize = 1;
const MAX_MAX_CONCURRENT: usize = 100;

pub fn build_config(args: &Args) -> Result<Arc<ServiceConfig>> {
    let working_root = WorkingRoot::new(&args.dir)?;
    probe_writable(working_root.as_path())?;

    if args.port < MIN_PORT {
        return Err(CliError::invalid_config(format!(
            "--port must be >= {MIN_PORT}, got {}",
            args.port
        )));
    }

    if !(MIN_FILE_SIZE_MB..=MAX_FILE_SIZE_MB).contains(&args.max_file_size_mb) {
        return Err(CliError::invalid_config(format!(
            "--max-file-size must be {MIN_FILE_SIZE_MB}-{MAX_FILE_SIZE_MB} MiB, got {}",
            args.max_file_size_mb
        )));
    }

    if !(MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&args.timeout) {
        return Err(CliError::invalid_config(format!(
            "--timeout must be {MIN_TIMEOUT_SECS}-{MAX_TIMEOUT_SECS} seconds, got {}",
            args.timeout
        )));
    }

    if let Some(max_concurrent) = args.max_concurrent {
        if !(MIN_MAX_CONCURRENT..=MAX_MAX_CONCURRENT).contains(&max_concurrent) {
            return Err(CliError::invalid_config(format!(
                "--max-concurrent must be {MIN_MAX_CONCURRENT}-{MAX_MAX_CONCURRENT}, got {max_concurrent}"
            )));
        }
    }

    Ok(Arc::new(ServiceConfig {
        working_root,
        max_file_size_bytes: args.max_file_size_mb * 1024 * 1024,
        max_line_count: edit_core::service::DEFAULT_MAX_LINE_COUNT,
        operation_timeout: Duration::from_secs(args.timeout),
        max_concurrent: args.max_concurrent,
    }))
}

/// Proves the working directory is writable by creating and removing a
/// throwaway file, rather than trusting the platform's permission bits
/// (which can lie under ACLs, read-only mounts, etc).
fn probe_writable(dir: &std::path::Path) -> Result<()> {
    let probe_path = dir.join(format!(".textedit-writability-probe-{}", std::process::id()));
    std::fs::write(&probe_path, b"")?;
    std::fs::remove_file(&probe_path)?;
    Ok(())
}
