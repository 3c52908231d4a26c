//! Errors that can arise in the CLI entry point itself: config validation
//! and process-level I/O, as opposed to a single request's errors.

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Fs(#[from] edit_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{message}")]
    InvalidConfig { message: String },
}

impl CliError {
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
