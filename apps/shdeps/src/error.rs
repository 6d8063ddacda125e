//! CLI error handling

use std::fmt;

use shdeps_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Build or configuration error from the library crates
    Build(shdeps_errors::Error),
    /// Reading or interpreting a package.json manifest failed
    Manifest(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Fatal events are printed by the log sink as they happen
    pub fn already_reported(&self) -> bool {
        matches!(self, CliError::Build(e) if e.is_fatal())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Build(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::Manifest(msg) => write!(f, "Invalid package.json: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Build(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Manifest(_) => None,
        }
    }
}

impl From<shdeps_errors::Error> for CliError {
    fn from(e: shdeps_errors::Error) -> Self {
        CliError::Build(e)
    }
}

impl From<shdeps_errors::ConfigError> for CliError {
    fn from(e: shdeps_errors::ConfigError) -> Self {
        CliError::Build(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
