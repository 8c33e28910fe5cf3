//! CLI error type.

use std::fmt;
use std::path::PathBuf;

use horizonmaps::config::ConfigError;
use horizonmaps::logging::LoggingError;
use horizonmaps::position::SamplerError;
use horizonmaps::routing::RoutingError;
use horizonmaps::session::SessionError;

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration problem (file, key, or missing setting).
    Config(String),

    /// Logging could not be initialized.
    Logging(LoggingError),

    /// The directions service failed.
    Routing(RoutingError),

    /// Guidance could not start.
    Session(SessionError),

    /// Reading or writing a route or track file failed.
    File { path: PathBuf, message: String },

    /// Bad command-line input.
    InvalidArgument(String),

    /// Failed to create the Tokio runtime or signal handler.
    Runtime(String),

    /// Guidance ended without reaching the destination.
    GuidanceIncomplete(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(e) => write!(f, "Logging error: {}", e),
            CliError::Routing(e) => write!(f, "Routing failed: {}", e),
            CliError::Session(e) => write!(f, "{}", e),
            CliError::File { path, message } => {
                write!(f, "{}: {}", path.display(), message)
            }
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
            CliError::GuidanceIncomplete(msg) => write!(f, "Guidance incomplete: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Logging(e) => Some(e),
            CliError::Routing(e) => Some(e),
            CliError::Session(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e)
    }
}

impl From<RoutingError> for CliError {
    fn from(e: RoutingError) -> Self {
        CliError::Routing(e)
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        CliError::Session(e)
    }
}

impl From<SamplerError> for CliError {
    fn from(e: SamplerError) -> Self {
        CliError::Session(SessionError::Sampler(e))
    }
}

impl CliError {
    /// Process exit code.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgument(_) => 2,
            CliError::GuidanceIncomplete(_) => 3,
            _ => 1,
        }
    }
}
