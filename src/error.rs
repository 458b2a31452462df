use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Calendar feed returned HTTP {status}")]
    #[diagnostic(code(rsvpbot::fetch))]
    Fetch { status: u16 },

    #[error("HTTP error: {0}")]
    #[diagnostic(code(rsvpbot::http))]
    Http(#[from] reqwest::Error),

    #[error("Calendar parse error: {0}")]
    #[diagnostic(code(rsvpbot::parse))]
    Parse(String),

    #[error("Messaging transport error: {0}")]
    #[diagnostic(code(rsvpbot::transport))]
    Transport(String),

    #[error("State store error: {0}")]
    #[diagnostic(code(rsvpbot::store))]
    Store(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(rsvpbot::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(rsvpbot::config))]
    Config(String),

    #[error("Messaging transport authentication failed: {0}")]
    #[diagnostic(
        code(rsvpbot::auth_failure),
        help("Re-link the messaging account and restart the bot")
    )]
    AuthFailure(String),

    #[error("Messaging transport disconnected: {0}")]
    #[diagnostic(code(rsvpbot::disconnected))]
    Disconnected(String),

    #[error(transparent)]
    #[diagnostic(code(rsvpbot::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(rsvpbot::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(rsvpbot::other))]
    Other(String),
}

impl Error {
    /// Process exit status for a fatal error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AuthFailure(_) => 2,
            Error::Disconnected(_) => 3,
            _ => 1,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type BotResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar parse errors
pub fn calendar_error(message: &str) -> Error {
    Error::Parse(message.to_string())
}

/// Helper to create state store errors
pub fn store_error(message: &str) -> Error {
    Error::Store(message.to_string())
}

/// Helper to create transport errors
pub fn transport_error(message: &str) -> Error {
    Error::Transport(message.to_string())
}
