//! CLI error types with miette diagnostics.
//!
//! Maps `awm_api::Error` and local file failures into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

/// Exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("Failed to read {path}")]
    #[diagnostic(
        code(awm::io),
        help("Check that the file exists and is readable by this user.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}")]
    #[diagnostic(code(awm::io))]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed credentials file {path}: {reason}")]
    #[diagnostic(
        code(awm::bad_credentials_file),
        help(
            "The installer writes temp credentials as 'username: ...' and\n\
             'password: ...' lines; AWS key files need a [default] section\n\
             with aws_access_key_id and aws_secret_access_key."
        )
    )]
    MalformedCredentials { path: String, reason: String },

    #[error("Invalid control-plane URL: {0}")]
    #[diagnostic(code(awm::bad_url))]
    InvalidUrl(String),

    #[error("{step} failed")]
    #[diagnostic(code(awm::api))]
    Step {
        step: &'static str,
        #[source]
        source: awm_api::Error,
    },
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Step { source, .. } if source.is_auth() => exit_code::AUTH,
            Self::Step {
                source: awm_api::Error::Transport(_),
                ..
            } => exit_code::CONNECTION,
            _ => exit_code::GENERAL,
        }
    }
}

/// Curry a step name onto an API error.
pub fn step(step: &'static str) -> impl FnOnce(awm_api::Error) -> CliError {
    move |source| CliError::Step { step, source }
}
