//! CLI error types with miette diagnostics.

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
    #[diagnostic(code(awm::io))]
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

    #[error("Malformed service-account key file {path}: {reason}")]
    #[diagnostic(
        code(awm::bad_key_file),
        help("Pass the deployment service-account key JSON written by awm-setup.")
    )]
    MalformedKey { path: String, reason: String },

    #[error("Invalid control-plane URL: {0}")]
    #[diagnostic(code(awm::bad_url))]
    InvalidUrl(String),

    #[error("Instance metadata lookup failed: {reason}")]
    #[diagnostic(
        code(awm::metadata),
        help("This tool must run on an EC2 instance with a reachable metadata endpoint.")
    )]
    Metadata { reason: String },

    #[error("Instance tag lookup failed: {reason}")]
    #[diagnostic(
        code(awm::tags),
        help(
            "The connector name needs the instance's Name tag.\n\
             Check that the aws CLI is installed and the instance role can\n\
             call ec2:DescribeTags."
        )
    )]
    TagLookup { reason: String },

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
