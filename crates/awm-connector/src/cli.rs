//! Argument definitions for `get-connector-token`.

use std::path::PathBuf;

use clap::Parser;

/// Create a new connector token from a deployment service-account key.
#[derive(Debug, Parser)]
#[command(name = "get-connector-token", version, about)]
pub struct Cli {
    /// Path to the Anyware Manager deployment service-account key JSON file
    #[arg(value_name = "AWM_KEY_FILE")]
    pub awm: PathBuf,

    /// File to write the connector token
    #[arg(long)]
    pub out: PathBuf,

    /// Anyware Manager base URL
    #[arg(long, default_value = "https://cas.teradici.com")]
    pub url: String,

    /// Allow unverified HTTPS connections to Anyware Manager
    #[arg(long)]
    pub insecure: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
