//! Argument definitions for `awm-setup`.
//!
//! Long flags keep their historical snake_case spellings -- provisioning
//! templates in the field invoke them verbatim.

use std::path::PathBuf;

use clap::Parser;

use crate::creds;

/// Set the Anyware Manager administrator password and create a deployment
/// with a deployment service-account key.
#[derive(Debug, Parser)]
#[command(name = "awm-setup", version, about)]
pub struct Cli {
    /// Name of the Anyware Manager deployment to create
    #[arg(long = "deployment_name")]
    pub deployment_name: String,

    /// Path to write the deployment service-account key JSON file
    #[arg(long = "key_file")]
    pub key_file: PathBuf,

    /// Name of the deployment service-account key to create
    #[arg(long = "key_name")]
    pub key_name: String,

    /// New Anyware Manager administrator password
    #[arg(long = "password")]
    pub password: String,

    /// PCoIP registration code
    #[arg(long = "reg_code")]
    pub reg_code: String,

    /// AWS service-account credentials INI file (optional; enables cloud
    /// account linking)
    #[arg(long = "aws_key")]
    pub aws_key: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    // The management service runs on the same VM; these two only vary in
    // test harnesses, so they stay out of the help text.
    /// Control-plane base URL
    #[arg(long, hide = true, env = "AWM_URL", default_value = "https://localhost")]
    pub url: String,

    /// Path to the installer's temp-credentials file
    #[arg(
        long = "temp_creds",
        hide = true,
        env = "AWM_TEMP_CREDS",
        default_value = creds::TEMP_CREDS_PATH
    )]
    pub temp_creds: PathBuf,
}
