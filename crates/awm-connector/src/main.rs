mod cli;
mod error;
mod metadata;
mod name;
mod tags;

use std::fs;
use std::path::Path;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use awm_api::{Credentials, ManagerClient, ServiceAccountKey, TransportConfig};

use crate::cli::Cli;
use crate::error::{CliError, step};
use crate::metadata::MetadataClient;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(args: Cli) -> Result<(), CliError> {
    let api_url: Url = format!("{}/api/v1", args.url.trim_end_matches('/'))
        .parse()
        .map_err(|e: url::ParseError| CliError::InvalidUrl(e.to_string()))?;

    let mut transport = TransportConfig::default();
    if args.insecure {
        transport = transport.insecure();
    }
    let mut client = ManagerClient::new(api_url, &transport).map_err(step("session setup"))?;

    println!(
        "Loading Anyware Manager deployment service-account key from {}...",
        args.awm.display()
    );
    let key = load_service_account_key(&args.awm)?;

    println!("Signing in to Anyware Manager with key {}...", key.key_name);
    client
        .login(&Credentials::ServiceAccountKey(key.clone()))
        .await
        .map_err(step("sign-in"))?;

    let connector_name = build_connector_name(metadata::METADATA_URL).await?;

    println!(
        "Creating a connector token in deployment {}...",
        key.deployment_id
    );
    let token = client
        .create_connector_token(&key.deployment_id, &connector_name)
        .await
        .map_err(step("connector token issuance"))?;

    println!("Writing connector token to {}...", args.out.display());
    fs::write(&args.out, &token).map_err(|source| CliError::Write {
        path: args.out.display().to_string(),
        source,
    })?;

    Ok(())
}

fn load_service_account_key(path: &Path) -> Result<ServiceAccountKey, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| CliError::MalformedKey {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Derive the connector name from the host's zone, its Name tag, and the
/// current UTC time.
async fn build_connector_name(metadata_url: &str) -> Result<String, CliError> {
    let metadata = MetadataClient::new(metadata_url)?;
    let zone = metadata.availability_zone().await?;
    let instance_id = metadata.instance_id().await?;
    let instance_name = tags::instance_name(name::region_of(&zone), &instance_id).await?;
    Ok(name::connector_name(&zone, &instance_name, Utc::now()))
}
