mod cli;
mod creds;
mod error;
mod iam;

use std::fs;
use std::path::Path;

use clap::Parser;
use secrecy::SecretString;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

use awm_api::{
    CloudAccountValidation, CloudCredential, Credentials, ManagerClient, TransportConfig,
};

use crate::cli::Cli;
use crate::error::{CliError, step};

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

    // localhost serves a self-signed cert; verification stays off.
    let transport = TransportConfig::default().insecure();
    let mut client = ManagerClient::new(api_url, &transport).map_err(step("session setup"))?;

    let new_password = SecretString::from(args.password);

    println!("Setting Anyware Manager Administrator password...");
    let temp = creds::read_temp_credentials(&args.temp_creds)?;
    client
        .login(&Credentials::AdminPassword {
            username: temp.username.clone(),
            password: temp.password,
        })
        .await
        .map_err(step("initial login"))?;
    client
        .set_admin_password(&new_password)
        .await
        .map_err(step("password change"))?;

    println!("Creating Anyware Manager deployment...");
    // Re-login with the new password: proves the change took effect before
    // any deployment work happens.
    client
        .login(&Credentials::AdminPassword {
            username: temp.username,
            password: new_password,
        })
        .await
        .map_err(step("login with new password"))?;

    let deployment = client
        .create_deployment(&args.deployment_name, &SecretString::from(args.reg_code))
        .await
        .map_err(step("deployment creation"))?;

    let key = client
        .create_deployment_key(&deployment.deployment_id, &args.key_name)
        .await
        .map_err(step("deployment key creation"))?;
    write_deployment_key(&key, &args.key_file)?;
    println!(
        "Deployment service-account key written to {}",
        args.key_file.display()
    );

    if let Some(aws_key_path) = args.aws_key {
        let access_key = creds::read_aws_access_key(&aws_key_path)?;
        match iam::lookup_user_name(&access_key.access_key_id).await {
            iam::UserNameLookup::Found(user_name) => {
                let credential = CloudCredential {
                    user_name,
                    access_key_id: access_key.access_key_id,
                    secret_access_key: access_key.secret_access_key,
                };
                link_cloud_account(&client, &deployment.deployment_id, &credential).await;
            }
            iam::UserNameLookup::Unavailable { reason } => {
                warn!("error retrieving AWS user name: {reason}");
                println!("Skip adding AWS credentials to the deployment.");
            }
        }
    }

    Ok(())
}

/// Persist the key object verbatim as JSON.
fn write_deployment_key(key: &serde_json::Value, path: &Path) -> Result<(), CliError> {
    let json = serde_json::to_string(key).map_err(|e| CliError::Write {
        path: path.display().to_string(),
        source: std::io::Error::other(e),
    })?;
    fs::write(path, json).map_err(|source| CliError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Optional cloud-account linking: validation, then attach.
///
/// The deployment exists and its key is on disk by the time we get here;
/// nothing in this path may abort the run. Every failure is reported and
/// the link is skipped.
async fn link_cloud_account(
    client: &ManagerClient,
    deployment_id: &str,
    credential: &CloudCredential,
) {
    println!("Validating AWS credentials with Anyware Manager...");
    match client.validate_cloud_account(credential).await {
        Ok(CloudAccountValidation::Accepted) => {}
        Ok(CloudAccountValidation::InsufficientPermissions { detail }) => {
            warn!("AWS service-account key has insufficient permissions: {detail}");
            println!("Skip adding AWS credentials to the deployment.");
            return;
        }
        Err(err) => {
            warn!("error validating AWS service-account key: {err}");
            println!("Skip adding AWS credentials to the deployment.");
            return;
        }
    }

    println!("Adding AWS credentials to the deployment...");
    match client.add_cloud_account(deployment_id, credential).await {
        Ok(()) => println!("Successfully added AWS cloud service account to the deployment."),
        Err(err) => {
            warn!("error adding AWS service account to the deployment: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use awm_api::RetryPolicy;

    use super::*;

    async fn logged_in_client(server: &MockServer) -> ManagerClient {
        let api_url = format!("{}/api/v1", server.uri()).parse().unwrap();
        let transport = TransportConfig {
            retry: RetryPolicy::disabled(),
            ..TransportConfig::default()
        };
        let mut client = ManagerClient::new(api_url, &transport).unwrap();

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/ad/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "token": "tok" } })),
            )
            .mount(server)
            .await;
        client
            .login(&Credentials::AdminPassword {
                username: "adminUser".into(),
                password: SecretString::from("pw"),
            })
            .await
            .unwrap();
        client
    }

    fn credential() -> CloudCredential {
        CloudCredential {
            user_name: "svc".into(),
            access_key_id: "AKIA123".into(),
            secret_access_key: "shhh".into(),
        }
    }

    #[tokio::test]
    async fn validation_rejection_skips_attach_without_failing() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/users/cloudServiceAccount/validate"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "data": { "missingPermissions": ["iam:ListRoles"] }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/deployments/d-42/cloudServiceAccounts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        // Must return normally: the caller treats this path as best-effort.
        link_cloud_account(&client, "d-42", &credential()).await;
    }

    #[tokio::test]
    async fn validation_server_error_skips_attach_without_failing() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/users/cloudServiceAccount/validate"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/deployments/d-42/cloudServiceAccounts"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        link_cloud_account(&client, "d-42", &credential()).await;
    }

    #[tokio::test]
    async fn attach_failure_is_tolerated() {
        let server = MockServer::start().await;
        let client = logged_in_client(&server).await;

        Mock::given(method("POST"))
            .and(path("/api/v1/auth/users/cloudServiceAccount/validate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/v1/deployments/d-42/cloudServiceAccounts"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(1)
            .mount(&server)
            .await;

        link_cloud_account(&client, "d-42", &credential()).await;
    }
}
