//! IAM user-name resolution for the optional cloud-account link.
//!
//! The control plane records a display name alongside the credential
//! pair; we resolve it from the access key via `GetAccessKeyLastUsed`,
//! using ambient instance credentials. Failure here never aborts the run
//! -- the caller decides to skip the link, so the outcome is an explicit
//! enum rather than an error.

use aws_config::BehaviorVersion;
use tracing::debug;

/// Outcome of the IAM user-name lookup.
pub enum UserNameLookup {
    Found(String),
    Unavailable { reason: String },
}

/// Resolve the IAM user name owning `access_key_id`.
pub async fn lookup_user_name(access_key_id: &str) -> UserNameLookup {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let iam = aws_sdk_iam::Client::new(&config);

    debug!("resolving IAM user name for access key {access_key_id}");

    match iam
        .get_access_key_last_used()
        .access_key_id(access_key_id)
        .send()
        .await
    {
        Ok(output) => match output.user_name {
            Some(name) => UserNameLookup::Found(name),
            None => UserNameLookup::Unavailable {
                reason: "response carried no user name".into(),
            },
        },
        Err(err) => UserNameLookup::Unavailable {
            reason: err.to_string(),
        },
    }
}
