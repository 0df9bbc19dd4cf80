// Control-plane authentication
//
// Two login shapes: the temporary admin username/password written by the
// installer (`/auth/ad/login`), and a deployment service-account key
// (`/auth/signin`), which swaps the key's username/apiKey in as the
// credential pair. Both return a bearer token in `data.token` that the
// client attaches to every subsequent request.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::ManagerClient;
use crate::error::Error;

/// A deployment service-account key, as written by `awm-setup` and read
/// back by `get-connector-token`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    pub key_name: String,
    pub username: String,
    pub api_key: SecretString,
    pub deployment_id: String,
}

/// Credentials for authenticating with the control plane.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Direct admin username/password (initial login and post-password-change
    /// re-login).
    AdminPassword {
        username: String,
        password: SecretString,
    },
    /// Deployment service-account key (connector registration).
    ServiceAccountKey(ServiceAccountKey),
}

impl Credentials {
    /// The login endpoint for this credential shape.
    fn login_path(&self) -> &'static str {
        match self {
            Self::AdminPassword { .. } => "auth/ad/login",
            Self::ServiceAccountKey(_) => "auth/signin",
        }
    }

    /// The login request body. Service-account keys sign in with their
    /// username/apiKey pair.
    fn payload(&self) -> serde_json::Value {
        match self {
            Self::AdminPassword { username, password } => json!({
                "username": username,
                "password": password.expose_secret(),
            }),
            Self::ServiceAccountKey(key) => json!({
                "username": key.username,
                "password": key.api_key.expose_secret(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

impl ManagerClient {
    /// Authenticate with the control plane.
    ///
    /// On success the bearer token from `data.token` is stored on the
    /// client and sent as the `Authorization` header on all subsequent
    /// requests. A non-2xx response is a credential failure and is never
    /// retried (the transport retry policy still covers transient 5xx).
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), Error> {
        let path = credentials.login_path();
        let resp = self.post_raw(path, credentials.payload()).await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let data: LoginData = Self::parse_envelope(resp).await?;
        self.set_token(SecretString::from(data.token));

        debug!("login successful via {path}");
        Ok(())
    }
}
