// Deployment provisioning endpoints
//
// Everything `awm-setup` calls after login: admin password rotation,
// deployment and deployment-key creation, and the optional cloud
// service-account validate/attach pair. All are single authenticated
// POSTs; only the cloud-account pair is allowed to fail softly.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::client::ManagerClient;
use crate::error::Error;

/// A deployment record returned by `POST /deployments`.
///
/// The server attaches more fields than we consume; only the id (needed
/// for key creation and cloud-account attachment) and the echoed name are
/// kept.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub deployment_id: String,
    #[serde(default)]
    pub deployment_name: String,
}

/// A cloud service-account credential pair, plus the IAM user name the
/// control plane records alongside it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudCredential {
    pub user_name: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Outcome of cloud-account credential validation.
///
/// A 400 from the validate endpoint means the key works but lacks the
/// permissions the control plane wants; that is a caller decision, not an
/// error. Anything else non-2xx is a real `Err`.
#[derive(Debug)]
pub enum CloudAccountValidation {
    Accepted,
    InsufficientPermissions { detail: String },
}

impl ManagerClient {
    /// Set a new password for the admin user. Fatal on failure.
    pub async fn set_admin_password(&self, new_password: &SecretString) -> Result<(), Error> {
        let payload = json!({ "password": new_password.expose_secret() });
        self.post_status("auth/ad/adminPassword", payload).await?;
        Ok(())
    }

    /// Create a deployment. Fatal on failure; exactly one request is
    /// issued -- a 4xx (bad registration code, duplicate name) surfaces
    /// immediately without retry.
    pub async fn create_deployment(
        &self,
        name: &str,
        registration_code: &SecretString,
    ) -> Result<Deployment, Error> {
        let payload = json!({
            "deploymentName": name,
            "registrationCode": registration_code.expose_secret(),
        });
        self.post("deployments", payload).await
    }

    /// Create a service-account key scoped to a deployment.
    ///
    /// Returns the raw key object so the caller can persist it verbatim --
    /// the key JSON is the script's output artifact and we must not drop
    /// fields we don't model.
    pub async fn create_deployment_key(
        &self,
        deployment_id: &str,
        key_name: &str,
    ) -> Result<Value, Error> {
        let payload = json!({
            "deploymentId": deployment_id,
            "keyName": key_name,
        });
        self.post("auth/keys", payload).await
    }

    /// Validate a cloud service-account credential against the control
    /// plane before attaching it.
    pub async fn validate_cloud_account(
        &self,
        credential: &CloudCredential,
    ) -> Result<CloudAccountValidation, Error> {
        let payload = json!({
            "provider": "aws",
            "credential": credential,
        });
        let resp = self
            .post_unchecked("auth/users/cloudServiceAccount/validate", payload)
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!("cloud service-account credential accepted");
            return Ok(CloudAccountValidation::Accepted);
        }

        if status == reqwest::StatusCode::BAD_REQUEST {
            // The envelope's `data` carries the permission details.
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("data").map(ToString::to_string))
                .unwrap_or(body);
            return Ok(CloudAccountValidation::InsufficientPermissions { detail });
        }

        Err(Self::status_error(resp).await)
    }

    /// Attach a validated cloud service-account to a deployment.
    pub async fn add_cloud_account(
        &self,
        deployment_id: &str,
        credential: &CloudCredential,
    ) -> Result<(), Error> {
        let payload = json!({
            "provider": "aws",
            "credential": credential,
        });
        let path = format!("deployments/{deployment_id}/cloudServiceAccounts");
        self.post_status(&path, payload).await?;
        Ok(())
    }
}
