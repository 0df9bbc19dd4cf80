// Connector token issuance
//
// Called by `get-connector-token` after signing in with a deployment
// service-account key. The token is scoped to one deployment and one
// connector name.

use serde::Deserialize;
use serde_json::json;

use crate::client::ManagerClient;
use crate::error::Error;

#[derive(Debug, Deserialize)]
struct ConnectorTokenData {
    token: String,
}

impl ManagerClient {
    /// Issue a connector token for `connector_name` in `deployment_id`.
    ///
    /// Fatal on failure. The returned string is the exact token the
    /// control plane issued; the caller writes it to disk verbatim.
    pub async fn create_connector_token(
        &self,
        deployment_id: &str,
        connector_name: &str,
    ) -> Result<String, Error> {
        let payload = json!({
            "deploymentId": deployment_id,
            "connectorName": connector_name,
        });
        let data: ConnectorTokenData = self.post("auth/tokens/connector", payload).await?;
        Ok(data.token)
    }
}
