// Control-plane HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, the `{ data: ... }`
// envelope unwrapping, bearer-token session state, and the bounded retry
// loop. Endpoint modules (deployments, connector) are implemented as
// inherent methods via separate files to keep this module focused on
// transport mechanics.

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::{RetryPolicy, TransportConfig};

/// Success envelope: every control-plane response wraps its payload
/// in a `data` field.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: T,
}

/// HTTP client for the Anyware Manager control plane.
///
/// Holds the API base URL (e.g. `https://cas.teradici.com/api/v1`) and,
/// after a successful [`login`](crate::auth), the bearer token sent as the
/// `Authorization` header on every subsequent request. One client per
/// process run; the token is never persisted.
pub struct ManagerClient {
    http: reqwest::Client,
    api_url: Url,
    retry: RetryPolicy,
    token: Option<SecretString>,
}

impl ManagerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `api_url` should already include the versioned API root
    /// (`.../api/v1`). The client starts unauthenticated.
    pub fn new(api_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            api_url,
            retry: transport.retry.clone(),
            token: None,
        })
    }

    /// The API base URL.
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Whether a login exchange has completed on this client.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn set_token(&mut self, token: SecretString) {
        self.token = Some(token);
    }

    /// Build a full URL for an API path relative to the base.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let full = format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send an unauthenticated POST (login endpoints only).
    pub(crate) async fn post_raw(&self, path: &str, body: Value) -> Result<reqwest::Response, Error> {
        let url = self.endpoint(path)?;
        self.send(Method::POST, url, Some(body), false).await
    }

    /// Send an authenticated POST and unwrap the `data` envelope.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<T, Error> {
        let resp = self.post_status(path, body).await?;
        Self::parse_envelope(resp).await
    }

    /// Send an authenticated POST and return the response with its status
    /// unchecked. Used by the one endpoint (cloud-account validation) that
    /// treats a 400 as data rather than an error.
    pub(crate) async fn post_unchecked(
        &self,
        path: &str,
        body: Value,
    ) -> Result<reqwest::Response, Error> {
        let url = self.endpoint(path)?;
        self.send(Method::POST, url, Some(body), true).await
    }

    /// Send an authenticated POST where only the status matters.
    ///
    /// Returns the raw response after the fatal/non-fatal status split:
    /// a non-2xx status becomes `Error::Api` with the body as the message.
    pub(crate) async fn post_status(
        &self,
        path: &str,
        body: Value,
    ) -> Result<reqwest::Response, Error> {
        let resp = self.post_unchecked(path, body).await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }

    /// Issue a request, applying the retry policy.
    ///
    /// Eligible failures (listed status on a listed method, or a
    /// connect/timeout transport error) are reissued with exponential
    /// backoff up to `total_retries` times after the initial attempt;
    /// everything else is returned to the caller on the first occurrence.
    /// The response is returned with its status unchecked -- callers
    /// decide what a non-2xx means.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Value>,
        authenticated: bool,
    ) -> Result<reqwest::Response, Error> {
        let mut retries: u32 = 0;
        loop {
            let mut req = self.http.request(method.clone(), url.clone());
            if let Some(ref json) = body {
                req = req.json(json);
            }
            if authenticated {
                let token = self.token.as_ref().ok_or(Error::NotAuthenticated)?;
                req = req.header(reqwest::header::AUTHORIZATION, token.expose_secret());
            }

            debug!("{} {} (attempt {})", method, url, retries + 1);

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if self.retry.retry_status(&method, status)
                        && retries < self.retry.total_retries
                    {
                        warn!("{} {} returned {}, retrying", method, url, status);
                        retries += 1;
                        tokio::time::sleep(self.retry.backoff(retries)).await;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if self.retry.retry_transport(&method, &err)
                        && retries < self.retry.total_retries
                    {
                        warn!("{} {} failed ({}), retrying", method, url, err);
                        retries += 1;
                        tokio::time::sleep(self.retry.backoff(retries)).await;
                        continue;
                    }
                    return Err(Error::Transport(err));
                }
            }
        }
    }

    /// Unwrap the `{ data: ... }` envelope from a 2xx response.
    pub(crate) async fn parse_envelope<T: DeserializeOwned>(
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let body = resp.text().await.map_err(Error::Transport)?;
        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;
        Ok(envelope.data)
    }

    /// Map a non-2xx response to the error the caller should see,
    /// consuming the body as the message.
    pub(crate) async fn status_error(resp: reqwest::Response) -> Error {
        let status: StatusCode = resp.status();
        let message = resp.text().await.unwrap_or_default();
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}
