// Transport configuration for building reqwest::Client instances.
//
// Both provisioning binaries share TLS, timeout, and retry settings
// through this module. The retry policy is normalized into a single
// struct constructed once at startup and consumed by the client's
// request loop; nothing else in the crate inspects retry behavior.

use std::time::Duration;

use reqwest::{Method, StatusCode};

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (management VMs serve self-signed certs).
    DangerAcceptInvalid,
}

/// Bounded retry policy for transient control-plane failures.
///
/// A request is eligible for retry when its method is in `methods` and the
/// response status is in `statuses` (or the transport failed with a
/// connect/timeout error). Eligible requests are reissued with exponential
/// backoff up to `total_retries` times after the initial attempt, so a
/// policy of 10 issues at most 11 requests; any other failure surfaces
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub total_retries: u32,
    pub backoff_factor: Duration,
    pub statuses: Vec<StatusCode>,
    pub methods: Vec<Method>,
}

impl RetryPolicy {
    /// The standard provisioning policy: up to 10 retries with a 1s
    /// backoff factor, retrying GET/POST on 500/502/503/504.
    pub fn standard() -> Self {
        Self {
            total_retries: 10,
            backoff_factor: Duration::from_secs(1),
            statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ],
            methods: vec![Method::GET, Method::POST],
        }
    }

    /// Single attempt, no retries.
    pub fn disabled() -> Self {
        Self {
            total_retries: 0,
            backoff_factor: Duration::ZERO,
            statuses: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Whether a response with this status should be reissued.
    pub(crate) fn retry_status(&self, method: &Method, status: StatusCode) -> bool {
        self.methods.contains(method) && self.statuses.contains(&status)
    }

    /// Whether a transport-level failure should be reissued.
    pub(crate) fn retry_transport(&self, method: &Method, err: &reqwest::Error) -> bool {
        self.methods.contains(method) && (err.is_timeout() || err.is_connect())
    }

    /// Backoff before the `retry`-th reissue (1-based):
    /// `backoff_factor * 2^(retry - 1)`.
    pub(crate) fn backoff(&self, retry: u32) -> Duration {
        self.backoff_factor * 2u32.saturating_pow(retry.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::standard(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("awm-provision/", env!("CARGO_PKG_VERSION")));

        if matches!(self.tls, TlsMode::DangerAcceptInvalid) {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Disable TLS verification.
    pub fn insecure(mut self) -> Self {
        self.tls = TlsMode::DangerAcceptInvalid;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_policy_matches_provisioning_defaults() {
        let policy = RetryPolicy::standard();
        assert_eq!(policy.total_retries, 10);
        assert_eq!(policy.backoff_factor, Duration::from_secs(1));
        assert_eq!(
            policy.statuses,
            vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::GATEWAY_TIMEOUT,
            ]
        );
        assert_eq!(policy.methods, vec![Method::GET, Method::POST]);
    }

    #[test]
    fn only_server_errors_on_listed_methods_are_retried() {
        let policy = RetryPolicy::standard();

        assert!(policy.retry_status(&Method::POST, StatusCode::SERVICE_UNAVAILABLE));
        assert!(policy.retry_status(&Method::GET, StatusCode::BAD_GATEWAY));

        // Business-logic failures surface immediately.
        assert!(!policy.retry_status(&Method::POST, StatusCode::BAD_REQUEST));
        assert!(!policy.retry_status(&Method::POST, StatusCode::UNAUTHORIZED));
        assert!(!policy.retry_status(&Method::POST, StatusCode::NOT_FOUND));

        // Methods outside the allow-list never retry.
        assert!(!policy.retry_status(&Method::DELETE, StatusCode::SERVICE_UNAVAILABLE));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = RetryPolicy::standard();
        assert_eq!(policy.backoff(1), Duration::from_secs(1));
        assert_eq!(policy.backoff(2), Duration::from_secs(2));
        assert_eq!(policy.backoff(3), Duration::from_secs(4));
        assert_eq!(policy.backoff(5), Duration::from_secs(16));
    }

    #[test]
    fn disabled_policy_never_retries() {
        let policy = RetryPolicy::disabled();
        assert_eq!(policy.total_retries, 0);
        assert!(!policy.retry_status(&Method::POST, StatusCode::SERVICE_UNAVAILABLE));
    }
}
