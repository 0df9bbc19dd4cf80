// awm-api: Async Rust client for the Anyware Manager control-plane API.
//
// One `ManagerClient` per process: build it from a `TransportConfig`,
// complete a `login` exchange, then call the endpoint wrappers. Endpoint
// modules (deployments, connector) are implemented as inherent methods
// via separate files to keep `client` focused on transport mechanics.

pub mod auth;
pub mod client;
pub mod connector;
pub mod deployments;
pub mod error;
pub mod transport;

pub use auth::{Credentials, ServiceAccountKey};
pub use client::ManagerClient;
pub use deployments::{CloudAccountValidation, CloudCredential, Deployment};
pub use error::Error;
pub use transport::{RetryPolicy, TlsMode, TransportConfig};
