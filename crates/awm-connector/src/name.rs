//! Connector-name derivation.
//!
//! `{zone}-{instance-name}-{timestamp}` must be unique per instance-run in
//! the control plane's connector namespace. There is no collision retry;
//! uniqueness relies on the second-granularity timestamp plus the
//! zone/instance pair.

use chrono::{DateTime, Utc};

/// Build the connector name from its three parts.
///
/// The timestamp is compact UTC with punctuation stripped, seconds
/// precision, suffixed `Z`: `20240501T120000Z`.
pub fn connector_name(zone: &str, instance_name: &str, at: DateTime<Utc>) -> String {
    format!("{zone}-{instance_name}-{}", at.format("%Y%m%dT%H%M%SZ"))
}

/// The region a zone belongs to: the zone minus its trailing letter
/// (`us-west-2a` -> `us-west-2`).
pub fn region_of(zone: &str) -> &str {
    zone.strip_suffix(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(zone)
}
