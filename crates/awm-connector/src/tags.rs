//! Instance-name lookup via the aws CLI.
//!
//! `ec2 describe-tags` filtered by the host's resource id, taking the
//! first tag's value as the instance name. The CLI is already present on
//! provisioned worker nodes and carries the instance-role credentials, so
//! we shell out rather than pull in an SDK for one call.

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::error::CliError;

#[derive(Debug, Deserialize)]
struct DescribeTagsOutput {
    #[serde(rename = "Tags", default)]
    tags: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    #[serde(rename = "Value")]
    value: String,
}

/// Look up the instance name for `instance_id` in `region`.
pub async fn instance_name(region: &str, instance_id: &str) -> Result<String, CliError> {
    let filter = format!("Name=resource-id,Values={instance_id}");
    debug!("aws ec2 describe-tags --region {region} --filters {filter}");

    let output = Command::new("aws")
        .args(["ec2", "describe-tags", "--region", region, "--filters", &filter])
        .output()
        .await
        .map_err(|e| CliError::TagLookup {
            reason: format!("failed to run aws CLI: {e}"),
        })?;

    if !output.status.success() {
        return Err(CliError::TagLookup {
            reason: format!(
                "aws CLI exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }

    parse_describe_tags(&String::from_utf8_lossy(&output.stdout))
}

fn parse_describe_tags(json: &str) -> Result<String, CliError> {
    let parsed: DescribeTagsOutput =
        serde_json::from_str(json).map_err(|e| CliError::TagLookup {
            reason: format!("unexpected describe-tags output: {e}"),
        })?;

    parsed
        .tags
        .into_iter()
        .next()
        .map(|tag| tag.value)
        .ok_or_else(|| CliError::TagLookup {
            reason: "instance has no tags".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tag_value_is_the_instance_name() {
        let json = r#"{
            "Tags": [
                { "Key": "Name", "ResourceId": "i-0abc", "ResourceType": "instance", "Value": "cac-node" },
                { "Key": "env", "ResourceId": "i-0abc", "ResourceType": "instance", "Value": "prod" }
            ]
        }"#;
        assert_eq!(parse_describe_tags(json).unwrap(), "cac-node");
    }

    #[test]
    fn untagged_instance_is_an_error() {
        let err = parse_describe_tags(r#"{ "Tags": [] }"#).unwrap_err();
        assert!(matches!(err, CliError::TagLookup { .. }));
    }

    #[test]
    fn malformed_output_is_an_error() {
        let err = parse_describe_tags("not json").unwrap_err();
        assert!(matches!(err, CliError::TagLookup { .. }));
    }
}
