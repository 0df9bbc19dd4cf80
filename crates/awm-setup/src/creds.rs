//! Local credential file parsing.
//!
//! Two flat formats feed this tool: the temp-credentials file the
//! installer leaves at a fixed path (`username: ...` / `password: ...`
//! lines), and an AWS-style INI file whose `[default]` section carries an
//! access-key pair. No repo-wide config stack is warranted for two
//! ten-line files, so both get small line parsers here.

use std::fs;
use std::path::Path;

use secrecy::SecretString;

use crate::error::CliError;

/// Where the installer writes the initial admin credentials.
pub const TEMP_CREDS_PATH: &str = "/opt/teradici/casm/temp-creds.txt";

/// The initial admin username/password pair.
#[derive(Debug)]
pub struct TempCredentials {
    pub username: String,
    pub password: SecretString,
}

/// Read and parse the installer's temp-credentials file.
pub fn read_temp_credentials(path: &Path) -> Result<TempCredentials, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_temp_credentials(&contents).map_err(|reason| CliError::MalformedCredentials {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_temp_credentials(contents: &str) -> Result<TempCredentials, String> {
    let mut username = None;
    let mut password = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| format!("expected 'key: value', got {line:?}"))?;
        match key.trim() {
            "username" => username = Some(value.trim().to_owned()),
            "password" => password = Some(value.trim().to_owned()),
            _ => {}
        }
    }

    Ok(TempCredentials {
        username: username.ok_or("missing 'username' line")?,
        password: SecretString::from(password.ok_or("missing 'password' line")?),
    })
}

/// The `[default]` access-key pair from an AWS credentials INI file.
#[derive(Debug)]
pub struct AwsAccessKey {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Read and parse the `[default]` section of an AWS credentials file.
pub fn read_aws_access_key(path: &Path) -> Result<AwsAccessKey, CliError> {
    let contents = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_aws_access_key(&contents).map_err(|reason| CliError::MalformedCredentials {
        path: path.display().to_string(),
        reason,
    })
}

fn parse_aws_access_key(contents: &str) -> Result<AwsAccessKey, String> {
    let mut in_default = false;
    let mut access_key_id = None;
    let mut secret_access_key = None;

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            in_default = section.trim() == "default";
            continue;
        }
        if !in_default {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            match key.trim() {
                "aws_access_key_id" => access_key_id = Some(value.trim().to_owned()),
                "aws_secret_access_key" => secret_access_key = Some(value.trim().to_owned()),
                _ => {}
            }
        }
    }

    Ok(AwsAccessKey {
        access_key_id: access_key_id.ok_or("missing aws_access_key_id in [default]")?,
        secret_access_key: secret_access_key.ok_or("missing aws_secret_access_key in [default]")?,
    })
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn temp_credentials_parse() {
        let creds = parse_temp_credentials("username: adminUser\npassword: s3cret!\n").unwrap();
        assert_eq!(creds.username, "adminUser");
        assert_eq!(creds.password.expose_secret(), "s3cret!");
    }

    #[test]
    fn temp_credentials_tolerate_extra_lines_and_whitespace() {
        let creds =
            parse_temp_credentials("\nhost: localhost\n  username :  adminUser  \npassword:pw\n")
                .unwrap();
        assert_eq!(creds.username, "adminUser");
        assert_eq!(creds.password.expose_secret(), "pw");
    }

    #[test]
    fn temp_credentials_missing_field_is_an_error() {
        let err = parse_temp_credentials("username: adminUser\n").unwrap_err();
        assert!(err.contains("password"));
    }

    #[test]
    fn aws_key_parses_default_section_only() {
        let ini = "\
[other]
aws_access_key_id = WRONG

[default]
# the pair the installer generated
aws_access_key_id = AKIAEXAMPLE
aws_secret_access_key = abc/def+ghi
";
        let key = parse_aws_access_key(ini).unwrap();
        assert_eq!(key.access_key_id, "AKIAEXAMPLE");
        assert_eq!(key.secret_access_key, "abc/def+ghi");
    }

    #[test]
    fn aws_key_missing_section_is_an_error() {
        let err = parse_aws_access_key("[profile x]\naws_access_key_id = A\n").unwrap_err();
        assert!(err.contains("aws_access_key_id"));
    }
}
