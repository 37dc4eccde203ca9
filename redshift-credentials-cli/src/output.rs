use std::borrow::Cow;
use std::io::Write;

use chrono::{DateTime, Utc};
use redshift_credentials::CredentialBundle;
use serde::Serialize;

use crate::{cli::OutputFormat, error::Result};

/// Characters that never need quoting in a POSIX shell word.
const SHELL_SAFE_PUNCTUATION: &[char] = &['@', '%', '+', '=', ':', ',', '.', '/', '-', '_'];

pub struct OutputManager {
    prefix: String,
}

impl OutputManager {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn format_bundle(&self, bundle: &CredentialBundle, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Env => Ok(self.format_env(bundle)),
            OutputFormat::Json => self.format_json(bundle),
            OutputFormat::Yaml => self.format_yaml(bundle),
        }
    }

    /// Variables handed to a wrapped command, unquoted.
    pub fn env_vars(&self, bundle: &CredentialBundle) -> Vec<(String, String)> {
        bundle.env_vars(&self.prefix)
    }

    fn format_env(&self, bundle: &CredentialBundle) -> String {
        let mut output = String::new();
        for (name, value) in self.env_vars(bundle) {
            output.push_str(&format!("export {name}={}\n", Self::shell_quote(&value)));
        }
        output
    }

    fn format_json(&self, bundle: &CredentialBundle) -> Result<String> {
        let mut json = serde_json::to_string_pretty(bundle)?;
        json.push('\n');
        Ok(json)
    }

    fn format_yaml(&self, bundle: &CredentialBundle) -> Result<String> {
        serde_yaml::to_string(&YamlDocument::from(bundle)).map_err(Into::into)
    }

    // Single-quote anything a shell could reinterpret.
    fn shell_quote(s: &str) -> Cow<'_, str> {
        let safe = !s.is_empty()
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || SHELL_SAFE_PUNCTUATION.contains(&c));
        if safe {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(format!("'{}'", s.replace('\'', r"'\''")))
        }
    }
}

/// YAML view of a bundle, with snake_case keys.
#[derive(Serialize)]
struct YamlDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    workgroup_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster_identifier: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    port: Option<String>,
    db_password: &'a str,
    db_user: &'a str,
    expiration: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_refresh_time: Option<DateTime<Utc>>,
}

impl<'a> From<&'a CredentialBundle> for YamlDocument<'a> {
    fn from(bundle: &'a CredentialBundle) -> Self {
        Self {
            workgroup_name: bundle.workgroup_name(),
            cluster_identifier: bundle.cluster_identifier(),
            endpoint: bundle.endpoint(),
            port: bundle.port().map(|port| port.to_string()),
            db_password: bundle.db_password().expose(),
            db_user: bundle.db_user(),
            expiration: bundle.expiration(),
            next_refresh_time: bundle.next_refresh_time(),
        }
    }
}

pub fn write_output(content: &str, output_file: Option<&std::path::Path>) -> Result<()> {
    match output_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)?;
        }
        None => {
            print!("{content}");
            std::io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use redshift_credentials::{DbPassword, IssuedCredentials};

    fn issued(password: &str) -> IssuedCredentials {
        IssuedCredentials {
            db_user: "IAM:admin".to_string(),
            db_password: DbPassword::new(password),
            expiration: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            next_refresh_time: None,
        }
    }

    fn full_bundle() -> CredentialBundle {
        let mut issued = issued("p@ss");
        issued.next_refresh_time = Some(Utc.with_ymd_and_hms(2024, 5, 1, 11, 30, 0).unwrap());
        CredentialBundle::serverless("default", issued).with_location(
            Some("default.123456789012.us-east-1.redshift-serverless.amazonaws.com".to_string()),
            Some(5439),
        )
    }

    /// Only the mandatory fields: no endpoint, port or refresh time.
    fn minimal_bundle() -> CredentialBundle {
        CredentialBundle::provisioned("main", issued("s3cr3t"))
    }

    #[test]
    fn test_env_format_order() {
        let output = OutputManager::new("REDSHIFT_")
            .format_bundle(&full_bundle(), OutputFormat::Env)
            .unwrap();

        assert_eq!(
            output,
            "export REDSHIFT_SERVERLESS_WORKGROUP=default\n\
             export REDSHIFT_HOST=default.123456789012.us-east-1.redshift-serverless.amazonaws.com\n\
             export REDSHIFT_PORT=5439\n\
             export REDSHIFT_PASSWORD=p@ss\n\
             export REDSHIFT_USER=IAM:admin\n\
             export REDSHIFT_EXPIRATION=2024-05-01T12:00:00Z\n\
             export REDSHIFT_NEXT_REFRESH_TIME=2024-05-01T11:30:00Z\n"
        );
    }

    #[test]
    fn test_minimal_bundle_env() {
        let output = OutputManager::new("PG")
            .format_bundle(&minimal_bundle(), OutputFormat::Env)
            .unwrap();

        assert_eq!(
            output,
            "export PGPROVISIONED_CLUSTER=main\n\
             export PGPASSWORD=s3cr3t\n\
             export PGUSER=IAM:admin\n\
             export PGEXPIRATION=2024-05-01T12:00:00Z\n"
        );
    }

    #[test]
    fn test_minimal_bundle_json() {
        let output = OutputManager::new("REDSHIFT_")
            .format_bundle(&minimal_bundle(), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "ClusterIdentifier": "main",
                "DbPassword": "s3cr3t",
                "DbUser": "IAM:admin",
                "Expiration": "2024-05-01T12:00:00Z",
            })
        );
    }

    #[test]
    fn test_minimal_bundle_yaml() {
        let output = OutputManager::new("REDSHIFT_")
            .format_bundle(&minimal_bundle(), OutputFormat::Yaml)
            .unwrap();

        let value: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        let mapping = value.as_mapping().unwrap();

        assert_eq!(value["cluster_identifier"], "main");
        assert_eq!(value["db_password"], "s3cr3t");
        assert_eq!(value["db_user"], "IAM:admin");
        assert_eq!(mapping.len(), 4);
        for absent in ["workgroup_name", "endpoint", "port", "next_refresh_time"] {
            assert!(!mapping.contains_key(absent), "{absent} should be omitted");
        }
        assert!(!output.contains("null"));
    }

    #[test]
    fn test_full_bundle_yaml_keys() {
        let output = OutputManager::new("REDSHIFT_")
            .format_bundle(&full_bundle(), OutputFormat::Yaml)
            .unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();

        assert_eq!(value["workgroup_name"], "default");
        assert_eq!(
            value["endpoint"],
            "default.123456789012.us-east-1.redshift-serverless.amazonaws.com"
        );
        // Quoted, so it reads back as a string.
        assert_eq!(value["port"], "5439");
        assert_eq!(value["db_password"], "p@ss");
        assert!(value.get("next_refresh_time").is_some());
        assert!(value.get("WorkgroupName").is_none());
    }

    #[test]
    fn test_full_bundle_json_port_is_string() {
        let output = OutputManager::new("REDSHIFT_")
            .format_bundle(&full_bundle(), OutputFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["Port"], "5439");
        assert_eq!(value["WorkgroupName"], "default");
        assert_eq!(value["NextRefreshTime"], "2024-05-01T11:30:00Z");
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(OutputManager::shell_quote("abc-123_/.:"), "abc-123_/.:");
        assert_eq!(OutputManager::shell_quote(""), "''");
        assert_eq!(OutputManager::shell_quote("a b"), "'a b'");
        assert_eq!(OutputManager::shell_quote("$(rm)"), "'$(rm)'");
        assert_eq!(OutputManager::shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_env_vars_are_unquoted() {
        let bundle = CredentialBundle::provisioned("main", issued("a b$c"));
        let vars = OutputManager::new("REDSHIFT_").env_vars(&bundle);

        assert!(vars.contains(&("REDSHIFT_PASSWORD".to_string(), "a b$c".to_string())));
    }

    #[test]
    fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("creds.env");

        write_output("export A=1\n", Some(&path)).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "export A=1\n");
    }
}
