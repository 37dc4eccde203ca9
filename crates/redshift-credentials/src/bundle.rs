//! The credential bundle handed to output adapters.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::remote::IssuedCredentials;
use crate::types::{DbPassword, TargetKind};

/// Environment variable suffixes, in output order.
pub const VAR_PROVISIONED_CLUSTER: &str = "PROVISIONED_CLUSTER";
pub const VAR_SERVERLESS_WORKGROUP: &str = "SERVERLESS_WORKGROUP";
pub const VAR_HOST: &str = "HOST";
pub const VAR_PORT: &str = "PORT";
pub const VAR_PASSWORD: &str = "PASSWORD";
pub const VAR_USER: &str = "USER";
pub const VAR_EXPIRATION: &str = "EXPIRATION";
pub const VAR_NEXT_REFRESH_TIME: &str = "NEXT_REFRESH_TIME";

/// Temporary credentials for one cluster or workgroup.
///
/// Exactly one of the cluster identifier and workgroup name is present.
/// Absent optional fields are skipped when serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CredentialBundle {
    #[serde(skip_serializing_if = "Option::is_none")]
    workgroup_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cluster_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_port"
    )]
    port: Option<u16>,
    db_password: DbPassword,
    db_user: String,
    expiration: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_refresh_time: Option<DateTime<Utc>>,
}

impl CredentialBundle {
    /// Bundle for a provisioned cluster. Provisioned credentials never carry a
    /// refresh time.
    pub fn provisioned(cluster_identifier: impl Into<String>, issued: IssuedCredentials) -> Self {
        Self {
            workgroup_name: None,
            cluster_identifier: Some(cluster_identifier.into()),
            endpoint: None,
            port: None,
            db_password: issued.db_password,
            db_user: issued.db_user,
            expiration: issued.expiration,
            next_refresh_time: None,
        }
    }

    /// Bundle for a serverless workgroup.
    pub fn serverless(workgroup_name: impl Into<String>, issued: IssuedCredentials) -> Self {
        Self {
            workgroup_name: Some(workgroup_name.into()),
            cluster_identifier: None,
            endpoint: None,
            port: None,
            db_password: issued.db_password,
            db_user: issued.db_user,
            expiration: issued.expiration,
            next_refresh_time: issued.next_refresh_time,
        }
    }

    /// Attach the network location.
    pub fn with_location(mut self, endpoint: Option<String>, port: Option<u16>) -> Self {
        self.endpoint = endpoint;
        self.port = port;
        self
    }

    pub fn kind(&self) -> TargetKind {
        if self.cluster_identifier.is_some() {
            TargetKind::Provisioned
        } else {
            TargetKind::Serverless
        }
    }

    pub fn workgroup_name(&self) -> Option<&str> {
        self.workgroup_name.as_deref()
    }

    pub fn cluster_identifier(&self) -> Option<&str> {
        self.cluster_identifier.as_deref()
    }

    /// Host name of the cluster or workgroup.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn db_user(&self) -> &str {
        &self.db_user
    }

    pub fn db_password(&self) -> &DbPassword {
        &self.db_password
    }

    pub fn expiration(&self) -> DateTime<Utc> {
        self.expiration
    }

    pub fn next_refresh_time(&self) -> Option<DateTime<Utc>> {
        self.next_refresh_time
    }

    /// `(NAME, value)` pairs for every present field, names prefixed with
    /// `prefix`.
    pub fn env_vars(&self, prefix: &str) -> Vec<(String, String)> {
        let mut vars = Vec::with_capacity(8);
        let mut push = |name: &str, value: String| vars.push((format!("{prefix}{name}"), value));

        if let Some(cluster) = &self.cluster_identifier {
            push(VAR_PROVISIONED_CLUSTER, cluster.clone());
        }
        if let Some(workgroup) = &self.workgroup_name {
            push(VAR_SERVERLESS_WORKGROUP, workgroup.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            push(VAR_HOST, endpoint.clone());
        }
        if let Some(port) = self.port {
            push(VAR_PORT, port.to_string());
        }
        push(VAR_PASSWORD, self.db_password.expose().to_string());
        push(VAR_USER, self.db_user.clone());
        push(VAR_EXPIRATION, format_timestamp(&self.expiration));
        if let Some(next_refresh_time) = &self.next_refresh_time {
            push(VAR_NEXT_REFRESH_TIME, format_timestamp(next_refresh_time));
        }
        vars
    }
}

// Port is written as a string in JSON and YAML documents.
fn serialize_port<S: Serializer>(port: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error> {
    match port {
        Some(port) => serializer.collect_str(port),
        None => serializer.serialize_none(),
    }
}

/// RFC 3339 in UTC with sub-second digits only when present.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
