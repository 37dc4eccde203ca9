//! Remote service abstraction.
//!
//! The resolver only talks to Redshift through the two traits defined here.
//! The AWS SDK implementations live in [`crate::aws`]; tests provide fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::types::{DbPassword, NetworkEndpoint};

/// Error-code prefix that marks a permission denial.
const ACCESS_DENIED_PREFIX: &str = "AccessDenied";

/// Failure of a single remote call.
#[derive(Debug, Clone, Error)]
#[error("{operation} failed: {message}")]
pub struct RemoteError {
    /// Remote operation name, e.g. `DescribeClusters`.
    pub operation: &'static str,
    /// Service error code, when the service returned one.
    pub code: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(operation: &'static str, code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            operation,
            code: code.map(String::from),
            message: message.into(),
        }
    }

    /// A response arrived but lacked a field the caller cannot do without.
    pub fn missing_field(operation: &'static str, field: &str) -> Self {
        Self::new(
            operation,
            Some("MissingField"),
            format!("response did not contain {field}"),
        )
    }

    /// Whether the service refused the call for lack of permission.
    pub fn is_access_denied(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|code| code.starts_with(ACCESS_DENIED_PREFIX))
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// A page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }
}

/// Metadata of a provisioned cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterDescription {
    pub identifier: String,
    pub master_username: Option<String>,
    pub db_name: Option<String>,
    pub endpoint: NetworkEndpoint,
}

/// Metadata of a serverless workgroup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkgroupDescription {
    pub name: String,
    pub endpoint: NetworkEndpoint,
}

/// Arguments to `GetClusterCredentials`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterCredentialsInput {
    pub cluster_identifier: String,
    pub db_user: String,
    pub db_name: Option<String>,
    pub duration_seconds: Option<i32>,
}

/// Arguments to the serverless `GetCredentials`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkgroupCredentialsInput {
    pub workgroup_name: String,
    pub db_name: Option<String>,
    pub duration_seconds: Option<i32>,
}

/// Credentials returned by either issuing operation.
#[derive(Debug, Clone)]
pub struct IssuedCredentials {
    pub db_user: String,
    pub db_password: DbPassword,
    pub expiration: DateTime<Utc>,
    /// Only returned by the serverless service.
    pub next_refresh_time: Option<DateTime<Utc>>,
}

/// Operations of the provisioned Redshift service.
#[async_trait]
pub trait ProvisionedService: Send + Sync {
    /// Describe clusters, one page at a time.
    ///
    /// With `identifier` set the service returns at most that one cluster.
    async fn describe_clusters(
        &self,
        identifier: Option<&str>,
        marker: Option<String>,
    ) -> Result<Page<ClusterDescription>, RemoteError>;

    /// Issue a temporary password for a database user.
    async fn get_cluster_credentials(
        &self,
        input: &ClusterCredentialsInput,
    ) -> Result<IssuedCredentials, RemoteError>;
}

/// Operations of the Redshift Serverless service.
#[async_trait]
pub trait ServerlessService: Send + Sync {
    /// List workgroups, one page at a time.
    async fn list_workgroups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<WorkgroupDescription>, RemoteError>;

    /// Fetch one workgroup by name.
    async fn get_workgroup(&self, name: &str) -> Result<WorkgroupDescription, RemoteError>;

    /// Issue temporary credentials for a workgroup.
    async fn get_credentials(
        &self,
        input: &WorkgroupCredentialsInput,
    ) -> Result<IssuedCredentials, RemoteError>;
}
