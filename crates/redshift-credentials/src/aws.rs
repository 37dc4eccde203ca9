//! AWS SDK backed implementations of the remote service traits.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_redshift::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_redshift::types::Cluster;
use aws_sdk_redshiftserverless::types::Workgroup;
use aws_smithy_types_convert::date_time::DateTimeExt;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::remote::{
    ClusterCredentialsInput, ClusterDescription, IssuedCredentials, Page, ProvisionedService,
    RemoteError, ServerlessService, WorkgroupCredentialsInput, WorkgroupDescription,
};
use crate::resolver::CredentialsClient;
use crate::types::{DbPassword, NetworkEndpoint};

/// Load the shared AWS configuration from the default provider chain.
///
/// `profile` and `region` override what the environment and shared config
/// files would select.
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

impl CredentialsClient {
    /// Client talking to the real provisioned and serverless endpoints.
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(
            Arc::new(AwsProvisionedService::from_sdk_config(config)),
            Arc::new(AwsServerlessService::from_sdk_config(config)),
        )
    }
}

/// `redshift` API client.
#[derive(Debug, Clone)]
pub struct AwsProvisionedService {
    client: aws_sdk_redshift::Client,
}

impl AwsProvisionedService {
    pub fn new(client: aws_sdk_redshift::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_redshift::Client::new(config))
    }
}

#[async_trait]
impl ProvisionedService for AwsProvisionedService {
    async fn describe_clusters(
        &self,
        identifier: Option<&str>,
        marker: Option<String>,
    ) -> Result<Page<ClusterDescription>, RemoteError> {
        const OP: &str = "DescribeClusters";
        let output = self
            .client
            .describe_clusters()
            .set_cluster_identifier(identifier.map(String::from))
            .set_marker(marker)
            .send()
            .await
            .map_err(|e| remote_error(OP, e))?;

        let items: Vec<_> = output.clusters().iter().filter_map(cluster_description).collect();
        debug!(clusters = items.len(), "DescribeClusters page received");
        Ok(Page {
            items,
            next_token: output
                .marker()
                .filter(|m| !m.is_empty())
                .map(String::from),
        })
    }

    async fn get_cluster_credentials(
        &self,
        input: &ClusterCredentialsInput,
    ) -> Result<IssuedCredentials, RemoteError> {
        const OP: &str = "GetClusterCredentials";
        let output = self
            .client
            .get_cluster_credentials()
            .cluster_identifier(&input.cluster_identifier)
            .db_user(&input.db_user)
            .set_db_name(input.db_name.clone())
            .set_duration_seconds(input.duration_seconds)
            .send()
            .await
            .map_err(|e| remote_error(OP, e))?;

        Ok(IssuedCredentials {
            db_user: required(OP, "DbUser", output.db_user())?.to_string(),
            db_password: DbPassword::new(required(OP, "DbPassword", output.db_password())?),
            expiration: to_chrono(OP, "Expiration", output.expiration())?,
            next_refresh_time: None,
        })
    }
}

/// `redshift-serverless` API client.
#[derive(Debug, Clone)]
pub struct AwsServerlessService {
    client: aws_sdk_redshiftserverless::Client,
}

impl AwsServerlessService {
    pub fn new(client: aws_sdk_redshiftserverless::Client) -> Self {
        Self { client }
    }

    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(aws_sdk_redshiftserverless::Client::new(config))
    }
}

#[async_trait]
impl ServerlessService for AwsServerlessService {
    async fn list_workgroups(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<WorkgroupDescription>, RemoteError> {
        const OP: &str = "ListWorkgroups";
        let output = self
            .client
            .list_workgroups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| remote_error(OP, e))?;

        let items: Vec<_> = output
            .workgroups()
            .iter()
            .filter_map(workgroup_description)
            .collect();
        debug!(workgroups = items.len(), "ListWorkgroups page received");
        Ok(Page {
            items,
            next_token: output
                .next_token()
                .filter(|t| !t.is_empty())
                .map(String::from),
        })
    }

    async fn get_workgroup(&self, name: &str) -> Result<WorkgroupDescription, RemoteError> {
        const OP: &str = "GetWorkgroup";
        let output = self
            .client
            .get_workgroup()
            .workgroup_name(name)
            .send()
            .await
            .map_err(|e| remote_error(OP, e))?;

        output
            .workgroup()
            .and_then(workgroup_description)
            .ok_or_else(|| RemoteError::missing_field(OP, "Workgroup"))
    }

    async fn get_credentials(
        &self,
        input: &WorkgroupCredentialsInput,
    ) -> Result<IssuedCredentials, RemoteError> {
        const OP: &str = "GetCredentials";
        let output = self
            .client
            .get_credentials()
            .workgroup_name(&input.workgroup_name)
            .set_db_name(input.db_name.clone())
            .set_duration_seconds(input.duration_seconds)
            .send()
            .await
            .map_err(|e| remote_error(OP, e))?;

        let next_refresh_time = match output.next_refresh_time() {
            Some(ts) => Some(to_chrono(OP, "NextRefreshTime", Some(ts))?),
            None => None,
        };

        Ok(IssuedCredentials {
            db_user: required(OP, "DbUser", output.db_user())?.to_string(),
            db_password: DbPassword::new(required(OP, "DbPassword", output.db_password())?),
            expiration: to_chrono(OP, "Expiration", output.expiration())?,
            next_refresh_time,
        })
    }
}

fn remote_error<E>(operation: &'static str, err: E) -> RemoteError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    RemoteError::new(
        operation,
        err.code(),
        DisplayErrorContext(&err).to_string(),
    )
}

fn required<'a>(
    operation: &'static str,
    field: &str,
    value: Option<&'a str>,
) -> Result<&'a str, RemoteError> {
    value.ok_or_else(|| RemoteError::missing_field(operation, field))
}

fn to_chrono(
    operation: &'static str,
    field: &str,
    value: Option<&aws_sdk_redshift::primitives::DateTime>,
) -> Result<DateTime<Utc>, RemoteError> {
    value
        .ok_or_else(|| RemoteError::missing_field(operation, field))?
        .to_chrono_utc()
        .map_err(|e| RemoteError::new(operation, Some("InvalidTimestamp"), e.to_string()))
}

fn port(port: Option<i32>) -> Option<u16> {
    port.and_then(|p| u16::try_from(p).ok())
}

fn cluster_description(cluster: &Cluster) -> Option<ClusterDescription> {
    let endpoint = cluster
        .endpoint()
        .map(|ep| NetworkEndpoint {
            address: ep.address().map(String::from),
            port: port(ep.port()),
        })
        .unwrap_or_default();
    Some(ClusterDescription {
        identifier: cluster.cluster_identifier()?.to_string(),
        master_username: cluster.master_username().map(String::from),
        db_name: cluster.db_name().map(String::from),
        endpoint,
    })
}

fn workgroup_description(workgroup: &Workgroup) -> Option<WorkgroupDescription> {
    let endpoint = workgroup
        .endpoint()
        .map(|ep| NetworkEndpoint {
            address: ep.address().map(String::from),
            port: port(ep.port()),
        })
        .unwrap_or_default();
    Some(WorkgroupDescription {
        name: workgroup.workgroup_name()?.to_string(),
        endpoint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_conversion() {
        assert_eq!(port(Some(5439)), Some(5439));
        assert_eq!(port(Some(-1)), None);
        assert_eq!(port(Some(70000)), None);
        assert_eq!(port(None), None);
    }

    #[test]
    fn test_cluster_description_requires_identifier() {
        let cluster = Cluster::builder()
            .master_username("admin")
            .db_name("dev")
            .build();
        assert!(cluster_description(&cluster).is_none());

        let cluster = Cluster::builder()
            .cluster_identifier("main")
            .master_username("admin")
            .endpoint(
                aws_sdk_redshift::types::Endpoint::builder()
                    .address("main.abc.us-east-1.redshift.amazonaws.com")
                    .port(5439)
                    .build(),
            )
            .build();
        let description = cluster_description(&cluster).unwrap();
        assert_eq!(description.identifier, "main");
        assert_eq!(description.master_username.as_deref(), Some("admin"));
        assert_eq!(description.endpoint.port, Some(5439));
    }

    #[test]
    fn test_to_chrono() {
        let ts = aws_sdk_redshift::primitives::DateTime::from_secs(1_714_564_800);
        let converted = to_chrono("GetCredentials", "Expiration", Some(&ts)).unwrap();
        assert_eq!(converted.timestamp(), 1_714_564_800);

        let err = to_chrono("GetCredentials", "Expiration", None).unwrap_err();
        assert_eq!(err.code.as_deref(), Some("MissingField"));
    }
}
