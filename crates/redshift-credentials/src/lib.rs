//! Temporary database credentials for Amazon Redshift.
//!
//! This crate resolves which Redshift target to talk to, a provisioned
//! cluster or a serverless workgroup, from whatever the caller knows, and
//! issues a temporary database password for it.
//!
//! ## Core Types
//!
//! - [`CredentialsClient`] - Resolves a target and fetches credentials
//! - [`CredentialsRequest`] - Partial caller input (endpoint, identifiers, user, database)
//! - [`CredentialBundle`] - The issued credentials plus the target's location
//! - [`TargetSelector`] - Strategy for choosing between several discovered targets
//!
//! ## Remote Services
//!
//! - [`ProvisionedService`] / [`ServerlessService`] - The Redshift APIs the resolver needs
//! - [`aws::AwsProvisionedService`] / [`aws::AwsServerlessService`] - AWS SDK implementations
//!   (feature `aws`)
//!
//! ```no_run
//! # #[cfg(feature = "aws")]
//! # async fn example() -> redshift_credentials::Result<()> {
//! use redshift_credentials::{CredentialsClient, CredentialsRequest};
//!
//! let config = redshift_credentials::aws::load_sdk_config(None, None).await;
//! let client = CredentialsClient::from_sdk_config(&config);
//! let request = CredentialsRequest::new().with_workgroup_name(Some("default".into()));
//! let bundle = client.get_credentials(&request).await?;
//! println!("user {} expires at {}", bundle.db_user(), bundle.expiration());
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "aws")]
pub mod aws;
pub mod bundle;
pub mod discovery;
pub mod endpoint;
pub mod error;
mod provisioned;
pub mod remote;
pub mod request;
pub mod resolver;
pub mod selection;
mod serverless;
pub mod types;

pub use bundle::{CredentialBundle, format_timestamp};
pub use discovery::DiscoveredTarget;
pub use endpoint::{ParsedEndpoint, parse_endpoint};
pub use error::{CredentialError, Result};
pub use remote::{
    ClusterCredentialsInput, ClusterDescription, IssuedCredentials, Page, ProvisionedService,
    RemoteError, ServerlessService, WorkgroupCredentialsInput, WorkgroupDescription,
};
pub use request::CredentialsRequest;
pub use resolver::{CredentialsClient, ResolvedTarget};
pub use selection::{MatchOutcome, SelectorError, TargetSelector, match_candidate};
pub use types::{DbPassword, NetworkEndpoint, TargetKind};
