//! Credential fetch for provisioned clusters.

use tracing::{debug, instrument};

use crate::bundle::CredentialBundle;
use crate::error::{CredentialError, Result};
use crate::remote::{ClusterCredentialsInput, ClusterDescription, ProvisionedService};
use crate::request::ResolutionState;

/// Issue credentials for `cluster`.
///
/// Without a database user the cluster is described first; its master user
/// becomes the database user and its endpoint replaces any resolved location.
/// When the location is still unknown after issuing, one more describe call is
/// attempted, and any failure of that call only costs the endpoint.
#[instrument(skip_all, fields(cluster = %cluster))]
pub(crate) async fn fetch(
    service: &dyn ProvisionedService,
    cluster: String,
    mut state: ResolutionState,
) -> Result<CredentialBundle> {
    let db_user = match state.db_user.take() {
        Some(user) => user,
        None => {
            let description = describe_cluster(service, &cluster)
                .await?
                .ok_or_else(|| CredentialError::TargetNotFound(cluster.clone()))?;
            let user = description
                .master_username
                .ok_or_else(|| CredentialError::TargetNotFound(cluster.clone()))?;
            debug!(db_user = %user, "Using cluster master user");
            state.set_location(description.endpoint.address, description.endpoint.port);
            user
        }
    };

    let input = ClusterCredentialsInput {
        cluster_identifier: cluster.clone(),
        db_user,
        db_name: state.db_name.clone(),
        duration_seconds: state.duration_seconds,
    };
    let issued = service.get_cluster_credentials(&input).await?;

    if state.resolved_address.is_none() {
        match describe_cluster(service, &cluster).await {
            Ok(Some(description)) => {
                state.set_location(description.endpoint.address, description.endpoint.port);
            }
            Ok(None) => debug!("Cluster not returned by DescribeClusters; endpoint unknown"),
            Err(e) if e.is_access_denied() => {
                debug!("Failed to fetch endpoint because redshift:DescribeClusters is denied");
            }
            Err(e) => debug!(error = %e, "Failed to fetch endpoint from redshift:DescribeClusters"),
        }
    }

    Ok(CredentialBundle::provisioned(cluster, issued)
        .with_location(state.resolved_address, state.resolved_port))
}

async fn describe_cluster(
    service: &dyn ProvisionedService,
    cluster: &str,
) -> Result<Option<ClusterDescription>> {
    let page = service.describe_clusters(Some(cluster), None).await?;
    Ok(page.items.into_iter().next())
}
