//! Enumeration of candidate clusters and workgroups.

use tracing::{debug, warn};

use crate::error::Result;
use crate::remote::{ClusterDescription, ProvisionedService, ServerlessService, WorkgroupDescription};
use crate::types::TargetKind;

/// A cluster or workgroup found while enumerating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredTarget {
    pub kind: TargetKind,
    /// Cluster identifier or workgroup name.
    pub identifier: String,
    /// Master user; provisioned only.
    pub master_user: Option<String>,
    /// Initial database name; provisioned only.
    pub initial_db_name: Option<String>,
    pub address: Option<String>,
    pub port: Option<u16>,
}

impl DiscoveredTarget {
    /// Listing line shown to a selector, numbered from 1.
    pub fn listing_line(&self, index: usize) -> String {
        format!(
            "[{}] {}\t{}\t{}",
            index + 1,
            self.identifier,
            self.kind,
            self.address.as_deref().unwrap_or_default()
        )
    }
}

impl From<ClusterDescription> for DiscoveredTarget {
    fn from(cluster: ClusterDescription) -> Self {
        Self {
            kind: TargetKind::Provisioned,
            identifier: cluster.identifier,
            master_user: cluster.master_username,
            initial_db_name: cluster.db_name,
            address: cluster.endpoint.address,
            port: cluster.endpoint.port,
        }
    }
}

impl From<WorkgroupDescription> for DiscoveredTarget {
    fn from(workgroup: WorkgroupDescription) -> Self {
        Self {
            kind: TargetKind::Serverless,
            identifier: workgroup.name,
            master_user: None,
            initial_db_name: None,
            address: workgroup.endpoint.address,
            port: workgroup.endpoint.port,
        }
    }
}

/// Collect every provisioned cluster visible to the caller.
///
/// A permission denial ends the listing; clusters from pages already read are
/// kept. Any other failure is returned.
pub async fn discover_clusters(service: &dyn ProvisionedService) -> Result<Vec<DiscoveredTarget>> {
    let mut found = Vec::new();
    let mut marker = None;
    loop {
        let page = match service.describe_clusters(None, marker.take()).await {
            Ok(page) => page,
            Err(e) if e.is_access_denied() => {
                warn!(
                    "Assuming no provisioned cluster exists because redshift:DescribeClusters is denied"
                );
                break;
            }
            Err(e) => return Err(e.into()),
        };
        for cluster in page.items {
            let target = DiscoveredTarget::from(cluster);
            debug!(identifier = %target.identifier, kind = %target.kind, "Target found");
            found.push(target);
        }
        match page.next_token {
            Some(token) => marker = Some(token),
            None => break,
        }
    }
    Ok(found)
}

/// Collect every serverless workgroup visible to the caller.
///
/// Same permission-denial policy as [`discover_clusters`].
pub async fn discover_workgroups(service: &dyn ServerlessService) -> Result<Vec<DiscoveredTarget>> {
    let mut found = Vec::new();
    let mut next_token = None;
    loop {
        let page = match service.list_workgroups(next_token.take()).await {
            Ok(page) => page,
            Err(e) if e.is_access_denied() => {
                warn!(
                    "Assuming no serverless workgroup exists because redshift-serverless:ListWorkgroups is denied"
                );
                break;
            }
            Err(e) => return Err(e.into()),
        };
        for workgroup in page.items {
            let target = DiscoveredTarget::from(workgroup);
            debug!(identifier = %target.identifier, kind = %target.kind, "Target found");
            found.push(target);
        }
        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NetworkEndpoint;

    #[test]
    fn test_listing_line() {
        let target = DiscoveredTarget::from(ClusterDescription {
            identifier: "main".to_string(),
            master_username: Some("admin".to_string()),
            db_name: Some("dev".to_string()),
            endpoint: NetworkEndpoint::new("main.abc.redshift.amazonaws.com", Some(5439)),
        });
        assert_eq!(
            target.listing_line(0),
            "[1] main\tprovisioned cluster\tmain.abc.redshift.amazonaws.com"
        );

        let target = DiscoveredTarget::from(WorkgroupDescription {
            name: "adhoc".to_string(),
            endpoint: NetworkEndpoint::default(),
        });
        assert_eq!(target.listing_line(4), "[5] adhoc\tserverless workgroup\t");
        assert_eq!(target.master_user, None);
    }
}
