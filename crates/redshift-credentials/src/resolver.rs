//! Target resolution and dispatch.
//!
//! Resolution turns a partial [`CredentialsRequest`] into exactly one cluster
//! or workgroup:
//!
//! 1. An endpoint URL, when given, is parsed for identifier, database and location.
//! 2. Without an identifier, clusters (and, if no database user was given,
//!    workgroups) are enumerated and one candidate is chosen.
//! 3. The matching fetcher issues the credentials.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::bundle::CredentialBundle;
use crate::discovery::{DiscoveredTarget, discover_clusters, discover_workgroups};
use crate::endpoint::parse_endpoint;
use crate::error::{CredentialError, Result};
use crate::remote::{ProvisionedService, ServerlessService};
use crate::request::{CredentialsRequest, ResolutionState};
use crate::selection::{TargetSelector, choose_target};
use crate::types::TargetKind;
use crate::{provisioned, serverless};

/// The single target a resolution settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    Provisioned(String),
    Serverless(String),
}

impl ResolvedTarget {
    pub fn kind(&self) -> TargetKind {
        match self {
            Self::Provisioned(_) => TargetKind::Provisioned,
            Self::Serverless(_) => TargetKind::Serverless,
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            Self::Provisioned(id) | Self::Serverless(id) => id,
        }
    }
}

/// Resolves Redshift targets and issues temporary credentials.
///
/// Holds no per-call state; every call builds its own working record.
#[derive(Clone)]
pub struct CredentialsClient {
    provisioned: Arc<dyn ProvisionedService>,
    serverless: Arc<dyn ServerlessService>,
    selector: Option<Arc<dyn TargetSelector>>,
}

impl CredentialsClient {
    /// Create a client without a selector; ambiguous discovery then fails.
    pub fn new(
        provisioned: Arc<dyn ProvisionedService>,
        serverless: Arc<dyn ServerlessService>,
    ) -> Self {
        Self {
            provisioned,
            serverless,
            selector: None,
        }
    }

    /// Use `selector` to choose between several discovered targets.
    pub fn with_selector(mut self, selector: Arc<dyn TargetSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Resolve the target described by `request` and issue credentials for it.
    #[instrument(skip_all)]
    pub async fn get_credentials(&self, request: &CredentialsRequest) -> Result<CredentialBundle> {
        let mut state = ResolutionState::from(request);
        let target = self.resolve_state(&mut state).await?;
        info!(kind = %target.kind(), identifier = %target.identifier(), "Fetching credentials");

        match target {
            ResolvedTarget::Provisioned(cluster) => {
                provisioned::fetch(self.provisioned.as_ref(), cluster, state).await
            }
            ResolvedTarget::Serverless(workgroup) => {
                serverless::fetch(self.serverless.as_ref(), workgroup, state).await
            }
        }
    }

    /// [`get_credentials`](Self::get_credentials), aborted when `cancel` fires.
    ///
    /// The in-flight remote call is dropped and nothing resolved so far is kept.
    pub async fn get_credentials_with_cancel(
        &self,
        request: &CredentialsRequest,
        cancel: &CancellationToken,
    ) -> Result<CredentialBundle> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Credential resolution cancelled");
                Err(CredentialError::Cancelled)
            }
            result = self.get_credentials(request) => result,
        }
    }

    /// Resolve the target only, without issuing credentials.
    pub async fn resolve(&self, request: &CredentialsRequest) -> Result<ResolvedTarget> {
        let mut state = ResolutionState::from(request);
        self.resolve_state(&mut state).await
    }

    async fn resolve_state(&self, state: &mut ResolutionState) -> Result<ResolvedTarget> {
        if let Some(endpoint) = state.endpoint.clone() {
            apply_endpoint(state, &endpoint)?;
        }

        if !state.has_identifier() {
            let selected = self.discover(state.db_user.is_none()).await?;
            apply_selection(state, selected);
        }

        if let Some(cluster) = state.cluster_identifier.clone() {
            Ok(ResolvedTarget::Provisioned(cluster))
        } else if let Some(workgroup) = state.workgroup_name.clone() {
            Ok(ResolvedTarget::Serverless(workgroup))
        } else {
            Err(CredentialError::Unresolved)
        }
    }

    /// Enumerate candidates and pick one.
    ///
    /// Workgroups have no database user, so they are only listed when the
    /// caller did not supply one.
    async fn discover(&self, include_serverless: bool) -> Result<DiscoveredTarget> {
        let mut candidates = discover_clusters(self.provisioned.as_ref()).await?;
        if include_serverless {
            candidates.extend(discover_workgroups(self.serverless.as_ref()).await?);
        }
        debug!(candidates = candidates.len(), "Redshift targets discovered");

        choose_target(candidates, self.selector.as_deref()).await
    }
}

fn apply_endpoint(state: &mut ResolutionState, endpoint: &str) -> Result<()> {
    let parsed = parse_endpoint(endpoint)?;
    match parsed.target {
        Some((TargetKind::Provisioned, cluster)) => state.cluster_identifier = Some(cluster),
        Some((TargetKind::Serverless, workgroup)) => state.workgroup_name = Some(workgroup),
        None => {}
    }
    if state.db_name.is_none() {
        state.db_name = parsed.db_name;
    }
    state.set_location(Some(parsed.address), parsed.port);
    Ok(())
}

fn apply_selection(state: &mut ResolutionState, selected: DiscoveredTarget) {
    match selected.kind {
        TargetKind::Provisioned => {
            state.cluster_identifier = Some(selected.identifier);
            if state.db_user.is_none() {
                state.db_user = selected.master_user;
            }
            if state.db_name.is_none() {
                state.db_name = selected.initial_db_name;
            }
        }
        TargetKind::Serverless => state.workgroup_name = Some(selected.identifier),
    }
    state.set_location(selected.address, selected.port);
}
