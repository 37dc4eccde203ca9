//! Credential fetch for serverless workgroups.

use tracing::{debug, instrument};

use crate::bundle::CredentialBundle;
use crate::error::Result;
use crate::remote::{ServerlessService, WorkgroupCredentialsInput};
use crate::request::ResolutionState;

/// Issue credentials for `workgroup`.
///
/// The refresh time returned by the service is passed through untouched. A
/// missing location is looked up with `GetWorkgroup`; failure there only costs
/// the endpoint.
#[instrument(skip_all, fields(workgroup = %workgroup))]
pub(crate) async fn fetch(
    service: &dyn ServerlessService,
    workgroup: String,
    mut state: ResolutionState,
) -> Result<CredentialBundle> {
    let input = WorkgroupCredentialsInput {
        workgroup_name: workgroup.clone(),
        db_name: state.db_name.clone(),
        duration_seconds: state.duration_seconds,
    };
    let issued = service.get_credentials(&input).await?;

    if state.resolved_address.is_none() {
        match service.get_workgroup(&workgroup).await {
            Ok(description) => {
                state.set_location(description.endpoint.address, description.endpoint.port);
            }
            Err(e) if e.is_access_denied() => {
                debug!(
                    "Failed to fetch endpoint because redshift-serverless:GetWorkgroup is denied"
                );
            }
            Err(e) => {
                debug!(error = %e, "Failed to fetch endpoint from redshift-serverless:GetWorkgroup")
            }
        }
    }

    Ok(CredentialBundle::serverless(workgroup, issued)
        .with_location(state.resolved_address, state.resolved_port))
}
