//! Caller request and the private resolution state derived from it.

/// What the caller knows about the target.
///
/// Every field is optional; the resolver discovers whatever is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsRequest {
    /// URL of the form `scheme://host[:port][/dbname]`.
    pub endpoint: Option<String>,
    pub workgroup_name: Option<String>,
    pub cluster_identifier: Option<String>,
    /// Database user. Only meaningful for provisioned clusters.
    pub db_user: Option<String>,
    pub db_name: Option<String>,
    /// Requested password lifetime.
    pub duration_seconds: Option<i32>,
}

impl CredentialsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = non_empty(endpoint);
        self
    }

    pub fn with_workgroup_name(mut self, workgroup_name: Option<String>) -> Self {
        self.workgroup_name = non_empty(workgroup_name);
        self
    }

    pub fn with_cluster_identifier(mut self, cluster_identifier: Option<String>) -> Self {
        self.cluster_identifier = non_empty(cluster_identifier);
        self
    }

    pub fn with_db_user(mut self, db_user: Option<String>) -> Self {
        self.db_user = non_empty(db_user);
        self
    }

    pub fn with_db_name(mut self, db_name: Option<String>) -> Self {
        self.db_name = non_empty(db_name);
        self
    }

    pub fn with_duration_seconds(mut self, duration_seconds: Option<i32>) -> Self {
        self.duration_seconds = duration_seconds.filter(|d| *d != 0);
        self
    }

    /// Whether the caller named a cluster or workgroup directly.
    #[inline]
    pub fn has_identifier(&self) -> bool {
        self.cluster_identifier.is_some() || self.workgroup_name.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Working record of a single resolution.
///
/// Owned by one `get_credentials` call and dropped with it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ResolutionState {
    pub endpoint: Option<String>,
    pub workgroup_name: Option<String>,
    pub cluster_identifier: Option<String>,
    pub db_user: Option<String>,
    pub db_name: Option<String>,
    pub duration_seconds: Option<i32>,
    pub resolved_address: Option<String>,
    pub resolved_port: Option<u16>,
}

impl From<&CredentialsRequest> for ResolutionState {
    fn from(request: &CredentialsRequest) -> Self {
        Self {
            endpoint: request.endpoint.clone(),
            workgroup_name: request.workgroup_name.clone(),
            cluster_identifier: request.cluster_identifier.clone(),
            db_user: request.db_user.clone(),
            db_name: request.db_name.clone(),
            duration_seconds: request.duration_seconds,
            resolved_address: None,
            resolved_port: None,
        }
    }
}

impl ResolutionState {
    #[inline]
    pub fn has_identifier(&self) -> bool {
        self.cluster_identifier.is_some() || self.workgroup_name.is_some()
    }

    /// Replace the resolved network location.
    pub fn set_location(&mut self, address: Option<String>, port: Option<u16>) {
        self.resolved_address = address;
        self.resolved_port = port;
    }
}
