//! Credential resolution error types.

use thiserror::Error;

use crate::remote::RemoteError;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, CredentialError>;

/// Errors that can occur while resolving a target or issuing credentials.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The endpoint URL could not be parsed or has no host.
    #[error("endpoint `{endpoint}` can not be parsed as a URL: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Discovery found neither a provisioned cluster nor a serverless workgroup.
    #[error(
        "no endpoint, workgroup or cluster was given and no Redshift cluster or workgroup could be found"
    )]
    NoTargetFound,

    /// Several candidates were found and no selector is configured.
    #[error("automatic selection was not possible because {candidates} Redshift targets were found")]
    AmbiguousSelection { candidates: usize },

    /// The selector failed or returned a line that is not a candidate.
    #[error("manual selection failed: {0}")]
    SelectionFailed(String),

    /// The named cluster does not exist.
    #[error("cluster `{0}` is not found")]
    TargetNotFound(String),

    /// A remote call failed for a reason other than tolerated permission denial.
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Resolution finished without a cluster identifier or workgroup name.
    #[error("neither a cluster identifier nor a workgroup name could be resolved")]
    Unresolved,

    /// The operation was cancelled before it completed.
    #[error("credential resolution was cancelled")]
    Cancelled,
}

impl CredentialError {
    /// Create an invalid endpoint error.
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a selection failure.
    pub fn selection_failed(msg: impl Into<String>) -> Self {
        Self::SelectionFailed(msg.into())
    }

    /// Check if this error wraps a remote permission denial.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Remote(e) if e.is_access_denied())
    }

    /// Check if this error originated from a remote call.
    #[inline]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_predicate() {
        let denied: CredentialError =
            RemoteError::new("DescribeClusters", Some("AccessDeniedException"), "nope").into();
        assert!(denied.is_access_denied());
        assert!(denied.is_remote());

        let throttled: CredentialError =
            RemoteError::new("DescribeClusters", Some("Throttling"), "slow down").into();
        assert!(!throttled.is_access_denied());

        assert!(!CredentialError::NoTargetFound.is_access_denied());
        assert!(!CredentialError::Unresolved.is_remote());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CredentialError::AmbiguousSelection { candidates: 3 }.to_string(),
            "automatic selection was not possible because 3 Redshift targets were found"
        );
        assert_eq!(
            CredentialError::TargetNotFound("main".to_string()).to_string(),
            "cluster `main` is not found"
        );
        let err = CredentialError::invalid_endpoint("::", "relative URL without a base");
        assert!(err.to_string().contains("`::`"));
    }
}
