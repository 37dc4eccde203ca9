//! Endpoint URL parsing and host classification.

use tracing::debug;
use url::Url;

use crate::error::{CredentialError, Result};
use crate::types::TargetKind;

/// Host suffix of provisioned cluster endpoints.
pub const PROVISIONED_DOMAIN_SUFFIX: &str = "redshift.amazonaws.com";

/// Host suffix of serverless workgroup endpoints.
pub const SERVERLESS_DOMAIN_SUFFIX: &str = "redshift-serverless.amazonaws.com";

/// What an endpoint URL tells us about the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEndpoint {
    /// Kind and identifier, when the host is a recognised Redshift domain.
    pub target: Option<(TargetKind, String)>,
    /// Database name from the URL path.
    pub db_name: Option<String>,
    pub address: String,
    pub port: Option<u16>,
}

/// Classify a host name by its Redshift domain suffix.
pub fn classify_host(host: &str) -> Option<TargetKind> {
    if host.ends_with(SERVERLESS_DOMAIN_SUFFIX) {
        Some(TargetKind::Serverless)
    } else if host.ends_with(PROVISIONED_DOMAIN_SUFFIX) {
        Some(TargetKind::Provisioned)
    } else {
        None
    }
}

/// Parse an endpoint URL such as
/// `https://mycluster.abc.us-east-1.redshift.amazonaws.com:5439/dev`.
///
/// The first DNS label of a recognised host becomes the cluster identifier or
/// workgroup name. Unrecognised hosts still yield an address and port.
pub fn parse_endpoint(endpoint: &str) -> Result<ParsedEndpoint> {
    let url =
        Url::parse(endpoint).map_err(|e| CredentialError::invalid_endpoint(endpoint, e))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| CredentialError::invalid_endpoint(endpoint, "URL has no host"))?;

    let target = classify_host(host).and_then(|kind| {
        host.split('.')
            .next()
            .filter(|label| !label.is_empty())
            .map(|label| (kind, label.to_string()))
    });

    let db_name = Some(url.path().trim_start_matches('/'))
        .filter(|p| !p.is_empty())
        .map(String::from);

    // `Url` hides a port equal to the scheme default; keep it when written out.
    let port = url.port().or_else(|| explicit_port(endpoint));

    debug!(host = %host, port = ?port, target = ?target, "Parsed endpoint");

    Ok(ParsedEndpoint {
        target,
        db_name,
        address: host.to_string(),
        port,
    })
}

/// Port written in the authority of `endpoint`, if any.
fn explicit_port(endpoint: &str) -> Option<u16> {
    let (_, rest) = endpoint.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    // Skip past a bracketed IPv6 literal.
    let after_host = host_port.rsplit_once(']').map_or(host_port, |(_, tail)| tail);
    let (_, port) = after_host.rsplit_once(':')?;
    port.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provisioned_endpoint() {
        let parsed =
            parse_endpoint("https://mycluster.us-east-1.redshift.amazonaws.com:5439/mydb").unwrap();

        assert_eq!(
            parsed.target,
            Some((TargetKind::Provisioned, "mycluster".to_string()))
        );
        assert_eq!(parsed.db_name.as_deref(), Some("mydb"));
        assert_eq!(parsed.address, "mycluster.us-east-1.redshift.amazonaws.com");
        assert_eq!(parsed.port, Some(5439));
    }

    #[test]
    fn test_serverless_endpoint() {
        let parsed = parse_endpoint(
            "https://default.123456789012.ap-northeast-1.redshift-serverless.amazonaws.com:5439/dev",
        )
        .unwrap();

        assert_eq!(
            parsed.target,
            Some((TargetKind::Serverless, "default".to_string()))
        );
        assert_eq!(parsed.db_name.as_deref(), Some("dev"));
        assert_eq!(parsed.port, Some(5439));
    }

    #[test]
    fn test_unknown_host_keeps_location() {
        let parsed = parse_endpoint("postgres://db.internal.example.com:5439/warehouse").unwrap();

        assert_eq!(parsed.target, None);
        assert_eq!(parsed.address, "db.internal.example.com");
        assert_eq!(parsed.port, Some(5439));
        assert_eq!(parsed.db_name.as_deref(), Some("warehouse"));
    }

    #[test]
    fn test_missing_path_and_port() {
        let parsed = parse_endpoint("https://mycluster.us-east-1.redshift.amazonaws.com").unwrap();

        assert_eq!(parsed.db_name, None);
        assert_eq!(parsed.port, None);
    }

    #[test]
    fn test_default_port_is_kept() {
        let parsed =
            parse_endpoint("https://mycluster.us-east-1.redshift.amazonaws.com:443/db").unwrap();
        assert_eq!(parsed.port, Some(443));

        let parsed = parse_endpoint("postgres://user@[::1]:5432/dev").unwrap();
        assert_eq!(parsed.port, Some(5432));

        assert_eq!(explicit_port("https://[::1]/dev"), None);
        assert_eq!(explicit_port("https://host.example.com/a:80"), None);
    }

    #[test]
    fn test_invalid_endpoints() {
        for endpoint in ["not a url", "mailto:someone@example.com", ""] {
            let err = parse_endpoint(endpoint).unwrap_err();
            assert!(
                matches!(err, CredentialError::InvalidEndpoint { .. }),
                "{endpoint}: {err:?}"
            );
        }
    }

    #[test]
    fn test_classify_host() {
        assert_eq!(
            classify_host("a.b.us-west-2.redshift.amazonaws.com"),
            Some(TargetKind::Provisioned)
        );
        assert_eq!(
            classify_host("wg.1.us-west-2.redshift-serverless.amazonaws.com"),
            Some(TargetKind::Serverless)
        );
        assert_eq!(classify_host("example.com"), None);
    }
}
