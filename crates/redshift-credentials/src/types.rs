//! Core shared types.

use std::fmt;

use serde::{Serialize, Serializer};

/// The two kinds of Redshift compute a credential can be issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// A persistently running cluster with a fixed master user.
    Provisioned,
    /// An on-demand workgroup whose credentials rotate server-side.
    Serverless,
}

impl TargetKind {
    /// Human-readable label used in candidate listings.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provisioned => "provisioned cluster",
            Self::Serverless => "serverless workgroup",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network location of a cluster or workgroup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NetworkEndpoint {
    pub address: Option<String>,
    pub port: Option<u16>,
}

impl NetworkEndpoint {
    pub fn new(address: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            address: Some(address.into()),
            port,
        }
    }
}

/// Temporary database password.
///
/// `Debug` and `Display` are redacted so the value cannot leak through
/// tracing fields or error messages. Serialization writes the real value.
#[derive(Clone, PartialEq, Eq)]
pub struct DbPassword(String);

impl DbPassword {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// The plain-text password.
    #[inline]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DbPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DbPassword(***)")
    }
}

impl fmt::Display for DbPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for DbPassword {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
