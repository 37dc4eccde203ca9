use std::path::PathBuf;

use redshift_credentials::CredentialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command runtime error, `{program}`: {source}")]
    Exec {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
