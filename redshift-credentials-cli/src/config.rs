//! Configuration file loading and merging with command-line flags.

use std::path::{Path, PathBuf};

use redshift_credentials::CredentialsRequest;
use serde::{Deserialize, Serialize};

use crate::cli::{Args, LogFormat, LogLevel, OutputFormat};
use crate::error::{CliError, Result};

pub const DEFAULT_PREFIX: &str = "REDSHIFT_";

const CONFIG_DIR_NAME: &str = "redshift-credentials";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Accepted range for `duration_seconds`.
const DURATION_RANGE: std::ops::RangeInclusive<i32> = 900..=3600;

/// Settings read from the optional TOML file. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub prefix: Option<String>,
    pub output: Option<OutputFormat>,
    pub log_level: Option<LogLevel>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub duration_seconds: Option<i32>,
    pub filter_command: Option<String>,
}

impl AppConfig {
    /// `<config_dir>/redshift-credentials/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the configuration.
    ///
    /// A missing file at the default location yields the defaults; a file named
    /// explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self =
            toml::from_str(&content).map_err(|source| CliError::ConfigParse { path, source })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(duration) = self.duration_seconds
            && !DURATION_RANGE.contains(&duration)
        {
            return Err(CliError::Config(format!(
                "duration_seconds must be between {} and {}, got {duration}",
                DURATION_RANGE.start(),
                DURATION_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub request: CredentialsRequest,
    pub prefix: String,
    pub output: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub filter_command: Option<String>,
    pub command: Vec<String>,
}

impl Settings {
    /// Flags win over the file, the file wins over built-in defaults.
    pub fn merge(args: Args, config: AppConfig) -> Self {
        let request = CredentialsRequest::new()
            .with_endpoint(args.endpoint)
            .with_workgroup_name(args.workgroup)
            .with_cluster_identifier(args.cluster)
            .with_db_user(args.db_user)
            .with_db_name(args.db_name)
            .with_duration_seconds(args.duration_seconds.or(config.duration_seconds));

        Self {
            request,
            prefix: args
                .prefix
                .or(config.prefix)
                .unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            output: args.output.or(config.output).unwrap_or_default(),
            output_file: args.output_file,
            log_level: args.log_level.or(config.log_level).unwrap_or_default(),
            log_format: args.log_format,
            profile: args.profile.or(config.profile),
            region: args.region.or(config.region),
            filter_command: args
                .filter
                .or(config.filter_command)
                .filter(|cmd| !cmd.trim().is_empty()),
            command: args.command,
        }
    }

    /// Whether a command is wrapped instead of printing the credentials.
    pub fn wraps_command(&self) -> bool {
        !self.command.is_empty()
    }
}
