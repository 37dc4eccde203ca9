use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(
    name = "redshift-credentials",
    version,
    about = "redshift-credentials is a command-line tool for Amazon Redshift temporary authorization",
    override_usage = "redshift-credentials [OPTIONS] [-- <COMMAND>...]"
)]
pub struct Args {
    /// Redshift endpoint URL
    #[arg(long, env = "REDSHIFT_CREDENTIALS_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Redshift Serverless workgroup name
    #[arg(long, env = "REDSHIFT_CREDENTIALS_WORKGROUP")]
    pub workgroup: Option<String>,

    /// Redshift provisioned cluster identifier
    #[arg(long, env = "REDSHIFT_CREDENTIALS_CLUSTER")]
    pub cluster: Option<String>,

    /// Database user name (provisioned only)
    #[arg(long, env = "REDSHIFT_CREDENTIALS_DB_USER")]
    pub db_user: Option<String>,

    /// Database name
    #[arg(long, env = "REDSHIFT_CREDENTIALS_DB_NAME")]
    pub db_name: Option<String>,

    /// Seconds until the temporary password expires (900 ~ 3600)
    #[arg(
        long,
        env = "REDSHIFT_CREDENTIALS_DURATION_SECONDS",
        value_parser = clap::value_parser!(i32).range(900..=3600)
    )]
    pub duration_seconds: Option<i32>,

    /// Prefix for environment variable names [default: REDSHIFT_]
    #[arg(long, env = "REDSHIFT_CREDENTIALS_PREFIX")]
    pub prefix: Option<String>,

    /// Output format when no command is wrapped [default: env]
    #[arg(short, long, value_enum, env = "REDSHIFT_CREDENTIALS_OUTPUT")]
    pub output: Option<OutputFormat>,

    /// Write the output to a file instead of stdout
    #[arg(long, env = "REDSHIFT_CREDENTIALS_OUTPUT_FILE")]
    pub output_file: Option<PathBuf>,

    /// Log level [default: info]
    #[arg(long, value_enum, env = "REDSHIFT_CREDENTIALS_LOG_LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log format
    #[arg(
        long,
        value_enum,
        default_value_t = LogFormat::Text,
        env = "REDSHIFT_CREDENTIALS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// AWS shared config profile
    #[arg(long, env = "REDSHIFT_CREDENTIALS_PROFILE")]
    pub profile: Option<String>,

    /// AWS region
    #[arg(long, env = "REDSHIFT_CREDENTIALS_REGION")]
    pub region: Option<String>,

    /// Command used to pick one of several clusters/workgroups
    #[arg(long, env = "FILTER")]
    pub filter: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "REDSHIFT_CREDENTIALS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run with the credentials in its environment
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `export NAME=value` lines for `eval`
    #[default]
    Env,
    /// Pretty-printed JSON
    Json,
    /// YAML document
    #[value(alias = "yml")]
    #[serde(alias = "yml")]
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_trailing_command() {
        let args = Args::try_parse_from([
            "redshift-credentials",
            "--workgroup",
            "default",
            "--",
            "psql",
            "-c",
            "select 1",
        ])
        .unwrap();
        assert_eq!(args.workgroup.as_deref(), Some("default"));
        assert_eq!(args.command, ["psql", "-c", "select 1"]);
    }

    #[test]
    fn test_duration_range() {
        assert!(
            Args::try_parse_from(["redshift-credentials", "--duration-seconds", "899"]).is_err()
        );
        assert!(
            Args::try_parse_from(["redshift-credentials", "--duration-seconds", "3601"]).is_err()
        );
        let args =
            Args::try_parse_from(["redshift-credentials", "--duration-seconds", "900"]).unwrap();
        assert_eq!(args.duration_seconds, Some(900));
    }

    #[test]
    fn test_output_alias() {
        let args = Args::try_parse_from(["redshift-credentials", "--output", "yml"]).unwrap();
        assert_eq!(args.output, Some(OutputFormat::Yaml));
    }
}
