mod cli;
mod config;
mod error;
mod exec;
mod output;
mod selector;

use std::{io, process, sync::Arc};

use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use redshift_credentials::{CredentialsClient, TargetSelector, aws::load_sdk_config};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::{
    cli::{Args, LogFormat, LogLevel, OutputFormat},
    config::{AppConfig, Settings},
    error::{CliError, Result},
    output::{OutputManager, write_output},
    selector::{FilterCommandSelector, PromptSelector},
};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let settings = match AppConfig::load(args.config.as_deref()) {
        Ok(config) => Settings::merge(args, config),
        Err(e) => {
            report_error(&e, false);
            process::exit(1);
        }
    };

    let json_errors = settings.output == OutputFormat::Json && !settings.wraps_command();
    let code = match run(settings).await {
        Ok(code) => code,
        Err(e) => {
            report_error(&e, json_errors);
            1
        }
    };
    process::exit(code);
}

async fn run(settings: Settings) -> Result<i32> {
    init_logging(settings.log_level, settings.log_format)?;
    debug!(?settings, "Settings resolved");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    let sdk_config = load_sdk_config(settings.profile.as_deref(), settings.region.as_deref()).await;
    let selector: Arc<dyn TargetSelector> = match &settings.filter_command {
        Some(command) => Arc::new(FilterCommandSelector::new(command)),
        None => Arc::new(PromptSelector),
    };
    let client = CredentialsClient::from_sdk_config(&sdk_config).with_selector(selector);

    let bundle = client
        .get_credentials_with_cancel(&settings.request, &cancel)
        .await?;
    info!(
        kind = %bundle.kind(),
        db_user = %bundle.db_user(),
        expiration = %bundle.expiration(),
        "Temporary credentials issued"
    );

    let output = OutputManager::new(&settings.prefix);
    if settings.wraps_command() {
        let vars = output.env_vars(&bundle);
        return exec::run_command(&settings.command, &vars).await;
    }

    let rendered = output.format_bundle(&bundle, settings.output)?;
    write_output(&rendered, settings.output_file.as_deref())?;
    Ok(0)
}

fn report_error(e: &CliError, json: bool) {
    if json {
        let error_json = serde_json::json!({
            "status": "error",
            "message": e.to_string(),
        });
        println!("{error_json}");
        return;
    }

    error!("Application error: {}", e);
    #[cfg(feature = "colored-output")]
    {
        eprintln!("{} {}", "Error:".red().bold(), e);
    }
    #[cfg(not(feature = "colored-output"))]
    {
        eprintln!("Error: {}", e);
    }
}

/// Logs go to stderr; stdout carries the credentials.
fn init_logging(level: LogLevel, format: LogFormat) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .compact(),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
    }
    .map_err(|e| CliError::Logging(e.to_string()))
}
