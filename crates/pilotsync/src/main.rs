//! `pilotsync` — headless monitor for an in-vehicle dashboard backend.
//!
//! Connects to the backend's state channel, keeps the dashboard stores in
//! sync, and prints every store change as a JSON line on stdout. Also
//! sends one-off control requests and manages the config file.
//!
//! Logs go to stderr, or to a file with `--log-file`, so stdout stays a
//! clean JSON stream.

mod cli;
mod monitor;

use std::ffi::OsStr;
use std::path::Path;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use pilotsync_config::Config;
use pilotsync_core::{ControlRequest, Dashboard};

use crate::cli::{Cli, Command, ConfigCommand};

/// Set up tracing. Returns a guard that must be held for the lifetime of
/// the process so buffered logs are flushed.
fn setup_tracing(cli: &Cli, log: &pilotsync_config::Log) -> WorkerGuard {
    let directive = match cli.verbose {
        0 => log.filter.clone(),
        n => {
            let level = match n {
                1 => "info",
                2 => "debug",
                _ => "trace",
            };
            format!("pilotsync={level},pilotsync_core={level},pilotsync_api={level}")
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let (writer, guard) = match cli.log_file.as_ref().or(log.file.as_ref()) {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let name = path.file_name().unwrap_or(OsStr::new("pilotsync.log"));
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json || log.json {
        registry
            .with(fmt::layer().json().with_writer(writer))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .with_target(true),
            )
            .init();
    }

    guard
}

/// Config file, then environment, then CLI flags.
fn effective_config(cli: &Cli) -> Result<(Config, std::path::PathBuf)> {
    let path = cli
        .config
        .clone()
        .unwrap_or_else(pilotsync_config::config_path);
    let mut config = pilotsync_config::load_config_from(&path)
        .wrap_err_with(|| format!("loading {}", path.display()))?;

    if let Some(host) = &cli.host {
        config.backend.host.clone_from(host);
    }
    if cli.secure {
        config.backend.secure = true;
    }
    Ok((config, path))
}

async fn send_request(dashboard: &Dashboard, request: ControlRequest) -> Result<()> {
    if request == ControlRequest::CheckForUpdate {
        let payload = dashboard.check_for_update().await?;
        println!("{}", serde_json::to_string(&payload)?);
    } else {
        dashboard.send_request(request).await?;
    }
    info!(%request, "request accepted");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let (config, config_path) = effective_config(&cli)?;
    let _log_guard = setup_tracing(&cli, &config.log);

    match cli.command.unwrap_or(Command::Watch { duration: None }) {
        Command::Watch { duration } => {
            let dashboard = Dashboard::new(config.to_dashboard_config()?)?;
            info!(host = %dashboard.config().host, "starting pilotsync");
            monitor::watch(&dashboard, duration).await?;
        }
        Command::Request { action } => {
            let dashboard = Dashboard::new(config.to_dashboard_config()?)?;
            send_request(&dashboard, action.into()).await?;
        }
        Command::Config { command } => match command {
            ConfigCommand::Show => {
                config.to_dashboard_config()?;
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigCommand::Init => {
                config.to_dashboard_config()?;
                pilotsync_config::save_config_to(&config, &config_path)?;
                println!("{}", config_path.display());
            }
        },
    }

    Ok(())
}
