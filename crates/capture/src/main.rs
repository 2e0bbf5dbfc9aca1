use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use sr_capture::cli::{Cli, Command, ConfigCommand};
use sr_capture::{CaptureError, CaptureOrchestrator};
use sr_domain::config::{Config, LogFormat, ObservabilityConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to run when no subcommand is given.
        None | Some(Command::Run) => {
            let (config, config_path) = sr_capture::cli::load_config()?;
            init_tracing(&config.observability);
            run_capture(config, config_path).await
        }
        Some(Command::Probe) => {
            init_cli_tracing();
            let (config, _) = sr_capture::cli::load_config()?;
            if !sr_capture::cli::probe::run(&config).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Validate)) => {
            let (config, config_path) = sr_capture::cli::load_config()?;
            if !sr_capture::cli::config::validate(&config, &config_path) {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Command::Config(ConfigCommand::Show)) => {
            let (config, _) = sr_capture::cli::load_config()?;
            sr_capture::cli::config::show(&config)
        }
        Some(Command::Version) => {
            println!("soundrelay {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Initialize structured tracing for the long-running `run` command.
fn init_tracing(obs: &ObservabilityConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sr_capture=debug,sr_device=debug"));

    match obs.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .init(),
    }
}

/// Initialize compact stderr-only tracing for CLI one-shot commands.
///
/// Defaults to `warn` level so diagnostic output does not pollute stdout.
fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run_capture(config: Config, config_path: String) -> anyhow::Result<()> {
    tracing::info!(config = %config_path, "SoundRelay starting");

    sr_capture::cli::config::ensure_valid(&config)?;

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let orchestrator = CaptureOrchestrator::from_config(&config, shutdown)
        .context("building capture pipeline")?;

    tracing::info!("waiting for device connection");
    match orchestrator.run().await {
        Ok(summary) => {
            tracing::info!(
                cycles = summary.cycles,
                readings = summary.readings_relayed,
                reconnects = summary.reconnects,
                stream_enables = summary.stream_enable_attempts,
                "capture finished"
            );
        }
        Err(CaptureError::Shutdown) => tracing::info!("interrupted, exiting"),
    }
    Ok(())
}

/// Cancel `shutdown` on SIGINT (and SIGTERM on unix).
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                let _ = ctrl_c.await;
                tracing::info!("received SIGINT, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received SIGINT, shutting down");
    }

    shutdown.cancel();
}
