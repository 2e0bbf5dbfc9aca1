pub mod config;
pub mod probe;

use clap::{Parser, Subcommand};
use sr_domain::config::Config;

/// SoundRelay — polls a sound-level device and relays its readings.
#[derive(Debug, Parser)]
#[command(name = "soundrelay", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the capture loop (default when no subcommand is given).
    Run,
    /// Check that the device is reachable and accepts the credentials.
    Probe,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config (file + environment) and report any problems.
    Validate,
    /// Dump the resolved configuration as TOML, password masked.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `SR_CONFIG` (or `config.toml`
/// by default), then apply the deployment environment variables on top.
/// A missing file means defaults.  Returns the config and the path used.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("SR_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let mut config: Config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("reading {config_path}: {e}"))?;
        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {config_path}: {e}"))?
    } else {
        Config::default()
    };

    config
        .apply_process_env()
        .map_err(|e| anyhow::anyhow!("environment: {e}"))?;

    Ok((config, config_path))
}
