//! `soundrelay config validate|show`.

use sr_domain::config::{Config, ConfigSeverity};

/// Print every validation issue.  Returns `true` when there are no
/// error-severity issues (warnings alone still pass).
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();

    if issues.is_empty() {
        println!("{config_path}: OK");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    println!(
        "{config_path}: {errors} error(s), {} warning(s)",
        issues.len() - errors
    );
    errors == 0
}

/// Log every validation issue and refuse to start on any error-severity
/// one.  Used by `run` before anything touches the network.
pub fn ensure_valid(config: &Config) -> anyhow::Result<()> {
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    if errors > 0 {
        anyhow::bail!("config validation failed with {errors} error(s)");
    }
    Ok(())
}

/// Print the resolved config with the password masked.
pub fn show(config: &Config) -> anyhow::Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &Config) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(&config.redacted())?)
}
