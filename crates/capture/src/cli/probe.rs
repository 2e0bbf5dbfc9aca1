//! `soundrelay probe` — one reachability check and a single login attempt.

use sr_device::probe;
use sr_domain::config::Config;
use tokio_util::sync::CancellationToken;

/// Returns `true` when the device answered and accepted the credentials.
pub async fn run(config: &Config) -> anyhow::Result<bool> {
    let device = &config.device;
    let target = format!("{}:{}", device.host, device.port);

    if !probe(&device.host, device.port, device.probe_timeout()).await {
        println!("[FAIL] {target}: unreachable");
        return Ok(false);
    }
    println!("[ OK ] {target}: reachable");

    let client = sr_device::build_client(config, CancellationToken::new())?;
    match client.session().login().await {
        Ok(()) => {
            println!("[ OK ] login as {:?}", device.username);
            Ok(true)
        }
        Err(e) => {
            println!("[FAIL] login as {:?}: {e}", device.username);
            Ok(false)
        }
    }
}
