use sr_domain::config::{Config, LogFormat, StaleTokenPolicy};

#[test]
fn default_device_matches_field_install() {
    let config = Config::default();
    assert_eq!(config.device.host, "192.168.11.88");
    assert_eq!(config.device.port, 80);
    assert_eq!(config.device.cookie_header, "CRYCookie");
    assert_eq!(config.device.base_url(), "http://192.168.11.88:80");
}

#[test]
fn default_session_policy() {
    let config = Config::default();
    assert_eq!(config.session.login_max_attempts, 5);
    assert_eq!(config.session.login_retry_delay_ms, 3000);
    assert_eq!(config.session.login_timeout_ms, 5000);
    assert_eq!(config.session.stale_token_policy, StaleTokenPolicy::Retain);
}

#[test]
fn default_capture_runs_one_cycle() {
    let config = Config::default();
    assert_eq!(config.capture.interval_secs, 10);
    assert_eq!(config.capture.reconnect_delay_secs, 10);
    assert_eq!(config.capture.limit(), Some(1));
}

#[test]
fn partial_toml_keeps_defaults() {
    let toml_str = r#"
[device]
host = "10.1.1.20"
port = 90

[capture]
infinite = true
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.device.host, "10.1.1.20");
    assert_eq!(config.device.port, 90);
    assert_eq!(config.device.probe_timeout_ms, 3000);
    assert_eq!(config.capture.limit(), None);
    assert_eq!(config.http.max_retries, 3);
}

#[test]
fn stale_token_policy_parses() {
    let toml_str = r#"
[session]
stale_token_policy = "discard"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.session.stale_token_policy, StaleTokenPolicy::Discard);
}

#[test]
fn observability_format_parses() {
    let toml_str = r#"
[observability]
log_format = "compact"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.observability.log_format, LogFormat::Compact);
}
