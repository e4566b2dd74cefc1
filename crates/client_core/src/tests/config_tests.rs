use super::*;

use std::collections::HashMap;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_point_at_local_backend_without_timeout() {
    let config = TransportConfig::default();
    assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
    assert_eq!(config.timeout, None);
    assert!(config.default_headers.is_empty());
}

#[test]
fn file_config_sets_base_url_timeout_and_headers() {
    let mut config = TransportConfig::default();
    apply_file_config(
        &mut config,
        r#"
base_url = "https://clusterizer.internal:9000"
timeout_seconds = 2.5

[default_headers]
x-client = "cli"
"#,
    );

    assert_eq!(config.base_url.as_str(), "https://clusterizer.internal:9000/");
    assert_eq!(config.timeout, Some(Duration::from_millis(2500)));
    assert_eq!(config.default_headers.get("x-client").map(String::as_str), Some("cli"));
}

#[test]
fn unreadable_file_config_keeps_defaults() {
    let mut config = TransportConfig::default();
    apply_file_config(&mut config, "base_url = [not toml");
    assert_eq!(config, TransportConfig::default());
}

#[test]
fn app_prefixed_env_wins_over_plain_env() {
    let mut config = TransportConfig::default();
    apply_env_overrides(
        &mut config,
        env(&[
            ("CLUSTERIZER_BASE_URL", "http://10.0.0.1:8080"),
            ("APP__BASE_URL", "http://10.0.0.2:8080"),
            ("CLUSTERIZER_TIMEOUT_SECONDS", "3"),
        ]),
    );

    assert_eq!(config.base_url.as_str(), "http://10.0.0.2:8080/");
    assert_eq!(config.timeout, Some(Duration::from_secs(3)));
}

#[test]
fn invalid_env_values_are_ignored() {
    let mut config = TransportConfig::default();
    apply_env_overrides(
        &mut config,
        env(&[
            ("CLUSTERIZER_BASE_URL", "ftp://example.com"),
            ("APP__TIMEOUT_SECONDS", "soon"),
            ("CLUSTERIZER_TIMEOUT_SECONDS", "-1"),
        ]),
    );

    assert_eq!(config, TransportConfig::default());
}

#[test]
fn parse_base_url_rejects_non_http_schemes() {
    let err = parse_base_url("file:///tmp/socket").expect_err("must fail");
    assert!(matches!(err, ClientError::RequestSetup(_)), "unexpected: {err:?}");
    assert!(parse_base_url(" http://localhost:8080 ").is_ok());
}

#[test]
fn unrepresentable_timeouts_keep_previous_layer() {
    let mut config = TransportConfig::default().timeout(Duration::from_secs(4));
    apply_env_overrides(&mut config, env(&[("CLUSTERIZER_TIMEOUT_SECONDS", "1e20")]));
    apply_env_overrides(&mut config, env(&[("APP__TIMEOUT_SECONDS", "inf")]));
    apply_env_overrides(&mut config, env(&[("APP__TIMEOUT_SECONDS", "NaN")]));
    apply_file_config(&mut config, "timeout_seconds = 1e20");

    assert_eq!(config.timeout, Some(Duration::from_secs(4)));
}

#[test]
fn timeout_must_be_positive_and_representable() {
    assert_eq!(timeout_from_seconds(0.5), Some(Duration::from_millis(500)));
    assert_eq!(timeout_from_seconds(0.0), None);
    assert_eq!(timeout_from_seconds(-3.0), None);
    assert_eq!(timeout_from_seconds(f64::NAN), None);
    assert_eq!(timeout_from_seconds(1e20), None);
}
