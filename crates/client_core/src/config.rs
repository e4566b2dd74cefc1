use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";
pub const CONFIG_FILE_NAME: &str = "clusterizer.toml";

/// Settings for the single transport a process talks to the backend through.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    pub base_url: Url,
    /// Unset means the HTTP client default (no timeout).
    pub timeout: Option<Duration>,
    pub default_headers: BTreeMap<String, String>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timeout: None,
            default_headers: BTreeMap::new(),
        }
    }
}

impl TransportConfig {
    pub fn with_base_url(base_url: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    timeout_seconds: Option<f64>,
    #[serde(default)]
    default_headers: BTreeMap<String, String>,
}

pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| ClientError::RequestSetup(format!("invalid base url '{raw}': {err}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::RequestSetup(format!(
            "unsupported base url scheme '{other}' in '{raw}'"
        ))),
    }
}

/// Defaults, then `clusterizer.toml` in the working directory, then env vars.
pub fn load_transport_config() -> TransportConfig {
    let mut config = TransportConfig::default();

    if let Ok(raw) = fs::read_to_string(Path::new(CONFIG_FILE_NAME)) {
        apply_file_config(&mut config, &raw);
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config
}

pub(crate) fn apply_file_config(config: &mut TransportConfig, raw: &str) {
    let file_cfg = match toml::from_str::<FileConfig>(raw) {
        Ok(file_cfg) => file_cfg,
        Err(err) => {
            tracing::warn!(error = %err, "config: ignoring unreadable {CONFIG_FILE_NAME}");
            return;
        }
    };

    if let Some(v) = file_cfg.base_url {
        set_base_url(config, &v);
    }
    if let Some(v) = file_cfg.timeout_seconds {
        set_timeout(config, v);
    }
    config.default_headers.extend(file_cfg.default_headers);
}

pub(crate) fn apply_env_overrides(
    config: &mut TransportConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CLUSTERIZER_BASE_URL") {
        set_base_url(config, &v);
    }
    if let Some(v) = lookup("APP__BASE_URL") {
        set_base_url(config, &v);
    }

    for key in ["CLUSTERIZER_TIMEOUT_SECONDS", "APP__TIMEOUT_SECONDS"] {
        if let Some(v) = lookup(key) {
            if let Ok(parsed) = v.trim().parse::<f64>() {
                set_timeout(config, parsed);
            }
        }
    }
}

fn set_base_url(config: &mut TransportConfig, raw: &str) {
    match parse_base_url(raw) {
        Ok(url) => config.base_url = url,
        Err(err) => tracing::warn!(error = %err, "config: keeping previous base url"),
    }
}

fn set_timeout(config: &mut TransportConfig, seconds: f64) {
    if let Some(timeout) = timeout_from_seconds(seconds) {
        config.timeout = Some(timeout);
    }
}

/// A usable request timeout: positive and representable as a `Duration`.
pub fn timeout_from_seconds(seconds: f64) -> Option<Duration> {
    if seconds > 0.0 {
        Duration::try_from_secs_f64(seconds).ok()
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
