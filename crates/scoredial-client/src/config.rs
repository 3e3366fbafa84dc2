//! Configuration and service factory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use scoredial_core::gauge::DEFAULT_FRAME_INTERVAL;
use scoredial_core::model::PredictionResponse;
use scoredial_core::workflow::RacePolicy;
use scoredial_core::{ScoringService, ServiceError};

use crate::http::{HttpScoringService, DEFAULT_ENDPOINT};
use crate::mock::MockScoringService;

/// Which scoring service to talk to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServiceConfig {
    Http {
        #[serde(default = "default_endpoint")]
        endpoint: String,
        /// Off unless set.
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    /// Canned answers, no network.
    Mock {
        #[serde(default)]
        prediction: Option<f64>,
        #[serde(default)]
        suggestions: Vec<String>,
        /// Reported as `{success: false, error}`.
        #[serde(default)]
        error: Option<String>,
        /// Reported as a transport failure.
        #[serde(default)]
        transport_error: Option<String>,
    },
}

impl ServiceConfig {
    pub fn http(endpoint: impl Into<String>) -> Self {
        ServiceConfig::Http {
            endpoint: endpoint.into(),
            timeout_secs: None,
        }
    }

    /// Human-readable target, for logs and saved records.
    pub fn describe(&self) -> String {
        match self {
            ServiceConfig::Http { endpoint, .. } => endpoint.clone(),
            ServiceConfig::Mock { .. } => "mock".to_string(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::http(default_endpoint())
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Terminal rendering options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Spacing between gauge frames in milliseconds.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Dial size used for ring geometry.
    #[serde(default = "default_dial_size")]
    pub dial_size: f64,
    /// Emit ANSI colours.
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_frame_interval_ms() -> u64 {
    DEFAULT_FRAME_INTERVAL.as_millis() as u64
}
fn default_dial_size() -> f64 {
    220.0
}
fn default_true() -> bool {
    true
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            dial_size: default_dial_size(),
            color: true,
        }
    }
}

impl DisplayConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// Top-level scoredial configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoredialConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub race_policy: RacePolicy,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    resolve_with(s, |name| std::env::var(name).ok())
}

fn resolve_with(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&lookup(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `scoredial.toml` in the current directory
/// 2. `~/.config/scoredial/config.toml`
///
/// Environment variable overrides: `SCOREDIAL_ENDPOINT`, `SCOREDIAL_TIMEOUT_SECS`.
pub fn load_config() -> Result<ScoredialConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ScoredialConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("scoredial.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<ScoredialConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => ScoredialConfig::default(),
    };

    apply_env_overrides(config, |name| std::env::var(name).ok())
}

/// Apply `SCOREDIAL_*` overrides and expand `${VAR}` references.
fn apply_env_overrides(
    mut config: ScoredialConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ScoredialConfig> {
    let timeout_override = match lookup("SCOREDIAL_TIMEOUT_SECS") {
        Some(raw) => Some(
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("invalid SCOREDIAL_TIMEOUT_SECS: '{raw}'"))?,
        ),
        None => None,
    };

    if let Some(endpoint) = lookup("SCOREDIAL_ENDPOINT") {
        let timeout_secs = match &config.service {
            ServiceConfig::Http { timeout_secs, .. } => *timeout_secs,
            ServiceConfig::Mock { .. } => None,
        };
        config.service = ServiceConfig::Http {
            endpoint,
            timeout_secs,
        };
    }

    if let ServiceConfig::Http {
        endpoint,
        timeout_secs,
    } = &mut config.service
    {
        *endpoint = resolve_env_vars(endpoint);
        if timeout_override.is_some() {
            *timeout_secs = timeout_override;
        }
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("scoredial"))
}

/// Create a scoring service from its configuration.
pub fn create_service(config: &ServiceConfig) -> Result<Box<dyn ScoringService>> {
    match config {
        ServiceConfig::Http {
            endpoint,
            timeout_secs,
        } => {
            anyhow::ensure!(
                endpoint.starts_with("http://") || endpoint.starts_with("https://"),
                "scoring endpoint must be an http(s) URL, got '{endpoint}'"
            );
            Ok(Box::new(HttpScoringService::with_timeout(
                endpoint,
                timeout_secs.map(Duration::from_secs),
            )))
        }
        ServiceConfig::Mock {
            prediction,
            suggestions,
            error,
            transport_error,
        } => {
            let outcome = match transport_error {
                Some(message) => Err(ServiceError::transport(message.as_str())),
                None => Ok(PredictionResponse {
                    success: error.is_none(),
                    prediction: *prediction,
                    suggestions: Some(suggestions.clone()),
                    error: error.clone(),
                }),
            };
            Ok(Box::new(MockScoringService::new(outcome)))
        }
    }
}
