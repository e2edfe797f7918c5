use std::fs;
use std::path::Path;
use std::time::Duration;

use animgen_client::{ApiSettings, RenderOptions, RetryPolicy, DEFAULT_API_ORIGIN};
use animgen_logging::{anim_info, anim_warn};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use url::Url;

pub const API_BASE_ENV: &str = "ANIMGEN_API_BASE";

/// Optional settings file. Every field may be omitted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: Option<String>,
    pub options: RenderOptions,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub retry: RetryPolicy,
}

pub fn load_config(path: &Path) -> AppConfig {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return AppConfig::default();
        }
        Err(err) => {
            anim_warn!("Failed to read config from {:?}: {}", path, err);
            return AppConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => {
            anim_info!("Loaded config from {:?}", path);
            config
        }
        Err(err) => {
            anim_warn!("Failed to parse config from {:?}: {}", path, err);
            AppConfig::default()
        }
    }
}

/// Picks the API origin: explicit flag or environment first, then the file,
/// then the local development default.
pub fn resolve_origin(flag_or_env: Option<&str>, file: Option<&str>) -> anyhow::Result<Url> {
    let raw = [flag_or_env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_API_ORIGIN);

    let origin = Url::parse(raw).with_context(|| format!("invalid API origin {raw:?}"))?;
    if !matches!(origin.scheme(), "http" | "https") {
        bail!("API origin must be http or https, got {raw:?}");
    }
    Ok(origin)
}

pub fn build_settings(config: &AppConfig, origin: Url) -> ApiSettings {
    let mut settings = ApiSettings::new(origin);
    settings.options = config.options.clone();
    settings.retry = config.retry;
    if let Some(ms) = config.poll_interval_ms {
        settings.poll_interval = Duration::from_millis(ms);
    }
    if let Some(secs) = config.request_timeout_secs {
        settings.request_timeout = Duration::from_secs(secs);
    }
    settings
}
