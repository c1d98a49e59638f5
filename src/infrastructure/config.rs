use crate::infrastructure::error::InfraError;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use url::Url;

const APP_JSON: &str = "app.json";
pub const BACKEND_URL_ENV: &str = "AGENDA_BACKEND_URL";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PopoverDimensions {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl Default for PopoverDimensions {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 360.0,
            margin: 8.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: Url,
    pub time_zone: Tz,
    pub popover: PopoverDimensions,
}

fn default_app_config() -> serde_json::Value {
    serde_json::json!({
        "schema": 1,
        "appName": "Agenda",
        "apiBaseUrl": null,
        "timezone": "UTC",
        "popover": {
            "width": 320,
            "height": 360,
            "margin": 8
        }
    })
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    let path = config_dir.join(APP_JSON);
    if !path.exists() {
        let formatted = serde_json::to_string_pretty(&default_app_config())?;
        fs::write(path, format!("{formatted}\n"))?;
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

fn config_str<'a>(config: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    config
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Parses the backend base URL, dropping trailing slashes.
pub fn parse_backend_url(raw: &str) -> Result<Url, InfraError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(InfraError::InvalidConfig(
            "backend base URL is not configured".to_string(),
        ));
    }
    let url = Url::parse(trimmed)
        .map_err(|error| InfraError::InvalidConfig(format!("invalid backend base URL '{trimmed}': {error}")))?;
    if url.cannot_be_a_base() {
        return Err(InfraError::InvalidConfig(format!(
            "backend base URL cannot be a base: {trimmed}"
        )));
    }
    Ok(url)
}

pub fn parse_time_zone(raw: &str) -> Result<Tz, InfraError> {
    raw.trim()
        .parse::<Tz>()
        .map_err(|error| InfraError::InvalidConfig(format!("unknown timezone '{raw}': {error}")))
}

pub fn load_app_config(config_dir: &Path) -> Result<AppConfig, InfraError> {
    load_app_config_with_lookup(config_dir, |key| std::env::var(key).ok())
}

/// Loads `app.json`, letting `AGENDA_BACKEND_URL` from `lookup` override `apiBaseUrl`.
pub fn load_app_config_with_lookup<F>(config_dir: &Path, lookup: F) -> Result<AppConfig, InfraError>
where
    F: Fn(&str) -> Option<String>,
{
    let app = read_config(&config_dir.join(APP_JSON))?;

    let from_env = lookup(BACKEND_URL_ENV).filter(|value| !value.trim().is_empty());
    let raw_url = from_env
        .as_deref()
        .or_else(|| config_str(&app, "apiBaseUrl"))
        .ok_or_else(|| {
            InfraError::InvalidConfig(format!(
                "backend base URL is missing: set {BACKEND_URL_ENV} or apiBaseUrl in {APP_JSON}"
            ))
        })?;
    let api_base_url = parse_backend_url(raw_url)?;

    let time_zone = match config_str(&app, "timezone") {
        Some(name) => parse_time_zone(name)?,
        None => Tz::UTC,
    };

    let popover = match app.get("popover") {
        Some(value) if !value.is_null() => {
            serde_json::from_value::<PopoverDimensions>(value.clone()).map_err(|error| {
                InfraError::InvalidConfig(format!("invalid popover settings in {APP_JSON}: {error}"))
            })?
        }
        _ => PopoverDimensions::default(),
    };

    Ok(AppConfig {
        api_base_url,
        time_zone,
        popover,
    })
}
