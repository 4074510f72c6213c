use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::region::{load_region, RegionConfig};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Load the search region named by `config.region_path`, or the built-in
/// Oak Brook region when no path is configured.
///
/// # Errors
///
/// Returns `ConfigError` if the region file cannot be read, parsed, or validated.
pub fn load_region_config(config: &AppConfig) -> Result<RegionConfig, ConfigError> {
    match &config.region_path {
        Some(path) => {
            let region = load_region(path)?;
            tracing::info!(
                path = %path.display(),
                state = %region.state,
                cities = region.cities.len(),
                "loaded region"
            );
            Ok(region)
        }
        None => Ok(RegionConfig::oak_brook()),
    }
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let rapidapi_key = require("RAPIDAPI_KEY")?;

    let env = parse_environment(&or_default("SPECHOME_ENV", "development"))?;

    let bind_addr = parse_addr("SPECHOME_BIND_ADDR", "127.0.0.1:5050")?;
    let log_level = or_default("SPECHOME_LOG_LEVEL", "info");
    let region_path = lookup("SPECHOME_REGION_PATH")
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);

    let listings_base_url = or_default(
        "SPECHOME_LISTINGS_BASE_URL",
        "https://real-estate101.p.rapidapi.com",
    );
    let listings_timeout_secs = parse_u64("SPECHOME_LISTINGS_TIMEOUT_SECS", "30")?;
    let listings_user_agent = or_default(
        "SPECHOME_LISTINGS_USER_AGENT",
        "spechome/0.1 (teardown-analysis)",
    );
    let listings_max_retries = parse_u32("SPECHOME_LISTINGS_MAX_RETRIES", "0")?;
    let listings_retry_backoff_base_secs =
        parse_u64("SPECHOME_LISTINGS_RETRY_BACKOFF_BASE_SECS", "2")?;

    let page_size: usize =
        parse_positive("SPECHOME_PAGE_SIZE", &or_default("SPECHOME_PAGE_SIZE", "40"))?;
    let nearby_max_pages: u32 = parse_positive(
        "SPECHOME_NEARBY_MAX_PAGES",
        &or_default("SPECHOME_NEARBY_MAX_PAGES", "39"),
    )?;
    let analyze_comp_limit: usize = parse_positive(
        "SPECHOME_ANALYZE_COMP_LIMIT",
        &or_default("SPECHOME_ANALYZE_COMP_LIMIT", "20"),
    )?;
    let session_idle_secs: u64 = parse_positive(
        "SPECHOME_SESSION_IDLE_SECS",
        &or_default("SPECHOME_SESSION_IDLE_SECS", "86400"),
    )?;

    Ok(AppConfig {
        rapidapi_key,
        env,
        bind_addr,
        log_level,
        region_path,
        listings_base_url,
        listings_timeout_secs,
        listings_user_agent,
        listings_max_retries,
        listings_retry_backoff_base_secs,
        page_size,
        nearby_max_pages,
        analyze_comp_limit,
        session_idle_secs,
    })
}

/// Parse a count or duration that must be at least 1.
fn parse_positive<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr + Default + PartialEq,
    T::Err: Display,
{
    match raw.trim().parse::<T>() {
        Ok(n) if n == T::default() => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SPECHOME_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
