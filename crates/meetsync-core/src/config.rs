use crate::app_config::AppConfig;
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
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup — no
/// `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_i64 = |var: &str, default: &str| -> Result<i64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let bmlt_base_url = require("BMLT_BASE_URL")?.trim().to_string();
    if !bmlt_base_url.starts_with("http://") && !bmlt_base_url.starts_with("https://") {
        return Err(ConfigError::InvalidEnvVar {
            var: "BMLT_BASE_URL".to_string(),
            reason: format!("must include http:// or https:// (got: {bmlt_base_url:?})"),
        });
    }
    let bmlt_admin_user = require("BMLT_ADMIN_USER")?;
    let bmlt_admin_pass = require("BMLT_ADMIN_PASS")?;

    let bmlt_api_prefix = or_default("BMLT_API_PREFIX", "/api/v1");
    // Values below 1 are accepted here and coerced to the daily default by the
    // schedule compiler; only an unparseable value is a configuration error.
    let sync_interval_minutes = parse_i64("SYNC_INTERVAL_MINUTES", "1440")?;

    let data_dir_raw = or_default("DATA_DIR", "/data");
    let data_dir_trimmed = data_dir_raw.trim();
    let data_dir = PathBuf::from(if data_dir_trimmed.is_empty() {
        "/data"
    } else {
        data_dir_trimmed
    });

    let wp_base = or_default("WP_BASE", "https://www.nasuomi.org")
        .trim()
        .to_string();
    let service_body_id = parse_i64("BMLT_SERVICE_BODY_ID", "1")?;

    let default_lat = parse_f64("BMLT_DEFAULT_LAT", "60.1699")?;
    let default_lon = parse_f64("BMLT_DEFAULT_LON", "24.9384")?;
    let allow_fallback_coords = or_default("BMLT_ALLOW_FALLBACK_COORDS", "0") == "1";

    let default_province_raw = or_default("BMLT_DEFAULT_PROVINCE", "Uusimaa");
    let default_province_trimmed = default_province_raw.trim();
    let default_province = if default_province_trimmed.is_empty() {
        "Uusimaa".to_string()
    } else {
        default_province_trimmed.to_string()
    };

    let log_level = or_default("MEETSYNC_LOG_LEVEL", "info");
    let http_timeout_secs = parse_u64("MEETSYNC_HTTP_TIMEOUT_SECS", "40")?;

    Ok(AppConfig {
        bmlt_base_url,
        bmlt_admin_user,
        bmlt_admin_pass,
        bmlt_api_prefix,
        sync_interval_minutes,
        data_dir,
        wp_base,
        service_body_id,
        default_lat,
        default_lon,
        allow_fallback_coords,
        default_province,
        log_level,
        http_timeout_secs,
    })
}
