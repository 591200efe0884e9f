use crate::app_config::{AppConfig, Environment, WooCommerceConfig};
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

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let present = |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.is_empty()) };

    let require = |var: &str| -> Result<String, ConfigError> {
        present(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default =
        |var: &str, default: &str| -> String { present(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("BUBBLEHOUSE_ENV", "development"))?;

    let bind_addr = or_default("BUBBLEHOUSE_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("BUBBLEHOUSE_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("BUBBLEHOUSE_LOG_LEVEL", "info");
    let settings_path = present("BUBBLEHOUSE_SETTINGS_PATH").map(PathBuf::from);
    let api_version = or_default("BUBBLEHOUSE_API_VERSION", "v2023061");
    let block_version = or_default("BUBBLEHOUSE_BLOCK_VERSION", "v2023061");

    let sync_interval_secs = parse_u64("BUBBLEHOUSE_SYNC_INTERVAL_SECS", "3600")?;
    if sync_interval_secs == 0 {
        return Err(invalid(
            "BUBBLEHOUSE_SYNC_INTERVAL_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let sync_timeout_secs = parse_u64("BUBBLEHOUSE_SYNC_TIMEOUT_SECS", "60")?;
    if sync_timeout_secs == 0 {
        return Err(invalid(
            "BUBBLEHOUSE_SYNC_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }

    let woocommerce = match present("WOOCOMMERCE_URL") {
        None => None,
        Some(store_url) => {
            let page_size = parse_u32("WOOCOMMERCE_PAGE_SIZE", "100")?;
            // The REST API caps `per_page` at 100.
            if !(1..=100).contains(&page_size) {
                return Err(invalid(
                    "WOOCOMMERCE_PAGE_SIZE",
                    format!("{page_size} is outside 1..=100"),
                ));
            }
            Some(WooCommerceConfig {
                store_url,
                consumer_key: require("WOOCOMMERCE_CONSUMER_KEY")?,
                consumer_secret: require("WOOCOMMERCE_CONSUMER_SECRET")?,
                page_size,
                inter_request_delay_ms: parse_u64("WOOCOMMERCE_INTER_REQUEST_DELAY_MS", "0")?,
                max_retries: parse_u32("WOOCOMMERCE_MAX_RETRIES", "3")?,
                retry_backoff_base_secs: parse_u64("WOOCOMMERCE_RETRY_BACKOFF_BASE_SECS", "2")?,
            })
        }
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        settings_path,
        api_version,
        block_version,
        sync_interval_secs,
        sync_timeout_secs,
        woocommerce,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BUBBLEHOUSE_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
