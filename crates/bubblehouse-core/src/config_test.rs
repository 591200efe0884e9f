use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with a complete WooCommerce block populated.
fn woo_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("WOOCOMMERCE_URL", "https://shop.example.com");
    m.insert("WOOCOMMERCE_CONSUMER_KEY", "ck_test");
    m.insert("WOOCOMMERCE_CONSUMER_SECRET", "cs_test");
    m
}

#[test]
fn parse_environment_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BUBBLEHOUSE_ENV"));
}

#[test]
fn build_app_config_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.settings_path.is_none());
    assert_eq!(cfg.api_version, "v2023061");
    assert_eq!(cfg.block_version, "v2023061");
    assert_eq!(cfg.sync_interval_secs, 3600);
    assert_eq!(cfg.sync_timeout_secs, 60);
    assert!(cfg.woocommerce.is_none());
}

#[test]
fn build_app_config_reads_woocommerce_block() {
    let map = woo_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let woo = cfg.woocommerce.expect("woocommerce config should be present");
    assert_eq!(woo.store_url, "https://shop.example.com");
    assert_eq!(woo.consumer_key, "ck_test");
    assert_eq!(woo.page_size, 100);
    assert_eq!(woo.inter_request_delay_ms, 0);
    assert_eq!(woo.max_retries, 3);
    assert_eq!(woo.retry_backoff_base_secs, 2);
}

#[test]
fn build_app_config_requires_consumer_secret_with_store_url() {
    let mut map = woo_env();
    map.remove("WOOCOMMERCE_CONSUMER_SECRET");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "WOOCOMMERCE_CONSUMER_SECRET"),
        "expected MissingEnvVar(WOOCOMMERCE_CONSUMER_SECRET), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_page_size_above_rest_cap() {
    let mut map = woo_env();
    map.insert("WOOCOMMERCE_PAGE_SIZE", "250");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "WOOCOMMERCE_PAGE_SIZE"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_interval() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("BUBBLEHOUSE_SYNC_INTERVAL_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUBBLEHOUSE_SYNC_INTERVAL_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_timeout() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("BUBBLEHOUSE_SYNC_TIMEOUT_SECS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUBBLEHOUSE_SYNC_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("BUBBLEHOUSE_SYNC_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUBBLEHOUSE_SYNC_TIMEOUT_SECS"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_invalid_bind_addr() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("BUBBLEHOUSE_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BUBBLEHOUSE_BIND_ADDR"),
        "got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_empty_values_as_unset() {
    let mut map: HashMap<&str, &str> = HashMap::new();
    map.insert("BUBBLEHOUSE_LOG_LEVEL", "");
    map.insert("WOOCOMMERCE_URL", "");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert!(cfg.woocommerce.is_none());
}

#[test]
fn woocommerce_debug_redacts_credentials() {
    let map = woo_env();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{:?}", cfg.woocommerce.unwrap());
    assert!(!rendered.contains("cs_test"));
    assert!(!rendered.contains("ck_test"));
    assert!(rendered.contains("[redacted]"));
}
