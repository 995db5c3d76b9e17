use crate::app_config::{AppConfig, FetchMode, ScraperApiCredentials};
use crate::{ConfigError, DEFAULT_BASE_URL, MAX_RESULT_CAP};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const DEFAULT_SCRAPER_API_URL: &str = "https://realtime.oxylabs.io/v1/queries";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional. Scraper-service credentials come as a pair:
/// neither set is a valid configuration that yields empty search results in
/// `scraper-api` mode, while only one of them set is an error.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

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

    let parse_positive_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let value = parse_u64(var, default)?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let parse_cap = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 || value > MAX_RESULT_CAP {
            return Err(invalid(
                var,
                format!("must be between 1 and {MAX_RESULT_CAP}, got {value}"),
            ));
        }
        Ok(value)
    };

    let log_level = or_default("PRICESCOUT_LOG_LEVEL", "info");
    let base_url = or_default("PRICESCOUT_BASE_URL", DEFAULT_BASE_URL)
        .trim_end_matches('/')
        .to_string();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(invalid(
            "PRICESCOUT_BASE_URL",
            format!("\"{base_url}\" is not an http(s) origin"),
        ));
    }

    let price_ceiling = or_default("PRICESCOUT_PRICE_CEILING", "5995")
        .parse::<f64>()
        .map_err(|e| invalid("PRICESCOUT_PRICE_CEILING", e.to_string()))?;
    if !price_ceiling.is_finite() || price_ceiling <= 0.0 {
        return Err(invalid(
            "PRICESCOUT_PRICE_CEILING",
            format!("must be a positive number, got {price_ceiling}"),
        ));
    }

    let max_results = parse_cap("PRICESCOUT_MAX_RESULTS", "20")?;
    let structured_max_results = parse_cap("PRICESCOUT_STRUCTURED_MAX_RESULTS", "10")?;

    let min_query_len = or_default("PRICESCOUT_MIN_QUERY_LEN", "2")
        .parse::<usize>()
        .map_err(|e| invalid("PRICESCOUT_MIN_QUERY_LEN", e.to_string()))?;
    if min_query_len == 0 {
        return Err(invalid(
            "PRICESCOUT_MIN_QUERY_LEN",
            "must be at least 1".to_string(),
        ));
    }
    let debounce_ms = parse_u64("PRICESCOUT_DEBOUNCE_MS", "500")?;

    let fetch_mode = or_default("PRICESCOUT_FETCH_MODE", "direct").parse::<FetchMode>()?;
    let request_timeout_secs = parse_positive_u64("PRICESCOUT_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("PRICESCOUT_USER_AGENT", DEFAULT_USER_AGENT);
    let max_retries = parse_u32("PRICESCOUT_MAX_RETRIES", "1")?;
    let retry_backoff_base_secs = parse_u64("PRICESCOUT_RETRY_BACKOFF_BASE_SECS", "1")?;

    let scraper_api_url = or_default("PRICESCOUT_SCRAPER_API_URL", DEFAULT_SCRAPER_API_URL);
    let scraper_api_credentials = match (
        optional("PRICESCOUT_SCRAPER_API_USERNAME"),
        optional("PRICESCOUT_SCRAPER_API_PASSWORD"),
    ) {
        (Some(username), Some(password)) => Some(ScraperApiCredentials { username, password }),
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar(
                "PRICESCOUT_SCRAPER_API_PASSWORD".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar(
                "PRICESCOUT_SCRAPER_API_USERNAME".to_string(),
            ))
        }
        (None, None) => None,
    };
    let render_mode = or_default("PRICESCOUT_RENDER_MODE", "html");
    let geo_location = or_default("PRICESCOUT_GEO_LOCATION", "United States");
    let scraper_api_parse = parse_bool(&or_default("PRICESCOUT_SCRAPER_API_PARSE", "false"))
        .ok_or_else(|| {
            invalid(
                "PRICESCOUT_SCRAPER_API_PARSE",
                "expected true/false".to_string(),
            )
        })?;

    Ok(AppConfig {
        log_level,
        base_url,
        price_ceiling,
        max_results,
        structured_max_results,
        min_query_len,
        debounce_ms,
        fetch_mode,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        scraper_api_url,
        scraper_api_credentials,
        render_mode,
        geo_location,
        scraper_api_parse,
    })
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
