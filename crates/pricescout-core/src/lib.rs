pub mod app_config;
pub mod config;
pub mod error;
pub mod products;

pub use app_config::{AppConfig, FetchMode, ScraperApiCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use products::{format_usd, ProductRecord};

/// Default origin every relative listing URL is resolved against.
pub const DEFAULT_BASE_URL: &str = "https://www.bestbuy.com";

/// Exclusive upper bound on surfaced prices unless overridden.
pub const DEFAULT_PRICE_CEILING: f64 = 5995.0;

/// Hard upper bound on any configured result cap.
pub const MAX_RESULT_CAP: usize = 20;
