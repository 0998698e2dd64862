use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use tracing::info;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_DB_CONNECT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_IDLE_TIMEOUT_SECS: u64 = 600;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 8;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DUE_NET_DAYS: i64 = 30;
const DEFAULT_TAX_RATE_PERCENT: u32 = 16;
const DEFAULT_PAYMENT_TERMS: &str = "30 days";

#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Deployment environment: "development", "staging", "production"
    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub log_json: bool,

    /// Run embedded migrations on startup
    #[serde(default = "default_true")]
    pub auto_migrate: bool,

    #[validate(length(min = 1, message = "database_url must not be empty"))]
    pub database_url: String,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,
    #[serde(default = "default_db_idle_timeout_secs")]
    pub db_idle_timeout_secs: u64,
    #[serde(default = "default_db_acquire_timeout_secs")]
    pub db_acquire_timeout_secs: u64,

    /// Per-request timeout applied to the whole router
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Comma-separated list of allowed CORS origins; unset means
    /// permissive CORS in development and a startup error elsewhere
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Net payment days used to derive a due date when the client omits one
    #[serde(default = "default_due_net_days")]
    pub invoice_due_net_days: i64,

    /// Default tax rate, whole percent
    #[serde(default = "default_tax_rate_percent")]
    pub default_tax_rate_percent: u32,

    #[serde(default = "default_payment_terms")]
    pub default_payment_terms: String,
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_db_max_connections() -> u32 {
    DEFAULT_DB_MAX_CONNECTIONS
}
fn default_db_min_connections() -> u32 {
    DEFAULT_DB_MIN_CONNECTIONS
}
fn default_db_connect_timeout_secs() -> u64 {
    DEFAULT_DB_CONNECT_TIMEOUT_SECS
}
fn default_db_idle_timeout_secs() -> u64 {
    DEFAULT_DB_IDLE_TIMEOUT_SECS
}
fn default_db_acquire_timeout_secs() -> u64 {
    DEFAULT_DB_ACQUIRE_TIMEOUT_SECS
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_due_net_days() -> i64 {
    DEFAULT_DUE_NET_DAYS
}
fn default_tax_rate_percent() -> u32 {
    DEFAULT_TAX_RATE_PERCENT
}
fn default_payment_terms() -> String {
    DEFAULT_PAYMENT_TERMS.to_string()
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Loads configuration from `config/default.toml`, an optional
/// environment-specific file, and `APP__`-prefixed environment variables
/// (later sources win).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder();

    let default_file = Path::new(CONFIG_DIR).join("default.toml");
    if default_file.exists() {
        builder = builder.add_source(File::from(default_file));
    }

    let env_file = Path::new(CONFIG_DIR).join(format!("{run_env}.toml"));
    if env_file.exists() {
        builder = builder.add_source(File::from(env_file));
    }

    let config: AppConfig = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    info!(
        environment = %config.environment,
        port = config.port,
        auto_migrate = config.auto_migrate,
        "configuration loaded"
    );

    Ok(config)
}

/// Initializes the global tracing subscriber. `RUST_LOG` overrides the
/// configured level.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
