use crate::ledger::TriggerPolicy;
use crate::utils::time;
use chrono_tz::Tz;
use rust_decimal::Decimal;

/// Default loyalty threshold in COP
pub const DEFAULT_LOYALTY_MIN_AMOUNT: i64 = 5_000_000;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | DATABASE_URL | sqlite:data/ledger.db | SQLite database |
/// | DB_MAX_CONNECTIONS | 5 | Pool size |
/// | HTTP_PORT | 8080 | HTTP port |
/// | ENVIRONMENT | development | Runtime environment |
/// | LOG_LEVEL | info | Log level when `RUST_LOG` is unset |
/// | LOG_DIR | - | Daily rolling log directory |
/// | LOG_JSON | false | JSON log lines |
/// | LOYALTY_MIN_AMOUNT | 5000000 | Default loyalty threshold |
/// | TRIGGER_POLICY | counted | `counted` or `completed` |
/// | BUSINESS_TIMEZONE | America/Bogota | Calendar used for months and dates |
///
/// # Example
///
/// ```ignore
/// DATABASE_URL=sqlite:/tmp/ledger.db HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
    pub log_json: bool,
    /// Used when a loyalty request carries no usable `min_amount`
    pub loyalty_min_amount: Decimal,
    pub trigger_policy: TriggerPolicy,
    pub timezone: Tz,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:data/ledger.db".into()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").ok(),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            loyalty_min_amount: std::env::var("LOYALTY_MIN_AMOUNT")
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(Decimal::from(DEFAULT_LOYALTY_MIN_AMOUNT)),
            trigger_policy: std::env::var("TRIGGER_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            timezone: std::env::var("BUSINESS_TIMEZONE")
                .map(|name| time::parse_timezone(&name))
                .unwrap_or(time::DEFAULT_TIMEZONE),
        }
    }

    /// Configuration for tests: in-memory database, defaults elsewhere
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            db_max_connections: 1,
            http_port: 0,
            environment: "test".into(),
            log_level: None,
            log_dir: None,
            log_json: false,
            loyalty_min_amount: Decimal::from(DEFAULT_LOYALTY_MIN_AMOUNT),
            trigger_policy: TriggerPolicy::default(),
            timezone: time::DEFAULT_TIMEZONE,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
