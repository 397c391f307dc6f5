use chrono::DateTime;
use chrono_tz::Tz;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::core::Config;
use crate::db::DbService;
use crate::ledger::{PurchaseWorkflow, SequentialOrderNumbers};
use crate::utils::{AppError, time};

/// Server state - shared by every handler
///
/// Cloning is cheap: the pool and the workflow are reference counted.
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | Immutable configuration |
/// | pool | SQLite connection pool |
/// | workflow | Purchase writes with aggregate maintenance |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub workflow: PurchaseWorkflow,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let workflow = PurchaseWorkflow::new(
            pool.clone(),
            config.trigger_policy,
            Arc::new(SequentialOrderNumbers::new()),
        );
        Self {
            config,
            pool,
            workflow,
        }
    }

    /// Open the configured database and build the state
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        if let Some(dir) = sqlite_parent_dir(&config.database_url) {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::database(format!("Cannot create database directory {dir}: {e}"))
            })?;
        }

        let db = DbService::new(&config.database_url, config.db_max_connections).await?;
        tracing::info!(
            trigger_policy = ?config.trigger_policy,
            timezone = %config.timezone,
            "Server state initialized"
        );
        Ok(Self::new(config.clone(), db.pool))
    }

    /// State over a fresh in-memory database
    pub async fn in_memory(config: Config) -> Result<Self, AppError> {
        let db = DbService::in_memory().await?;
        Ok(Self::new(config, db.pool))
    }

    pub fn timezone(&self) -> Tz {
        self.config.timezone
    }

    /// Current instant in the business timezone
    pub fn now(&self) -> DateTime<Tz> {
        time::now_in(self.config.timezone)
    }
}

/// Directory part of a file-backed `sqlite:` url
fn sqlite_parent_dir(url: &str) -> Option<&str> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    path.rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_parent_dir() {
        assert_eq!(sqlite_parent_dir("sqlite:data/ledger.db"), Some("data"));
        assert_eq!(sqlite_parent_dir("sqlite:///var/lib/ledger.db?mode=rwc"), Some("/var/lib"));
        assert_eq!(sqlite_parent_dir("sqlite:ledger.db"), None);
        assert_eq!(sqlite_parent_dir("sqlite::memory:"), None);
        assert_eq!(sqlite_parent_dir("postgres://x"), None);
    }

    #[tokio::test]
    async fn test_in_memory_state() {
        let state = ServerState::in_memory(Config::for_tests()).await.unwrap();
        assert_eq!(state.timezone(), chrono_tz::America::Bogota);
        assert_eq!(state.workflow.policy(), state.config.trigger_policy);
    }
}
