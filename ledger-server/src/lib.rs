//! Ledger Server - customer and purchase ledger service
//!
//! # Overview
//!
//! - **Ledger** (`ledger`): customer aggregate recompute, loyalty candidate
//!   selection, order numbering and the transactional purchase workflow
//! - **Database** (`db`): SQLite through sqlx, embedded migrations
//! - **Reports** (`reports`): XLSX / CSV / text rendering and analytics
//! - **HTTP API** (`api`): axum routers and handlers
//!
//! # Module structure
//!
//! ```text
//! ledger-server/src/
//! ├── core/          # config, state, server
//! ├── db/            # pool, repositories
//! ├── ledger/        # aggregate, loyalty, order numbers, workflow
//! ├── reports/       # tables, sinks, analytics
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logger, time, validation, errors
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod ledger;
pub mod reports;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use utils::logger::{init_logger, init_logger_with_file};

/// Initialize logging from the configuration
pub fn setup_environment(config: &Config) {
    init_logger_with_file(
        config.log_level.as_deref(),
        config.log_json,
        config.log_dir.as_deref(),
    );
}
