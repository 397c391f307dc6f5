//! Ledger-wide analytics API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/reports/summary | GET | Sales overview |
//! | /api/reports/loyalty/monthly | GET | Customer-months above a threshold |
//! | /api/reports/trends | GET | Monthly history and projection |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/summary", get(handler::summary))
        .route("/loyalty/monthly", get(handler::monthly_loyalty))
        .route("/trends", get(handler::trends))
}
