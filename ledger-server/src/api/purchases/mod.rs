//! Purchase API
//!
//! Writes go through the purchase workflow so the owning customer's cached
//! totals are refreshed in the same transaction.

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/purchases", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/order/{order_number}", get(handler::get_by_order_number))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/status", put(handler::change_status))
}
