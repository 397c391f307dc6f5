//! API routing
//!
//! # Structure
//!
//! - [`health`] - liveness check
//! - [`document_types`] - identity document types
//! - [`customers`] - customers, their purchases, loyalty report and exports
//! - [`purchases`] - purchase orders
//! - [`reports`] - ledger-wide analytics

pub mod download;
pub mod params;

pub mod customers;
pub mod document_types;
pub mod health;
pub mod purchases;
pub mod reports;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::core::ServerState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request id generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Every route, without middleware or state
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(document_types::router())
        .merge(customers::router())
        .merge(purchases::router())
        .merge(reports::router())
}

/// Fully configured application with middleware and state
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
