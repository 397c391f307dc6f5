//! Customer API
//!
//! | Path | Method | Meaning |
//! |------|--------|---------|
//! | /api/customers | GET, POST | List (filters) / create |
//! | /api/customers/lookup/{document_number} | GET | Basic profile |
//! | /api/customers/search | GET | By document type code and number |
//! | /api/customers/{id} | GET, PUT, DELETE | Detail / update / deactivate |
//! | /api/customers/{id}/permanent | DELETE | Physical delete |
//! | /api/customers/{id}/purchases | GET | Paginated purchases |
//! | /api/customers/{id}/statistics | GET | Purchase statistics |
//! | /api/customers/{id}/aggregates/recompute | POST | Rebuild cached totals |
//! | /api/customers/reports/loyalty | GET | Loyalty report (per customer) |
//! | /api/customers/reports/loyalty/bulk | GET | Loyalty report (bulk scan) |
//! | /api/customers/export/{format} | GET | All active customers |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/customers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/lookup/{document_number}", get(handler::lookup))
        .route("/search", get(handler::search))
        .route("/reports/loyalty", get(handler::loyalty_report))
        .route("/reports/loyalty/bulk", get(handler::loyalty_report_bulk))
        .route("/export/{format}", get(handler::export))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/permanent", delete(handler::delete_permanent))
        .route("/{id}/purchases", get(handler::purchases))
        .route("/{id}/statistics", get(handler::statistics))
        .route("/{id}/aggregates/recompute", post(handler::recompute))
}
