//! File download responses

use axum::response::{IntoResponse, Response};
use http::{HeaderValue, header};

use crate::reports::RenderedReport;

impl IntoResponse for RenderedReport {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!(
            "attachment; filename=\"{}\"",
            self.filename
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            [
                (header::CONTENT_TYPE, HeaderValue::from_static(self.content_type)),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.bytes,
        )
            .into_response()
    }
}
