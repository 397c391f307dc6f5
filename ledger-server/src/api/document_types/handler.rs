//! Document Type API Handlers

use axum::{Json, extract::State};
use shared::models::{DocumentType, DocumentTypeCreate};

use crate::core::ServerState;
use crate::db::repository::document_type;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_CODE_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text,
};

/// GET /api/document-types - active document types
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DocumentType>>> {
    let types = document_type::find_all(&state.pool).await?;
    Ok(Json(types))
}

/// POST /api/document-types - register a document type
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DocumentTypeCreate>,
) -> AppResult<Json<DocumentType>> {
    validate_required_text(&payload.code, "code", MAX_CODE_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let created = document_type::create(&state.pool, payload).await?;
    tracing::info!(code = %created.code, "Document type created");
    Ok(Json(created))
}
