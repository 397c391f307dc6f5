//! Document Type Repository

use super::{RepoError, RepoResult};
use shared::models::{DocumentType, DocumentTypeCreate};
use sqlx::{Executor, Sqlite, SqlitePool};

const SELECT: &str = "SELECT id, code, name, description, is_active, created_at FROM document_type";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DocumentType>> {
    let types = sqlx::query_as::<_, DocumentType>(&format!(
        "{SELECT} WHERE is_active = 1 ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(types)
}

pub async fn find_by_id<'e, E>(executor: E, id: i64) -> RepoResult<Option<DocumentType>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let found = sqlx::query_as::<_, DocumentType>(&format!("{SELECT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(found)
}

/// Look up an active type by code (case-insensitive)
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> RepoResult<Option<DocumentType>> {
    let found = sqlx::query_as::<_, DocumentType>(&format!(
        "{SELECT} WHERE code = ? AND is_active = 1"
    ))
    .bind(code.trim().to_uppercase())
    .fetch_optional(pool)
    .await?;
    Ok(found)
}

pub async fn create(pool: &SqlitePool, data: DocumentTypeCreate) -> RepoResult<DocumentType> {
    let now = shared::util::now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO document_type (code, name, description, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4) RETURNING id",
    )
    .bind(data.code.trim().to_uppercase())
    .bind(data.name.trim())
    .bind(data.description.unwrap_or_default())
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create document type".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;

    #[tokio::test]
    async fn test_seeded_types_are_listed() {
        let pool = test_support::pool().await;
        let types = find_all(&pool).await.unwrap();
        let codes: Vec<&str> = types.iter().map(|t| t.code.as_str()).collect();
        for code in ["CC", "TI", "CE", "PP", "NIT"] {
            assert!(codes.contains(&code), "missing {code}");
        }
    }

    #[tokio::test]
    async fn test_find_by_code_is_case_insensitive() {
        let pool = test_support::pool().await;
        let cc = find_by_code(&pool, " cc ").await.unwrap().unwrap();
        assert_eq!(cc.code, "CC");
        assert!(find_by_code(&pool, "XX").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_uppercases_and_rejects_duplicate_code() {
        let pool = test_support::pool().await;
        let created = create(
            &pool,
            DocumentTypeCreate {
                code: "rc".into(),
                name: "Registro Civil".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(created.code, "RC");
        assert!(created.is_active);

        let dup = create(
            &pool,
            DocumentTypeCreate {
                code: "RC".into(),
                name: "Otro".into(),
                description: None,
            },
        )
        .await;
        assert!(matches!(dup, Err(RepoError::Duplicate(_))));
    }
}
