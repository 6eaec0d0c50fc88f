use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use greenpath_core::domain::implementation::{
    Implementation, ImplementationId, ImplementationStatus,
};
use greenpath_core::domain::recommendation::RecommendationId;
use greenpath_core::domain::UserId;
use greenpath_core::errors::StoreError;
use greenpath_core::store::ImplementationStore;

use super::{decode_err, parse_optional_timestamp, parse_timestamp, RepositoryError};
use crate::DbPool;

pub struct SqlImplementationRepository {
    pool: DbPool,
}

impl SqlImplementationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn find(
        &self,
        id: &ImplementationId,
    ) -> Result<Option<Implementation>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, user_id, recommendation_id, category, estimated_cost_savings,
                    estimated_co2_reduction, status, progress_percentage, started_at, updated_at,
                    completed_at
             FROM implementation
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_implementation).transpose()
    }

    pub async fn upsert(&self, implementation: &Implementation) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO implementation (id, user_id, recommendation_id, category,
                                         estimated_cost_savings, estimated_co2_reduction, status,
                                         progress_percentage, started_at, updated_at, completed_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                status = excluded.status,
                progress_percentage = excluded.progress_percentage,
                updated_at = excluded.updated_at,
                completed_at = excluded.completed_at",
        )
        .bind(&implementation.id.0)
        .bind(&implementation.user_id.0)
        .bind(implementation.recommendation_id.as_ref().map(|id| id.0.as_str()))
        .bind(&implementation.category)
        .bind(implementation.estimated_cost_savings)
        .bind(implementation.estimated_co2_reduction)
        .bind(implementation.status.as_str())
        .bind(implementation.progress_percentage)
        .bind(implementation.started_at.to_rfc3339())
        .bind(implementation.updated_at.to_rfc3339())
        .bind(implementation.completed_at.map(|at| at.to_rfc3339()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_implementation(row: &SqliteRow) -> Result<Implementation, RepositoryError> {
    let status: String = row.try_get("status").map_err(decode_err)?;
    let recommendation_id: Option<String> = row.try_get("recommendation_id").map_err(decode_err)?;
    let started_at: String = row.try_get("started_at").map_err(decode_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_err)?;

    Ok(Implementation {
        id: ImplementationId(row.try_get("id").map_err(decode_err)?),
        user_id: UserId(row.try_get("user_id").map_err(decode_err)?),
        recommendation_id: recommendation_id.map(RecommendationId),
        category: row.try_get("category").map_err(decode_err)?,
        estimated_cost_savings: row.try_get("estimated_cost_savings").map_err(decode_err)?,
        estimated_co2_reduction: row.try_get("estimated_co2_reduction").map_err(decode_err)?,
        status: ImplementationStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown status `{status}`")))?,
        progress_percentage: row.try_get("progress_percentage").map_err(decode_err)?,
        started_at: parse_timestamp("started_at", &started_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
        completed_at: parse_optional_timestamp(
            "completed_at",
            row.try_get("completed_at").map_err(decode_err)?,
        )?,
    })
}

#[async_trait]
impl ImplementationStore for SqlImplementationRepository {
    async fn find_by_id(
        &self,
        id: &ImplementationId,
    ) -> Result<Option<Implementation>, StoreError> {
        Ok(self.find(id).await?)
    }

    async fn save(&self, implementation: &Implementation) -> Result<(), StoreError> {
        Ok(self.upsert(implementation).await?)
    }
}
