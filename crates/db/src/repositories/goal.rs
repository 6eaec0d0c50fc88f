use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use greenpath_core::domain::goal::{GoalId, GoalStatus, SustainabilityGoal};
use greenpath_core::domain::UserId;
use greenpath_core::errors::StoreError;
use greenpath_core::store::GoalStore;

use super::{decode_err, parse_optional_timestamp, parse_timestamp, RepositoryError};
use crate::DbPool;

pub struct SqlGoalRepository {
    pool: DbPool,
}

impl SqlGoalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list_active(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SustainabilityGoal>, RepositoryError> {
        sqlx::query(
            "SELECT id, user_id, title, category, unit, target_value, current_value,
                    progress_percentage, status, last_measured_at, updated_at
             FROM sustainability_goal
             WHERE user_id = ? AND status = ?
             ORDER BY id ASC",
        )
        .bind(&user_id.0)
        .bind(GoalStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(row_to_goal)
        .collect()
    }

    /// Last write wins; there is no version check on the row.
    pub async fn upsert(&self, goal: &SustainabilityGoal) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO sustainability_goal (id, user_id, title, category, unit, target_value,
                                              current_value, progress_percentage, status,
                                              last_measured_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                unit = excluded.unit,
                target_value = excluded.target_value,
                current_value = excluded.current_value,
                progress_percentage = excluded.progress_percentage,
                status = excluded.status,
                last_measured_at = excluded.last_measured_at,
                updated_at = excluded.updated_at",
        )
        .bind(&goal.id.0)
        .bind(&goal.user_id.0)
        .bind(&goal.title)
        .bind(&goal.category)
        .bind(&goal.unit)
        .bind(goal.target_value)
        .bind(goal.current_value)
        .bind(goal.progress_percentage)
        .bind(goal.status.as_str())
        .bind(goal.last_measured_at.map(|at| at.to_rfc3339()))
        .bind(goal.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn row_to_goal(row: &SqliteRow) -> Result<SustainabilityGoal, RepositoryError> {
    let status: String = row.try_get("status").map_err(decode_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(decode_err)?;

    Ok(SustainabilityGoal {
        id: GoalId(row.try_get("id").map_err(decode_err)?),
        user_id: UserId(row.try_get("user_id").map_err(decode_err)?),
        title: row.try_get("title").map_err(decode_err)?,
        category: row.try_get("category").map_err(decode_err)?,
        unit: row.try_get("unit").map_err(decode_err)?,
        target_value: row.try_get("target_value").map_err(decode_err)?,
        current_value: row.try_get("current_value").map_err(decode_err)?,
        progress_percentage: row.try_get("progress_percentage").map_err(decode_err)?,
        status: GoalStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown goal status `{status}`")))?,
        last_measured_at: parse_optional_timestamp(
            "last_measured_at",
            row.try_get("last_measured_at").map_err(decode_err)?,
        )?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

#[async_trait]
impl GoalStore for SqlGoalRepository {
    async fn list_active_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<SustainabilityGoal>, StoreError> {
        Ok(self.list_active(user_id).await?)
    }

    async fn save_goal(&self, goal: &SustainabilityGoal) -> Result<(), StoreError> {
        Ok(self.upsert(goal).await?)
    }
}
