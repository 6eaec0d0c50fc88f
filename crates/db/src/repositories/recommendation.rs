use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use greenpath_core::domain::recommendation::{
    Difficulty, Recommendation, RecommendationId, RecommendationSource, RecommendationStatus,
    StoredRecommendation,
};
use greenpath_core::domain::UserId;
use greenpath_core::errors::StoreError;
use greenpath_core::store::RecommendationStore;

use super::{decode_err, parse_timestamp, RepositoryError};
use crate::DbPool;

const SELECT_COLUMNS: &str = "user_id, recommendation_id, title, description, category,
        estimated_cost_savings, estimated_co2_reduction, roi_months, difficulty,
        priority_score, source, confidence, implementation_steps, reasoning, status, created_at";

pub struct SqlRecommendationRepository {
    pool: DbPool,
}

impl SqlRecommendationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        user_id: &UserId,
        statuses: &[RecommendationStatus],
    ) -> Result<Vec<StoredRecommendation>, RepositoryError> {
        let mut sql = format!("SELECT {SELECT_COLUMNS} FROM recommendation WHERE user_id = ?");
        if !statuses.is_empty() {
            let placeholders = vec!["?"; statuses.len()].join(", ");
            sql.push_str(&format!(" AND status IN ({placeholders})"));
        }
        sql.push_str(" ORDER BY created_at ASC, priority_score DESC");

        let mut query = sqlx::query(&sql).bind(&user_id.0);
        for status in statuses {
            query = query.bind(status.as_str());
        }

        query.fetch_all(&self.pool).await?.iter().map(row_to_stored).collect()
    }

    /// Inserts the whole batch in one transaction; nothing is written on failure.
    pub async fn insert_batch(
        &self,
        user_id: &UserId,
        recommendations: &[Recommendation],
    ) -> Result<(), RepositoryError> {
        let created_at = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        for recommendation in recommendations {
            let steps =
                serde_json::to_string(&recommendation.implementation_steps).map_err(decode_err)?;
            sqlx::query(
                "INSERT INTO recommendation (row_id, user_id, recommendation_id, title,
                     normalized_title, description, category, estimated_cost_savings,
                     estimated_co2_reduction, roi_months, difficulty, priority_score, source,
                     confidence, implementation_steps, reasoning, status, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&user_id.0)
            .bind(&recommendation.id.0)
            .bind(&recommendation.title)
            .bind(recommendation.normalized_title())
            .bind(&recommendation.description)
            .bind(&recommendation.category)
            .bind(recommendation.estimated_cost_savings)
            .bind(recommendation.estimated_co2_reduction)
            .bind(i64::from(recommendation.roi_months))
            .bind(recommendation.difficulty.as_str())
            .bind(recommendation.priority_score)
            .bind(recommendation.source.as_str())
            .bind(recommendation.confidence)
            .bind(steps)
            .bind(&recommendation.reasoning)
            .bind(RecommendationStatus::Pending.as_str())
            .bind(&created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        user_id: &UserId,
        recommendation_id: &RecommendationId,
        status: RecommendationStatus,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            "UPDATE recommendation SET status = ? WHERE user_id = ? AND recommendation_id = ?",
        )
        .bind(status.as_str())
        .bind(&user_id.0)
        .bind(&recommendation_id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_stored(row: &SqliteRow) -> Result<StoredRecommendation, RepositoryError> {
    let roi_months: i64 = row.try_get("roi_months").map_err(decode_err)?;
    let difficulty: String = row.try_get("difficulty").map_err(decode_err)?;
    let source: String = row.try_get("source").map_err(decode_err)?;
    let status: String = row.try_get("status").map_err(decode_err)?;
    let steps: String = row.try_get("implementation_steps").map_err(decode_err)?;
    let created_at: String = row.try_get("created_at").map_err(decode_err)?;

    let recommendation = Recommendation {
        id: RecommendationId(row.try_get("recommendation_id").map_err(decode_err)?),
        title: row.try_get("title").map_err(decode_err)?,
        description: row.try_get("description").map_err(decode_err)?,
        category: row.try_get("category").map_err(decode_err)?,
        estimated_cost_savings: row.try_get("estimated_cost_savings").map_err(decode_err)?,
        estimated_co2_reduction: row.try_get("estimated_co2_reduction").map_err(decode_err)?,
        roi_months: u32::try_from(roi_months).map_err(decode_err)?,
        difficulty: Difficulty::parse_lenient(&difficulty),
        priority_score: row.try_get("priority_score").map_err(decode_err)?,
        source: RecommendationSource::parse(&source)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown source `{source}`")))?,
        confidence: row.try_get("confidence").map_err(decode_err)?,
        implementation_steps: serde_json::from_str(&steps).map_err(decode_err)?,
        reasoning: row.try_get("reasoning").map_err(decode_err)?,
    };

    Ok(StoredRecommendation {
        user_id: UserId(row.try_get("user_id").map_err(decode_err)?),
        recommendation,
        status: RecommendationStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Decode(format!("unknown status `{status}`")))?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

#[async_trait]
impl RecommendationStore for SqlRecommendationRepository {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        statuses: &[RecommendationStatus],
    ) -> Result<Vec<StoredRecommendation>, StoreError> {
        Ok(self.list(user_id, statuses).await?)
    }

    async fn save_batch(
        &self,
        user_id: &UserId,
        recommendations: &[Recommendation],
    ) -> Result<(), StoreError> {
        Ok(self.insert_batch(user_id, recommendations).await?)
    }
}

#[cfg(test)]
mod tests {
    use greenpath_core::domain::recommendation::{
        Difficulty, Recommendation, RecommendationId, RecommendationSource, RecommendationStatus,
    };
    use greenpath_core::domain::UserId;
    use greenpath_core::store::RecommendationStore;

    use super::SqlRecommendationRepository;
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlRecommendationRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlRecommendationRepository::new(pool)
    }

    fn recommendation(id: &str, title: &str, priority_score: f64) -> Recommendation {
        Recommendation {
            id: RecommendationId(id.to_owned()),
            title: title.to_owned(),
            description: "Replace fluorescent fixtures".to_owned(),
            category: "Energy Efficiency".to_owned(),
            estimated_cost_savings: 2_550.0,
            estimated_co2_reduction: 23_460.0,
            roi_months: 18,
            difficulty: Difficulty::Easy,
            priority_score,
            source: RecommendationSource::Ai,
            confidence: 0.7,
            implementation_steps: vec!["Audit fixtures".to_owned(), "Order LEDs".to_owned()],
            reasoning: Some("High lighting load".to_owned()),
        }
    }

    #[tokio::test]
    async fn saved_batch_round_trips_as_pending() {
        let repo = repository().await;
        let user = UserId("user-1".to_owned());
        let batch = vec![
            recommendation("led_retrofit_basic", "LED Lighting Retrofit", 0.9),
            recommendation("ai-rec-1", "Heat Pump Water Heaters", 0.6),
        ];

        repo.save_batch(&user, &batch).await.expect("save batch");
        let stored = repo.list_for_user(&user, &[]).await.expect("list");

        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|row| row.status == RecommendationStatus::Pending));
        let led = stored
            .iter()
            .find(|row| row.recommendation.id.0 == "led_retrofit_basic")
            .expect("led row");
        assert_eq!(led.recommendation, batch[0]);
    }

    #[tokio::test]
    async fn status_filter_limits_results() {
        let repo = repository().await;
        let user = UserId("user-1".to_owned());
        repo.save_batch(
            &user,
            &[recommendation("a", "A", 0.5), recommendation("b", "B", 0.5)],
        )
        .await
        .expect("save batch");
        repo.set_status(&user, &RecommendationId("a".to_owned()), RecommendationStatus::Dismissed)
            .await
            .expect("dismiss");

        let suppressing = repo
            .list_for_user(&user, RecommendationStatus::suppressing())
            .await
            .expect("list suppressing");
        assert_eq!(suppressing.len(), 1);
        assert_eq!(suppressing[0].recommendation.title, "B");

        let other_user = repo.list_for_user(&UserId("user-2".to_owned()), &[]).await.expect("list");
        assert!(other_user.is_empty());
    }

    #[tokio::test]
    async fn failed_batch_writes_nothing() {
        let repo = repository().await;
        let user = UserId("user-1".to_owned());
        let mut invalid = recommendation("bad", "Bad", 0.5);
        invalid.priority_score = 4.0;

        let result = repo.save_batch(&user, &[recommendation("ok", "Ok", 0.5), invalid]).await;

        assert!(result.is_err());
        assert!(repo.list_for_user(&user, &[]).await.expect("list").is_empty());
    }
}
