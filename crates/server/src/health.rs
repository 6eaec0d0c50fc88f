use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use greenpath_core::AiSourceStatus;
use greenpath_db::DbPool;
use serde::Serialize;

use crate::routes::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    Degraded,
    /// Optional component switched off by configuration.
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComponentCheck {
    pub name: &'static str,
    pub readiness: Readiness,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealthReport {
    pub readiness: Readiness,
    pub version: &'static str,
    pub rule_count: usize,
    pub checks: Vec<ComponentCheck>,
    pub ai: AiSourceStatus,
    pub checked_at: String,
}

/// Degraded only when the database is unreachable; a missing AI source is reported, not fatal.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let database = check_database(&state.db_pool).await;
    let ai = state.recommendations.ai_source().status();
    let ai_check = ComponentCheck {
        name: "ai_source",
        readiness: if ai.configured { Readiness::Ready } else { Readiness::Disabled },
        detail: match &ai.model {
            Some(model) => format!("{} / {model}", ai.provider),
            None => format!("{} not configured; rule output only", ai.provider),
        },
    };

    let readiness = database.readiness;
    let report = HealthReport {
        readiness,
        version: env!("CARGO_PKG_VERSION"),
        rule_count: state.engine.catalog().len(),
        checks: vec![database, ai_check],
        ai,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = match readiness {
        Readiness::Ready => StatusCode::OK,
        _ => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(report))
}

async fn check_database(pool: &DbPool) -> ComponentCheck {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recommendation")
        .fetch_one(pool)
        .await;
    let (readiness, detail) = match count {
        Ok(rows) => (Readiness::Ready, format!("{rows} stored recommendations")),
        Err(error) => (Readiness::Degraded, format!("database query failed: {error}")),
    };
    ComponentCheck { name: "database", readiness, detail }
}

#[cfg(test)]
mod tests {
    use axum::{extract::State, http::StatusCode, Json};

    use super::{health, Readiness};
    use crate::routes::tests::test_state;

    #[tokio::test]
    async fn ready_with_ai_disabled() {
        let state = test_state().await;

        let (status, Json(report)) = health(State(state.clone())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.readiness, Readiness::Ready);
        assert!(report.rule_count > 0);
        let ai = report.checks.iter().find(|check| check.name == "ai_source").expect("ai check");
        assert_eq!(ai.readiness, Readiness::Disabled);

        state.db_pool.close().await;
    }

    #[tokio::test]
    async fn closed_pool_is_service_unavailable() {
        let state = test_state().await;
        state.db_pool.close().await;

        let (status, Json(report)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.readiness, Readiness::Degraded);
        assert_eq!(report.checks[0].readiness, Readiness::Degraded);
    }
}
