use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use greenpath_core::{
    ApplicationError, CompletionOutcome, HybridOutcome, Implementation, ImplementationId,
    ImplementationService, ProfileInput, Recommendation, RecommendationId, RecommendationService,
    RecommendationTotals, RuleEngine, SimpleFootprint, UserId,
};
use greenpath_db::DbPool;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::health;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub engine: Arc<RuleEngine>,
    pub recommendations: Arc<RecommendationService>,
    pub implementations: Arc<ImplementationService>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/recommendations", post(rule_recommendations))
        .route("/users/{user_id}/recommendations", post(hybrid_recommendations))
        .route("/users/{user_id}/implementations", post(start_implementation))
        .route("/calculate-footprint", post(calculate_footprint))
        .route("/implementations/{implementation_id}/complete", post(complete_implementation))
        .route("/implementations/{implementation_id}/progress", post(record_progress))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(CORRELATION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("req-{}", uuid::Uuid::new_v4()))
}

#[derive(Debug, Serialize)]
pub struct RuleRecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    pub total_potential_savings: f64,
    pub total_co2_reduction: f64,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct HybridRecommendationsResponse {
    #[serde(flatten)]
    pub outcome: HybridOutcome,
    pub correlation_id: String,
    pub generated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct StartImplementationRequest {
    pub recommendation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress_percentage: f64,
}

/// Rule output only; nothing is persisted.
async fn rule_recommendations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Result<Json<RuleRecommendationsResponse>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let profile = input
        .validate()
        .map_err(|error| {
            ApiError::from_application(ApplicationError::from(error), &correlation_id)
        })?;

    let recommendations = state.engine.generate_or_fallback(&profile);
    let totals = RecommendationTotals::from_recommendations(&recommendations);
    info!(
        event_name = "recommendations.rules.generated",
        correlation_id = %correlation_id,
        count = recommendations.len(),
        "rule recommendations generated"
    );

    Ok(Json(RuleRecommendationsResponse {
        recommendations,
        total_potential_savings: totals.total_potential_savings,
        total_co2_reduction: totals.total_co2_reduction,
        generated_at: Utc::now().to_rfc3339(),
    }))
}

async fn hybrid_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Result<Json<HybridRecommendationsResponse>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let outcome = state
        .recommendations
        .generate(&UserId(user_id), input, &correlation_id)
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    Ok(Json(HybridRecommendationsResponse {
        outcome,
        correlation_id,
        generated_at: Utc::now().to_rfc3339(),
    }))
}

async fn calculate_footprint(
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Result<Json<SimpleFootprint>, ApiError> {
    let correlation_id = correlation_id(&headers);
    let profile = input
        .validate()
        .map_err(|error| {
            ApiError::from_application(ApplicationError::from(error), &correlation_id)
        })?;
    Ok(Json(SimpleFootprint::calculate(profile.monthly_kwh, profile.monthly_therms)))
}

/// Starts work on one of the user's stored recommendations.
async fn start_implementation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<StartImplementationRequest>,
) -> Result<(StatusCode, Json<Implementation>), ApiError> {
    let correlation_id = correlation_id(&headers);
    let user_id = UserId(user_id);
    let recommendation = state
        .recommendations
        .find_for_user(&user_id, &RecommendationId(request.recommendation_id))
        .await
        .map_err(|error| ApiError::from_application(error, &correlation_id))?;

    let id = ImplementationId(format!("impl-{}", uuid::Uuid::new_v4()));
    state
        .implementations
        .start(id, user_id, &recommendation, &correlation_id)
        .await
        .map(|implementation| (StatusCode::CREATED, Json(implementation)))
        .map_err(|error| ApiError::from_application(error, &correlation_id))
}

async fn complete_implementation(
    State(state): State<AppState>,
    Path(implementation_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CompletionOutcome>, ApiError> {
    let correlation_id = correlation_id(&headers);
    state
        .implementations
        .complete(&ImplementationId(implementation_id), &correlation_id)
        .await
        .map(Json)
        .map_err(|error| ApiError::from_application(error, &correlation_id))
}

async fn record_progress(
    State(state): State<AppState>,
    Path(implementation_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ProgressRequest>,
) -> Result<Json<Implementation>, ApiError> {
    let correlation_id = correlation_id(&headers);
    state
        .implementations
        .update_progress(
            &ImplementationId(implementation_id),
            request.progress_percentage,
            &correlation_id,
        )
        .await
        .map(Json)
        .map_err(|error| ApiError::from_application(error, &correlation_id))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use chrono::Utc;
    use greenpath_agent::DisabledAiSource;
    use greenpath_core::config::AppConfig;
    use greenpath_core::errors::AiSourceError;
    use greenpath_core::{
        AiRecommendation, AiRecommendationRequest, AiRecommendationSource, AiSourceStatus,
        GoalId, GoalStatus, GoalStore, Implementation, ImplementationId, ImplementationStatus,
        ImplementationStore, SustainabilityGoal, UserId,
    };
    use greenpath_db::{
        connect_with_settings, migrations, SqlGoalRepository, SqlImplementationRepository,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, AppState, CORRELATION_HEADER};
    use crate::bootstrap::build_state;

    struct LedAi;

    #[async_trait]
    impl AiRecommendationSource for LedAi {
        async fn recommend(
            &self,
            _request: &AiRecommendationRequest,
        ) -> Result<Vec<AiRecommendation>, AiSourceError> {
            Ok(vec![AiRecommendation {
                id: None,
                title: "led lighting retrofit".to_string(),
                description: "Tailored LED plan".to_string(),
                category: "Energy Efficiency".to_string(),
                estimated_cost_savings: 3_000.0,
                estimated_co2_reduction: 4.0,
                roi_months: 2,
                difficulty: "easy".to_string(),
                priority_score: 1.7,
                implementation_steps: vec!["Walk the floor".to_string()],
                reasoning: "Open-plan office lighting".to_string(),
            }])
        }

        fn status(&self) -> AiSourceStatus {
            AiSourceStatus {
                configured: true,
                provider: "test".to_string(),
                model: Some("led".to_string()),
            }
        }
    }

    async fn state_with(ai_source: Arc<dyn AiRecommendationSource>) -> AppState {
        let pool = connect_with_settings("sqlite::memory:", 1, 5).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        build_state(&AppConfig::default(), pool, ai_source)
    }

    pub(crate) async fn test_state() -> AppState {
        state_with(Arc::new(DisabledAiSource::new("openrouter"))).await
    }

    fn tech_profile() -> Value {
        json!({
            "business_name": "Northwind Analytics",
            "industry": "Technology",
            "company_size": "51-200 employees",
            "location": "Austin, Texas",
            "monthly_kwh": 8500,
            "monthly_therms": 0,
            "sustainability_goals": ["Reduce energy costs"]
        })
    }

    async fn send(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header(CORRELATION_HEADER, "test-correlation")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let payload = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, payload)
    }

    async fn seed_implementation(state: &AppState, id: &str, user_id: &str) {
        let now = Utc::now();
        SqlImplementationRepository::new(state.db_pool.clone())
            .save(&Implementation {
                id: ImplementationId(id.to_string()),
                user_id: UserId(user_id.to_string()),
                recommendation_id: None,
                category: "Energy Efficiency".to_string(),
                estimated_cost_savings: 2_400.0,
                estimated_co2_reduction: 1.5,
                status: ImplementationStatus::InProgress,
                progress_percentage: 40.0,
                started_at: now,
                updated_at: now,
                completed_at: None,
            })
            .await
            .expect("seed implementation");
    }

    #[tokio::test]
    async fn rule_endpoint_returns_scored_recommendations_with_totals() {
        let app = router(test_state().await);

        let (status, payload) = send(app, "/recommendations", tech_profile()).await;

        assert_eq!(status, StatusCode::OK);
        let recommendations = payload["recommendations"].as_array().expect("array");
        assert!(!recommendations.is_empty());
        let savings: f64 = recommendations
            .iter()
            .map(|rec| rec["estimated_cost_savings"].as_f64().expect("savings"))
            .sum();
        let total = payload["total_potential_savings"].as_f64().expect("total");
        assert!((savings - total).abs() < 1e-6);
    }

    #[tokio::test]
    async fn invalid_profile_is_a_bad_request_with_correlation_id() {
        let app = router(test_state().await);

        let (status, payload) = send(
            app,
            "/recommendations",
            json!({"industry": "Retail", "monthly_kwh": -1, "monthly_therms": 0}),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(payload["correlation_id"], "test-correlation");
        assert!(payload["detail"].as_str().unwrap_or_default().contains("monthly_kwh"));
    }

    #[tokio::test]
    async fn hybrid_endpoint_persists_and_suppresses_on_second_session() {
        let app = router(test_state().await);

        let (status, first) = send(app.clone(), "/users/u-1/recommendations", tech_profile()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["ai_available"], false);
        let first_count = first["recommendations"].as_array().expect("array").len();
        assert!(first_count > 0);

        let (status, second) = send(app, "/users/u-1/recommendations", tech_profile()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["suppressed"].as_u64(), Some(first_count as u64));
        assert!(second["recommendations"].as_array().expect("array").is_empty());
    }

    #[tokio::test]
    async fn ai_entry_replaces_rule_entry_with_same_title() {
        let app = router(state_with(Arc::new(LedAi)).await);

        let (status, payload) = send(app, "/users/u-2/recommendations", tech_profile()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["ai_available"], true);
        let leds = payload["recommendations"]
            .as_array()
            .expect("array")
            .iter()
            .filter(|rec| {
                let title = rec["title"].as_str().unwrap_or_default();
                title.eq_ignore_ascii_case("led lighting retrofit")
            })
            .collect::<Vec<_>>();
        assert_eq!(leds.len(), 1);
        assert_eq!(leds[0]["source"], "ai");
        assert_eq!(leds[0]["priority_score"].as_f64(), Some(1.0));
        assert_eq!(leds[0]["roi_months"].as_u64(), Some(6));
    }

    #[tokio::test]
    async fn footprint_uses_fixed_emission_factors() {
        let app = router(test_state().await);

        let (status, payload) = send(
            app,
            "/calculate-footprint",
            json!({"monthly_kwh": 8500, "monthly_therms": 100}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["monthly_co2_lbs"].as_f64(), Some(8_990.0));
        assert_eq!(payload["breakdown"]["gas_co2_lbs"].as_f64(), Some(1_170.0));
    }

    #[tokio::test]
    async fn completing_an_implementation_updates_matching_goals_once() {
        let state = test_state().await;
        let now = Utc::now();
        seed_implementation(&state, "impl-1", "u-3").await;
        let goals = SqlGoalRepository::new(state.db_pool.clone());
        goals
            .save_goal(&SustainabilityGoal {
                id: GoalId("goal-1".to_string()),
                user_id: UserId("u-3".to_string()),
                title: "Cut utility spend".to_string(),
                category: "cost_savings".to_string(),
                unit: "usd".to_string(),
                target_value: 5_000.0,
                current_value: 1_000.0,
                progress_percentage: 20.0,
                status: GoalStatus::Active,
                last_measured_at: None,
                updated_at: now,
            })
            .await
            .expect("seed goal");
        let app = router(state);

        let (status, payload) =
            send(app.clone(), "/implementations/impl-1/complete", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["implementation"]["status"], "completed");
        assert_eq!(payload["goal_impact"]["goals_updated"], 1);

        let (status, _) = send(app, "/implementations/impl-1/complete", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let stored = goals.list_active_for_user(&UserId("u-3".to_string())).await.expect("goals");
        assert_eq!(stored[0].current_value, 3_400.0);
    }

    #[tokio::test]
    async fn implementation_started_from_a_recommendation_moves_through_progress() {
        let app = router(test_state().await);
        let (_, session) = send(app.clone(), "/users/u-5/recommendations", tech_profile()).await;
        let recommendation_id = session["recommendations"][0]["id"].clone();

        let (status, started) = send(
            app.clone(),
            "/users/u-5/implementations",
            json!({"recommendation_id": recommendation_id}),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(started["status"], "started");
        assert_eq!(started["progress_percentage"].as_f64(), Some(5.0));
        assert_eq!(started["recommendation_id"], recommendation_id);

        let id = started["id"].as_str().expect("implementation id");
        let (status, progressed) = send(
            app.clone(),
            &format!("/implementations/{id}/progress"),
            json!({"progress_percentage": 40.0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(progressed["status"], "in-progress");

        let (status, _) = send(
            app,
            "/users/u-6/implementations",
            json!({"recommendation_id": recommendation_id}),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_implementation_is_not_found() {
        let app = router(test_state().await);

        let (status, payload) = send(app, "/implementations/missing/complete", json!({})).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(payload["error"], "The requested record does not exist.");
    }

    #[tokio::test]
    async fn progress_is_clamped_and_rejected_after_completion() {
        let state = test_state().await;
        seed_implementation(&state, "impl-2", "u-4").await;
        let app = router(state);

        let (status, payload) = send(
            app.clone(),
            "/implementations/impl-2/progress",
            json!({"progress_percentage": 99.0}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["progress_percentage"].as_f64(), Some(95.0));

        let (status, _) = send(app.clone(), "/implementations/impl-2/complete", json!({})).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            app,
            "/implementations/impl-2/progress",
            json!({"progress_percentage": 50.0}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
