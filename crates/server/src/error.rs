use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use greenpath_core::{ApplicationError, InterfaceError};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    detail: String,
    correlation_id: &'a str,
}

/// Interface error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub InterfaceError);

impl ApiError {
    pub fn from_application(error: ApplicationError, correlation_id: &str) -> Self {
        Self(error.into_interface(correlation_id))
    }

    pub fn status_code(&self) -> StatusCode {
        match self.0 {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::NotFound { .. } => StatusCode::NOT_FOUND,
            InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self.0 {
            InterfaceError::BadRequest { message, .. }
            | InterfaceError::NotFound { message, .. } => message.clone(),
            // Backend detail stays in the logs.
            InterfaceError::ServiceUnavailable { message, .. }
            | InterfaceError::Internal { message, .. } => {
                warn!(
                    event_name = "system.http.request_failed",
                    correlation_id = self.0.correlation_id(),
                    status = status.as_u16(),
                    error = %message,
                    "request failed"
                );
                String::new()
            }
        };

        let body = ErrorBody {
            error: self.0.user_message(),
            detail,
            correlation_id: self.0.correlation_id(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use greenpath_core::{ApplicationError, DomainError, StoreError};

    use super::ApiError;

    #[test]
    fn application_errors_map_to_http_status() {
        let validation =
            ApplicationError::from(DomainError::validation("monthly_kwh", "is required"));
        assert_eq!(
            ApiError::from_application(validation, "c-1").status_code(),
            StatusCode::BAD_REQUEST
        );

        let missing = ApplicationError::from(StoreError::NotFound("implementation x".to_string()));
        assert_eq!(ApiError::from_application(missing, "c-2").status_code(), StatusCode::NOT_FOUND);

        let backend = ApplicationError::from(StoreError::Backend("disk full".to_string()));
        assert_eq!(
            ApiError::from_application(backend, "c-3").status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
