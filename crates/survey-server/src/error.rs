use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use survey_core::error::SurveyError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn join(err: tokio::task::JoinError) -> Self {
        Self(anyhow::anyhow!("task join error: {err}"))
    }
}

fn status_for(err: &SurveyError) -> StatusCode {
    match err {
        SurveyError::Validation(_) | SurveyError::InvalidEvent { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        SurveyError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        SurveyError::HeaderMismatch { .. } => StatusCode::CONFLICT,
        SurveyError::NetworkFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        SurveyError::MissingResource(_)
        | SurveyError::AuthFailure(_)
        | SurveyError::Remote { .. } => StatusCode::BAD_GATEWAY,
        SurveyError::CatalogMissing(_)
        | SurveyError::InvalidConfig(_)
        | SurveyError::Io(_)
        | SurveyError::Yaml(_)
        | SurveyError::Json(_)
        | SurveyError::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Some(err) = self.0.downcast_ref::<SurveyError>() else {
            tracing::error!(error = %self.0, "request failed");
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response();
        };

        let status = status_for(err);
        if status.is_server_error() {
            tracing::warn!(%status, error = %err, "request failed");
        }

        let body = match err {
            SurveyError::Validation(failure) => serde_json::json!({
                "error": err.to_string(),
                "issues": failure.issues,
            }),
            _ => serde_json::json!({ "error": err.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
