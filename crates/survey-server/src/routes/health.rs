use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/health: can the sheet store be reached?
///
/// A store failure is reported as 503 with a warning rather than as an
/// error, so the form can keep rendering with a banner.
pub async fn health(
    State(app): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let store = app.store.clone();
    let (described, checked) = tokio::task::spawn_blocking(move || (store.describe(), store.check()))
        .await
        .map_err(AppError::join)?;

    match checked {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "network": "active",
                "message": "Network Active!",
                "store": described,
            })),
        )),
        Err(e) if e.is_remote() => {
            tracing::warn!(store = %described, error = %e, "store unreachable");
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "network": "unavailable",
                    "warning": "Network connection issue detected",
                    "error": e.to_string(),
                    "store": described,
                })),
            ))
        }
        Err(e) => Err(e.into()),
    }
}
