use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use survey_core::wizard::{self, Env, Event, Outcome};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/sessions: start a new form session.
pub async fn create_session(
    State(app): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let session = app.sessions().create();
    let state = session.snapshot()?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": session.id(),
            "state": state,
        })),
    ))
}

/// GET /api/sessions/:id
pub async fn get_session(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = app.sessions().get(&id)?;
    // Waits for any event in flight on this session.
    let state = tokio::task::spawn_blocking(move || session.snapshot())
        .await
        .map_err(AppError::join)??;
    Ok(Json(serde_json::json!({
        "id": id,
        "state": state,
    })))
}

/// DELETE /api/sessions/:id: abandon a session and its entered data.
pub async fn delete_session(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    app.sessions().remove(&id)?;
    tracing::debug!(%id, "session abandoned");
    Ok(Json(serde_json::json!({ "deleted": id })))
}

/// POST /api/sessions/:id/events: apply one wizard event.
///
/// Unknown ids start a fresh session. Events on one session apply in
/// arrival order under the session's own lock, which is held while the
/// store is consulted. A failed call leaves the session as it was, and a
/// successful submit ends the session.
pub async fn apply_event(
    State(app): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<Event>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = app.sessions().get_or_init(id);

    let worker = app.clone();
    let target = Arc::clone(&session);
    let step = tokio::task::spawn_blocking(move || {
        target.apply(|current| {
            let env = Env {
                catalog: &worker.catalog.catalog,
                store: worker.store.as_ref(),
                rules: worker.rules,
                now: chrono::Utc::now(),
            };
            wizard::transition(current, event, &env)
        })
    })
    .await
    .map_err(AppError::join)??;

    if matches!(step.outcome, Outcome::Submitted { .. }) {
        app.sessions().discard(&session);
    }
    Ok(Json(serde_json::json!({
        "id": id,
        "outcome": step.outcome,
        "state": step.state,
    })))
}
