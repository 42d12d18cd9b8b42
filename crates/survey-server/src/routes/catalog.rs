use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegionQuery {
    pub zone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DivisionQuery {
    pub region: Option<String>,
}

fn options(app: &AppState, options: Vec<String>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "options": options,
        "error": app.catalog.error,
    }))
}

/// GET /api/catalog/zones
pub async fn zones(State(app): State<AppState>) -> Json<serde_json::Value> {
    let zones = app.catalog.catalog.zones();
    options(&app, zones)
}

/// GET /api/catalog/regions?zone=: empty until a zone is chosen.
pub async fn regions(
    State(app): State<AppState>,
    Query(q): Query<RegionQuery>,
) -> Json<serde_json::Value> {
    let regions = q
        .zone
        .map(|z| app.catalog.catalog.regions(z.trim()))
        .unwrap_or_default();
    options(&app, regions)
}

/// GET /api/catalog/divisions?region=
pub async fn divisions(
    State(app): State<AppState>,
    Query(q): Query<DivisionQuery>,
) -> Json<serde_json::Value> {
    let divisions = q
        .region
        .map(|r| app.catalog.catalog.divisions(r.trim()))
        .unwrap_or_default();
    options(&app, divisions)
}
