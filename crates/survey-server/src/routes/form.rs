use axum::extract::State;
use axum::Json;

use survey_core::types::{ClassLevel, StaffKind, MAX_COMMITTEE, MAX_STAFF};

use crate::state::AppState;

/// GET /api/form: page layout and fixed option lists for rendering.
pub async fn describe_form(State(app): State<AppState>) -> Json<serde_json::Value> {
    let pages: Vec<serde_json::Value> = app
        .variant
        .pages()
        .iter()
        .enumerate()
        .map(|(i, sections)| {
            serde_json::json!({
                "page": i + 1,
                "sections": sections,
            })
        })
        .collect();
    let levels: Vec<&str> = ClassLevel::all().iter().map(|l| l.label()).collect();

    Json(serde_json::json!({
        "title": app.title,
        "variant": app.variant,
        "pages": pages,
        "class_levels": levels,
        "education": {
            "teaching": StaffKind::Teaching.education_options(),
            "non_teaching": StaffKind::NonTeaching.education_options(),
        },
        "limits": {
            "staff": MAX_STAFF,
            "committee": MAX_COMMITTEE,
        },
        "validation": app.rules,
    }))
}
