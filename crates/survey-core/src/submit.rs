use crate::error::{Result, SurveyError};
use crate::flatten::{flatten, SubmissionRow};
use crate::form::FormState;
use crate::store::{Cell, SheetStore};
use crate::types::Variant;
use crate::validate::{validate_for_submit, ValidationRules};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReceipt {
    /// True when this submission created the sheet's header row.
    pub header_written: bool,
    pub columns: usize,
    pub submitted_at: DateTime<Utc>,
    pub store: String,
}

/// Validate, flatten and append one submission.
///
/// Every validator for `variant` runs again first, including the duplicate
/// lookup. An empty sheet gets a header row from the flattened keys. A sheet
/// that already has a header must agree on the shared leading columns or the
/// write is refused; the variant-specific tail is not checked because its
/// length follows the roster sizes.
pub fn submit(
    form: &FormState,
    variant: Variant,
    rules: &ValidationRules,
    store: &dyn SheetStore,
    now: DateTime<Utc>,
) -> Result<SubmissionReceipt> {
    validate_for_submit(form, variant, rules, store)?;

    let row = flatten(form, variant, now);
    let existing = store.read_all_values()?;
    let header_written = match existing.first() {
        Some(header) if header.iter().any(|h| !h.trim().is_empty()) => {
            check_header(header, &row)?;
            false
        }
        _ => {
            let header: Vec<Cell> = row.keys().into_iter().map(Cell::text).collect();
            store.append_row(&header)?;
            tracing::info!(store = %store.describe(), columns = header.len(), "wrote header row");
            true
        }
    };

    store.append_row(&row.values())?;
    tracing::info!(
        store = %store.describe(),
        variant = %variant,
        school = %form.school_info.school_name.trim(),
        "submission appended"
    );

    Ok(SubmissionReceipt {
        header_written,
        columns: row.len(),
        submitted_at: now,
        store: store.describe(),
    })
}

fn check_header(header: &[String], row: &SubmissionRow) -> Result<()> {
    let keys = row.keys();
    for (i, expected) in keys.iter().take(row.fixed_column_count()).enumerate() {
        let found = header.get(i).map(|h| h.trim()).unwrap_or("");
        if found != *expected {
            tracing::warn!(column = i + 1, expected = %expected, found = %found, "sheet header mismatch");
            return Err(SurveyError::HeaderMismatch {
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }
    }
    Ok(())
}
