use std::path::Path;
use survey_core::config::Config;
use survey_core::flatten::flatten;
use survey_core::types::Variant;

use crate::output::{print_json, print_table};

pub fn run(root: &Path, file: &Path, variant: Option<Variant>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let variant = variant.unwrap_or(config.form.variant);
    let form = super::load_form(file)?;

    let row = flatten(&form, variant, chrono::Utc::now());

    if json {
        let columns: Vec<serde_json::Value> = row
            .iter()
            .map(|(column, value)| serde_json::json!({ "column": column, "value": value }))
            .collect();
        return print_json(&serde_json::json!({
            "variant": variant,
            "columns": columns,
        }));
    }

    let rows: Vec<Vec<String>> = row
        .iter()
        .map(|(column, value)| vec![column.to_string(), value.to_string()])
        .collect();
    print_table(&["COLUMN", "VALUE"], &rows);
    Ok(())
}
