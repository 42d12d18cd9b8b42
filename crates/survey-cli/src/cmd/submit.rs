use anyhow::Context;
use std::path::Path;
use survey_core::config::Config;
use survey_core::submit::submit;
use survey_core::types::Variant;
use survey_core::SurveyError;

use crate::output::print_json;

pub fn run(root: &Path, file: &Path, variant: Option<Variant>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let variant = variant.unwrap_or(config.form.variant);
    let form = super::load_form(file)?;
    let store = config.open_store(root)?;

    let receipt = match submit(
        &form,
        variant,
        &config.validation,
        store.as_ref(),
        chrono::Utc::now(),
    ) {
        Ok(receipt) => receipt,
        Err(SurveyError::Validation(failure)) => {
            for issue in &failure.issues {
                eprintln!("  {issue}");
            }
            anyhow::bail!(
                "{} not submitted: {} problem(s) found",
                file.display(),
                failure.issues.len()
            );
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to submit to {}", store.describe()));
        }
    };

    if json {
        return print_json(&receipt);
    }
    if receipt.header_written {
        println!("Wrote header row ({} columns).", receipt.columns);
    }
    println!(
        "Submitted {} to {} at {}.",
        form.school_info.school_name.trim(),
        receipt.store,
        receipt.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
