use survey_core::validate::{validate_phone, PHONE_NOTICE};

use crate::output::print_json;

pub fn run(number: &str, json: bool) -> anyhow::Result<()> {
    let valid = validate_phone(number);
    if json {
        return print_json(&serde_json::json!({ "number": number, "valid": valid }));
    }
    if !valid {
        anyhow::bail!("{number}: {PHONE_NOTICE}");
    }
    println!("{number}: valid");
    Ok(())
}
