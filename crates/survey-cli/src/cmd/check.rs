use std::path::Path;
use survey_core::config::{Config, WarnLevel};

use crate::output::print_json;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let warnings = config.validate();
    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        for w in &warnings {
            eprintln!("{:?}: {}", w.level, w.message);
        }
        anyhow::bail!("configuration has errors");
    }

    let store = config.open_store(root)?;
    let checked = store.check();

    if json {
        print_json(&serde_json::json!({
            "store": store.describe(),
            "network": if checked.is_ok() { "active" } else { "unavailable" },
            "error": checked.as_ref().err().map(|e| e.to_string()),
            "warnings": warnings,
        }))?;
    } else {
        for w in &warnings {
            eprintln!("{:?}: {}", w.level, w.message);
        }
    }

    match checked {
        Ok(()) => {
            if !json {
                println!("Network Active! ({})", store.describe());
            }
            Ok(())
        }
        Err(e) => Err(anyhow::Error::new(e).context("Network connection issue detected")),
    }
}
