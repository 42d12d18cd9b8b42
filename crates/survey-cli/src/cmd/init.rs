use anyhow::Context;
use std::path::Path;
use survey_core::config::Config;
use survey_core::form::FormState;
use survey_core::{io, paths};

pub const EXAMPLE_FORM_FILE: &str = ".survey/form.example.yaml";

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing survey project in: {}", root.display());

    let dir = paths::survey_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        Config::new()
            .save(root)
            .context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let example = serde_yaml::to_string(&FormState::default())?;
    if io::write_if_missing(&root.join(EXAMPLE_FORM_FILE), example.as_bytes())? {
        println!("  created: {EXAMPLE_FORM_FILE}");
    } else {
        println!("  exists:  {EXAMPLE_FORM_FILE}");
    }

    let config = Config::load(root)?;
    let catalog = config.catalog_path(root);
    if !catalog.exists() {
        println!(
            "\nLocation catalog not found at {}.\nAdd a CSV with ZONE, REGION and DIVISION columns there, or set catalog.path.",
            catalog.display()
        );
    }
    Ok(())
}
