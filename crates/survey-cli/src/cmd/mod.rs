pub mod catalog;
pub mod check;
pub mod flatten;
pub mod init;
pub mod phone;
pub mod serve;
pub mod submit;

use anyhow::Context;
use std::path::Path;
use survey_core::form::FormState;

/// Read a form saved as YAML. Relative paths are taken from the cwd, not
/// the project root, so tab completion works.
pub(crate) fn load_form(file: &Path) -> anyhow::Result<FormState> {
    let data = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    FormState::from_yaml(&data).with_context(|| format!("failed to parse {}", file.display()))
}
