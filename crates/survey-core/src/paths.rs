use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const SURVEY_DIR: &str = ".survey";
pub const CONFIG_FILE: &str = ".survey/config.yaml";

pub const DEFAULT_CATALOG_FILE: &str = "zone - Original.csv";
pub const DEFAULT_CSV_STORE_FILE: &str = ".survey/submissions.csv";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn survey_dir(root: &Path) -> PathBuf {
    root.join(SURVEY_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path: absolute paths are kept, relative ones are
/// taken from the project root.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}
