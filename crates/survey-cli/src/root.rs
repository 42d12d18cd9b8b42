use std::path::{Path, PathBuf};

use survey_core::paths::SURVEY_DIR;

/// Resolve the survey project directory.
///
/// Priority:
/// 1. `--root` flag / `SURVEY_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.survey/`
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_project_dir(&cwd).unwrap_or(cwd)
}

fn find_project_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(SURVEY_DIR).is_dir())
        .map(Path::to_path_buf)
}
