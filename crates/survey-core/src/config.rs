use crate::error::Result;
use crate::paths;
use crate::remote::{HttpSheet, HttpSheetOptions};
use crate::store::{CsvSheet, MemorySheet, SheetStore};
use crate::types::Variant;
use crate::validate::ValidationRules;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// FormConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Heading shown above every page.
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_title() -> String {
    "Deeper Life Basic Schools".to_string()
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            title: default_title(),
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_CATALOG_FILE)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Hosted spreadsheet service over HTTPS.
    #[default]
    Http,
    /// Local CSV file, for offline use.
    Csv,
    /// Process memory; rows vanish on exit.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Spreadsheet document name, resolved to an id on first use.
    #[serde(default = "default_document")]
    pub document: String,
    /// Worksheet (tab) inside the document.
    #[serde(default = "default_sheet")]
    pub sheet: String,
    /// Skip the name lookup when the document id is already known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_drive_base")]
    pub drive_base: String,
    /// Environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

fn default_document() -> String {
    "DL Schools".to_string()
}

fn default_sheet() -> String {
    "DL".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_drive_base() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_token_env() -> String {
    "SURVEY_SHEETS_TOKEN".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_csv_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_CSV_STORE_FILE)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            document: default_document(),
            sheet: default_sheet(),
            document_id: None,
            api_base: default_api_base(),
            drive_base: default_drive_base(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout(),
            csv_path: default_csv_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Sessions untouched for this long are dropped.
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,
    /// Upper bound on live sessions; the least recently used goes first.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_port() -> u16 {
    8501
}

fn default_session_idle_minutes() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            session_idle_minutes: default_session_idle_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

impl ServerConfig {
    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_minutes.saturating_mul(60))
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub validation: ValidationRules,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            version: 1,
            form: FormConfig::default(),
            catalog: CatalogConfig::default(),
            store: StoreConfig::default(),
            validation: ValidationRules::default(),
            server: ServerConfig::default(),
        }
    }

    /// Load `.survey/config.yaml`, or the defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::new());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.catalog.path)
    }

    /// Build the configured sheet store. The HTTP backend reads its token
    /// from the environment here; a missing token is reported by the store's
    /// own calls, so the form can still be served with a connectivity warning.
    pub fn open_store(&self, root: &Path) -> Result<Box<dyn SheetStore>> {
        match self.store.backend {
            StoreBackend::Memory => Ok(Box::new(MemorySheet::new())),
            StoreBackend::Csv => Ok(Box::new(CsvSheet::new(paths::resolve(
                root,
                &self.store.csv_path,
            )))),
            StoreBackend::Http => {
                let token = std::env::var(&self.store.token_env).ok();
                if token.is_none() {
                    tracing::warn!(
                        "environment variable {} is not set; the sheet store will refuse requests",
                        self.store.token_env
                    );
                }
                let sheet = HttpSheet::new(HttpSheetOptions {
                    api_base: self.store.api_base.clone(),
                    drive_base: self.store.drive_base.clone(),
                    document: self.store.document.clone(),
                    document_id: self.store.document_id.clone(),
                    sheet: self.store.sheet.clone(),
                    token,
                    token_source: format!("environment variable {}", self.store.token_env),
                    timeout: Duration::from_secs(self.store.timeout_seconds),
                })?;
                Ok(Box::new(sheet))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.store.sheet.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "store.sheet must name a worksheet".to_string(),
            });
        }

        if self.store.backend == StoreBackend::Http
            && self.store.document.trim().is_empty()
            && self.store.document_id.is_none()
        {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "store.document or store.document_id is required for the http backend"
                    .to_string(),
            });
        }

        if self.store.backend == StoreBackend::Memory {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "store.backend is 'memory': submissions are lost on exit".to_string(),
            });
        }

        if self.store.timeout_seconds == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "store.timeout_seconds=0 disables the request timeout".to_string(),
            });
        }

        if self.validation.allow_zero_financial {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "validation.allow_zero_financial is on: unfilled fees and salaries \
                          will be recorded as 0"
                    .to_string(),
            });
        }

        if self.server.max_sessions == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "server.max_sessions must be at least 1".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurveyError;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::new();
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.store.document, "DL Schools");
        assert_eq!(parsed.store.sheet, "DL");
        assert_eq!(parsed.form.variant, Variant::ThreePage);
    }

    #[test]
    fn sparse_yaml_fills_defaults() {
        let yaml = "form:\n  variant: two_page\nstore:\n  backend: csv\nvalidation:\n  allow_zero_financial: true\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.form.variant, Variant::TwoPage);
        assert_eq!(cfg.form.title, "Deeper Life Basic Schools");
        assert_eq!(cfg.store.backend, StoreBackend::Csv);
        assert_eq!(cfg.store.token_env, "SURVEY_SHEETS_TOKEN");
        assert!(cfg.validation.allow_zero_financial);
        assert_eq!(cfg.server.port, 8501);
    }

    #[test]
    fn load_missing_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.catalog.path, PathBuf::from("zone - Original.csv"));
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new();
        cfg.store.backend = StoreBackend::Memory;
        cfg.server.port = 9000;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.store.backend, StoreBackend::Memory);
        assert_eq!(loaded.server.port, 9000);
    }

    #[test]
    fn validate_default_config_no_warnings() {
        assert!(Config::new().validate().is_empty());
    }

    #[test]
    fn validate_memory_backend_warns() {
        let mut cfg = Config::new();
        cfg.store.backend = StoreBackend::Memory;
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Warning && w.message.contains("lost on exit")));
    }

    #[test]
    fn validate_empty_sheet_is_error() {
        let mut cfg = Config::new();
        cfg.store.sheet = " ".to_string();
        let warnings = cfg.validate();
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
    }

    #[test]
    fn open_store_csv_resolves_relative_path() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::new();
        cfg.store.backend = StoreBackend::Csv;
        let store = cfg.open_store(dir.path()).unwrap();
        assert!(store.describe().ends_with("submissions.csv"));
    }

    #[test]
    fn open_store_http_without_token_defers_auth_failure() {
        let mut cfg = Config::new();
        cfg.store.token_env = "SURVEY_TEST_TOKEN_THAT_IS_NEVER_SET".to_string();
        let store = cfg.open_store(Path::new(".")).unwrap();
        let err = store.check().unwrap_err();
        assert!(matches!(
            err,
            SurveyError::AuthFailure(ref m) if m.contains("SURVEY_TEST_TOKEN_THAT_IS_NEVER_SET")
        ));
    }

    #[test]
    fn document_name_is_not_checked_for_phone_numbers() {
        let mut cfg = Config::new();
        cfg.store.document = "0551234567".to_string();
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn session_limits_default_and_validate() {
        let mut cfg = Config::new();
        assert_eq!(cfg.server.session_idle(), Duration::from_secs(3600));
        assert_eq!(cfg.server.max_sessions, 1000);
        cfg.server.max_sessions = 0;
        assert!(cfg
            .validate()
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("max_sessions")));
    }
}
