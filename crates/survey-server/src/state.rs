use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use survey_core::catalog::{CatalogLoad, LocationCatalog};
use survey_core::config::Config;
use survey_core::session::SessionStore;
use survey_core::store::SheetStore;
use survey_core::types::Variant;
use survey_core::validate::ValidationRules;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub title: String,
    pub variant: Variant,
    pub rules: ValidationRules,
    pub catalog: Arc<CatalogLoad>,
    pub store: Arc<dyn SheetStore>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl AppState {
    pub fn new(config: &Config, catalog: CatalogLoad, store: Box<dyn SheetStore>) -> Self {
        Self {
            title: config.form.title.clone(),
            variant: config.form.variant,
            rules: config.validation,
            catalog: Arc::new(catalog),
            store: Arc::from(store),
            sessions: Arc::new(Mutex::new(
                SessionStore::new(config.form.variant)
                    .with_limits(config.server.session_idle(), config.server.max_sessions),
            )),
        }
    }

    /// Load config, catalog and store for the project at `root`.
    ///
    /// The HTTP store builds a blocking client, so call this before entering
    /// the async runtime.
    pub fn load(root: &Path) -> survey_core::Result<Self> {
        let config = Config::load(root)?;
        for w in config.validate() {
            tracing::warn!(level = ?w.level, "{}", w.message);
        }
        let catalog = LocationCatalog::load_or_empty(&config.catalog_path(root));
        let store = config.open_store(root)?;
        tracing::info!(store = %store.describe(), variant = %config.form.variant, "survey state loaded");
        Ok(Self::new(&config, catalog, store))
    }

    pub fn sessions(&self) -> MutexGuard<'_, SessionStore> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::store::MemorySheet;

    #[test]
    fn new_state_uses_configured_variant() {
        let mut config = Config::new();
        config.form.variant = Variant::TwoPage;
        let state = AppState::new(
            &config,
            CatalogLoad {
                catalog: LocationCatalog::empty(),
                error: None,
            },
            Box::new(MemorySheet::new()),
        );
        assert_eq!(state.variant, Variant::TwoPage);
        assert_eq!(state.sessions().variant(), Variant::TwoPage);
        assert_eq!(state.store.describe(), "memory");
    }

    #[test]
    fn load_without_catalog_degrades() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = Config::new();
        config.store.backend = survey_core::config::StoreBackend::Memory;
        config.save(dir.path()).unwrap();

        let state = AppState::load(dir.path()).unwrap();
        assert!(state.catalog.catalog.is_empty());
        assert!(state.catalog.error.as_deref().unwrap().contains("was not found"));
    }
}
