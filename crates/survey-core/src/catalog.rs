//! Zone → region → division lookup table backing the cascading dropdowns.

use crate::error::{Result, SurveyError};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

pub const ZONE_COLUMN: &str = "ZONE";
pub const REGION_COLUMN: &str = "REGION";
pub const DIVISION_COLUMN: &str = "DIVISION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRow {
    pub zone: String,
    pub region: String,
    pub division: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationCatalog {
    rows: Vec<LocationRow>,
}

/// Result of loading the catalog at session start. A missing file still
/// yields a usable (empty) catalog so the form can render.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: LocationCatalog,
    pub error: Option<String>,
}

impl LocationCatalog {
    pub fn new(rows: Vec<LocationRow>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[LocationRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse CSV with ZONE, REGION and DIVISION columns. Header names are
    /// trimmed before lookup and may appear in any order.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| SurveyError::InvalidConfig(format!("catalog has no '{name}' column")))
        };
        let zone_idx = column(ZONE_COLUMN)?;
        let region_idx = column(REGION_COLUMN)?;
        let division_idx = column(DIVISION_COLUMN)?;

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
            rows.push(LocationRow {
                zone: cell(zone_idx),
                region: cell(region_idx),
                division: cell(division_idx),
            });
        }
        Ok(Self { rows })
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SurveyError::CatalogMissing(path.to_path_buf()));
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the catalog, degrading to an empty table plus a user-facing
    /// message when the file is absent or unreadable.
    pub fn load_or_empty(path: &Path) -> CatalogLoad {
        match Self::load(path) {
            Ok(catalog) => {
                tracing::debug!(rows = catalog.rows.len(), path = %path.display(), "loaded location catalog");
                CatalogLoad {
                    catalog,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "location catalog unavailable");
                let message = match e {
                    SurveyError::CatalogMissing(_) => format!(
                        "The location file was not found. Please make sure '{}' is in the correct directory.",
                        path.display()
                    ),
                    other => format!("The location file could not be read: {other}"),
                };
                CatalogLoad {
                    catalog: Self::empty(),
                    error: Some(message),
                }
            }
        }
    }

    pub fn zones(&self) -> Vec<String> {
        unique(self.rows.iter().map(|r| r.zone.as_str()))
    }

    pub fn regions(&self, zone: &str) -> Vec<String> {
        unique(
            self.rows
                .iter()
                .filter(|r| r.zone == zone)
                .map(|r| r.region.as_str()),
        )
    }

    pub fn divisions(&self, region: &str) -> Vec<String> {
        unique(
            self.rows
                .iter()
                .filter(|r| r.region == region)
                .map(|r| r.division.as_str()),
        )
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        self.rows.iter().any(|r| r.zone == zone)
    }

    pub fn has_region(&self, zone: &str, region: &str) -> bool {
        self.rows.iter().any(|r| r.zone == zone && r.region == region)
    }

    pub fn has_division(&self, region: &str, division: &str) -> bool {
        self.rows
            .iter()
            .any(|r| r.region == region && r.division == division)
    }
}

/// De-duplicate keeping first-appearance order, dropping blanks.
fn unique<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for v in values {
        if !v.is_empty() && !out.iter().any(|o| o == v) {
            out.push(v.to_string());
        }
    }
    out
}
