use clap::Subcommand;
use std::path::Path;
use survey_core::catalog::LocationCatalog;
use survey_core::config::Config;

use crate::output::{print_json, print_list};

#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// List every zone
    Zones,
    /// List the regions of a zone
    Regions {
        #[arg(long)]
        zone: String,
    },
    /// List the divisions of a region
    Divisions {
        #[arg(long)]
        region: String,
    },
}

pub fn run(root: &Path, subcommand: CatalogSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let load = LocationCatalog::load_or_empty(&config.catalog_path(root));
    let catalog = &load.catalog;

    let options = match &subcommand {
        CatalogSubcommand::Zones => catalog.zones(),
        CatalogSubcommand::Regions { zone } => catalog.regions(zone.trim()),
        CatalogSubcommand::Divisions { region } => catalog.divisions(region.trim()),
    };

    if json {
        return print_json(&serde_json::json!({
            "options": options,
            "error": load.error,
        }));
    }

    if let Some(message) = &load.error {
        eprintln!("warning: {message}");
    }
    if options.is_empty() && load.error.is_none() {
        match &subcommand {
            CatalogSubcommand::Zones => eprintln!("No zones in the catalog."),
            CatalogSubcommand::Regions { zone } => eprintln!("No regions for zone '{zone}'."),
            CatalogSubcommand::Divisions { region } => {
                eprintln!("No divisions for region '{region}'.")
            }
        }
    }
    print_list(&options);
    Ok(())
}
