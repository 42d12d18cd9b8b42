mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::catalog::CatalogSubcommand;
use std::path::PathBuf;
use survey_core::types::Variant;

#[derive(Parser)]
#[command(
    name = "survey",
    about = "School survey form: location catalog, validation, and submission to the survey sheet",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project directory (defaults to the nearest parent containing .survey/)
    #[arg(long, global = true, env = "SURVEY_ROOT")]
    root: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .survey/config.yaml and an example form file
    Init,

    /// Serve the JSON API for form sessions
    Serve {
        /// Port to listen on (defaults to server.port in config)
        #[arg(long)]
        port: Option<u16>,

        /// Open the form description in a browser
        #[arg(long)]
        open: bool,
    },

    /// Query the zone / region / division catalog
    Catalog {
        #[command(subcommand)]
        subcommand: CatalogSubcommand,
    },

    /// Check that the configured sheet store is reachable
    Check,

    /// Check that a phone number is exactly ten digits
    ValidatePhone { number: String },

    /// Print the row a form file would be submitted as
    Flatten {
        file: PathBuf,

        /// Override form.variant from config
        #[arg(long)]
        variant: Option<Variant>,
    },

    /// Validate a form file and append it to the sheet store
    Submit {
        file: PathBuf,

        /// Override form.variant from config
        #[arg(long)]
        variant: Option<Variant>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Serve { port, open } => cmd::serve::run(&root, port, open),
        Commands::Catalog { subcommand } => cmd::catalog::run(&root, subcommand, cli.json),
        Commands::Check => cmd::check::run(&root, cli.json),
        Commands::ValidatePhone { number } => cmd::phone::run(&number, cli.json),
        Commands::Flatten { file, variant } => cmd::flatten::run(&root, &file, variant, cli.json),
        Commands::Submit { file, variant } => cmd::submit::run(&root, &file, variant, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
