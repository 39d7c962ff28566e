use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use appreel_core::{AppConfig, Catalogue, SceneKind};

mod commands;

#[derive(Parser)]
#[command(name = "appreel")]
#[command(author, version, about = "Scroll-driven app showcase for the terminal")]
struct Cli {
    /// Config file (default: ~/.config/appreel/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI
    Run {
        /// Scene to start in (carousel or slideshow)
        #[arg(short, long)]
        mode: Option<SceneKind>,
        /// Catalogue file (TOML or JSON) instead of the configured one
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
    /// Print the enter/hold/exit windows for a slide count
    Plan {
        /// Number of slides
        #[arg(short, long)]
        slides: usize,
        /// Fraction of each share spent fully visible
        #[arg(long)]
        hold: Option<f64>,
        /// Fraction of a share the exit runs into the next slide
        #[arg(long)]
        overlap: Option<f64>,
        /// Preset whose fractions fill in missing values
        #[arg(short, long, default_value = "slideshow")]
        mode: SceneKind,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print carousel ring placement for every item
    Layout {
        /// Number of items on the ring
        #[arg(short = 'n', long)]
        items: usize,
        /// Slot facing the viewer (fractional allowed)
        #[arg(short, long, default_value_t = 0.0)]
        reference: f64,
        /// Ring radius (default: carousel breakpoint for an 80-column terminal)
        #[arg(long)]
        radius: Option<f64>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect the catalogue
    Catalogue {
        #[command(subcommand)]
        action: CatalogueAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

#[derive(Subcommand)]
enum CatalogueAction {
    /// List apps and where each one links to
    List {
        /// Catalogue file (TOML or JSON) instead of the configured one
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let tui = matches!(cli.command, Some(Commands::Run { .. }) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run { mode, catalogue }) => {
            let catalogue = load_catalogue(&config, catalogue)?;
            commands::run::run(config, catalogue, mode)
        }
        None => {
            let catalogue = load_catalogue(&config, None)?;
            commands::run::run(config, catalogue, None)
        }
        Some(Commands::Plan {
            slides,
            hold,
            overlap,
            mode,
            json,
        }) => commands::plan::run(&config, slides, hold, overlap, mode, json),
        Some(Commands::Layout {
            items,
            reference,
            radius,
            json,
        }) => commands::layout::run(&config, items, reference, radius, json),
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init { force } => commands::config::init(&config_path, force),
            ConfigAction::Show => commands::config::show(&config, &config_path),
        },
        Some(Commands::Catalogue { action }) => match action {
            CatalogueAction::List { catalogue } => {
                let catalogue = load_catalogue(&config, catalogue)?;
                commands::catalogue::list(&config, &catalogue)
            }
        },
    }
}

/// Logs go to stderr, or to `<data_dir>/appreel.log` while the TUI owns the
/// terminal
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

/// Catalogue from `path`, the configured file, or the built-in one
fn load_catalogue(config: &AppConfig, path: Option<PathBuf>) -> Result<Catalogue> {
    match path.or_else(|| config.catalogue_path()) {
        Some(path) => Catalogue::load_from(&path)
            .with_context(|| format!("Failed to load catalogue from {}", path.display())),
        None => Ok(Catalogue::builtin()),
    }
}
