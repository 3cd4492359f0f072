//! Binary entry point for vehiclestore.
//!
//! This binary provides the CLI interface for the vehicle repository.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vehiclestore::cli::{self, CommandStatus, CreateArgs};
use vehiclestore::config::CONFIG_PATH_ENV;
use vehiclestore::observability::{self, LoggingConfig};
use vehiclestore::VehicleStoreConfig;

/// Vehiclestore - a file-backed vehicle catalogue.
#[derive(Parser)]
#[command(name = "vehiclestore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the store document (overrides configuration).
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Create an empty store document if none exists.
    Init,

    /// List all vehicles.
    List,

    /// Show one vehicle.
    Get {
        /// Vehicle id.
        id: String,
    },

    /// List vehicles in a category.
    Category {
        /// Category name (exact match).
        category: String,
    },

    /// Add a vehicle.
    Create(CreateArgs),

    /// Merge a JSON object into a vehicle.
    Update {
        /// Vehicle id.
        id: String,

        /// Fields to change, e.g. '{"active": false}'. `null` clears an optional field.
        patch: String,
    },

    /// Remove a vehicle.
    Delete {
        /// Vehicle id.
        id: String,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            return ExitCode::FAILURE;
        },
    };
    let config = match cli.store {
        Some(path) => config.with_store_path(path),
        None => config,
    };

    let logging = LoggingConfig::from_settings(Some(&config.logging), cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize observability: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli.command, &config) {
        Ok(CommandStatus::Success) => ExitCode::SUCCESS,
        Ok(CommandStatus::NotFound(id)) => {
            eprintln!("Vehicle {id} not found");
            ExitCode::FAILURE
        },
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
fn run_command(command: Commands, config: &VehicleStoreConfig) -> anyhow::Result<CommandStatus> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let store = config.store_path.display();

    let repo = cli::open_repository(config);
    let status = match command {
        Commands::Init => {
            cli::cmd_init(config, &mut out).with_context(|| format!("initializing store {store}"))?
        },
        Commands::List => {
            cli::cmd_list(&repo, &mut out).with_context(|| format!("listing vehicles in {store}"))?
        },
        Commands::Get { id } => cli::cmd_get(&repo, &id, &mut out)
            .with_context(|| format!("reading vehicle {id} from {store}"))?,
        Commands::Category { category } => cli::cmd_category(&repo, &category, &mut out)
            .with_context(|| format!("listing category {category} in {store}"))?,
        Commands::Create(args) => cli::cmd_create(&repo, args, &mut out)
            .with_context(|| format!("creating vehicle in {store}"))?,
        Commands::Update { id, patch } => cli::cmd_update(&repo, &id, &patch, &mut out)
            .with_context(|| format!("updating vehicle {id} in {store}"))?,
        Commands::Delete { id } => cli::cmd_delete(&repo, &id, &mut out)
            .with_context(|| format!("deleting vehicle {id} from {store}"))?,
    };

    Ok(status)
}

/// Loads configuration and applies environment overrides.
fn load_config(path: Option<&Path>) -> anyhow::Result<VehicleStoreConfig> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return VehicleStoreConfig::load_from_file(config_path)
            .map(VehicleStoreConfig::with_env_overrides)
            .with_context(|| format!("loading {}", config_path.display()));
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        if !config_path.trim().is_empty() {
            return VehicleStoreConfig::load_from_file(Path::new(config_path.trim()))
                .map(VehicleStoreConfig::with_env_overrides)
                .with_context(|| format!("loading {config_path} from {CONFIG_PATH_ENV}"));
        }
    }

    // Otherwise, load from default location
    VehicleStoreConfig::load_default()
        .map(VehicleStoreConfig::with_env_overrides)
        .context("loading default configuration")
}
