//! Learnstyle Service - Learning-style persona resolution API
//!
//! This is the main entry point for the service binary. The service loads
//! the artifacts produced by the offline clustering pipeline (cluster
//! assignments plus opaque model/scaler blobs) once at startup, then
//! serves `user_id → persona` lookups over HTTP.

mod artifacts;
mod catalog;
mod cli;
mod config;
mod error;
mod logging;
mod resolver;
mod server;
mod version;

use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use crate::artifacts::ArtifactStore;
use crate::catalog::PersonaCatalog;
use crate::cli::{ArtifactsSubcommand, Cli, Commands};
use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::resolver::{ArtifactState, Resolver};

fn main() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    // For commands that don't need full logging, use simple setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            // Config commands use minimal logging
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Resolve { user_id, config } => {
            logging::init_simple(if cli.verbose > 0 {
                tracing::Level::DEBUG
            } else {
                tracing::Level::WARN
            })?;
            return run_resolve(*user_id, config.as_deref());
        }
        Commands::Artifacts { subcommand } => {
            logging::init_simple(if cli.verbose > 0 {
                tracing::Level::DEBUG
            } else {
                tracing::Level::WARN
            })?;
            let ArtifactsSubcommand::Validate { config } = subcommand.clone();
            return run_artifacts_validate(config.as_deref());
        }
        _ => {}
    }

    // Load configuration for the run command
    let config_path = match &cli.command {
        Commands::Run { config } => config.clone(),
        _ => None,
    };

    // Load config (or use defaults)
    let config = match ServiceConfig::load(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Use formatted error for terminal
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    // Initialize logging with config settings
    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    // Log version info at startup
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting learnstyle service"
    );

    match cli.command {
        Commands::Run { .. } => run_server(config),
        Commands::Version
        | Commands::Config { .. }
        | Commands::Resolve { .. }
        | Commands::Artifacts { .. } => {
            // Already handled above
            unreachable!();
        }
    }
}

/// Run the API server
fn run_server(config: ServiceConfig) -> Result<()> {
    info!(
        bind_addr = %config.server.bind_addr,
        assignments = %config.artifacts.assignments_path,
        model = %config.artifacts.model_path,
        scaler = %config.artifacts.scaler_path,
        "Configuration loaded"
    );

    // Build and run the tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(
            if config.server.worker_threads > 0 {
                config.server.worker_threads as usize
            } else {
                num_cpus::get().min(8)
            }
        )
        .thread_name("learnstyle-service")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async_server_main(config))
}

/// Async server main: load artifacts, then serve until shutdown.
async fn async_server_main(config: ServiceConfig) -> Result<()> {
    // The catalog is static configuration; a broken override file is a
    // startup failure, unlike the pipeline artifacts below.
    let catalog = load_catalog(&config)?;
    info!(personas = catalog.len(), "Persona catalog loaded");

    // Artifact loading happens exactly once, before any request is
    // accepted. A failure degrades the service instead of crashing it:
    // every request is answered with a server fault until the process is
    // restarted with corrected artifacts.
    let state = match ArtifactStore::load(&config.artifacts) {
        Ok(store) => {
            let missing = catalog.uncovered(store.assignments().clusters());
            if !missing.is_empty() {
                warn!(
                    clusters = ?missing,
                    "Assignment table contains clusters with no persona definition; \
                     affected users will resolve to a server fault"
                );
            }
            ArtifactState::Ready(store)
        }
        Err(e) => {
            error!(
                error = %e.format_for_log(),
                "Artifact load failed; starting degraded"
            );
            ArtifactState::Unavailable {
                reason: e.format_for_log(),
            }
        }
    };

    let resolver = Arc::new(Resolver::new(state, catalog));
    server::serve(&config, resolver).await
}

/// Load the persona catalog, bundled or from the configured override.
fn load_catalog(config: &ServiceConfig) -> Result<PersonaCatalog> {
    match &config.artifacts.catalog_path {
        Some(path) => PersonaCatalog::from_path(std::path::Path::new(path)),
        None => Ok(PersonaCatalog::bundled()),
    }
}

/// One-shot resolution from the command line
fn run_resolve(user_id: i64, config_path: Option<&str>) -> Result<()> {
    let config = load_config_or_exit(config_path);

    let resolver = match build_resolver(&config) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    match resolver.resolve(user_id) {
        Ok(persona) => {
            println!("{}", serde_json::to_string_pretty(&persona)
                .map_err(|e| Error::Internal(format!("Failed to serialize result: {}", e)))?);
            Ok(())
        }
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    }
}

/// Load artifacts and catalog, checking that they are mutually consistent
fn run_artifacts_validate(config_path: Option<&str>) -> Result<()> {
    let config = load_config_or_exit(config_path);

    let catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    let store = match ArtifactStore::load(&config.artifacts) {
        Ok(store) => store,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    };

    let mut distinct: Vec<u32> = store.assignments().clusters().collect();
    distinct.sort_unstable();
    distinct.dedup();

    println!("Artifacts:");
    println!("  Clustered users:  {}", store.assignments().len());
    println!("  Distinct clusters: {}", distinct.len());
    println!("  Personas defined:  {}", catalog.len());
    println!("  Model:   {} bytes, sha256 {}", store.model().len(), store.model().fingerprint());
    println!("  Scaler:  {} bytes, sha256 {}", store.scaler().len(), store.scaler().fingerprint());

    let missing = catalog.uncovered(store.assignments().clusters());
    if !missing.is_empty() {
        let e = Error::CatalogInconsistency {
            cluster_id: missing[0],
        };
        eprintln!(
            "Clusters without a persona definition: {:?}",
            missing
        );
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }

    println!("Artifacts are valid and consistent with the persona catalog.");
    Ok(())
}

/// Build a resolver for one-shot commands; artifact failures are returned
/// rather than degraded since there is no server to keep alive.
fn build_resolver(config: &ServiceConfig) -> Result<Resolver> {
    let catalog = load_catalog(config)?;
    let store = ArtifactStore::load(&config.artifacts)?;
    Ok(Resolver::new(ArtifactState::Ready(store), catalog))
}

/// Load configuration, printing and exiting on failure
fn load_config_or_exit(config_path: Option<&str>) -> ServiceConfig {
    match ServiceConfig::load(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprint!("{}", e.format_for_terminal());
            std::process::exit(e.exit_code());
        }
    }
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: cli::ConfigSubcommand) -> Result<()> {
    use cli::ConfigSubcommand;

    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = ServiceConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            config::init_config(path.as_deref(), force)?;
        }
        ConfigSubcommand::Validate { config } => {
            let path = config.as_deref();
            match ServiceConfig::load(path) {
                Ok(_) => {
                    println!("Configuration is valid.");
                }
                Err(e) => {
                    eprint!("{}", e.format_for_terminal());
                    std::process::exit(e.exit_code());
                }
            }
        }
    }

    Ok(())
}
