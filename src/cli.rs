//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the learnstyle service.

use clap::{Parser, Subcommand};

/// Learnstyle Service - Learning-style persona resolution API
///
/// Loads the cluster assignments produced by the offline clustering
/// pipeline and serves persona lookups by user id over HTTP.
#[derive(Parser, Debug)]
#[command(name = "learnstyle-service")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the service
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the API server (loads artifacts once, then serves lookups)
    Run {
        /// Path to configuration file
        #[arg(short, long, env = "LEARNSTYLE_CONFIG")]
        config: Option<String>,
    },

    /// Resolve a single user id to its persona and print the result as JSON
    Resolve {
        /// Numeric user identifier
        #[arg(allow_negative_numbers = true)]
        user_id: i64,

        /// Path to configuration file
        #[arg(short, long, env = "LEARNSTYLE_CONFIG")]
        config: Option<String>,
    },

    /// Artifact management
    Artifacts {
        #[command(subcommand)]
        subcommand: ArtifactsSubcommand,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Artifact subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ArtifactsSubcommand {
    /// Load all artifacts and check catalog consistency
    Validate {
        /// Path to configuration file
        #[arg(short, long, env = "LEARNSTYLE_CONFIG")]
        config: Option<String>,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
