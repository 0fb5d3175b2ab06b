//! Command-line interface definitions using clap
//!
//! Running without a subcommand starts the HTTP server.

use clap::{Parser, Subcommand};

/// adserve - targeted ad delivery service
#[derive(Parser, Debug)]
#[command(name = "adserve")]
#[command(version)]
#[command(about = "Targeted ad delivery service", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Reset today's ad creation counter to zero
    ResetCounter,

    /// Show ad creation counter and daily limit
    Quota,

    /// Print the ads a query would return, as JSON
    List {
        #[arg(long)]
        age: Option<String>,

        /// M or F
        #[arg(long)]
        gender: Option<String>,

        #[arg(long)]
        country: Option<String>,

        /// android, ios or web
        #[arg(long)]
        platform: Option<String>,

        #[arg(long)]
        offset: Option<String>,

        #[arg(long)]
        limit: Option<String>,
    },

    /// Configuration helpers
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Write a sample configuration file
    Generate {
        /// Output path; prints to stdout when omitted
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// The `list` flags as query pairs, in the form the HTTP layer sees them.
    pub fn list_pairs(&self) -> Vec<(String, String)> {
        let Commands::List {
            age,
            gender,
            country,
            platform,
            offset,
            limit,
        } = self
        else {
            return Vec::new();
        };

        [
            ("age", age),
            ("gender", gender),
            ("country", country),
            ("platform", platform),
            ("offset", offset),
            ("limit", limit),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name.to_string(), v.clone())))
        .collect()
    }
}
