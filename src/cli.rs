use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::logger::LogLevel;

#[derive(Parser)]
#[command(
    name = "cms",
    version,
    about = "Work with CMS templates on a remote portal"
)]
pub struct Cli {
    /// Path to a config file (default: nearest cms.config.toml)
    #[arg(long, global = true, env = "CMS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set log level to debug
    #[arg(long, global = true)]
    pub debug: bool,

    /// Console verbosity (ignored with --debug)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lint a file or folder for HubL syntax
    Lint {
        /// Local file or folder to lint
        path: PathBuf,

        /// Portal name or ID to use (default: default_portal from config)
        #[arg(long, env = "CMS_PORTAL")]
        portal: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
