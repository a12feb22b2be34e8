//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Karang article generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: karang.conf)
    #[arg(short = 'C', long, default_value = "karang.conf")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write a starter config, subject list and key file
    Init,

    /// Generate pending articles once
    Generate {
        /// Override the configured batch size
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Run the periodic generation loop (Ctrl+C to stop)
    Schedule {
        /// Override the interval in minutes
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Upload generated posts to the configured GitHub repository
    Publish,

    /// Show subject and processing counts
    Status,
}

#[allow(unused)]
impl Cli {
    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init)
    }
    pub const fn is_generate(&self) -> bool {
        matches!(self.command, Commands::Generate { .. })
    }
    pub const fn is_schedule(&self) -> bool {
        matches!(self.command, Commands::Schedule { .. })
    }
}
