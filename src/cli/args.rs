//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Mirror a declared component tree onto a 3D scene graph
#[derive(Parser, Debug)]
#[command(name = "scenetree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file layered over the global config
    #[arg(short, long, global = true, env = "SCENETREE_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register every node of a manifest, flush once, report the outcome
    Mount {
        /// Manifest file
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
        /// Fail when any node stays unattached (overrides config)
        #[arg(long)]
        strict: bool,
    },

    /// Show the mounted hierarchy as tree
    Tree {
        /// Manifest file
        #[arg(value_hint = ValueHint::FilePath)]
        manifest: PathBuf,
        /// Show the mirrored scene objects instead of node identifiers
        #[arg(long)]
        objects: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show config file locations
    Path,
    /// Print a commented config template
    Template,
}
