// file: src/cli/args.rs
// version: 2.0.0
// guid: 6a1d3f8e-c924-4b07-9e5a-d8b2f07c41e6

//! Command line argument definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pve-devbox-agent")]
#[command(about = "Create and provision a development container on a Proxmox VE host")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Defaults to an interactive `create`
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[arg(long, global = true, help = "Also append log output to this file")]
    pub log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        global = true,
        env = "PVE_DEVBOX_CONFIG",
        help = "Tool configuration file (TOML)"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create, start and provision a container
    Create {
        #[arg(short, long, help = "Answers file (YAML or TOML) instead of prompts")]
        answers: Option<PathBuf>,

        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,

        #[arg(long, help = "Log mutating host commands instead of running them")]
        dry_run: bool,

        #[arg(long, help = "Print the summary as JSON")]
        json: bool,
    },

    /// Render the provisioning payload without touching the host
    Render {
        #[arg(short, long, help = "Answers file supplying hostname and editor choice")]
        answers: Option<PathBuf>,

        #[arg(short, long, help = "Write the script here instead of stdout")]
        output: Option<PathBuf>,
    },

    /// Check host prerequisites
    CheckPrereqs,
}

impl Commands {
    /// Subcommand used when none is given
    pub fn interactive_create() -> Self {
        Commands::Create {
            answers: None,
            yes: false,
            dry_run: false,
            json: false,
        }
    }
}
