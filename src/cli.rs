use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::commands::{RolesCommand, ServeCommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "imds-switch", version, about = "Mock EC2 instance metadata service with a switchable IAM role", long_about = None)]
pub struct Cli {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "Config file (default: $IMDS_SWITCH_CONFIG or ~/.config/imds-switch/config)"
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Increase verbosity (-v debug, -vv trace)")]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Serve the metadata endpoints and the role control API")]
    Serve(ServeCommand),
    #[command(about = "List the configured roles")]
    Roles(RolesCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let config = self.config;
        let command = self
            .command
            .unwrap_or_else(|| Commands::Serve(ServeCommand::default()));

        match command {
            Commands::Serve(cmd) => cmd.execute(config.as_deref()).await,
            Commands::Roles(cmd) => cmd.execute(config.as_deref()).await,
        }
    }
}
