// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "keyglow")]
#[command(author, version, about = "Game-state-driven per-key keyboard lighting")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/keyglow/keyglow.json)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the scripted game session against a terminal keyboard
    #[command(visible_alias = "d")]
    Demo {
        /// Ticks per second (1-60)
        #[arg(long, default_value = "20")]
        tps: u32,
    },

    /// Show the resolved configuration
    #[command(visible_aliases = ["cfg", "c"])]
    Config {
        /// Write the resolved values back to the config file
        #[arg(long)]
        write: bool,
    },
}
