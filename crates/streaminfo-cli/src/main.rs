use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod keys;

#[derive(Parser)]
#[command(name = "streaminfo")]
#[command(about = "Stream overlay session controller")]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "streaminfo.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drive a full session from a JSON-lines script (simulated host)
    Replay {
        /// Script file, one step per line
        script: PathBuf,
        /// Print overlay frames to the console instead of overlay.txt
        #[arg(long)]
        console: bool,
    },
    /// Write a default config file
    Init,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("streaminfo=info".parse()?))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Replay { script, console } => commands::replay::run(&args.config, &script, console),
        Command::Init => commands::init::run(&args.config),
    }
}
