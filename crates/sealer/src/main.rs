//! `sealer` — authoring CLI entry point.
//!
//! `seal` produces the envelope embedded in a published page; `open` checks an
//! envelope against a password before publishing.

mod cli;
mod commands;
mod password;
mod payload;
mod telemetry;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Command::Seal(args) => commands::seal(args),
        Command::Open(args) => commands::open(args),
    }
}
