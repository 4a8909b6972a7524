//! # RL Sandbox
//!
//! Entry point for the `sandbox` binary.
//!
//! Parses the command line and hands over to [`app::run`], which builds the
//! async runtime and executes the chosen command against the solver.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    app::run(cli)
}
