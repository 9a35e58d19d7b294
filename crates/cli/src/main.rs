//! proposal: turn client briefs into project proposals.
//!
//! Runs the proposal server, submits briefs to it and follows their
//! progress, or runs the pipeline in-process.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
