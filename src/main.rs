//! `curate`: manage a local collection of learning paths.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
