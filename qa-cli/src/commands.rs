use std::path::PathBuf;

use clap::Subcommand;

use crate::args::*;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a feature file, or every feature file below a directory
    Run {
        path: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Parse features and check that every step resolves to a phrase
    Validate {
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List the documented phrases of the built-in dialects
    Phrases {
        #[command(flatten)]
        output: OutputArgs,
    },
}
