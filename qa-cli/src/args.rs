use std::path::PathBuf;

use clap::{Args, ValueEnum};
use qa_exec::engine::DEFAULT_ENV_PREFIX;

use crate::output::OutputFormat;

#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ConfigArgs {
    /// JSON or YAML file whose top-level object seeds the scope
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,
    /// Scope value by path, e.g. `--set api.host=localhost`
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set_options: Vec<String>,
    /// Environment variables with this prefix become engine properties
    #[arg(long, default_value = DEFAULT_ENV_PREFIX)]
    pub env_prefix: String,
    #[arg(long)]
    pub no_env: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventsMode {
    Stdout,
    Progress,
    None,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[arg(long, value_enum, default_value_t = EventsMode::None)]
    pub events: EventsMode,
    /// Abort the whole run after this many milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,
}
