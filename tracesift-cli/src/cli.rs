use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Filter trace-item reports with declarative conditions")]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply a filter to one or more trace data reports
    Apply {
        /// Path to the YAML filter definition
        #[clap(long, short = 'f')]
        filter: PathBuf,

        /// Trace data report files (JSON or YAML)
        #[clap(required = true)]
        reports: Vec<PathBuf>,

        /// Output format for the matching items
        #[clap(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Validate a filter definition without applying it
    Check {
        /// Path to the YAML filter definition
        filter: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// One line per item: id and title
    Text,
    /// Matching item ids only
    Ids,
    /// Matching items as JSON
    Json,
    /// Matching items as YAML
    Yaml,
}
