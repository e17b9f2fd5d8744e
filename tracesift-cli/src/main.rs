mod cli;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::path::{Path, PathBuf};

use tracesift_core::{load_all_items, Filter};

use crate::cli::{Cli, Command, OutputFormat};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Command::Apply {
            filter,
            reports,
            format,
        } => apply_filter(filter, reports, *format),
        Command::Check { filter } => check_filter(filter),
    }
}

fn apply_filter(filter_path: &Path, reports: &[PathBuf], format: OutputFormat) -> Result<()> {
    let filter = Filter::load(filter_path)?;
    let items = load_all_items(reports)?;
    let matched = filter.apply(&items)?;

    match format {
        OutputFormat::Text => {
            for item in &matched {
                println!("{}  {}", item.id.green(), item.title);
            }
            println!(
                "{}",
                format!("Matched {} of {} items", matched.len(), items.len()).bold()
            );
        }
        OutputFormat::Ids => {
            for item in &matched {
                println!("{}", item.id);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&matched)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&matched)?),
    }

    Ok(())
}

fn check_filter(filter_path: &Path) -> Result<()> {
    let filter = Filter::load(filter_path)?;

    println!("{}", "Filter definition is valid".green());
    println!("Named conditions: {}", filter.named_conditions().len());

    Ok(())
}
