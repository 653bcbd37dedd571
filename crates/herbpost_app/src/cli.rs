use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use pipeline_logging::LogDestination;

/// Scrape a natural-healing article, turn it into a short post and publish it
/// from an Android phone.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "herbpost", version)]
pub struct Cli {
    /// Print the scraped content and generated post instead of posting
    #[arg(long)]
    pub dry_run: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}
