//! The `herbpost` pipeline: article scrape, post generation, device publish.
mod cli;
mod config;
mod run;

pub use cli::Cli;
pub use config::AppConfig;
pub use run::run;
