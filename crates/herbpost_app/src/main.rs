use anyhow::Result;
use clap::Parser;
use herbpost_app::{run, AppConfig, Cli};
use pipeline_logging::pipeline_error;
use publish_driver::AtxConnector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    pipeline_logging::initialize(cli.log_destination(), cli.log_level());

    let config = AppConfig::from_env()?;
    let connector = AtxConnector::new(config.device_address.clone());
    let mut stdout = std::io::stdout();
    let outcome = run(&config, &cli, connector, &mut stdout).await;
    if let Err(err) = &outcome {
        pipeline_error!("{:#}", err);
    }
    outcome
}
