use campusrag::cli;
use campusrag::cli::Cli;
use campusrag::config::AppConfig;
use campusrag::logging;
use campusrag::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;

    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init_logging_with_config(Some(&config))?;

    cli::run(cli, config).await
}
