use clap::Parser;
use demand_letter_lib::cli::{self, CliArgs};
use demand_letter_lib::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;
    cli::run(args, config).await?;
    Ok(())
}
