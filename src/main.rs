use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use training_client::cli::{self, Command};
use training_client::config::ClientConfig;
use training_client::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "training-client", version, about = "Client for the online training backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "training_client=warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Cli::parse();

    let config = ClientConfig::new_from_env()?;
    info!("using backend at {}", config.api_url);

    let state = AppState::from_config(&config).await?;

    if let Err(e) = cli::run(&state, args.command).await {
        error!("command failed: {}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}
