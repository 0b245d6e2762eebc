use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backoffice::{AppContext, Config};

mod cli;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backoffice=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let args = cli::Cli::parse();

    let code = match run(args).await {
        Ok(()) => 0,
        Err(e) if cli::is_reported(&e) => 1,
        Err(e) => {
            eprintln!("error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

async fn run(args: cli::Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::debug!("API at {}", config.api_url);

    let ctx = AppContext::from_config(config)?;
    let result = cli::run(&ctx, args).await;
    ctx.shutdown();
    result
}
