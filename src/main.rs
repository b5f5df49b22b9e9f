use clap::Parser;
use podpage::{compose, config, Result, Settings};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "podpage")]
#[command(about = "Generate the static podcast page from a feed and store metadata", long_about = None)]
struct Cli {
    /// Path to the podcast RSS feed
    #[arg(long, env = "FEED_PATH", default_value = config::DEFAULT_FEED_PATH)]
    feed: PathBuf,

    /// Path to the store metadata JSON
    #[arg(long, env = "STORE_PATH", default_value = config::DEFAULT_STORE_PATH)]
    store: PathBuf,

    /// Path to the HTML template
    #[arg(long, env = "TEMPLATE_PATH", default_value = config::DEFAULT_TEMPLATE_PATH)]
    template: PathBuf,

    /// Destination for the generated page
    #[arg(long, env = "OUTPUT_PATH", default_value = config::DEFAULT_OUTPUT_PATH)]
    output: PathBuf,
}

fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,podpage=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = Settings {
        feed_path: cli.feed,
        store_path: cli.store,
        template_path: cli.template,
        output_path: cli.output,
    };
    settings.validate()?;

    compose::generate(&settings)?;
    Ok(())
}
