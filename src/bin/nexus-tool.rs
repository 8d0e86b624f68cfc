use anyhow::Result;
use clap::Parser;
use nexus_node_tool::cli::cli::Cli;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with menu output
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting nexus-tool v{}", nexus_node_tool::cli::VERSION);

    match cli.execute().await {
        Ok(code) => {
            info!("Exiting with code {}", code);
            std::process::exit(code);
        }
        Err(e) if e.exit_code() == 0 => {
            eprintln!("{}", e.user_message());
            std::process::exit(0);
        }
        Err(e) => {
            error!("Tool stopped: {:?}", e);
            eprintln!("Error: {}", e.user_message());
            std::process::exit(e.exit_code());
        }
    }
}
