//! tagdl binary entry point

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use tagdl::cli::{Cli, Commands};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagdl=info"));

    let format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Pages(args) => args.execute(&cli.base_url).await,
        Commands::Download(args) => args.execute(&cli.base_url).await,
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
